//! Cross-recognizer state for one touch session.

use log::debug;

use crate::config::{GestureSettings, Thresholds};
use crate::event::Point;
use crate::host::{GestureTelemetry, MapHost, TelemetryKind};

/// The continuous recognizers that compete for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuous {
    Zoom,
    Rotate,
    Tilt,
}

#[derive(Debug, Clone, Default)]
pub struct SessionFlags {
    /// A second finger went down and nothing has claimed the stream yet.
    pub two_tap: bool,
    pub zoom_started: bool,
    /// Set when a quick-scale zoom committed; swallows the next double-tap zoom.
    pub quick_zoom: bool,
    /// A tilt owns the stream; pan and rotate stay quiet.
    pub drag_started: bool,
    pub scroll_in_progress: bool,
    committed: Option<Continuous>,
}

impl SessionFlags {
    /// First contact of a new stream.
    pub fn begin_session(&mut self) {
        self.committed = None;
        self.two_tap = false;
    }

    pub fn cancel_session(&mut self) {
        self.committed = None;
        self.two_tap = false;
        self.scroll_in_progress = false;
    }

    pub fn committed(&self) -> Option<Continuous> {
        self.committed
    }

    /// True when a recognizer other than `kind` already owns the session.
    pub fn owned_by_other(&self, kind: Continuous) -> bool {
        self.committed.is_some_and(|c| c != kind)
    }

    /// Claims the session for `kind`. The first claim wins; a claim also ends
    /// any two-finger tap candidacy.
    pub fn try_commit(&mut self, kind: Continuous) -> bool {
        match self.committed {
            Some(owner) => owner == kind,
            None => {
                debug!("{kind:?} owns the touch session");
                self.committed = Some(kind);
                self.two_tap = false;
                true
            }
        }
    }
}

/// What a recognizer sees of the world while handling one event.
pub struct GestureContext<'a> {
    pub host: &'a mut dyn MapHost,
    pub flags: &'a mut SessionFlags,
    pub settings: &'a GestureSettings,
    pub thresholds: &'a Thresholds,
    pub focal_point: Option<Point>,
}

impl GestureContext<'_> {
    pub fn density(&self) -> f64 {
        self.thresholds.density()
    }

    pub fn scroll_enabled(&self) -> bool {
        self.settings.scroll_gestures && !self.host.scroll_locked()
    }

    pub fn rotate_enabled(&self) -> bool {
        self.settings.rotate_gestures && !self.host.rotate_locked()
    }

    /// Converts a screen-pixel anchor to the viewport's density-independent units.
    pub fn anchor(&self, p: Point) -> (f64, f64) {
        let d = self.density();
        (p.x as f64 / d, p.y as f64 / d)
    }

    /// The user override if set, otherwise `fallback`.
    pub fn focus_or(&self, fallback: Point) -> Point {
        self.focal_point.unwrap_or(fallback)
    }

    pub fn track(&mut self, kind: TelemetryKind, point: Point) {
        self.host.track(GestureTelemetry { kind, point });
    }
}
