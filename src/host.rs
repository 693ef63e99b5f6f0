//! Collaborators the gesture core drives.
//!
//! A host implements every trait here (most methods have no-op defaults) and
//! is then usable as a [`MapHost`].

use serde::{Deserialize, Serialize};

use crate::event::Point;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// A rectangle centred on `center` with the given half extents.
    pub fn around(center: Point, half_width: f32, half_height: f32) -> Self {
        Self {
            left: center.x - half_width,
            top: center.y - half_height,
            right: center.x + half_width,
            bottom: center.y + half_height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Drawn by the map as an icon; selecting shows its info window.
    Icon,
    /// Backed by a host view that handles its own click.
    View,
}

/// A selectable annotation. Ordering is by id, which is the order the
/// click target is chosen in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkerRef {
    pub id: u64,
    pub kind: MarkerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryKind {
    SingleTap,
    DoubleTap,
    TwoFingerSingleTap,
    PinchStart,
    RotationStart,
    PitchStart,
    PanStart,
    DragEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureTelemetry {
    pub kind: TelemetryKind,
    pub point: Point,
}

/// The camera the gestures move.
///
/// Offsets and anchors passed to `move_by`, `scale_by` and `set_bearing` are
/// in density-independent units; `zoom` takes screen pixels.
pub trait Viewport {
    fn move_by(&mut self, dx: f64, dy: f64, duration_ms: Option<u64>);
    fn scale_by(&mut self, factor: f64, x: f64, y: f64);
    fn set_bearing(&mut self, bearing: f64, x: f64, y: f64);
    fn set_pitch(&mut self, pitch: f64);
    /// Animated one-step zoom; `None` zooms about the viewport centre.
    fn zoom(&mut self, zoom_in: bool, focus: Option<Point>);
    fn cancel_transitions(&mut self);
    fn set_gesture_in_progress(&mut self, in_progress: bool);
    fn bearing(&self) -> f64;
    fn pitch(&self) -> f64;
    /// Viewport size in screen pixels.
    fn size(&self) -> (f32, f32);

    /// True while a location tracking mode pins the camera position.
    fn scroll_locked(&self) -> bool {
        false
    }
    /// True while a tracking mode pins the bearing.
    fn rotate_locked(&self) -> bool {
        false
    }
    fn reset_tracking_modes(&mut self, _translate: bool, _rotate: bool) {}
    /// Ask enclosing scroll containers to stop stealing this touch stream.
    fn disallow_intercept(&mut self) {}
    fn set_zoom_controls_visible(&mut self, _visible: bool) {}
}

pub trait Projection {
    fn from_screen_location(&self, point: Point) -> LatLng;
}

pub trait Annotations {
    /// Average marker icon size in pixels, used to size the tap target.
    fn average_icon_size(&self) -> (f32, f32) {
        (0.0, 0.0)
    }
    fn markers_in_rect(&self, _rect: Rect) -> Vec<MarkerRef> {
        Vec::new()
    }
    fn selected_markers(&self) -> Vec<MarkerRef> {
        Vec::new()
    }
    fn select_marker(&mut self, _marker: MarkerRef) {}
    fn click_marker_view(&mut self, _marker: MarkerRef) {}
    fn deselect_markers(&mut self) {}
}

pub trait MapListener {
    fn on_map_click(&mut self, _position: LatLng) {}
    fn on_map_long_click(&mut self, _position: LatLng) {}
    fn on_fling(&mut self) {}
    fn on_scroll(&mut self) {}
}

/// Fire-and-forget gesture analytics. Implementations swallow their own failures.
pub trait Telemetry {
    fn track(&mut self, _event: GestureTelemetry) {}
}

pub trait MapHost: Viewport + Projection + Annotations + MapListener + Telemetry {}

impl<T> MapHost for T where T: Viewport + Projection + Annotations + MapListener + Telemetry {}
