//! A host that records every call the core makes.
//!
//! Used by `touchmap replay` to print what a script does, and by the tests.

use serde::Serialize;

use crate::event::Point;
use crate::host::{
    Annotations, GestureTelemetry, LatLng, MapListener, MarkerRef, Projection, Rect, Telemetry,
    TelemetryKind, Viewport,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    MoveBy {
        dx: f64,
        dy: f64,
        duration_ms: Option<u64>,
    },
    ScaleBy {
        factor: f64,
        x: f64,
        y: f64,
    },
    SetBearing {
        bearing: f64,
        x: f64,
        y: f64,
    },
    SetPitch {
        pitch: f64,
    },
    Zoom {
        zoom_in: bool,
        focus: Option<Point>,
    },
    CancelTransitions,
    GestureInProgress {
        active: bool,
    },
    ResetTracking {
        translate: bool,
        rotate: bool,
    },
    DisallowIntercept,
    ZoomControls {
        visible: bool,
    },
    SelectMarker {
        marker: MarkerRef,
    },
    ClickMarkerView {
        marker: MarkerRef,
    },
    DeselectMarkers,
    MapClick {
        position: LatLng,
    },
    MapLongClick {
        position: LatLng,
    },
    Fling,
    Scroll,
    Telemetry {
        kind: TelemetryKind,
        point: Point,
    },
}

impl Command {
    /// Commands that change what the camera shows.
    pub fn moves_camera(&self) -> bool {
        matches!(
            self,
            Command::MoveBy { .. }
                | Command::ScaleBy { .. }
                | Command::SetBearing { .. }
                | Command::SetPitch { .. }
                | Command::Zoom { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct RecordingHost {
    pub commands: Vec<Command>,
    pub bearing: f64,
    pub pitch: f64,
    pub size: (f32, f32),
    pub icon_size: (f32, f32),
    pub markers: Vec<(MarkerRef, Point)>,
    pub selected: Vec<MarkerRef>,
    pub scroll_locked: bool,
    pub rotate_locked: bool,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            bearing: 0.0,
            pitch: 0.0,
            size: (1080.0, 1920.0),
            icon_size: (20.0, 40.0),
            markers: Vec::new(),
            selected: Vec::new(),
            scroll_locked: false,
            rotate_locked: false,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn place_marker(&mut self, marker: MarkerRef, at: Point) {
        self.markers.push((marker, at));
    }

    /// Drains the recorded commands.
    pub fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    pub fn scales(&self) -> Vec<f64> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::ScaleBy { factor, .. } => Some(*factor),
                _ => None,
            })
            .collect()
    }

    pub fn zooms(&self) -> Vec<bool> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Zoom { zoom_in, .. } => Some(*zoom_in),
                _ => None,
            })
            .collect()
    }

    pub fn moves(&self) -> Vec<(f64, f64)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::MoveBy { dx, dy, .. } => Some((*dx, *dy)),
                _ => None,
            })
            .collect()
    }

    pub fn telemetry(&self) -> Vec<TelemetryKind> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Telemetry { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }
}

impl Viewport for RecordingHost {
    fn move_by(&mut self, dx: f64, dy: f64, duration_ms: Option<u64>) {
        self.commands.push(Command::MoveBy {
            dx,
            dy,
            duration_ms,
        });
    }

    fn scale_by(&mut self, factor: f64, x: f64, y: f64) {
        self.commands.push(Command::ScaleBy { factor, x, y });
    }

    fn set_bearing(&mut self, bearing: f64, x: f64, y: f64) {
        self.bearing = bearing;
        self.commands.push(Command::SetBearing { bearing, x, y });
    }

    fn set_pitch(&mut self, pitch: f64) {
        self.pitch = pitch;
        self.commands.push(Command::SetPitch { pitch });
    }

    fn zoom(&mut self, zoom_in: bool, focus: Option<Point>) {
        self.commands.push(Command::Zoom { zoom_in, focus });
    }

    fn cancel_transitions(&mut self) {
        self.commands.push(Command::CancelTransitions);
    }

    fn set_gesture_in_progress(&mut self, in_progress: bool) {
        self.commands.push(Command::GestureInProgress {
            active: in_progress,
        });
    }

    fn bearing(&self) -> f64 {
        self.bearing
    }

    fn pitch(&self) -> f64 {
        self.pitch
    }

    fn size(&self) -> (f32, f32) {
        self.size
    }

    fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    fn rotate_locked(&self) -> bool {
        self.rotate_locked
    }

    fn reset_tracking_modes(&mut self, translate: bool, rotate: bool) {
        self.commands
            .push(Command::ResetTracking { translate, rotate });
    }

    fn disallow_intercept(&mut self) {
        self.commands.push(Command::DisallowIntercept);
    }

    fn set_zoom_controls_visible(&mut self, visible: bool) {
        self.commands.push(Command::ZoomControls { visible });
    }
}

impl Projection for RecordingHost {
    /// Screen-space stand-in: y maps to latitude, x to longitude.
    fn from_screen_location(&self, point: Point) -> LatLng {
        LatLng {
            latitude: point.y as f64,
            longitude: point.x as f64,
        }
    }
}

impl Annotations for RecordingHost {
    fn average_icon_size(&self) -> (f32, f32) {
        self.icon_size
    }

    fn markers_in_rect(&self, rect: Rect) -> Vec<MarkerRef> {
        self.markers
            .iter()
            .filter(|(_, at)| rect.contains(*at))
            .map(|(m, _)| *m)
            .collect()
    }

    fn selected_markers(&self) -> Vec<MarkerRef> {
        self.selected.clone()
    }

    fn select_marker(&mut self, marker: MarkerRef) {
        self.selected.push(marker);
        self.commands.push(Command::SelectMarker { marker });
    }

    fn click_marker_view(&mut self, marker: MarkerRef) {
        self.commands.push(Command::ClickMarkerView { marker });
    }

    fn deselect_markers(&mut self) {
        self.selected.clear();
        self.commands.push(Command::DeselectMarkers);
    }
}

impl MapListener for RecordingHost {
    fn on_map_click(&mut self, position: LatLng) {
        self.commands.push(Command::MapClick { position });
    }

    fn on_map_long_click(&mut self, position: LatLng) {
        self.commands.push(Command::MapLongClick { position });
    }

    fn on_fling(&mut self) {
        self.commands.push(Command::Fling);
    }

    fn on_scroll(&mut self) {
        self.commands.push(Command::Scroll);
    }
}

impl Telemetry for RecordingHost {
    fn track(&mut self, event: GestureTelemetry) {
        self.commands.push(Command::Telemetry {
            kind: event.kind,
            point: event.point,
        });
    }
}
