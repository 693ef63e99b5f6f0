//! Raw input as the core sees it: touch streams, keys, trackball and generic motion.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Point) -> f32 {
        self.distance_sq(other).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// First contact of a stream.
    Down,
    Move,
    /// Last contact left the surface.
    Up,
    /// An additional contact joined the stream.
    PointerDown,
    /// A contact left while others remain.
    PointerUp,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    #[default]
    None,
    Primary,
    Secondary,
    Tertiary,
}

impl ButtonState {
    /// Touch streams only carry "no button" or the primary button.
    pub fn is_touch_compatible(self) -> bool {
        matches!(self, ButtonState::None | ButtonState::Primary)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    #[default]
    Touchscreen,
    Mouse,
    Stylus,
    Touchpad,
    Trackball,
    Joystick,
    Keyboard,
}

impl Source {
    /// Devices that report absolute screen positions.
    pub fn is_pointer_class(self) -> bool {
        matches!(
            self,
            Source::Touchscreen | Source::Mouse | Source::Stylus | Source::Touchpad
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub id: i32,
    pub x: f32,
    pub y: f32,
}

impl Pointer {
    pub const fn new(id: i32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One dispatch of a touch stream.
///
/// `pointers` holds every contact present for this event, including the one
/// leaving on `PointerUp`/`Up`; `action_index` names the contact that changed.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub phase: Phase,
    pub action_index: usize,
    pub pointers: Vec<Pointer>,
    pub time_ms: u64,
    pub down_time_ms: u64,
    pub source: Source,
    pub buttons: ButtonState,
}

impl PointerEvent {
    pub fn new(phase: Phase, pointers: Vec<Pointer>, time_ms: u64) -> Self {
        let action_index = match phase {
            Phase::PointerDown | Phase::PointerUp => pointers.len().saturating_sub(1),
            _ => 0,
        };
        Self {
            phase,
            action_index,
            pointers,
            time_ms,
            down_time_ms: time_ms,
            source: Source::Touchscreen,
            buttons: ButtonState::None,
        }
    }

    pub fn with_down_time(mut self, down_time_ms: u64) -> Self {
        self.down_time_ms = down_time_ms;
        self
    }

    pub fn with_action_index(mut self, index: usize) -> Self {
        self.action_index = index;
        self
    }

    pub fn with_buttons(mut self, buttons: ButtonState) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn first_point(&self) -> Point {
        self.pointers
            .first()
            .map(Pointer::point)
            .unwrap_or_default()
    }

    fn is_leaving(&self, index: usize) -> bool {
        matches!(self.phase, Phase::PointerUp) && index == self.action_index
    }

    /// Contacts that remain down after this event.
    pub fn staying(&self) -> impl Iterator<Item = &Pointer> {
        self.pointers
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.is_leaving(*i))
            .map(|(_, p)| p)
    }

    pub fn staying_count(&self) -> usize {
        self.staying().count()
    }

    /// Centroid of every contact in the event.
    pub fn focus(&self) -> Point {
        centroid(self.pointers.iter())
    }

    /// Centroid of the contacts that remain down.
    pub fn staying_focus(&self) -> Point {
        centroid(self.staying())
    }
}

fn centroid<'a>(pointers: impl Iterator<Item = &'a Pointer>) -> Point {
    let (mut sx, mut sy, mut n) = (0.0f32, 0.0f32, 0usize);
    for p in pointers {
        sx += p.x;
        sy += p.y;
        n += 1;
    }
    if n == 0 {
        return Point::default();
    }
    Point::new(sx / n as f32, sy / n as f32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCode {
    Enter,
    DpadCenter,
    DpadLeft,
    DpadRight,
    DpadUp,
    DpadDown,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub repeat_count: u32,
    /// Set by the input system when the key press was aborted (virtual keyboards).
    pub canceled: bool,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            repeat_count: 0,
            canceled: false,
        }
    }

    pub fn repeated(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    pub fn canceled(mut self) -> Self {
        self.canceled = true;
        self
    }
}

/// Trackball input; motion deltas are relative, in device units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackballEvent {
    pub phase: Phase,
    pub dx: f32,
    pub dy: f32,
    pub time_ms: u64,
}

impl TrackballEvent {
    pub fn new(phase: Phase, time_ms: u64) -> Self {
        Self {
            phase,
            dx: 0.0,
            dy: 0.0,
            time_ms,
        }
    }

    pub fn motion(dx: f32, dy: f32, time_ms: u64) -> Self {
        Self {
            phase: Phase::Move,
            dx,
            dy,
            time_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionAction {
    Scroll,
    HoverEnter,
    HoverMove,
    HoverExit,
    Other,
}

/// Motion that is not part of a touch stream: wheels, hover, joysticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenericMotionEvent {
    pub action: MotionAction,
    pub source: Source,
    pub position: Point,
    /// Vertical scroll axis; one wheel click is 1.0.
    pub vscroll: f32,
    pub time_ms: u64,
}

impl GenericMotionEvent {
    pub fn scroll(position: Point, vscroll: f32, time_ms: u64) -> Self {
        Self {
            action: MotionAction::Scroll,
            source: Source::Mouse,
            position,
            vscroll,
            time_ms,
        }
    }

    pub fn hover(action: MotionAction, position: Point, time_ms: u64) -> Self {
        Self {
            action,
            source: Source::Mouse,
            position,
            vscroll: 0.0,
            time_ms,
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }
}
