//! Keys, trackball, mouse wheel, hover and zoom buttons.
//!
//! These paths issue immediate viewport commands; only the trackball long
//! press goes through the arbiter's task queue.

use log::{debug, trace};

use crate::arbiter::{Deferred, GestureArbiter};
use crate::event::{GenericMotionEvent, KeyCode, KeyEvent, MotionAction, Phase, TrackballEvent};
use crate::host::MapHost;
use crate::scheduler::TaskHandle;

/// Pixels moved per d-pad press.
const KEY_SCROLL_PX: f64 = 10.0;
/// Pixels moved per press once the key has auto-repeated this often.
const KEY_SCROLL_FAST_PX: f64 = 50.0;
const KEY_FAST_REPEAT_COUNT: u32 = 5;
/// Trackball units are scaled up by this before panning.
const TRACKBALL_SCROLL_FACTOR: f64 = 10.0;

impl<H: MapHost> GestureArbiter<H> {
    pub fn on_key_down(&mut self, event: &KeyEvent) -> bool {
        let step = if event.repeat_count >= KEY_FAST_REPEAT_COUNT {
            KEY_SCROLL_FAST_PX
        } else {
            KEY_SCROLL_PX
        };
        let (dx, dy) = match event.code {
            // tracked so a long press can zoom out
            KeyCode::Enter | KeyCode::DpadCenter => return true,
            KeyCode::DpadLeft => (step, 0.0),
            KeyCode::DpadRight => (-step, 0.0),
            KeyCode::DpadUp => (0.0, step),
            KeyCode::DpadDown => (0.0, -step),
            KeyCode::Other => return false,
        };
        if !self.scroll_enabled() {
            return false;
        }

        self.host.cancel_transitions();
        let d = self.thresholds.density();
        self.host.move_by(dx / d, dy / d, None);
        true
    }

    pub fn on_key_long_press(&mut self, event: &KeyEvent) -> bool {
        match event.code {
            KeyCode::Enter | KeyCode::DpadCenter => {
                if !self.settings.zoom_gestures {
                    return false;
                }
                self.host.zoom(false, None);
                true
            }
            _ => false,
        }
    }

    pub fn on_key_up(&mut self, event: &KeyEvent) -> bool {
        if event.canceled {
            return false;
        }
        match event.code {
            KeyCode::Enter | KeyCode::DpadCenter => {
                if !self.settings.zoom_gestures {
                    return false;
                }
                self.host.zoom(true, None);
                true
            }
            _ => false,
        }
    }

    pub fn on_trackball_event(&mut self, event: &TrackballEvent) -> bool {
        self.advance(event.time_ms);
        match event.phase {
            Phase::Move => {
                if !self.scroll_enabled() {
                    return false;
                }
                self.host.cancel_transitions();
                let d = self.thresholds.density();
                self.host.move_by(
                    -TRACKBALL_SCROLL_FACTOR * event.dx as f64 / d,
                    -TRACKBALL_SCROLL_FACTOR * event.dy as f64 / d,
                    None,
                );
                true
            }
            Phase::Down => {
                self.cancel_trackball_long_press();
                let due = event.time_ms + self.thresholds.long_press_timeout_ms;
                self.trackball_long_press =
                    Some(self.tasks.schedule(due, Deferred::TrackballLongPress));
                true
            }
            Phase::Up => {
                let was_pending = self.cancel_trackball_long_press();
                if !self.settings.zoom_gestures {
                    return false;
                }
                if was_pending {
                    self.host.zoom(true, None);
                }
                true
            }
            Phase::Cancel => {
                self.cancel_trackball_long_press();
                true
            }
            Phase::PointerDown | Phase::PointerUp => false,
        }
    }

    /// Fired from the task queue once the trackball was held down long enough.
    pub(crate) fn on_trackball_long_press(&mut self, handle: TaskHandle) {
        if self.trackball_long_press != Some(handle) {
            trace!("stale trackball long press {handle:?}");
            return;
        }
        self.trackball_long_press = None;
        if self.settings.zoom_gestures {
            debug!("trackball held, zooming out");
            self.host.zoom(false, None);
        }
    }

    /// Returns whether a long press was still pending.
    fn cancel_trackball_long_press(&mut self) -> bool {
        match self.trackball_long_press.take() {
            Some(handle) => self.tasks.cancel(handle),
            None => false,
        }
    }

    /// Mouse wheel and other pointer-class motion outside a touch stream.
    pub fn on_generic_motion(&mut self, event: &GenericMotionEvent) -> bool {
        self.advance(event.time_ms);
        if !event.source.is_pointer_class() {
            return false;
        }
        match event.action {
            MotionAction::Scroll => {
                if !self.settings.zoom_gestures {
                    return false;
                }
                self.host.cancel_transitions();
                let d = self.thresholds.density();
                self.host.scale_by(
                    2f64.powf(event.vscroll as f64),
                    event.position.x as f64 / d,
                    event.position.y as f64 / d,
                );
                true
            }
            _ => false,
        }
    }

    pub fn on_hover(&mut self, event: &GenericMotionEvent) -> bool {
        let visible = match event.action {
            MotionAction::HoverEnter | MotionAction::HoverMove => true,
            MotionAction::HoverExit => false,
            _ => return false,
        };
        if self.settings.zoom_controls {
            self.host.set_zoom_controls_visible(visible);
        }
        true
    }

    /// A press on one of the on-screen zoom buttons.
    pub fn on_zoom_button(&mut self, zoom_in: bool) -> bool {
        if !self.settings.zoom_gestures {
            return false;
        }
        self.host.zoom(zoom_in, None);
        true
    }

    pub fn on_visibility_changed(&mut self, visible: bool) {
        if self.settings.zoom_controls {
            self.host.set_zoom_controls_visible(visible);
        }
    }

    /// The map left the screen: hide the controls and drop pending work.
    pub fn on_detached(&mut self) {
        if self.settings.zoom_controls {
            self.host.set_zoom_controls_visible(false);
        }
        self.cancel_trackball_long_press();
        self.tasks.clear();
    }
}
