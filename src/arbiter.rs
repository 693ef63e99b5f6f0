//! The single entry point for touch input.
//!
//! Every touch event goes to the rotate, pinch and shove recognizers (in that
//! order), then through the two-finger-tap and session bookkeeping, and last to
//! the single-pointer recognizer whose outputs become taps, pans and flings.

use log::{debug, trace};

use crate::config::{GestureSettings, Thresholds};
use crate::event::{Phase, Point, PointerEvent};
use crate::host::{GestureTelemetry, MapHost, MarkerKind, Rect, TelemetryKind};
use crate::rotate::RotateGesture;
use crate::scale::PinchGesture;
use crate::scheduler::{TaskHandle, TaskQueue};
use crate::session::{GestureContext, SessionFlags};
use crate::shove::ShoveGesture;
use crate::tap::{TapGesture, TapRecognizer};

/// Horizontal slack around a marker's icon when hit-testing a tap, in dp.
const TAP_TOLERANCE_SIDES_DP: f32 = 4.0;
/// Vertical slack, in dp.
const TAP_TOLERANCE_TOP_BOTTOM_DP: f32 = 10.0;
/// Fling velocity (px/s) is divided by this to get the glide distance.
const FLING_DIVISOR: f64 = 4.0;
const FLING_DURATION_MS: u64 = 1000;

/// Work scheduled on the arbiter's own queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Deferred {
    TrackballLongPress,
}

pub struct GestureArbiter<H: MapHost> {
    pub(crate) host: H,
    pub(crate) thresholds: Thresholds,
    pub(crate) settings: GestureSettings,
    focal_override: Option<Point>,
    pub(crate) flags: SessionFlags,
    tap: TapRecognizer,
    pinch: PinchGesture,
    rotate: RotateGesture,
    shove: ShoveGesture,
    pub(crate) tasks: TaskQueue<Deferred>,
    /// Pending trackball long-press, cleared before it is acted on.
    pub(crate) trackball_long_press: Option<TaskHandle>,
}

impl<H: MapHost> GestureArbiter<H> {
    pub fn new(host: H, thresholds: Thresholds, settings: GestureSettings) -> Self {
        Self {
            host,
            tap: TapRecognizer::new(thresholds.clone()),
            thresholds,
            settings,
            focal_override: None,
            flags: SessionFlags::default(),
            pinch: PinchGesture::new(),
            rotate: RotateGesture::new(),
            shove: ShoveGesture::new(),
            tasks: TaskQueue::new(),
            trackball_long_press: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn flags(&self) -> &SessionFlags {
        &self.flags
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn set_settings(&mut self, settings: GestureSettings) {
        self.settings = settings;
    }

    pub fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.tap.set_thresholds(thresholds.clone());
        self.thresholds = thresholds;
    }

    /// Pins every zoom, rotate and double-tap anchor to `point`. `None` falls
    /// back to the focal point from the settings, if any.
    pub fn set_focal_point(&mut self, point: Option<Point>) {
        self.focal_override = point;
    }

    /// The anchor in effect: explicit override, then settings, then none.
    pub fn focal_point(&self) -> Option<Point> {
        self.focal_override.or(self.settings.focal_point)
    }

    /// Earliest time at which [`advance`](Self::advance) has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.tap.next_deadline(), self.tasks.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Runs every timer and deferred task due at `now_ms`.
    pub fn advance(&mut self, now_ms: u64) {
        for gesture in self.tap.advance(now_ms) {
            self.on_tap_gesture(gesture);
        }
        while let Some((handle, task)) = self.tasks.pop_due(now_ms) {
            match task {
                Deferred::TrackballLongPress => self.on_trackball_long_press(handle),
            }
        }
    }

    pub fn on_touch_event(&mut self, event: &PointerEvent) -> bool {
        self.advance(event.time_ms);

        if !event.buttons.is_touch_compatible() {
            trace!("ignoring touch with {:?} pressed", event.buttons);
            return false;
        }
        if event.pointers.is_empty() {
            trace!("ignoring {:?} without contacts", event.phase);
            return false;
        }

        if event.phase == Phase::Down {
            self.flags.begin_session();
        }
        self.feed_continuous(event);

        match event.phase {
            Phase::Down => self.host.set_gesture_in_progress(true),
            Phase::PointerDown => {
                self.flags.two_tap = event.pointer_count() == 2
                    && self.settings.zoom_gestures
                    && self.flags.committed().is_none();
                if self.flags.two_tap {
                    self.track(TelemetryKind::TwoFingerSingleTap, event.first_point());
                }
            }
            Phase::Up => {
                if self.try_two_finger_tap(event) {
                    return true;
                }
                if self.flags.scroll_in_progress {
                    self.track(TelemetryKind::DragEnd, event.first_point());
                    self.flags.scroll_in_progress = false;
                }
                self.flags.two_tap = false;
                self.host.set_gesture_in_progress(false);
            }
            Phase::Cancel => {
                self.flags.cancel_session();
                self.host.set_gesture_in_progress(false);
            }
            Phase::Move | Phase::PointerUp => {}
        }

        let mut handled = false;
        for gesture in self.tap.on_touch(event) {
            handled |= self.on_tap_gesture(gesture);
        }

        debug_assert!(
            !(self.flags.zoom_started && self.flags.drag_started),
            "zoom and tilt both own the session"
        );
        debug_assert!(
            !(self.flags.two_tap && self.flags.committed().is_some()),
            "two-finger tap survived a commit"
        );
        handled
    }

    fn feed_continuous(&mut self, event: &PointerEvent) {
        let focal_point = self.focal_point();
        let Self {
            host,
            flags,
            settings,
            thresholds,
            rotate,
            pinch,
            shove,
            ..
        } = self;
        let mut ctx = GestureContext {
            host,
            flags,
            settings,
            thresholds,
            focal_point,
        };
        rotate.on_touch(event, &mut ctx);
        pinch.on_touch(event, &mut ctx);
        shove.on_touch(event, &mut ctx);
    }

    /// Two contacts down and up within the tap timeout, with nothing
    /// continuous running: zoom out one step.
    fn try_two_finger_tap(&mut self, event: &PointerEvent) -> bool {
        let is_tap = event.time_ms.saturating_sub(event.down_time_ms) <= self.thresholds.tap_timeout_ms;
        let in_progress = self.rotate.is_in_progress()
            || self.pinch.is_in_progress()
            || self.shove.is_in_progress();
        if !(self.flags.two_tap && is_tap && !in_progress) {
            return false;
        }

        let focus = self.focal_point().unwrap_or_else(|| event.focus());
        debug!("two-finger tap, zooming out about ({:.0}, {:.0})", focus.x, focus.y);
        self.host.zoom(false, Some(focus));
        self.flags.two_tap = false;
        self.host.set_gesture_in_progress(false);
        // the stream was a tap for us, not for the single-pointer recognizer
        self.tap.cancel();
        true
    }

    fn on_tap_gesture(&mut self, gesture: TapGesture) -> bool {
        match gesture {
            TapGesture::Down { .. } => {
                if self.settings.zoom_controls {
                    self.host.set_zoom_controls_visible(true);
                }
                true
            }
            TapGesture::SingleTapUp { .. } => {
                self.host.cancel_transitions();
                true
            }
            TapGesture::SingleTapConfirmed { at } => {
                self.on_single_tap_confirmed(at);
                true
            }
            TapGesture::DoubleTap { phase, at } => self.on_double_tap(phase, at),
            TapGesture::LongPress { at } => {
                if !self.flags.quick_zoom {
                    let position = self.host.from_screen_location(at);
                    self.host.on_map_long_click(position);
                }
                true
            }
            TapGesture::Scroll { distance, .. } => self.on_scroll(distance),
            TapGesture::Fling { origin, velocity } => self.on_fling(origin, velocity),
        }
    }

    fn on_single_tap_confirmed(&mut self, at: Point) {
        let d = self.thresholds.pixel_density;
        let (icon_w, icon_h) = self.host.average_icon_size();
        let rect = Rect::around(
            at,
            icon_w / 2.0 + TAP_TOLERANCE_SIDES_DP * d,
            icon_h / 2.0 + TAP_TOLERANCE_TOP_BOTTOM_DP * d,
        );

        let mut nearby = self.host.markers_in_rect(rect);
        nearby.sort();
        let selected = self.host.selected_markers();
        match nearby.into_iter().find(|m| !selected.contains(m)) {
            Some(marker) => {
                debug!("tap picked marker {}", marker.id);
                match marker.kind {
                    MarkerKind::View => self.host.click_marker_view(marker),
                    MarkerKind::Icon => self.host.select_marker(marker),
                }
            }
            None => {
                if self.settings.deselect_markers_on_tap {
                    self.host.deselect_markers();
                }
                let position = self.host.from_screen_location(at);
                self.host.on_map_click(position);
            }
        }
        self.track(TelemetryKind::SingleTap, at);
    }

    fn on_double_tap(&mut self, phase: Phase, at: Point) -> bool {
        if !self.settings.zoom_gestures {
            return false;
        }
        if phase == Phase::Down {
            // only a real double tap may turn into a quick-scale drag
            self.pinch.arm_quick_scale(at);
        } else if phase == Phase::Up {
            if self.flags.quick_zoom {
                debug!("double tap closed a quick zoom, not zooming again");
                self.flags.quick_zoom = false;
            } else {
                let focus = self.focal_point().unwrap_or(at);
                self.host.zoom(true, Some(focus));
            }
            self.track(TelemetryKind::DoubleTap, at);
        }
        true
    }

    fn on_scroll(&mut self, distance: (f32, f32)) -> bool {
        self.flags.scroll_in_progress = true;
        if !self.scroll_enabled() {
            return false;
        }
        if self.flags.drag_started || self.flags.committed().is_some() {
            return false;
        }

        self.host.disallow_intercept();
        self.host.reset_tracking_modes(true, false);
        self.host.cancel_transitions();

        let d = self.thresholds.density();
        self.host
            .move_by(-distance.0 as f64 / d, -distance.1 as f64 / d, None);
        self.host.on_scroll();
        true
    }

    fn on_fling(&mut self, origin: Point, velocity: (f32, f32)) -> bool {
        if !self.scroll_enabled() {
            return false;
        }
        if self.flags.drag_started || self.flags.committed().is_some() {
            trace!("fling after a continuous gesture ignored");
            return false;
        }

        self.host.reset_tracking_modes(true, false);
        self.host.cancel_transitions();

        let d = self.thresholds.density();
        let dx = velocity.0 as f64 / FLING_DIVISOR / d;
        let dy = velocity.1 as f64 / FLING_DIVISOR / d;
        self.host.set_gesture_in_progress(true);
        self.host.move_by(dx, dy, Some(FLING_DURATION_MS));
        self.host.set_gesture_in_progress(false);

        self.host.on_fling();
        self.track(TelemetryKind::PanStart, origin);
        true
    }

    /// Scroll toggle on and no tracking mode pinning the camera.
    pub(crate) fn scroll_enabled(&self) -> bool {
        self.settings.scroll_gestures && !self.host.scroll_locked()
    }

    pub(crate) fn track(&mut self, kind: TelemetryKind, point: Point) {
        self.host.track(GestureTelemetry { kind, point });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ButtonState;
    use crate::host::{LatLng, MarkerRef};
    use crate::recording::{Command, RecordingHost};
    use crate::session::Continuous;
    use crate::testing::touch;

    fn arbiter() -> GestureArbiter<RecordingHost> {
        GestureArbiter::new(
            RecordingHost::new(),
            Thresholds::default(),
            GestureSettings::default(),
        )
    }

    fn tap(a: &mut GestureArbiter<RecordingHost>, x: f32, y: f32, t: u64) {
        a.on_touch_event(&touch(Phase::Down, &[(x, y)], t));
        a.on_touch_event(&touch(Phase::Up, &[(x, y)], t + 40).with_down_time(t));
    }

    fn icon(id: u64) -> MarkerRef {
        MarkerRef {
            id,
            kind: MarkerKind::Icon,
        }
    }

    #[test]
    fn secondary_button_is_rejected() {
        let mut a = arbiter();
        let ev = touch(Phase::Down, &[(10.0, 10.0)], 0).with_buttons(ButtonState::Secondary);
        assert!(!a.on_touch_event(&ev));
        assert!(a.host().commands.is_empty());
    }

    #[test]
    fn tap_on_empty_map_clicks_after_confirmation() {
        let mut a = arbiter();
        tap(&mut a, 200.0, 300.0, 0);
        assert_eq!(a.host().count(|c| matches!(c, Command::MapClick { .. })), 0);
        assert_eq!(a.next_deadline(), Some(300));

        a.advance(300);
        let cmds = a.host_mut().take();
        let tail: Vec<_> = cmds.iter().rev().take(3).rev().cloned().collect();
        assert_eq!(
            tail,
            vec![
                Command::DeselectMarkers,
                Command::MapClick {
                    position: LatLng {
                        latitude: 300.0,
                        longitude: 200.0
                    }
                },
                Command::Telemetry {
                    kind: TelemetryKind::SingleTap,
                    point: Point::new(200.0, 300.0)
                },
            ]
        );
    }

    #[test]
    fn tap_selects_first_unselected_marker_by_id() {
        let mut a = arbiter();
        a.host_mut().place_marker(icon(2), Point::new(205.0, 300.0));
        a.host_mut().place_marker(icon(1), Point::new(195.0, 290.0));
        a.host_mut().selected.push(icon(1));
        tap(&mut a, 200.0, 300.0, 0);
        a.advance(300);
        assert!(a.host().commands.contains(&Command::SelectMarker { marker: icon(2) }));
        assert_eq!(a.host().count(|c| matches!(c, Command::MapClick { .. })), 0);
    }

    #[test]
    fn view_marker_gets_a_click_instead_of_selection() {
        let mut a = arbiter();
        let view = MarkerRef {
            id: 9,
            kind: MarkerKind::View,
        };
        a.host_mut().place_marker(view, Point::new(200.0, 310.0));
        tap(&mut a, 200.0, 300.0, 0);
        a.advance(300);
        assert!(a.host().commands.contains(&Command::ClickMarkerView { marker: view }));
        assert!(a.host().selected.is_empty());
    }

    #[test]
    fn marker_outside_the_tap_rect_is_ignored() {
        let mut a = arbiter();
        a.host_mut().place_marker(icon(3), Point::new(200.0, 340.0));
        tap(&mut a, 200.0, 300.0, 0);
        a.advance(300);
        assert_eq!(a.host().count(|c| matches!(c, Command::MapClick { .. })), 1);
    }

    #[test]
    fn keeping_selection_on_tap_skips_deselect() {
        let mut a = arbiter();
        let mut settings = a.settings().clone();
        settings.deselect_markers_on_tap = false;
        a.set_settings(settings);
        tap(&mut a, 200.0, 300.0, 0);
        a.advance(300);
        assert_eq!(a.host().count(|c| *c == Command::DeselectMarkers), 0);
        assert_eq!(a.host().count(|c| matches!(c, Command::MapClick { .. })), 1);
    }

    #[test]
    fn double_tap_zooms_in_at_the_tap() {
        let mut a = arbiter();
        tap(&mut a, 200.0, 300.0, 0);
        tap(&mut a, 210.0, 305.0, 150);
        assert_eq!(a.host().zooms(), vec![true]);
        assert!(a.host().commands.contains(&Command::Zoom {
            zoom_in: true,
            focus: Some(Point::new(210.0, 305.0))
        }));
        a.advance(5_000);
        assert_eq!(a.host().count(|c| matches!(c, Command::MapClick { .. })), 0);
    }

    #[test]
    fn focal_override_anchors_double_tap_and_resets_to_settings() {
        let mut a = arbiter();
        let mut settings = a.settings().clone();
        settings.focal_point = Some(Point::new(1.0, 2.0));
        a.set_settings(settings);
        a.set_focal_point(Some(Point::new(50.0, 60.0)));
        assert_eq!(a.focal_point(), Some(Point::new(50.0, 60.0)));

        tap(&mut a, 200.0, 300.0, 0);
        tap(&mut a, 200.0, 300.0, 150);
        assert!(a.host().commands.contains(&Command::Zoom {
            zoom_in: true,
            focus: Some(Point::new(50.0, 60.0))
        }));

        a.set_focal_point(None);
        assert_eq!(a.focal_point(), Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn drag_pans_in_dp_and_reports_scroll() {
        let mut a = arbiter();
        let mut th = Thresholds::default();
        th.pixel_density = 2.0;
        a.set_thresholds(th);
        a.on_touch_event(&touch(Phase::Down, &[(100.0, 100.0)], 0));
        assert!(a.on_touch_event(&touch(Phase::Move, &[(120.0, 100.0)], 20)));
        assert_eq!(a.host().moves(), vec![(10.0, 0.0)]);
        assert_eq!(a.host().count(|c| *c == Command::Scroll), 1);
        assert!(a.flags().scroll_in_progress);

        a.on_touch_event(&touch(Phase::Up, &[(120.0, 100.0)], 600));
        assert!(!a.flags().scroll_in_progress);
        assert_eq!(a.host().telemetry().last(), Some(&TelemetryKind::DragEnd));
    }

    #[test]
    fn locked_scroll_does_not_pan() {
        let mut a = arbiter();
        a.host_mut().scroll_locked = true;
        a.on_touch_event(&touch(Phase::Down, &[(100.0, 100.0)], 0));
        assert!(!a.on_touch_event(&touch(Phase::Move, &[(150.0, 100.0)], 20)));
        assert!(a.host().moves().is_empty());
    }

    #[test]
    fn fast_release_flings_for_one_second() {
        let mut a = arbiter();
        a.on_touch_event(&touch(Phase::Down, &[(100.0, 500.0)], 0));
        a.on_touch_event(&touch(Phase::Move, &[(200.0, 500.0)], 20));
        a.on_touch_event(&touch(Phase::Move, &[(400.0, 500.0)], 40));
        a.on_touch_event(&touch(Phase::Up, &[(500.0, 500.0)], 50));

        let fling = a
            .host()
            .commands
            .iter()
            .find_map(|c| match c {
                Command::MoveBy {
                    dx,
                    dy,
                    duration_ms: Some(ms),
                } => Some((*dx, *dy, *ms)),
                _ => None,
            })
            .expect("fling move");
        assert!((fling.0 - 2_000.0).abs() < 1.0);
        assert_eq!(fling.1, 0.0);
        assert_eq!(fling.2, 1_000);
        assert_eq!(a.host().count(|c| *c == Command::Fling), 1);
        assert!(a.host().telemetry().contains(&TelemetryKind::PanStart));
    }

    #[test]
    fn long_press_reports_a_long_click() {
        let mut a = arbiter();
        a.on_touch_event(&touch(Phase::Down, &[(30.0, 40.0)], 0));
        a.advance(600);
        assert!(a.host().commands.contains(&Command::MapLongClick {
            position: LatLng {
                latitude: 40.0,
                longitude: 30.0
            }
        }));
    }

    #[test]
    fn zoom_controls_appear_on_touch_when_enabled() {
        let mut a = arbiter();
        let mut settings = a.settings().clone();
        settings.zoom_controls = true;
        a.set_settings(settings);
        a.on_touch_event(&touch(Phase::Down, &[(30.0, 40.0)], 0));
        assert!(a.host().commands.contains(&Command::ZoomControls { visible: true }));
    }

    #[test]
    fn touch_session_brackets_gesture_in_progress() {
        let mut a = arbiter();
        tap(&mut a, 10.0, 10.0, 0);
        let flags: Vec<bool> = a
            .host()
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::GestureInProgress { active } => Some(*active),
                _ => None,
            })
            .collect();
        assert_eq!(flags, vec![true, false]);
    }

    fn in_progress_flags(a: &GestureArbiter<RecordingHost>) -> Vec<bool> {
        a.host()
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::GestureInProgress { active } => Some(*active),
                _ => None,
            })
            .collect()
    }

    /// Second finger down at 10 ms, 200 px apart.
    fn spread(a: &mut GestureArbiter<RecordingHost>) {
        a.on_touch_event(&touch(Phase::Down, &[(400.0, 500.0)], 0));
        let both = [(400.0, 500.0), (600.0, 500.0)];
        a.on_touch_event(&touch(Phase::PointerDown, &both, 10).with_down_time(0));
    }

    #[test]
    fn cancel_drops_pending_tap_timers() {
        let mut a = arbiter();
        a.on_touch_event(&touch(Phase::Down, &[(30.0, 40.0)], 0));
        assert!(a.next_deadline().is_some());
        a.on_touch_event(&touch(Phase::Cancel, &[(30.0, 40.0)], 50).with_down_time(0));
        assert_eq!(a.next_deadline(), None);

        a.advance(5_000);
        assert_eq!(a.host().count(|c| matches!(c, Command::MapClick { .. })), 0);
        assert_eq!(a.host().count(|c| matches!(c, Command::MapLongClick { .. })), 0);
        assert_eq!(in_progress_flags(&a), vec![true, false]);
    }

    #[test]
    fn cancel_ends_a_two_finger_session() {
        let mut a = arbiter();
        spread(&mut a);
        assert!(a.flags.two_tap);
        assert!(a.pinch.is_in_progress());

        a.on_touch_event(&touch(Phase::Cancel, &[(400.0, 500.0), (600.0, 500.0)], 60).with_down_time(0));
        assert!(!a.flags.two_tap);
        assert_eq!(a.flags.committed(), None);
        assert!(!a.pinch.is_in_progress());
        assert!(!a.rotate.is_in_progress());
        assert!(!a.shove.is_in_progress());
        assert_eq!(in_progress_flags(&a), vec![true, false]);
        assert_eq!(a.next_deadline(), None);
        assert!(a.host().zooms().is_empty());
    }

    #[test]
    fn zoom_commit_ends_two_finger_tap_candidacy() {
        let mut a = arbiter();
        spread(&mut a);
        assert!(a.flags.two_tap);

        a.on_touch_event(&touch(Phase::Move, &[(380.0, 500.0), (620.0, 500.0)], 150).with_down_time(0));
        assert_eq!(a.flags.committed(), Some(Continuous::Zoom));
        assert!(!a.flags.two_tap);

        a.on_touch_event(&touch(Phase::PointerUp, &[(380.0, 500.0), (620.0, 500.0)], 160).with_down_time(0));
        a.on_touch_event(&touch(Phase::Up, &[(380.0, 500.0)], 170).with_down_time(0));
        assert!(a.host().zooms().is_empty());
        assert!(!a.host().telemetry().contains(&TelemetryKind::SingleTap));
    }

    #[test]
    fn no_fling_once_a_zoom_owns_the_session() {
        let mut a = arbiter();
        spread(&mut a);
        a.on_touch_event(&touch(Phase::Move, &[(380.0, 500.0), (620.0, 500.0)], 150).with_down_time(0));
        assert!(!a.host().scales().is_empty());

        // one finger stays and flicks away fast
        a.on_touch_event(&touch(Phase::PointerUp, &[(380.0, 500.0), (620.0, 500.0)], 200).with_down_time(0));
        a.on_touch_event(&touch(Phase::Move, &[(480.0, 500.0)], 230).with_down_time(0));
        a.on_touch_event(&touch(Phase::Move, &[(580.0, 500.0)], 260).with_down_time(0));
        a.on_touch_event(&touch(Phase::Up, &[(600.0, 500.0)], 270).with_down_time(0));

        assert_eq!(a.host().count(|c| *c == Command::Fling), 0);
        assert!(a.host().moves().is_empty());
        assert!(!a.host().telemetry().contains(&TelemetryKind::PanStart));
    }

    #[test]
    fn long_press_is_quiet_during_a_quick_zoom() {
        let mut a = arbiter();
        a.on_touch_event(&touch(Phase::Down, &[(540.0, 960.0)], 0));
        a.on_touch_event(&touch(Phase::Up, &[(540.0, 960.0)], 50).with_down_time(0));
        a.on_touch_event(&touch(Phase::Down, &[(540.0, 960.0)], 150));
        a.on_touch_event(&touch(Phase::Move, &[(540.0, 1000.0)], 200).with_down_time(150));
        a.on_touch_event(&touch(Phase::Move, &[(540.0, 1100.0)], 320).with_down_time(150));
        assert!(a.flags.quick_zoom);

        // still held past the long-press deadline at 750
        a.advance(800);
        assert_eq!(a.host().count(|c| matches!(c, Command::MapLongClick { .. })), 0);
        assert!(a.flags.quick_zoom);
    }
}
