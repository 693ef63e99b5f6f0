//! Two-finger rotation mapped to camera bearing.

use log::debug;

use crate::event::PointerEvent;
use crate::host::TelemetryKind;
use crate::recognizer::{
    ContinuousRecognizer, FingerPair, PairDetector, PairMeasure, RecognizerState, Sample,
};
use crate::session::{Continuous, GestureContext};

/// Accumulated rotation, in degrees, that separates a rotate from a wobbly tap.
pub const ROTATION_THRESHOLD_DEG: f64 = 20.0;

#[derive(Debug)]
pub struct RotationMeasure;

impl PairMeasure for RotationMeasure {
    /// Previous finger-line angle minus the current one, in (-180, 180].
    fn delta(prev: &FingerPair, curr: &FingerPair) -> f64 {
        let (px, py) = prev.diff();
        let (cx, cy) = curr.diff();
        let diff = (py as f64).atan2(px as f64) - (cy as f64).atan2(cx as f64);
        wrap_degrees(diff.to_degrees())
    }
}

fn wrap_degrees(mut deg: f64) -> f64 {
    while deg > 180.0 {
        deg -= 360.0;
    }
    while deg <= -180.0 {
        deg += 360.0;
    }
    deg
}

#[derive(Debug)]
pub struct RotateRecognizer {
    pub state: RecognizerState,
}

impl Default for RotateRecognizer {
    fn default() -> Self {
        Self {
            state: RecognizerState::new(0.0),
        }
    }
}

impl ContinuousRecognizer for RotateRecognizer {
    fn on_begin(&mut self, sample: &Sample, ctx: &mut GestureContext<'_>) -> bool {
        if !ctx.rotate_enabled() {
            return false;
        }
        self.state.begin(sample.time_ms);
        ctx.track(TelemetryKind::RotationStart, sample.focus);
        true
    }

    fn on_update(&mut self, sample: &Sample, ctx: &mut GestureContext<'_>) -> bool {
        if !ctx.rotate_enabled() || ctx.flags.drag_started {
            return false;
        }

        self.state.accumulated += sample.delta;
        if !self.state.started
            && self.state.accumulated.abs() > ROTATION_THRESHOLD_DEG
            && self.state.elapsed(sample.time_ms) > ctx.thresholds.tap_timeout_ms
            && !ctx.flags.zoom_started
            && ctx.flags.try_commit(Continuous::Rotate)
        {
            debug!(
                "rotate committed after {:.1} deg",
                self.state.accumulated
            );
            self.state.started = true;
        }
        if !self.state.started {
            return false;
        }

        ctx.host.cancel_transitions();
        // rotating moves everything but the anchor, so both trackers let go
        ctx.host.reset_tracking_modes(true, true);

        let bearing = ctx.host.bearing() + sample.delta;
        let (x, y) = ctx.anchor(ctx.focus_or(sample.focus));
        ctx.host.set_bearing(bearing, x, y);
        true
    }

    fn on_end(&mut self, _ctx: &mut GestureContext<'_>) {
        self.state.reset();
    }
}

#[derive(Debug, Default)]
pub struct RotateGesture {
    detector: PairDetector<RotationMeasure>,
    recognizer: RotateRecognizer,
}

impl RotateGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_touch(&mut self, event: &PointerEvent, ctx: &mut GestureContext<'_>) -> bool {
        self.detector.on_touch(event, &mut self.recognizer, ctx)
    }

    pub fn is_in_progress(&self) -> bool {
        self.detector.is_in_progress()
    }

    pub fn state(&self) -> &RecognizerState {
        &self.recognizer.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Phase;
    use crate::recording::Command;
    use crate::testing::{Harness, touch};

    /// Two contacts 200 px apart around (500, 500), finger line at `deg`.
    fn at_angle(deg: f32) -> [(f32, f32); 2] {
        let (s, c) = deg.to_radians().sin_cos();
        [
            (500.0 - 100.0 * c, 500.0 - 100.0 * s),
            (500.0 + 100.0 * c, 500.0 + 100.0 * s),
        ]
    }

    fn bearings(h: &Harness) -> Vec<f64> {
        h.host
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::SetBearing { bearing, .. } => Some(*bearing),
                _ => None,
            })
            .collect()
    }

    fn start(g: &mut RotateGesture, h: &mut Harness) {
        g.on_touch(&touch(Phase::Down, &at_angle(0.0)[..1], 0), &mut h.ctx());
        g.on_touch(&touch(Phase::PointerDown, &at_angle(0.0), 0), &mut h.ctx());
    }

    #[test]
    fn wraps_across_the_half_turn() {
        assert_eq!(wrap_degrees(350.0), -10.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
    }

    #[test]
    fn small_rotation_never_commits() {
        let mut h = Harness::new();
        let mut g = RotateGesture::new();
        start(&mut g, &mut h);
        assert!(g.is_in_progress());
        // declined samples keep the first frame, so these accumulate to -18
        for (i, deg) in [5.0, 8.0, 3.0, 2.0].into_iter().enumerate() {
            let handled = g.on_touch(
                &touch(Phase::Move, &at_angle(deg), 200 + i as u64 * 50),
                &mut h.ctx(),
            );
            assert!(!handled);
        }
        assert!(bearings(&h).is_empty());
    }

    #[test]
    fn waits_for_tap_timeout_then_applies_cumulative_delta() {
        let mut h = Harness::new();
        let mut g = RotateGesture::new();
        start(&mut g, &mut h);
        assert_eq!(h.host.telemetry(), vec![TelemetryKind::RotationStart]);

        assert!(!g.on_touch(&touch(Phase::Move, &at_angle(30.0), 50), &mut h.ctx()));
        assert!(bearings(&h).is_empty());

        assert!(g.on_touch(&touch(Phase::Move, &at_angle(31.0), 150), &mut h.ctx()));
        let b = bearings(&h);
        assert_eq!(b.len(), 1);
        assert!((b[0] + 31.0).abs() < 1e-3, "bearing {}", b[0]);
        assert_eq!(h.flags.committed(), Some(Continuous::Rotate));
    }

    #[test]
    fn zoom_ownership_blocks_rotation() {
        let mut h = Harness::new();
        let mut g = RotateGesture::new();
        start(&mut g, &mut h);
        h.flags.try_commit(Continuous::Zoom);
        h.flags.zoom_started = true;
        assert!(!g.on_touch(&touch(Phase::Move, &at_angle(60.0), 300), &mut h.ctx()));
        assert!(!g.state().started);
        assert!(bearings(&h).is_empty());
    }

    #[test]
    fn tilt_drag_suppresses_rotation() {
        let mut h = Harness::new();
        let mut g = RotateGesture::new();
        start(&mut g, &mut h);
        h.flags.drag_started = true;
        assert!(!g.on_touch(&touch(Phase::Move, &at_angle(60.0), 300), &mut h.ctx()));
        assert!(bearings(&h).is_empty());
    }

    #[test]
    fn locked_bearing_refuses_to_begin() {
        let mut h = Harness::new();
        h.host.rotate_locked = true;
        let mut g = RotateGesture::new();
        start(&mut g, &mut h);
        assert!(!g.is_in_progress());
    }

    #[test]
    fn lifting_a_finger_resets_to_identity() {
        let mut h = Harness::new();
        let mut g = RotateGesture::new();
        start(&mut g, &mut h);
        g.on_touch(&touch(Phase::Move, &at_angle(40.0), 200), &mut h.ctx());
        assert!(g.state().started);
        g.on_touch(&touch(Phase::PointerUp, &at_angle(40.0), 250), &mut h.ctx());
        assert!(!g.is_in_progress());
        assert!(g.state().is_identity());
    }
}
