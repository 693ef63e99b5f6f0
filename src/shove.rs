//! Two-finger vertical drag ("shove") mapped to camera pitch.

use log::debug;

use crate::event::PointerEvent;
use crate::host::TelemetryKind;
use crate::recognizer::{
    ContinuousRecognizer, FingerPair, PairDetector, PairMeasure, RecognizerState, Sample,
};
use crate::session::{Continuous, GestureContext};

/// Accumulated vertical travel, in pixels, before a shove counts as a tilt.
pub const SHOVE_THRESHOLD_PX: f64 = 10.0;
/// Degrees of pitch per pixel of vertical travel.
pub const PITCH_PER_PIXEL: f64 = 0.1;
/// Finger lines steeper than this are a rotate or a pinch, not a shove.
const MAX_SHOVE_LINE_ANGLE: f32 = 0.349_066; // 20 degrees

#[derive(Debug)]
pub struct ShoveMeasure;

impl PairMeasure for ShoveMeasure {
    fn accepts(pair: &FingerPair) -> bool {
        let (dx, dy) = pair.diff();
        let angle = dy.atan2(dx).abs();
        angle < MAX_SHOVE_LINE_ANGLE || angle > std::f32::consts::PI - MAX_SHOVE_LINE_ANGLE
    }

    /// Change of the contacts' average y.
    fn delta(prev: &FingerPair, curr: &FingerPair) -> f64 {
        (curr.focus().y - prev.focus().y) as f64
    }
}

#[derive(Debug)]
pub struct ShoveRecognizer {
    pub state: RecognizerState,
}

impl Default for ShoveRecognizer {
    fn default() -> Self {
        Self {
            state: RecognizerState::new(0.0),
        }
    }
}

impl ContinuousRecognizer for ShoveRecognizer {
    fn on_begin(&mut self, sample: &Sample, ctx: &mut GestureContext<'_>) -> bool {
        if !ctx.settings.tilt_gestures {
            return false;
        }
        self.state.begin(sample.time_ms);
        ctx.track(TelemetryKind::PitchStart, sample.focus);
        true
    }

    fn on_update(&mut self, sample: &Sample, ctx: &mut GestureContext<'_>) -> bool {
        if !ctx.settings.tilt_gestures {
            return false;
        }

        self.state.accumulated += sample.delta;
        if !self.state.started
            && self.state.accumulated.abs() > SHOVE_THRESHOLD_PX
            && self.state.elapsed(sample.time_ms) > ctx.thresholds.tap_timeout_ms
            && !ctx.flags.zoom_started
            && ctx.flags.try_commit(Continuous::Tilt)
        {
            debug!("tilt committed after {:.1} px", self.state.accumulated);
            self.state.started = true;
        }
        if !self.state.started {
            return false;
        }

        ctx.host.cancel_transitions();

        let th = ctx.thresholds;
        let pitch = (ctx.host.pitch() - PITCH_PER_PIXEL * sample.delta)
            .max(th.min_tilt)
            .min(th.max_tilt);
        ctx.host.set_pitch(pitch);

        ctx.flags.drag_started = true;
        true
    }

    fn on_end(&mut self, ctx: &mut GestureContext<'_>) {
        self.state.reset();
        ctx.flags.drag_started = false;
    }
}

#[derive(Debug, Default)]
pub struct ShoveGesture {
    detector: PairDetector<ShoveMeasure>,
    recognizer: ShoveRecognizer,
}

impl ShoveGesture {
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
