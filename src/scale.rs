//! Pinch zoom, including single-finger quick-scale (double-tap then drag).

use log::debug;

use crate::event::{Phase, Point, PointerEvent};
use crate::host::TelemetryKind;
use crate::recognizer::{ContinuousRecognizer, RecognizerState, Sample};
use crate::session::{Continuous, GestureContext};

/// Accumulated scale inside this band is treated as a tap, not a zoom.
pub const ZOOM_BAND: (f64, f64) = (0.95, 1.05);
/// Damping applied to quick-scale span changes.
const QUICK_SCALE_FACTOR: f64 = 0.5;

/// Turns a touch stream into pinch samples.
///
/// Pinch tracking starts when a second contact goes down and ends when fewer
/// than two remain. Quick-scale starts when the second tap of a double tap
/// drags vertically past the touch slop, and ends with that tap. The detector
/// does not judge double taps itself; the owner arms it through
/// [`ScaleDetector::arm_quick_scale`].
#[derive(Debug, Default)]
pub struct ScaleDetector {
    in_progress: bool,
    prev_span: f32,
    /// Quick-scale anchor while a quick-scale is in progress.
    quick_anchor: Option<Point>,
    /// Second tap of a double tap is down; a vertical drag starts quick-scale.
    armed_anchor: Option<Point>,
}

impl ScaleDetector {
    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn is_quick_scale(&self) -> bool {
        self.in_progress && self.quick_anchor.is_some()
    }

    /// The second tap of a double tap went down at `anchor`.
    pub fn arm_quick_scale(&mut self, anchor: Point) {
        if !self.in_progress {
            self.armed_anchor = Some(anchor);
        }
    }

    pub fn on_touch<R: ContinuousRecognizer>(
        &mut self,
        event: &PointerEvent,
        recognizer: &mut R,
        ctx: &mut GestureContext<'_>,
    ) -> bool {
        match event.phase {
            Phase::Down => {
                self.end(recognizer, ctx);
                self.armed_anchor = None;
                false
            }
            Phase::Move => self.on_move(event, recognizer, ctx),
            Phase::PointerDown => {
                self.armed_anchor = None;
                if event.staying_count() < 2 {
                    return self.in_progress;
                }
                if self.quick_anchor.is_some() {
                    self.end(recognizer, ctx);
                }
                self.prev_span = span_of(event);
                if !self.in_progress {
                    let sample = Sample {
                        time_ms: event.time_ms,
                        focus: event.staying_focus(),
                        delta: 1.0,
                        anchored: false,
                    };
                    self.in_progress = recognizer.on_begin(&sample, ctx);
                }
                self.in_progress
            }
            Phase::PointerUp => {
                if self.in_progress && self.quick_anchor.is_none() {
                    if event.staying_count() < 2 {
                        self.end(recognizer, ctx);
                    } else {
                        self.prev_span = span_of(event);
                    }
                }
                false
            }
            Phase::Up | Phase::Cancel => {
                self.end(recognizer, ctx);
                self.armed_anchor = None;
                false
            }
        }
    }

    fn on_move<R: ContinuousRecognizer>(
        &mut self,
        event: &PointerEvent,
        recognizer: &mut R,
        ctx: &mut GestureContext<'_>,
    ) -> bool {
        if let Some(anchor) = self.armed_anchor {
            let y = event.first_point().y;
            if event.pointer_count() == 1 && (y - anchor.y).abs() > ctx.thresholds.touch_slop_px() {
                self.armed_anchor = None;
                self.prev_span = quick_span(anchor, y);
                let sample = Sample {
                    time_ms: event.time_ms,
                    focus: anchor,
                    delta: 1.0,
                    anchored: true,
                };
                self.in_progress = recognizer.on_begin(&sample, ctx);
                if self.in_progress {
                    self.quick_anchor = Some(anchor);
                }
            }
            return self.in_progress;
        }

        if !self.in_progress {
            return false;
        }

        let (span, focus, factor) = match self.quick_anchor {
            Some(anchor) => {
                let y = event.first_point().y;
                let span = quick_span(anchor, y);
                (span, anchor, quick_factor(self.prev_span, span, y < anchor.y))
            }
            None => {
                let span = span_of(event);
                let factor = if self.prev_span > 0.0 {
                    (span / self.prev_span) as f64
                } else {
                    1.0
                };
                (span, event.staying_focus(), factor)
            }
        };

        let sample = Sample {
            time_ms: event.time_ms,
            focus,
            delta: factor,
            anchored: self.quick_anchor.is_some(),
        };
        let handled = recognizer.on_update(&sample, ctx);
        if handled {
            self.prev_span = span;
        }
        handled
    }

    fn end<R: ContinuousRecognizer>(&mut self, recognizer: &mut R, ctx: &mut GestureContext<'_>) {
        if self.in_progress {
            recognizer.on_end(ctx);
        }
        self.in_progress = false;
        self.quick_anchor = None;
        self.prev_span = 0.0;
    }
}

/// Twice the mean distance of the remaining contacts from their centroid.
fn span_of(event: &PointerEvent) -> f32 {
    let focus = event.staying_focus();
    let (mut sum, mut n) = (0.0f32, 0usize);
    for p in event.staying() {
        sum += p.point().distance(focus);
        n += 1;
    }
    if n == 0 { 0.0 } else { 2.0 * sum / n as f32 }
}

fn quick_span(anchor: Point, y: f32) -> f32 {
    2.0 * (y - anchor.y).abs()
}

/// Dragging away from the anchor below it zooms in, above it zooms out.
fn quick_factor(prev_span: f32, span: f32, above_anchor: bool) -> f64 {
    if prev_span <= 0.0 {
        return 1.0;
    }
    let scale_up = (above_anchor && span < prev_span) || (!above_anchor && span > prev_span);
    let diff = (1.0 - (span / prev_span) as f64).abs() * QUICK_SCALE_FACTOR;
    if scale_up { 1.0 + diff } else { 1.0 - diff }
}

#[derive(Debug)]
pub struct PinchRecognizer {
    pub state: RecognizerState,
    quick: bool,
}

impl Default for PinchRecognizer {
    fn default() -> Self {
        Self {
            state: RecognizerState::new(1.0),
            quick: false,
        }
    }
}

impl ContinuousRecognizer for PinchRecognizer {
    fn on_begin(&mut self, sample: &Sample, ctx: &mut GestureContext<'_>) -> bool {
        if !ctx.settings.zoom_gestures {
            return false;
        }
        self.state.begin(sample.time_ms);
        self.quick = sample.anchored;
        ctx.track(TelemetryKind::PinchStart, sample.focus);
        true
    }

    fn on_update(&mut self, sample: &Sample, ctx: &mut GestureContext<'_>) -> bool {
        if !ctx.settings.zoom_gestures {
            return false;
        }

        self.state.accumulated *= sample.delta;
        let (low, high) = ZOOM_BAND;
        let outside = self.state.accumulated > high || self.state.accumulated < low;
        if !self.state.started
            && outside
            && self.state.elapsed(sample.time_ms) > ctx.thresholds.tap_timeout_ms
            && !ctx.flags.drag_started
            && ctx.flags.try_commit(Continuous::Zoom)
        {
            debug!(
                "zoom committed at x{:.3} (quick: {})",
                self.state.accumulated, self.quick
            );
            self.state.started = true;
            ctx.flags.zoom_started = true;
            if self.quick {
                ctx.flags.quick_zoom = true;
            }
        }
        if !self.state.started || ctx.flags.drag_started {
            return false;
        }

        ctx.host.cancel_transitions();
        // an off-centre anchor translates the camera; quick-scale stays centred
        ctx.host.reset_tracking_modes(!self.quick, false);

        let focus = match ctx.focal_point {
            Some(fp) => fp,
            None if self.quick => {
                let (w, h) = ctx.host.size();
                Point::new(w / 2.0, h / 2.0)
            }
            None => sample.focus,
        };
        let (x, y) = ctx.anchor(focus);
        ctx.host.scale_by(sample.delta, x, y);
        true
    }

    fn on_end(&mut self, ctx: &mut GestureContext<'_>) {
        self.state.reset();
        self.quick = false;
        ctx.flags.zoom_started = false;
    }
}

#[derive(Debug, Default)]
pub struct PinchGesture {
    detector: ScaleDetector,
    recognizer: PinchRecognizer,
}

impl PinchGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_touch(&mut self, event: &PointerEvent, ctx: &mut GestureContext<'_>) -> bool {
        self.detector.on_touch(event, &mut self.recognizer, ctx)
    }

    pub fn is_in_progress(&self) -> bool {
        self.detector.is_in_progress()
    }

    pub fn is_quick_scale(&self) -> bool {
        self.detector.is_quick_scale()
    }

    pub fn arm_quick_scale(&mut self, anchor: Point) {
        self.detector.arm_quick_scale(anchor);
    }

    pub fn state(&self) -> &RecognizerState {
        &self.recognizer.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::Command;
    use crate::testing::{Harness, touch};

    fn spread(half: f32) -> [(f32, f32); 2] {
        [(500.0 - half, 500.0), (500.0 + half, 500.0)]
    }

    fn start(g: &mut PinchGesture, h: &mut Harness) {
        g.on_touch(&touch(Phase::Down, &spread(100.0)[..1], 0), &mut h.ctx());
        g.on_touch(&touch(Phase::PointerDown, &spread(100.0), 0), &mut h.ctx());
    }

    #[test]
    fn early_pinch_is_held_back_then_applied_cumulatively() {
        let mut h = Harness::new();
        let mut g = PinchGesture::new();
        start(&mut g, &mut h);
        assert!(g.is_in_progress());
        assert_eq!(h.host.telemetry(), vec![TelemetryKind::PinchStart]);

        assert!(!g.on_touch(&touch(Phase::Move, &spread(120.0), 50), &mut h.ctx()));
        assert!(h.host.scales().is_empty());

        assert!(g.on_touch(&touch(Phase::Move, &spread(120.0), 150), &mut h.ctx()));
        let scales = h.host.scales();
        assert_eq!(scales.len(), 1);
        assert!((scales[0] - 1.2).abs() < 1e-6);
        assert!(h.flags.zoom_started);
        assert!(!h.flags.quick_zoom);

        // handled frames advance the baseline
        assert!(g.on_touch(&touch(Phase::Move, &spread(132.0), 200), &mut h.ctx()));
        assert!((h.host.scales()[1] - 1.1).abs() < 1e-6);
    }

    #[test]
    fn in_band_pinch_never_scales() {
        let mut h = Harness::new();
        let mut g = PinchGesture::new();
        start(&mut g, &mut h);
        for (i, half) in [101.0, 102.0, 99.0, 101.5].into_iter().enumerate() {
            g.on_touch(&touch(Phase::Move, &spread(half), 150 + i as u64 * 40), &mut h.ctx());
        }
        assert!(h.host.scales().is_empty());
        assert!(!h.flags.zoom_started);
    }

    #[test]
    fn pinch_scales_about_the_centroid_in_dp() {
        let mut h = Harness::new();
        h.thresholds.pixel_density = 2.0;
        let mut g = PinchGesture::new();
        start(&mut g, &mut h);
        g.on_touch(&touch(Phase::Move, &spread(150.0), 200), &mut h.ctx());
        let scale = h
            .host
            .commands
            .iter()
            .find(|c| matches!(c, Command::ScaleBy { .. }))
            .cloned();
        assert_eq!(
            scale,
            Some(Command::ScaleBy {
                factor: 1.5,
                x: 250.0,
                y: 250.0
            })
        );
    }

    #[test]
    fn focal_override_beats_the_centroid() {
        let mut h = Harness::new();
        h.focal_point = Some(Point::new(100.0, 80.0));
        let mut g = PinchGesture::new();
        start(&mut g, &mut h);
        g.on_touch(&touch(Phase::Move, &spread(150.0), 200), &mut h.ctx());
        assert!(h.host.commands.contains(&Command::ScaleBy {
            factor: 1.5,
            x: 100.0,
            y: 80.0
        }));
    }

    #[test]
    fn quick_scale_zooms_about_screen_centre() {
        let mut h = Harness::new();
        let mut g = PinchGesture::new();
        let p = [(500.0, 500.0)];
        g.on_touch(&touch(Phase::Down, &p, 0), &mut h.ctx());
        g.on_touch(&touch(Phase::Up, &p, 50), &mut h.ctx());
        g.on_touch(&touch(Phase::Down, &p, 150), &mut h.ctx());
        g.arm_quick_scale(Point::new(500.0, 500.0));
        assert!(!g.is_in_progress());

        g.on_touch(&touch(Phase::Move, &[(500.0, 520.0)], 200), &mut h.ctx());
        assert!(g.is_quick_scale());

        assert!(g.on_touch(&touch(Phase::Move, &[(500.0, 560.0)], 350), &mut h.ctx()));
        assert!(h.host.commands.contains(&Command::ScaleBy {
            factor: 2.0,
            x: 540.0,
            y: 960.0
        }));
        assert!(h.flags.quick_zoom);

        g.on_touch(&touch(Phase::Up, &[(500.0, 560.0)], 400), &mut h.ctx());
        assert!(!g.is_in_progress());
        assert!(!h.flags.zoom_started);
        assert!(h.flags.quick_zoom);
    }

    #[test]
    fn tap_then_drag_without_arming_is_not_a_quick_scale() {
        let mut h = Harness::new();
        let mut g = PinchGesture::new();
        let p = [(500.0, 500.0)];
        g.on_touch(&touch(Phase::Down, &p, 0), &mut h.ctx());
        g.on_touch(&touch(Phase::Up, &p, 50), &mut h.ctx());
        g.on_touch(&touch(Phase::Down, &p, 150), &mut h.ctx());
        g.on_touch(&touch(Phase::Move, &[(500.0, 600.0)], 200), &mut h.ctx());
        g.on_touch(&touch(Phase::Move, &[(500.0, 700.0)], 350), &mut h.ctx());
        assert!(!g.is_in_progress());
        assert!(h.host.scales().is_empty());
        assert!(!h.flags.quick_zoom);
    }

    #[test]
    fn arming_lasts_only_until_the_tap_ends() {
        let mut h = Harness::new();
        let mut g = PinchGesture::new();
        let p = [(500.0, 500.0)];
        g.on_touch(&touch(Phase::Down, &p, 0), &mut h.ctx());
        g.arm_quick_scale(Point::new(500.0, 500.0));
        g.on_touch(&touch(Phase::Up, &p, 40), &mut h.ctx());
        g.on_touch(&touch(Phase::Down, &p, 100), &mut h.ctx());
        g.on_touch(&touch(Phase::Move, &[(500.0, 600.0)], 150), &mut h.ctx());
        assert!(!g.is_in_progress());
    }

    #[test]
    fn disabled_zoom_never_begins() {
        let mut h = Harness::new();
        h.settings.zoom_gestures = false;
        let mut g = PinchGesture::new();
        start(&mut g, &mut h);
        assert!(!g.is_in_progress());
        assert!(h.host.telemetry().is_empty());
    }

    #[test]
    fn tilt_drag_blocks_zoom_commit() {
        let mut h = Harness::new();
        let mut g = PinchGesture::new();
        start(&mut g, &mut h);
        h.flags.try_commit(Continuous::Tilt);
        h.flags.drag_started = true;
        assert!(!g.on_touch(&touch(Phase::Move, &spread(200.0), 300), &mut h.ctx()));
        assert!(!g.state().started);
    }

    #[test]
    fn last_finger_up_resets_to_identity() {
        let mut h = Harness::new();
        let mut g = PinchGesture::new();
        start(&mut g, &mut h);
        g.on_touch(&touch(Phase::Move, &spread(150.0), 200), &mut h.ctx());
        assert!(g.state().started);
        g.on_touch(&touch(Phase::PointerUp, &spread(150.0), 250), &mut h.ctx());
        assert!(!g.is_in_progress());
        assert!(g.state().is_identity());
        assert!(!h.flags.zoom_started);
    }
}
