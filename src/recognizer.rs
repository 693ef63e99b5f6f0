//! Shared machinery for the continuous two-finger recognizers.
//!
//! Each recognizer is split in two: a detector that turns the touch stream
//! into begin/update/end samples, and a [`ContinuousRecognizer`] that decides
//! what those samples mean for the map. When `on_update` declines a sample,
//! the detector keeps its previous frame, so the next delta is measured from
//! the last sample that was acted on.

use crate::event::{Phase, Point, PointerEvent};
use crate::session::GestureContext;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time_ms: u64,
    pub focus: Point,
    /// Per-frame change: a scale ratio, degrees, or pixels depending on the recognizer.
    pub delta: f64,
    /// Single-finger quick-scale rather than a real second contact.
    pub anchored: bool,
}

pub trait ContinuousRecognizer {
    /// Returns whether the recognizer wants the rest of the gesture.
    fn on_begin(&mut self, sample: &Sample, ctx: &mut GestureContext<'_>) -> bool;
    /// Returns whether the sample was acted on.
    fn on_update(&mut self, sample: &Sample, ctx: &mut GestureContext<'_>) -> bool;
    fn on_end(&mut self, ctx: &mut GestureContext<'_>);
}

/// Begin time, accumulated magnitude and commit state of one recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerState {
    pub begin_time_ms: u64,
    pub accumulated: f64,
    pub started: bool,
    identity: f64,
}

impl RecognizerState {
    pub fn new(identity: f64) -> Self {
        Self {
            begin_time_ms: 0,
            accumulated: identity,
            started: false,
            identity,
        }
    }

    pub fn begin(&mut self, time_ms: u64) {
        self.begin_time_ms = time_ms;
    }

    pub fn elapsed(&self, time_ms: u64) -> u64 {
        time_ms.saturating_sub(self.begin_time_ms)
    }

    pub fn reset(&mut self) {
        self.begin_time_ms = 0;
        self.accumulated = self.identity;
        self.started = false;
    }

    pub fn is_identity(&self) -> bool {
        self.accumulated == self.identity && !self.started
    }
}

/// Exactly two contacts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerPair {
    pub a: Point,
    pub b: Point,
}

impl FingerPair {
    /// The two contacts that remain down, if there are exactly two.
    pub fn from_event(event: &PointerEvent) -> Option<Self> {
        let mut it = event.staying();
        let a = it.next()?.point();
        let b = it.next()?.point();
        if it.next().is_some() {
            return None;
        }
        Some(Self { a, b })
    }

    pub fn focus(&self) -> Point {
        Point::new((self.a.x + self.b.x) / 2.0, (self.a.y + self.b.y) / 2.0)
    }

    pub fn diff(&self) -> (f32, f32) {
        (self.b.x - self.a.x, self.b.y - self.a.y)
    }
}

/// Geometry a pair detector measures between frames.
pub trait PairMeasure {
    /// Whether the pair is in a shape this gesture can start from.
    fn accepts(_pair: &FingerPair) -> bool {
        true
    }
    fn delta(prev: &FingerPair, curr: &FingerPair) -> f64;
}

/// Drives a [`ContinuousRecognizer`] from exactly-two-contact streams.
#[derive(Debug)]
pub struct PairDetector<M> {
    prev: Option<FingerPair>,
    in_progress: bool,
    /// Two contacts are down but their shape was not acceptable yet.
    waiting: bool,
    _measure: std::marker::PhantomData<M>,
}

impl<M> Default for PairDetector<M> {
    fn default() -> Self {
        Self {
            prev: None,
            in_progress: false,
            waiting: false,
            _measure: std::marker::PhantomData,
        }
    }
}

impl<M: PairMeasure> PairDetector<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn on_touch<R: ContinuousRecognizer>(
        &mut self,
        event: &PointerEvent,
        recognizer: &mut R,
        ctx: &mut GestureContext<'_>,
    ) -> bool {
        let pair = FingerPair::from_event(event);

        if self.in_progress {
            return match (event.phase, pair) {
                (Phase::Move, Some(curr)) => {
                    let Some(prev) = self.prev else {
                        self.prev = Some(curr);
                        return false;
                    };
                    let sample = Sample {
                        time_ms: event.time_ms,
                        focus: curr.focus(),
                        delta: M::delta(&prev, &curr),
                        anchored: false,
                    };
                    let handled = recognizer.on_update(&sample, ctx);
                    if handled {
                        self.prev = Some(curr);
                    }
                    handled
                }
                (Phase::Move, None) => false,
                _ => {
                    // contacts changed or the stream ended
                    recognizer.on_end(ctx);
                    self.reset();
                    false
                }
            };
        }

        match (event.phase, pair) {
            (Phase::PointerDown, Some(curr)) => {
                self.prev = Some(curr);
                self.waiting = !M::accepts(&curr);
                if !self.waiting {
                    self.start(curr, event.time_ms, recognizer, ctx);
                }
                self.in_progress
            }
            (Phase::Move, Some(curr)) if self.waiting => {
                if M::accepts(&curr) {
                    self.waiting = false;
                    self.prev = Some(curr);
                    self.start(curr, event.time_ms, recognizer, ctx);
                }
                self.in_progress
            }
            (Phase::Move, _) => false,
            _ => {
                self.reset();
                false
            }
        }
    }

    fn start<R: ContinuousRecognizer>(
        &mut self,
        curr: FingerPair,
        time_ms: u64,
        recognizer: &mut R,
        ctx: &mut GestureContext<'_>,
    ) {
        let sample = Sample {
            time_ms,
            focus: curr.focus(),
            delta: 0.0,
            anchored: false,
        };
        self.in_progress = recognizer.on_begin(&sample, ctx);
    }

    fn reset(&mut self) {
        self.prev = None;
        self.in_progress = false;
        self.waiting = false;
    }
}
