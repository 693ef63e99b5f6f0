//! Test fixtures shared by the unit tests.

use crate::config::{GestureSettings, Thresholds};
use crate::event::{Phase, Point, Pointer, PointerEvent};
use crate::recording::RecordingHost;
use crate::session::{GestureContext, SessionFlags};

pub(crate) struct Harness {
    pub host: RecordingHost,
    pub flags: SessionFlags,
    pub settings: GestureSettings,
    pub thresholds: Thresholds,
    pub focal_point: Option<Point>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            host: RecordingHost::new(),
            flags: SessionFlags::default(),
            settings: GestureSettings::default(),
            thresholds: Thresholds::default(),
            focal_point: None,
        }
    }

    pub fn ctx(&mut self) -> GestureContext<'_> {
        GestureContext {
            host: &mut self.host,
            flags: &mut self.flags,
            settings: &self.settings,
            thresholds: &self.thresholds,
            focal_point: self.focal_point,
        }
    }
}

/// A touch event with pointer ids assigned in order.
pub(crate) fn touch(phase: Phase, pts: &[(f32, f32)], time_ms: u64) -> PointerEvent {
    let pointers = pts
        .iter()
        .enumerate()
        .map(|(i, (x, y))| Pointer::new(i as i32, *x, *y))
        .collect();
    PointerEvent::new(phase, pointers, time_ms)
}
