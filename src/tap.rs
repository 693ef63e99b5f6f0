//! Single-pointer gestures: taps, double taps, long press, scroll and fling.
//!
//! [`TapRecognizer`] consumes the whole touch stream but only reports what a
//! single contact means. Its two timers (tap confirmation and long press) live
//! in a [`TaskQueue`] and fire from [`TapRecognizer::advance`], which
//! [`TapRecognizer::on_touch`] also runs before handling each event.

use std::collections::VecDeque;

use log::trace;

use crate::config::Thresholds;
use crate::event::{Phase, Point, PointerEvent};
use crate::scheduler::{TaskHandle, TaskQueue};

/// Samples older than this do not count toward fling velocity.
const VELOCITY_WINDOW_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapGesture {
    Down {
        at: Point,
    },
    /// Release of a contact that never left the tap region.
    SingleTapUp {
        at: Point,
    },
    /// The tap was not followed by a second one.
    SingleTapConfirmed {
        at: Point,
    },
    /// Events of the second tap of a double tap.
    DoubleTap {
        phase: Phase,
        at: Point,
    },
    LongPress {
        at: Point,
    },
    /// `distance` is the previous focus minus the current one, in pixels.
    Scroll {
        origin: Point,
        distance: (f32, f32),
    },
    /// `velocity` in pixels per second.
    Fling {
        origin: Point,
        velocity: (f32, f32),
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TapTimer {
    Confirm,
    LongPress,
}

#[derive(Debug, Clone, Copy)]
struct Contact {
    at: Point,
    time_ms: u64,
}

#[derive(Debug, Default)]
struct VelocityTracker {
    samples: VecDeque<(u64, Point)>,
}

impl VelocityTracker {
    fn add(&mut self, time_ms: u64, p: Point) {
        self.samples.push_back((time_ms, p));
        while let Some(&(t, _)) = self.samples.front() {
            if t + VELOCITY_WINDOW_MS >= time_ms {
                break;
            }
            self.samples.pop_front();
        }
    }

    fn velocity(&self) -> (f32, f32) {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.front(), self.samples.back()) else {
            return (0.0, 0.0);
        };
        if t1 <= t0 {
            return (0.0, 0.0);
        }
        let dt = (t1 - t0) as f32 / 1000.0;
        ((p1.x - p0.x) / dt, (p1.y - p0.y) / dt)
    }

    fn clear(&mut self) {
        self.samples.clear();
    }
}

#[derive(Debug)]
pub struct TapRecognizer {
    th: Thresholds,
    timers: TaskQueue<TapTimer>,
    confirm: Option<TaskHandle>,
    long_press: Option<TaskHandle>,
    current_down: Option<Contact>,
    previous_up: Option<Contact>,
    still_down: bool,
    in_long_press: bool,
    double_tapping: bool,
    /// The contact has not moved beyond the touch slop since its down.
    in_tap_region: bool,
    /// The confirm timer fired while the finger was still down.
    defer_confirm: bool,
    down_focus: Point,
    last_focus: Point,
    velocity: VelocityTracker,
}

impl TapRecognizer {
    pub fn new(th: Thresholds) -> Self {
        Self {
            th,
            timers: TaskQueue::new(),
            confirm: None,
            long_press: None,
            current_down: None,
            previous_up: None,
            still_down: false,
            in_long_press: false,
            double_tapping: false,
            in_tap_region: false,
            defer_confirm: false,
            down_focus: Point::default(),
            last_focus: Point::default(),
            velocity: VelocityTracker::default(),
        }
    }

    pub fn set_thresholds(&mut self, th: Thresholds) {
        self.th = th;
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn on_touch(&mut self, event: &PointerEvent) -> Vec<TapGesture> {
        let mut out = self.advance(event.time_ms);
        let focus = event.staying_focus();

        match event.phase {
            Phase::Down => self.on_down(event, focus, &mut out),
            Phase::PointerDown => {
                self.down_focus = focus;
                self.last_focus = focus;
                self.velocity.clear();
                self.cancel_taps();
            }
            Phase::PointerUp => {
                self.down_focus = focus;
                self.last_focus = focus;
                self.velocity.clear();
            }
            Phase::Move => self.on_move(event, focus, &mut out),
            Phase::Up => self.on_up(event, focus, &mut out),
            Phase::Cancel => self.cancel(),
        }
        out
    }

    /// Fires the timers due at `now_ms`.
    pub fn advance(&mut self, now_ms: u64) -> Vec<TapGesture> {
        let mut out = Vec::new();
        while let Some((handle, timer)) = self.timers.pop_due(now_ms) {
            let at = self.current_down.map(|c| c.at).unwrap_or_default();
            match timer {
                TapTimer::Confirm => {
                    if self.confirm == Some(handle) {
                        self.confirm = None;
                    }
                    if self.still_down {
                        self.defer_confirm = true;
                    } else {
                        out.push(TapGesture::SingleTapConfirmed { at });
                    }
                }
                TapTimer::LongPress => {
                    if self.long_press == Some(handle) {
                        self.long_press = None;
                    }
                    self.cancel_timer(TapTimer::Confirm);
                    self.defer_confirm = false;
                    self.in_long_press = true;
                    out.push(TapGesture::LongPress { at });
                }
            }
        }
        out
    }

    /// Drops every pending timer and candidate for the current stream.
    pub fn cancel(&mut self) {
        self.cancel_timer(TapTimer::Confirm);
        self.cancel_timer(TapTimer::LongPress);
        self.velocity.clear();
        self.still_down = false;
        self.double_tapping = false;
        self.in_tap_region = false;
        self.defer_confirm = false;
        self.in_long_press = false;
    }

    fn on_down(&mut self, event: &PointerEvent, focus: Point, out: &mut Vec<TapGesture>) {
        let p = event.first_point();
        let had_confirm = self.cancel_timer(TapTimer::Confirm);
        if had_confirm && self.is_double_tap(p, event.time_ms) {
            trace!("second tap at ({:.0}, {:.0})", p.x, p.y);
            self.double_tapping = true;
            out.push(TapGesture::DoubleTap {
                phase: Phase::Down,
                at: p,
            });
        } else {
            let due = event.time_ms + self.th.double_tap_timeout_ms;
            self.confirm = Some(self.timers.schedule(due, TapTimer::Confirm));
        }

        self.down_focus = focus;
        self.last_focus = focus;
        self.current_down = Some(Contact {
            at: p,
            time_ms: event.time_ms,
        });
        self.in_tap_region = true;
        self.still_down = true;
        self.in_long_press = false;
        self.defer_confirm = false;

        self.velocity.clear();
        self.velocity.add(event.time_ms, focus);

        self.cancel_timer(TapTimer::LongPress);
        let due = event.down_time_ms + self.th.tap_timeout_ms + self.th.long_press_timeout_ms;
        self.long_press = Some(self.timers.schedule(due, TapTimer::LongPress));

        out.push(TapGesture::Down { at: p });
    }

    fn on_move(&mut self, event: &PointerEvent, focus: Point, out: &mut Vec<TapGesture>) {
        if self.in_long_press {
            return;
        }
        self.velocity.add(event.time_ms, focus);

        let origin = self.current_down.map(|c| c.at).unwrap_or(focus);
        let distance = (self.last_focus.x - focus.x, self.last_focus.y - focus.y);

        if self.double_tapping {
            out.push(TapGesture::DoubleTap {
                phase: Phase::Move,
                at: event.first_point(),
            });
        } else if self.in_tap_region {
            let slop = self.th.touch_slop_px();
            if focus.distance_sq(self.down_focus) > slop * slop {
                out.push(TapGesture::Scroll { origin, distance });
                self.last_focus = focus;
                self.in_tap_region = false;
                self.cancel_timer(TapTimer::Confirm);
                self.cancel_timer(TapTimer::LongPress);
            }
        } else if distance.0.abs() >= 1.0 || distance.1.abs() >= 1.0 {
            out.push(TapGesture::Scroll { origin, distance });
            self.last_focus = focus;
        }
    }

    fn on_up(&mut self, event: &PointerEvent, focus: Point, out: &mut Vec<TapGesture>) {
        self.still_down = false;
        let p = event.first_point();

        if self.double_tapping {
            out.push(TapGesture::DoubleTap {
                phase: Phase::Up,
                at: p,
            });
        } else if self.in_long_press {
            self.cancel_timer(TapTimer::Confirm);
            self.in_long_press = false;
        } else if self.in_tap_region {
            out.push(TapGesture::SingleTapUp { at: p });
            if self.defer_confirm {
                out.push(TapGesture::SingleTapConfirmed { at: p });
            }
        } else {
            self.velocity.add(event.time_ms, focus);
            let velocity = self.velocity.velocity();
            let min = self.th.min_fling_velocity_px();
            if velocity.0.abs() > min || velocity.1.abs() > min {
                let origin = self.current_down.map(|c| c.at).unwrap_or(p);
                out.push(TapGesture::Fling { origin, velocity });
            }
        }

        self.previous_up = Some(Contact {
            at: p,
            time_ms: event.time_ms,
        });
        self.velocity.clear();
        self.double_tapping = false;
        self.defer_confirm = false;
        self.cancel_timer(TapTimer::LongPress);
    }

    /// A second contact joined: nothing in this stream is a tap any more.
    fn cancel_taps(&mut self) {
        self.cancel_timer(TapTimer::Confirm);
        self.cancel_timer(TapTimer::LongPress);
        self.double_tapping = false;
        self.in_tap_region = false;
        self.defer_confirm = false;
        self.in_long_press = false;
    }

    /// Second down within the window and slop of the first tap, which itself
    /// never left its tap region.
    fn is_double_tap(&self, p: Point, time_ms: u64) -> bool {
        if !self.in_tap_region {
            return false;
        }
        let (Some(first), Some(up)) = (self.current_down, self.previous_up) else {
            return false;
        };
        let dt = time_ms.saturating_sub(up.time_ms);
        if dt <= self.th.double_tap_min_time_ms || dt > self.th.double_tap_timeout_ms {
            return false;
        }
        let slop = self.th.double_tap_slop_px();
        first.at.distance_sq(p) < slop * slop
    }

    fn cancel_timer(&mut self, which: TapTimer) -> bool {
        let slot = match which {
            TapTimer::Confirm => &mut self.confirm,
            TapTimer::LongPress => &mut self.long_press,
        };
        match slot.take() {
            Some(h) => self.timers.cancel(h),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::touch;

    fn rec() -> TapRecognizer {
        TapRecognizer::new(Thresholds::default())
    }

    fn at(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn quick_tap_is_confirmed_after_double_tap_timeout() {
        let mut t = rec();
        let p = [(100.0, 100.0)];
        assert_eq!(
            t.on_touch(&touch(Phase::Down, &p, 0)),
            vec![TapGesture::Down { at: at(100.0, 100.0) }]
        );
        assert_eq!(
            t.on_touch(&touch(Phase::Up, &p, 50)),
            vec![TapGesture::SingleTapUp { at: at(100.0, 100.0) }]
        );
        assert_eq!(t.next_deadline(), Some(300));
        assert!(t.advance(299).is_empty());
        assert_eq!(
            t.advance(300),
            vec![TapGesture::SingleTapConfirmed { at: at(100.0, 100.0) }]
        );
        assert!(t.advance(5_000).is_empty());
    }

    #[test]
    fn slow_tap_is_confirmed_at_release() {
        let mut t = rec();
        let p = [(100.0, 100.0)];
        t.on_touch(&touch(Phase::Down, &p, 0));
        assert!(t.advance(350).is_empty());
        assert_eq!(
            t.on_touch(&touch(Phase::Up, &p, 400)),
            vec![
                TapGesture::SingleTapUp { at: at(100.0, 100.0) },
                TapGesture::SingleTapConfirmed { at: at(100.0, 100.0) },
            ]
        );
    }

    #[test]
    fn second_tap_in_window_is_a_double_tap() {
        let mut t = rec();
        t.on_touch(&touch(Phase::Down, &[(100.0, 100.0)], 0));
        t.on_touch(&touch(Phase::Up, &[(100.0, 100.0)], 50));
        assert_eq!(
            t.on_touch(&touch(Phase::Down, &[(120.0, 110.0)], 150)),
            vec![
                TapGesture::DoubleTap {
                    phase: Phase::Down,
                    at: at(120.0, 110.0)
                },
                TapGesture::Down { at: at(120.0, 110.0) },
            ]
        );
        assert_eq!(
            t.on_touch(&touch(Phase::Up, &[(120.0, 110.0)], 200)),
            vec![TapGesture::DoubleTap {
                phase: Phase::Up,
                at: at(120.0, 110.0)
            }]
        );
        assert!(t.advance(5_000).is_empty());
    }

    #[test]
    fn too_quick_or_too_far_second_tap_is_not_a_double_tap() {
        let mut t = rec();
        t.on_touch(&touch(Phase::Down, &[(100.0, 100.0)], 0));
        t.on_touch(&touch(Phase::Up, &[(100.0, 100.0)], 50));
        let out = t.on_touch(&touch(Phase::Down, &[(100.0, 100.0)], 70));
        assert_eq!(out, vec![TapGesture::Down { at: at(100.0, 100.0) }]);
        t.on_touch(&touch(Phase::Up, &[(100.0, 100.0)], 90));

        let out = t.on_touch(&touch(Phase::Down, &[(400.0, 100.0)], 190));
        assert_eq!(out, vec![TapGesture::Down { at: at(400.0, 100.0) }]);
    }

    #[test]
    fn held_contact_becomes_a_long_press() {
        let mut t = rec();
        let p = [(10.0, 20.0)];
        t.on_touch(&touch(Phase::Down, &p, 0));
        assert!(t.advance(599).is_empty());
        assert_eq!(t.advance(600), vec![TapGesture::LongPress { at: at(10.0, 20.0) }]);
        assert!(t.on_touch(&touch(Phase::Move, &[(40.0, 20.0)], 650)).is_empty());
        assert!(t.on_touch(&touch(Phase::Up, &p, 700)).is_empty());
        assert!(t.advance(5_000).is_empty());
    }

    #[test]
    fn leaving_the_slop_scrolls_and_drops_the_tap() {
        let mut t = rec();
        t.on_touch(&touch(Phase::Down, &[(100.0, 100.0)], 0));
        assert!(t.on_touch(&touch(Phase::Move, &[(105.0, 100.0)], 10)).is_empty());
        assert_eq!(
            t.on_touch(&touch(Phase::Move, &[(120.0, 100.0)], 20)),
            vec![TapGesture::Scroll {
                origin: at(100.0, 100.0),
                distance: (-20.0, 0.0)
            }]
        );
        assert_eq!(
            t.on_touch(&touch(Phase::Move, &[(130.0, 95.0)], 30)),
            vec![TapGesture::Scroll {
                origin: at(100.0, 100.0),
                distance: (-10.0, 5.0)
            }]
        );
        assert!(t.on_touch(&touch(Phase::Up, &[(130.0, 95.0)], 500)).is_empty());
        assert!(t.advance(5_000).is_empty());
    }

    #[test]
    fn fast_release_flings() {
        let mut t = rec();
        t.on_touch(&touch(Phase::Down, &[(100.0, 500.0)], 0));
        t.on_touch(&touch(Phase::Move, &[(200.0, 500.0)], 20));
        t.on_touch(&touch(Phase::Move, &[(400.0, 500.0)], 40));
        let out = t.on_touch(&touch(Phase::Up, &[(500.0, 500.0)], 50));
        let [TapGesture::Fling { origin, velocity }] = out.as_slice() else {
            panic!("expected a fling, got {out:?}");
        };
        assert_eq!(*origin, at(100.0, 500.0));
        assert!((velocity.0 - 8_000.0).abs() < 1.0);
        assert_eq!(velocity.1, 0.0);
    }

    #[test]
    fn second_pointer_cancels_every_tap_candidate() {
        let mut t = rec();
        let mut all = Vec::new();
        all.extend(t.on_touch(&touch(Phase::Down, &[(100.0, 100.0)], 0)));
        all.extend(t.on_touch(&touch(Phase::PointerDown, &[(100.0, 100.0), (200.0, 100.0)], 20)));
        all.extend(t.on_touch(&touch(Phase::PointerUp, &[(100.0, 100.0), (200.0, 100.0)], 60)));
        all.extend(t.on_touch(&touch(Phase::Up, &[(100.0, 100.0)], 80)));
        all.extend(t.advance(5_000));
        assert_eq!(all, vec![TapGesture::Down { at: at(100.0, 100.0) }]);
        assert_eq!(t.next_deadline(), None);
    }

    #[test]
    fn cancel_clears_pending_timers() {
        let mut t = rec();
        t.on_touch(&touch(Phase::Down, &[(100.0, 100.0)], 0));
        t.on_touch(&touch(Phase::Cancel, &[(100.0, 100.0)], 10));
        assert_eq!(t.next_deadline(), None);
        assert!(t.advance(5_000).is_empty());
    }
}
