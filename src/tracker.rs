//! Multitouch slot tracking: evdev MT-B frames in, pointer events out.

use touchmap::config::ScreenSize;
use touchmap::event::{Phase, Point, Pointer, PointerEvent};

const MAX_SLOTS: usize = 10;

#[derive(Debug, Clone)]
struct Slot {
    tracking_id: i32, // -1 = inactive
    x_raw: i32,
    y_raw: i32,
    moved: bool,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            tracking_id: -1,
            x_raw: 0,
            y_raw: 0,
            moved: false,
        }
    }
}

#[derive(Debug)]
pub struct Tracker {
    slots: Vec<Slot>,
    cur_slot: usize,
    /// Slots in the order their contacts went down; the pointer index order.
    order: Vec<usize>,
    down_time_ms: u64,
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
    screen: ScreenSize,
}

impl Tracker {
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            slots: vec![Slot::default(); MAX_SLOTS],
            cur_slot: 0,
            order: Vec::new(),
            down_time_ms: 0,
            x_min: 0,
            x_max: 4096,
            y_min: 0,
            y_max: 4096,
            screen,
        }
    }

    pub fn set_ranges(&mut self, x_min: i32, x_max: i32, y_min: i32, y_max: i32) {
        self.x_min = x_min;
        self.x_max = x_max.max(x_min + 1);
        self.y_min = y_min;
        self.y_max = y_max.max(y_min + 1);
    }

    pub fn set_screen(&mut self, screen: ScreenSize) {
        self.screen = screen;
    }

    pub fn on_slot(&mut self, slot: i32) {
        self.cur_slot = slot.clamp(0, MAX_SLOTS as i32 - 1) as usize;
    }

    pub fn on_tracking_id(&mut self, tracking_id: i32) {
        self.slots[self.cur_slot].tracking_id = tracking_id.max(-1);
    }

    pub fn on_pos_x(&mut self, raw: i32) {
        let s = &mut self.slots[self.cur_slot];
        s.moved |= s.x_raw != raw;
        s.x_raw = raw;
    }

    pub fn on_pos_y(&mut self, raw: i32) {
        let s = &mut self.slots[self.cur_slot];
        s.moved |= s.y_raw != raw;
        s.y_raw = raw;
    }

    fn to_screen(&self, s: &Slot) -> Point {
        let nx = ((s.x_raw - self.x_min) as f32 / (self.x_max - self.x_min) as f32).clamp(0.0, 1.0);
        let ny = ((s.y_raw - self.y_min) as f32 / (self.y_max - self.y_min) as f32).clamp(0.0, 1.0);
        Point::new(nx * self.screen.width, ny * self.screen.height)
    }

    fn pointers(&self) -> Vec<Pointer> {
        self.order
            .iter()
            .map(|&i| {
                let p = self.to_screen(&self.slots[i]);
                Pointer::new(i as i32, p.x, p.y)
            })
            .collect()
    }

    fn event(&self, phase: Phase, time_ms: u64) -> PointerEvent {
        PointerEvent::new(phase, self.pointers(), time_ms).with_down_time(self.down_time_ms)
    }

    /// Closes the current frame, returning the pointer events it implies:
    /// releases first, then new contacts, then one move if anything moved.
    pub fn on_syn_report(&mut self, time_ms: u64) -> Vec<PointerEvent> {
        let mut out = Vec::new();

        let released: Vec<usize> = self
            .order
            .iter()
            .copied()
            .filter(|&i| self.slots[i].tracking_id < 0)
            .collect();
        for slot in released {
            let Some(index) = self.order.iter().position(|&i| i == slot) else {
                continue;
            };
            let phase = if self.order.len() == 1 {
                Phase::Up
            } else {
                Phase::PointerUp
            };
            out.push(self.event(phase, time_ms).with_action_index(index));
            self.order.remove(index);
        }

        let pressed: Vec<usize> = (0..MAX_SLOTS)
            .filter(|i| self.slots[*i].tracking_id >= 0 && !self.order.contains(i))
            .collect();
        for slot in pressed {
            let phase = if self.order.is_empty() {
                self.down_time_ms = time_ms;
                Phase::Down
            } else {
                Phase::PointerDown
            };
            self.order.push(slot);
            self.slots[slot].moved = false;
            out.push(self.event(phase, time_ms));
        }

        let moved = self.order.iter().any(|&i| self.slots[i].moved);
        if moved {
            out.push(self.event(Phase::Move, time_ms));
        }
        for s in &mut self.slots {
            s.moved = false;
        }
        out
    }
}
