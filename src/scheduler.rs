//! One-shot deferred tasks on the dispatch thread.
//!
//! Tasks are plain values; the owner pops them once their deadline passes and
//! decides what to run. A cancelled task is removed immediately, so it can
//! never be popped afterwards.

use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
pub struct TaskQueue<T> {
    next_id: u64,
    pending: BTreeMap<(u64, u64), T>,
    due_at: HashMap<u64, u64>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: BTreeMap::new(),
            due_at: HashMap::new(),
        }
    }

    pub fn schedule(&mut self, due_ms: u64, task: T) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert((due_ms, id), task);
        self.due_at.insert(id, due_ms);
        TaskHandle(id)
    }

    /// Returns true if the task was still pending. Cancelling twice is a no-op.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.due_at.remove(&handle.0) {
            Some(due) => self.pending.remove(&(due, handle.0)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.due_at.contains_key(&handle.0)
    }

    /// Pops the earliest task whose deadline is at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TaskHandle, T)> {
        let (&(due, _), _) = self.pending.first_key_value()?;
        if due > now_ms {
            return None;
        }
        let ((_, id), task) = self.pending.pop_first()?;
        self.due_at.remove(&id);
        Some((TaskHandle(id), task))
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.due_at.clear();
    }
}
