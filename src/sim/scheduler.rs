//! Virtual-clock timers
//!
//! The session owns one scheduler and advances it with wall-clock time. Timers
//! only fire from `pop_due`, so nothing runs behind the caller's back and tests
//! can drive time by hand.

use serde::{Deserialize, Serialize};

/// Handle returned when scheduling, used to cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    due: u64,
    /// Re-arm interval for repeating timers
    period: Option<u64>,
    task: T,
}

/// Millisecond timer queue
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: u64,
    next_id: u64,
    timers: Vec<Timer<T>>,
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 1,
            timers: Vec::new(),
        }
    }

    /// Current clock time (ms)
    pub fn now(&self) -> u64 {
        self.now
    }

    fn push(&mut self, delay: u64, period: Option<u64>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now.saturating_add(delay),
            period,
            task,
        });
        id
    }

    /// Fire `task` once, `delay` ms from now
    pub fn schedule_once(&mut self, delay: u64, task: T) -> TimerId {
        self.push(delay, None, task)
    }

    /// Fire `task` every `period` ms, first time one period from now
    pub fn schedule_repeating(&mut self, period: u64, task: T) -> TimerId {
        let period = period.max(1);
        self.push(period, Some(period), task)
    }

    /// Returns false if the timer already fired (one-shot) or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its due time. Ties fire in scheduling order.
    ///
    /// Call repeatedly until `None`, then `settle(until)`.
    pub fn pop_due(&mut self, until: u64) -> Option<T> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;

        let due = self.timers[idx].due;
        self.now = self.now.max(due);

        // A repeating timer whose next due time would pass u64::MAX fires one
        // last time and is dropped
        let task = match self.timers[idx].period.and_then(|p| due.checked_add(p)) {
            Some(next) => {
                let timer = &mut self.timers[idx];
                timer.due = next;
                timer.task.clone()
            }
            None => self.timers.swap_remove(idx).task,
        };
        Some(task)
    }

    /// Move the clock forward to `until` once all due timers have been popped
    pub fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }
}
