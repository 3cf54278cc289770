//! Virtual-time scheduler for deferred UI work.
//!
//! Toast dismissal and the checkout confirmation are not fire-and-forget
//! timers: they are entries in a [`Scheduler`] that the host advances. Tests
//! advance it by exact durations; a real shell advances it from a clock.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled task, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Ordered queue of tasks keyed by virtual deadline
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    // (deadline, id) keeps ties in scheduling order
    pending: BTreeMap<(Duration, TaskId), T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` once `delay` of virtual time has passed
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.insert((self.now + delay, id), task);
        id
    }

    /// Cancel a pending task, returning it if it had not run yet
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let key = self.pending.keys().find(|(_, task_id)| *task_id == id).copied()?;
        self.pending.remove(&key)
    }

    /// Drop every pending task, returning how many were cancelled
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.keys().any(|(_, task_id)| *task_id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Time remaining until the earliest pending task, if any
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending
            .keys()
            .next()
            .map(|(deadline, _)| deadline.saturating_sub(self.now))
    }

    /// Move virtual time forward and return the tasks that became due,
    /// earliest first.
    pub fn advance(&mut self, by: Duration) -> Vec<T> {
        self.now += by;
        let mut due = Vec::new();
        while let Some(entry) = self.pending.first_entry() {
            if entry.key().0 > self.now {
                break;
            }
            due.push(entry.remove());
        }
        due
    }
}
