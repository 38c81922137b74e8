//! Cooperative timers for a single-threaded event loop.
//!
//! Nothing here sleeps. Callers schedule a task value, then periodically hand
//! the current time to [`Scheduler::poll`] and act on whatever became due.
//! Every handle belongs to the generation it was issued in; [`Scheduler::cancel_all`]
//! drops all pending tasks and retires that generation at once, so a superseded
//! run can never observe a stale continuation.

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: u64,
    generation: u64,
}

impl TimerHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
struct Pending<T> {
    handle: TimerHandle,
    due_ms: f64,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    pending: Vec<Pending<T>>,
    next_id: u64,
    generation: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
            generation: 0,
        }
    }

    /// Queues `task` to become due `delay_ms` after `now_ms`.
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, task: T) -> TimerHandle {
        let handle = TimerHandle {
            id: self.next_id,
            generation: self.generation,
        };
        self.next_id += 1;
        let due_ms = now_ms + delay_ms.max(0.0);
        trace!(id = handle.id, due_ms, "timer scheduled");
        self.pending.push(Pending {
            handle,
            due_ms,
            task,
        });
        handle
    }

    /// Cancels one timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        if handle.generation != self.generation {
            return false;
        }
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        before != self.pending.len()
    }

    /// Cancels every pending timer and starts a new generation.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.generation += 1;
        trace!(dropped, generation = self.generation, "timer group cancelled");
        dropped
    }

    /// Removes and returns every task due at `now_ms`, earliest first.
    /// Timers due at the same instant fire in scheduling order.
    pub fn poll(&mut self, now_ms: f64) -> Vec<T> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due_ms <= now_ms {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| {
            a.due_ms
                .total_cmp(&b.due_ms)
                .then(a.handle.id.cmp(&b.handle.id))
        });
        due.into_iter().map(|p| p.task).collect()
    }

    /// Earliest due time among pending timers.
    pub fn next_due(&self) -> Option<f64> {
        self.pending
            .iter()
            .map(|p| p.due_ms)
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule(0.0, 300.0, "c");
        s.schedule(0.0, 100.0, "a");
        s.schedule(0.0, 200.0, "b");
        assert!(s.poll(50.0).is_empty());
        assert_eq!(s.poll(250.0), vec!["a", "b"]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.poll(1_000.0), vec!["c"]);
        assert!(s.is_empty());
    }

    #[test]
    fn ties_fire_in_schedule_order() {
        let mut s = Scheduler::new();
        s.schedule(0.0, 100.0, 1);
        s.schedule(50.0, 50.0, 2);
        s.schedule(0.0, 100.0, 3);
        assert_eq!(s.poll(100.0), vec![1, 2, 3]);
    }

    #[test]
    fn cancel_single() {
        let mut s = Scheduler::new();
        let a = s.schedule(0.0, 10.0, 'a');
        s.schedule(0.0, 20.0, 'b');
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert_eq!(s.poll(100.0), vec!['b']);
    }

    #[test]
    fn cancel_all_retires_generation() {
        let mut s = Scheduler::new();
        let old = s.schedule(0.0, 10.0, 1);
        s.schedule(0.0, 20.0, 2);
        assert_eq!(s.cancel_all(), 2);
        assert_eq!(s.generation(), 1);
        assert!(!s.cancel(old));

        let fresh = s.schedule(0.0, 10.0, 3);
        assert_eq!(fresh.generation(), 1);
        assert_eq!(s.poll(100.0), vec![3]);
    }

    #[test]
    fn next_due_tracks_earliest() {
        let mut s = Scheduler::new();
        assert_eq!(s.next_due(), None);
        s.schedule(1_000.0, 500.0, ());
        s.schedule(1_000.0, 250.0, ());
        assert_eq!(s.next_due(), Some(1_250.0));
    }

    #[test]
    fn negative_delay_is_immediate() {
        let mut s = Scheduler::new();
        let h = s.schedule(10.0, -5.0, "now");
        assert!(s.is_pending(h));
        assert_eq!(s.poll(10.0), vec!["now"]);
    }
}
