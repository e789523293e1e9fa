//! Cancellable one-shot timers on a single-threaded clock.
//!
//! The owner decides what "now" is and drains due events from its frame loop,
//! so nothing fires behind its back and a cancelled timer can never run.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Pending<E> {
    id: TimerId,
    due_ms: u64,
    event: E,
}

#[derive(Debug)]
pub struct Scheduler<E> {
    next_id: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, due_ms: u64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending { id, due_ms, event });
        id
    }

    /// Returns false when the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ms).min()
    }

    /// Removes and returns the earliest event due at or before `now_ms`.
    /// Ties go to the timer scheduled first.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerId, E)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= now_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.id.0))
            .map(|(idx, _)| idx)?;
        let p = self.pending.remove(idx);
        Some((p.id, p.event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_order_then_schedule_order() {
        let mut s = Scheduler::new();
        s.schedule(300, "c");
        s.schedule(100, "a");
        s.schedule(100, "b");
        assert_eq!(s.next_due(), Some(100));
        assert_eq!(s.pop_due(50), None);
        let fired: Vec<_> = std::iter::from_fn(|| s.pop_due(1_000).map(|(_, e)| e)).collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
        assert!(s.is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut s = Scheduler::new();
        let keep = s.schedule(10, 1);
        let drop = s.schedule(5, 2);
        assert!(s.cancel(drop));
        assert!(!s.cancel(drop));
        assert!(!s.is_pending(drop));
        assert_eq!(s.pop_due(100), Some((keep, 1)));
        assert_eq!(s.pop_due(100), None);
    }

    #[test]
    fn cancel_all_empties_queue() {
        let mut s = Scheduler::new();
        s.schedule(1, ());
        s.schedule(2, ());
        assert_eq!(s.len(), 2);
        s.cancel_all();
        assert!(s.pop_due(u64::MAX).is_none());
    }
}
