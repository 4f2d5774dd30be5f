//! Cancellable scheduled tasks
//!
//! Every periodic or delayed event of a session (spawn, countdown, boost
//! expiry) is a task owned by the session's [`Scheduler`]. The host's clock
//! drives it: [`Scheduler::pop_due`] hands back due tasks one at a time in
//! (due time, creation order), so handlers always run to completion before
//! the next event is looked at.

use serde::{Deserialize, Serialize};

/// Handle used to cancel or inspect a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

/// What a task does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    Spawn,
    Countdown,
    SpeedUpExpiry,
    DoublePointsExpiry,
}

/// A task that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,
    /// Scheduled time of this firing (ms)
    pub at_ms: u64,
}

#[derive(Debug, Clone)]
struct Task {
    id: TimerId,
    kind: TimerKind,
    due_ms: u64,
    /// Some for intervals, None for one-shots
    period_ms: Option<u64>,
}

/// Session-owned task queue
#[derive(Debug, Clone)]
pub struct Scheduler {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    fn push(&mut self, kind: TimerKind, due_ms: u64, period_ms: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            kind,
            due_ms,
            period_ms,
        });
        id
    }

    /// Fire every `period_ms`, first at `now_ms + period_ms`
    pub fn every(&mut self, kind: TimerKind, now_ms: u64, period_ms: u64) -> TimerId {
        // A zero period would never let the clock catch up
        let period = period_ms.max(1);
        self.push(kind, now_ms + period, Some(period))
    }

    /// Fire once at `now_ms + delay_ms`
    pub fn after(&mut self, kind: TimerKind, now_ms: u64, delay_ms: u64) -> TimerId {
        self.push(kind, now_ms + delay_ms, None)
    }

    /// Cancel a task; returns false if it was not armed
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Cancel the task behind an optional handle and clear the handle
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerId>) {
        if let Some(id) = slot.take() {
            self.cancel(id);
        }
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Interval period of an armed task
    pub fn period_of(&self, id: TimerId) -> Option<u64> {
        self.tasks.iter().find(|t| t.id == id).and_then(|t| t.period_ms)
    }

    /// Number of armed tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Earliest due time among armed tasks
    pub fn next_due(&self) -> Option<u64> {
        self.tasks.iter().map(|t| t.due_ms).min()
    }

    /// Take the earliest task due at or before `now_ms`
    ///
    /// Intervals are re-armed from their own due time, so a late caller
    /// receives every missed firing in order. One-shots are removed.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Fired> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let task = &self.tasks[idx];
        let fired = Fired {
            id: task.id,
            kind: task.kind,
            at_ms: task.due_ms,
        };
        let period = task.period_ms;
        match period {
            Some(period) => self.tasks[idx].due_ms += period,
            None => {
                self.tasks.swap_remove(idx);
            }
        }
        Some(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler, now: u64) -> Vec<(TimerKind, u64)> {
        std::iter::from_fn(|| s.pop_due(now)).map(|f| (f.kind, f.at_ms)).collect()
    }

    #[test]
    fn test_interval_catches_up_in_order() {
        let mut s = Scheduler::new();
        s.every(TimerKind::Spawn, 0, 300);
        s.every(TimerKind::Countdown, 0, 1000);
        let fired = drain(&mut s, 1000);
        assert_eq!(
            fired,
            vec![
                (TimerKind::Spawn, 300),
                (TimerKind::Spawn, 600),
                (TimerKind::Spawn, 900),
                (TimerKind::Countdown, 1000),
            ]
        );
        assert_eq!(s.next_due(), Some(1200));
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut s = Scheduler::new();
        let id = s.after(TimerKind::DoublePointsExpiry, 100, 3000);
        assert!(s.pop_due(3099).is_none());
        let f = s.pop_due(3100).unwrap();
        assert_eq!(f.id, id);
        assert!(s.pop_due(10_000).is_none());
        assert!(!s.is_armed(id));
    }

    #[test]
    fn test_ties_break_by_creation_order() {
        let mut s = Scheduler::new();
        s.after(TimerKind::SpeedUpExpiry, 0, 500);
        s.every(TimerKind::Spawn, 0, 500);
        let fired = drain(&mut s, 500);
        assert_eq!(fired[0].0, TimerKind::SpeedUpExpiry);
        assert_eq!(fired[1].0, TimerKind::Spawn);
    }

    #[test]
    fn test_cancel_and_slot() {
        let mut s = Scheduler::new();
        let mut slot = Some(s.every(TimerKind::Spawn, 0, 100));
        let other = s.every(TimerKind::Countdown, 0, 1000);
        s.cancel_slot(&mut slot);
        assert!(slot.is_none());
        assert_eq!(s.len(), 1);
        assert!(!s.cancel(TimerId(999)));
        assert_eq!(s.period_of(other), Some(1000));
        s.cancel_all();
        assert!(s.is_empty());
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let mut s = Scheduler::new();
        let id = s.every(TimerKind::Spawn, 0, 0);
        assert_eq!(s.period_of(id), Some(1));
        assert_eq!(drain(&mut s, 3).len(), 3);
    }
}
