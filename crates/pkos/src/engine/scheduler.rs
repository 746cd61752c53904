//! Virtual-clock timer queue.
//!
//! Every deferred action in the session (countdown ticks, upload progress,
//! scan and decrypt delays, theme restore, uptime) is a [`Job`] on this queue.
//! Nothing fires on its own: the owner advances the clock and pops due jobs,
//! so tests move time forward explicitly.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Handle returned by `schedule*`, used to cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Deferred work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Mission countdown, every second while an operation is active
    EngineTick,
    /// Mission loot upload progress
    UploadStep,
    /// Project OMEGA-9 upload progress
    OmegaUploadStep,
    /// `scan_network` results
    ScanComplete,
    /// `decrypt` key verification
    DecryptComplete,
    /// One delayed `ping` reply line
    PingReply(String),
    /// Back to the default palette after a reward flash
    ThemeRestore,
    /// One minute of uptime
    UptimeTick,
    /// Blue screen
    Crash,
    /// Forced reload after a crash or a finished deep-web heist
    Reload,
}

#[derive(Debug, Clone)]
struct Timer {
    job: Job,
    interval: Option<u64>,
}

/// Min-heap of timers keyed by `(due, seq)`; `seq` keeps ties FIFO
#[derive(Debug, Default)]
pub struct Scheduler {
    now: u64,
    next_id: u64,
    next_seq: u64,
    queue: BinaryHeap<Reverse<(u64, u64, TimerId)>>,
    timers: HashMap<TimerId, Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Fire `job` once, `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u64, job: Job) -> TimerId {
        self.insert(delay_ms, job, None)
    }

    /// Fire `job` every `interval_ms`, first time one interval from now
    pub fn schedule_every(&mut self, interval_ms: u64, job: Job) -> TimerId {
        let interval_ms = interval_ms.max(1);
        self.insert(interval_ms, job, Some(interval_ms))
    }

    fn insert(&mut self, delay_ms: u64, job: Job, interval: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(id, Timer { job, interval });
        self.push(self.now + delay_ms, id);
        id
    }

    fn push(&mut self, due: u64, id: TimerId) {
        self.queue.push(Reverse((due, self.next_seq, id)));
        self.next_seq += 1;
    }

    /// Returns true if the timer was still pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    #[cfg(test)]
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Number of live timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Pop the earliest job due at or before `until`, moving the clock to its due time.
    ///
    /// Recurring timers are re-armed before returning.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, Job)> {
        loop {
            let Reverse((due, _, id)) = *self.queue.peek()?;
            if due > until {
                return None;
            }
            self.queue.pop();

            // Cancelled timers leave stale heap entries behind
            let Some(timer) = self.timers.get(&id) else {
                continue;
            };

            self.now = self.now.max(due);
            let job = timer.job.clone();
            match timer.interval {
                Some(interval) => self.push(due + interval, id),
                None => {
                    self.timers.remove(&id);
                }
            }
            return Some((id, job));
        }
    }

    /// Move the clock to `until` once nothing more is due
    pub fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler, until: u64) -> Vec<(u64, Job)> {
        let mut fired = Vec::new();
        while let Some((_, job)) = scheduler.pop_due(until) {
            fired.push((scheduler.now(), job));
        }
        scheduler.settle(until);
        fired
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(800, Job::DecryptComplete);
        scheduler.schedule(500, Job::PingReply("a".into()));
        scheduler.schedule(500, Job::PingReply("b".into()));

        let fired = drain(&mut scheduler, 1000);
        assert_eq!(
            fired,
            vec![
                (500, Job::PingReply("a".into())),
                (500, Job::PingReply("b".into())),
                (800, Job::DecryptComplete),
            ]
        );
        assert_eq!(scheduler.now(), 1000);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_recurring_until_cancelled() {
        let mut scheduler = Scheduler::new();
        let tick = scheduler.schedule_every(1000, Job::EngineTick);

        assert_eq!(drain(&mut scheduler, 3500).len(), 3);
        assert!(scheduler.is_scheduled(tick));

        assert!(scheduler.cancel(tick));
        assert!(!scheduler.cancel(tick));
        assert!(drain(&mut scheduler, 10_000).is_empty());
    }

    #[test]
    fn test_nothing_fires_early() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(2000, Job::ScanComplete);
        assert!(drain(&mut scheduler, 1999).is_empty());
        assert_eq!(drain(&mut scheduler, 2000), vec![(2000, Job::ScanComplete)]);
    }

    #[test]
    fn test_delay_is_relative_to_virtual_now() {
        let mut scheduler = Scheduler::new();
        scheduler.settle(5000);
        scheduler.schedule(3000, Job::ThemeRestore);
        assert!(drain(&mut scheduler, 7999).is_empty());
        assert_eq!(drain(&mut scheduler, 8000).len(), 1);
    }
}
