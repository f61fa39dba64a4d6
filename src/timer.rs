//! Scheduler-agnostic timers
//!
//! Both timers are driven by explicit `Instant`s so the host decides how to
//! wait (event-loop deadline, test clock, ...). Nothing here sleeps.

use std::time::{Duration, Instant};

/// Fires once after `delay` of quiet
///
/// Every `restart` pushes the deadline out and supersedes the pending firing,
/// so a burst of restarts collapses into a single fire after the last one.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)arm the timer, cancelling any pending firing
    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the pending firing if its deadline has passed
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Fixed-period ticker for periodic sampling
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next: Instant,
}

impl Interval {
    /// First tick is due one period after `start`
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next: start + period,
        }
    }

    pub fn next_due(&self) -> Instant {
        self.next
    }

    /// Returns true (at most once per call) when a tick is due
    ///
    /// Missed ticks are not replayed: after a long stall the next tick is
    /// scheduled one period from `now`.
    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_debouncer_fires_once_after_quiet() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(300 * MS);
        d.restart(t0);

        assert!(!d.fire_if_due(t0 + 299 * MS));
        assert!(d.fire_if_due(t0 + 300 * MS));
        assert!(!d.fire_if_due(t0 + 900 * MS));
    }

    #[test]
    fn test_restart_cancels_pending_firing() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(300 * MS);
        d.restart(t0);
        d.restart(t0 + 200 * MS);

        // The first deadline (t0+300) is gone
        assert!(!d.fire_if_due(t0 + 350 * MS));
        assert!(d.fire_if_due(t0 + 500 * MS));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_cancel_clears_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(300 * MS);
        d.restart(t0);
        d.cancel();
        assert!(!d.is_pending());
        assert!(!d.fire_if_due(t0 + 1000 * MS));
    }

    #[test]
    fn test_interval_ticks_each_period() {
        let t0 = Instant::now();
        let mut i = Interval::new(2000 * MS, t0);
        assert!(!i.due(t0 + 1999 * MS));
        assert!(i.due(t0 + 2000 * MS));
        assert!(!i.due(t0 + 2001 * MS));
        assert!(i.due(t0 + 4000 * MS));
    }

    #[test]
    fn test_interval_does_not_replay_missed_ticks() {
        let t0 = Instant::now();
        let mut i = Interval::new(2000 * MS, t0);
        assert!(i.due(t0 + 10_000 * MS));
        assert!(!i.due(t0 + 10_001 * MS));
        assert_eq!(i.next_due(), t0 + 12_000 * MS);
    }
}
