//! Cooperative timers driven by the frame loop.
//!
//! Nothing here sleeps or spawns. Owners keep the handles next to their own
//! state and poll them with the current [`Instant`].

use std::time::{Duration, Instant};

/// Delay-then-fire-once-on-quiet scheduling.
///
/// Each [`trigger`](Self::trigger) replaces any pending deadline, so a burst
/// of triggers fires once, `delay` after the last one. The owner keeps the
/// handle next to its state and runs its action when
/// [`fire_due`](Self::fire_due) returns `true`.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` exactly once when the deadline has been reached.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A repeating tick. Missed periods are skipped rather than replayed.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next: Option<Instant>,
}

impl Interval {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next: Some(now + period),
        }
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub fn is_active(&self) -> bool {
        self.next.is_some()
    }

    pub fn due(&mut self, now: Instant) -> bool {
        let Some(next) = self.next else {
            return false;
        };
        if now < next || self.period.is_zero() {
            return false;
        }
        let behind = now.duration_since(next).as_nanos() / self.period.as_nanos();
        let skipped = u32::try_from(behind).unwrap_or(u32::MAX).saturating_add(1);
        self.next = Some(next + self.period * skipped);
        true
    }
}

/// A one-shot timer.
#[derive(Debug, Clone)]
pub struct Timeout {
    at: Option<Instant>,
}

impl Timeout {
    pub fn new(delay: Duration, now: Instant) -> Self {
        Self {
            at: Some(now + delay),
        }
    }

    pub fn cancel(&mut self) {
        self.at = None;
    }

    pub fn is_pending(&self) -> bool {
        self.at.is_some()
    }

    pub fn due(&mut self, now: Instant) -> bool {
        match self.at {
            Some(at) if now >= at => {
                self.at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_debounce_fires_once_after_last_trigger() {
        let t0 = Instant::now();
        let mut hide = Debounce::new(ms(2000));

        hide.trigger(t0);
        hide.trigger(t0 + ms(500));
        hide.trigger(t0 + ms(1000));

        // 2s after the first trigger, but only 1s after the last
        assert!(!hide.fire_due(t0 + ms(2000)));
        assert!(!hide.fire_due(t0 + ms(2999)));
        let fired = [3000, 3001, 9000]
            .iter()
            .filter(|at| hide.fire_due(t0 + ms(**at)))
            .count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_debounce_handles_are_independent() {
        let t0 = Instant::now();
        let mut counter = Debounce::new(ms(2000));
        let mut sidebar = Debounce::new(ms(2000));
        counter.trigger(t0);
        sidebar.trigger(t0 + ms(1500));
        assert!(counter.fire_due(t0 + ms(2000)));
        assert!(!sidebar.fire_due(t0 + ms(2000)));
        assert!(sidebar.fire_due(t0 + ms(3500)));
    }

    #[test]
    fn test_debounce_cancel() {
        let t0 = Instant::now();
        let mut d = Debounce::new(ms(10));
        d.trigger(t0);
        d.cancel();
        assert!(!d.fire_due(t0 + ms(100)));
    }

    #[test]
    fn test_interval_skips_missed_ticks() {
        let t0 = Instant::now();
        let mut tick = Interval::new(ms(1000), t0);
        assert!(!tick.due(t0 + ms(999)));
        assert!(tick.due(t0 + ms(1000)));
        assert!(!tick.due(t0 + ms(1500)));
        // Stalled for several periods: one tick, then back on the grid
        assert!(tick.due(t0 + ms(5500)));
        assert!(!tick.due(t0 + ms(5900)));
        assert!(tick.due(t0 + ms(6000)));
    }

    #[test]
    fn test_interval_cancel() {
        let t0 = Instant::now();
        let mut tick = Interval::new(ms(10), t0);
        tick.cancel();
        assert!(!tick.is_active());
        assert!(!tick.due(t0 + ms(100)));
    }

    #[test]
    fn test_timeout_fires_once() {
        let t0 = Instant::now();
        let mut t = Timeout::new(ms(100), t0);
        assert!(!t.due(t0 + ms(99)));
        assert!(t.due(t0 + ms(100)));
        assert!(!t.due(t0 + ms(200)));
        assert!(!t.is_pending());
    }
}
