use std::time::Duration;

/// Fixed-period timer driven by an external clock.
///
/// The timer never reads the wall clock itself; callers pass the current
/// session time to `start` and `poll`. Firings are due at `start + k * period`
/// for `k >= 1`, inclusive of the exact deadline.
#[derive(Debug, Clone)]
pub struct RegenTimer {
    period: Duration,
    next_due: Option<Duration>,
    fired: u64,
}

impl RegenTimer {
    /// Create an unstarted timer. Panics if `period` is zero.
    pub fn new(period: Duration) -> Self {
        assert!(!period.is_zero(), "timer period must be positive");
        Self {
            period,
            next_due: None,
            fired: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Register the timer; the first firing is one period after `now`.
    pub fn start(&mut self, now: Duration) {
        self.next_due = Some(now + self.period);
        tracing::trace!(?now, period = ?self.period, "regen timer started");
    }

    /// Deregister the timer. Later polls report nothing due.
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Deadline of the next firing, if the timer is active.
    pub fn next_due(&self) -> Option<Duration> {
        self.next_due
    }

    /// Total firings reported so far.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Number of firings due at or before `now`.
    ///
    /// Every missed deadline is counted, then the next deadline is re-anchored
    /// to the first one strictly after `now`, so a stalled clock never queues
    /// a backlog.
    pub fn poll(&mut self, now: Duration) -> u32 {
        let Some(due) = self.next_due else {
            return 0;
        };
        if now < due {
            return 0;
        }
        let missed = (now - due).as_nanos() / self.period.as_nanos();
        let count = u32::try_from(missed + 1).unwrap_or(u32::MAX);
        let skip = self.period * u32::try_from(missed).unwrap_or(u32::MAX);
        self.next_due = Some(due + skip + self.period);
        self.fired += u64::from(count);
        if count > 1 {
            tracing::debug!(?now, count, "regen timer caught up after a stall");
        } else {
            tracing::trace!(?now, "regen timer fired");
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn unstarted_timer_never_fires() {
        let mut t = RegenTimer::new(ms(500));
        assert_eq!(t.poll(ms(10_000)), 0);
        assert!(!t.is_active());
    }

    #[test]
    fn fires_four_times_in_two_seconds() {
        let mut t = RegenTimer::new(ms(500));
        t.start(ms(0));
        let mut firings = Vec::new();
        for now in (0..=2000).step_by(10) {
            for _ in 0..t.poll(ms(now)) {
                firings.push(now);
            }
        }
        assert_eq!(firings, vec![500, 1000, 1500, 2000]);
        assert_eq!(t.fired(), 4);
    }

    #[test]
    fn late_poll_reports_every_missed_firing() {
        let mut t = RegenTimer::new(ms(500));
        t.start(ms(0));
        assert_eq!(t.poll(ms(1700)), 3);
        assert_eq!(t.next_due(), Some(ms(2000)));
    }

    #[test]
    fn long_stall_reanchors_past_now() {
        let mut t = RegenTimer::new(ms(500));
        t.start(ms(0));
        assert_eq!(t.poll(ms(60_000)), 120);
        let next = t.next_due().unwrap();
        assert!(next > ms(60_000));
        assert_eq!(next, ms(60_500));
        assert_eq!(t.poll(ms(60_499)), 0);
        assert_eq!(t.poll(ms(60_500)), 1);
        assert_eq!(t.fired(), 121);
    }

    #[test]
    fn cancel_deregisters() {
        let mut t = RegenTimer::new(ms(500));
        t.start(ms(0));
        assert_eq!(t.poll(ms(500)), 1);
        t.cancel();
        assert_eq!(t.poll(ms(5000)), 0);
    }

    #[test]
    #[should_panic]
    fn zero_period_rejected() {
        RegenTimer::new(Duration::ZERO);
    }
}
