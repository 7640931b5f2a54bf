use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Armed {
    period: Duration,
    started_at: Instant,
    next_due: Instant,
}

/// Recurring auto-advance timer driven by the event loop's ticks.
///
/// The timer only ever fires from `poll`, and a disarmed timer has no
/// deadline left to reach, so nothing can fire after `disarm`.
#[derive(Clone, Debug, Default)]
pub struct AutoTimer {
    armed: Option<Armed>,
}

impl AutoTimer {
    /// (Re)starts the timer; the first firing is one full period from `now`.
    pub fn arm(&mut self, period: Duration, now: Instant) {
        self.armed = Some(Armed {
            period,
            started_at: now,
            next_due: now + period,
        });
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn period(&self) -> Option<Duration> {
        self.armed.map(|a| a.period)
    }

    /// Fires at most once per call. A tick that arrives several periods
    /// late fires once and reschedules from `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(armed) = self.armed.as_mut() else {
            return false;
        };
        if now < armed.next_due {
            return false;
        }
        let next = armed.next_due + armed.period;
        if next > now {
            armed.started_at = armed.next_due;
            armed.next_due = next;
        } else {
            armed.started_at = now;
            armed.next_due = now + armed.period;
        }
        true
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.armed.map(|a| a.next_due.saturating_duration_since(now))
    }

    /// Fraction of the current period already elapsed, in 0.0..=1.0.
    pub fn progress(&self, now: Instant) -> Option<f64> {
        self.armed.map(|a| {
            let total = a.next_due.saturating_duration_since(a.started_at).as_secs_f64();
            if total <= 0.0 {
                return 1.0;
            }
            let elapsed = now.saturating_duration_since(a.started_at).as_secs_f64();
            (elapsed / total).clamp(0.0, 1.0)
        })
    }
}
