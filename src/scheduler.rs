//! Fixed-period tick scheduling.
//!
//! The control task waits for [`PeriodicSchedule::deadline`], runs one
//! tick to completion, then calls [`PeriodicSchedule::advance`].  Ticks
//! therefore never overlap.  A tick that overruns one or more periods
//! (slow weather lookup, long window travel) does not cause a burst of
//! back-to-back catch-up ticks: the missed deadlines are skipped and the
//! schedule resumes on its original phase.
//!
//! ```text
//!   period  |----P----|----P----|----P----|----P----|
//!   ticks   ^         ^=====overrun=====^ ^         ^
//!                               (skipped)  next
//! ```

use embassy_time::{Duration, Instant, Timer};
use log::warn;

pub struct PeriodicSchedule {
    period: Duration,
    next: Instant,
}

impl PeriodicSchedule {
    /// First deadline is one full period after `now`.
    pub fn new(period: Duration, now: Instant) -> Self {
        let period = if period.as_ticks() == 0 {
            Duration::from_ticks(1)
        } else {
            period
        };
        Self {
            period,
            next: now + period,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Suspend until the current deadline.
    pub async fn wait(&self) {
        Timer::at(self.next).await;
    }

    /// Move to the next deadline after a tick that finished at `now`.
    /// Returns how many deadlines were skipped.
    pub fn advance(&mut self, now: Instant) -> u64 {
        self.next += self.period;
        if now <= self.next {
            return 0;
        }

        let behind = (now - self.next).as_ticks() / self.period.as_ticks() + 1;
        self.next += Duration::from_ticks(self.period.as_ticks() * behind);
        warn!(
            "tick overran by {} period(s), next tick in {} ms",
            behind,
            (self.next - now).as_millis()
        );
        behind
    }
}
