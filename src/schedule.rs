//! Once-a-day trigger for daemon mode.
//!
//! Runs never overlap: the next tick is computed only after the previous
//! run has returned. Waiting happens in chunks of at most `poll` so a
//! suspended machine or a clock change is noticed within one chunk.

use std::time::Duration;

use chrono::{Days, NaiveDateTime, NaiveTime};
use tracing::{debug, info};

use crate::caption::Clock;
use crate::pacing::Pacer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    pub at: NaiveTime,
    pub poll: Duration,
}

impl DailySchedule {
    pub fn new(at: NaiveTime, poll: Duration) -> Self {
        Self {
            at,
            poll: poll.max(Duration::from_secs(1)),
        }
    }

    /// Today at `at` if that is still ahead of `now`, otherwise tomorrow.
    pub fn next_run_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.at);
        if today > now {
            today
        } else {
            now.date()
                .checked_add_days(Days::new(1))
                .unwrap_or(now.date())
                .and_time(self.at)
        }
    }

    /// Block until `target`, sleeping at most `poll` at a time.
    pub fn wait_until(&self, target: NaiveDateTime, clock: &impl Clock, pacer: &impl Pacer) {
        loop {
            let remaining = target - clock.now();
            let Ok(remaining) = remaining.to_std() else {
                return;
            };
            if remaining.is_zero() {
                return;
            }
            pacer.pause(remaining.min(self.poll));
        }
    }

    /// Wait for the next tick, then run `job` once.
    ///
    /// `job` returns whether the run counts as a failure, which is logged
    /// and passed back.
    pub fn run_next(
        &self,
        clock: &impl Clock,
        pacer: &impl Pacer,
        job: &mut impl FnMut() -> bool,
    ) -> bool {
        let next = self.next_run_after(clock.now());
        info!(next_run = %next, "waiting for next scheduled run");
        self.wait_until(next, clock, pacer);

        debug!("scheduled run starting");
        let failed = job();
        if failed {
            info!("scheduled run failed; will try again at the next tick");
        }
        failed
    }

    /// Run `job` once per day, forever. A failed run never ends the loop.
    pub fn run_daily(
        &self,
        clock: &impl Clock,
        pacer: &impl Pacer,
        mut job: impl FnMut() -> bool,
    ) -> ! {
        loop {
            self.run_next(clock, pacer, &mut job);
        }
    }
}
