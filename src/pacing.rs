//! Deliberate waits.
//!
//! Every sleep in a run (the randomized pauses around login and logout, and
//! retry backoff) goes through a [`Pacer`], so tests can record the delays
//! instead of sleeping through them.

use rand::Rng;
use std::time::Duration;

pub trait Pacer {
    fn pause(&self, duration: Duration);
}

impl<T: Pacer + ?Sized> Pacer for &T {
    fn pause(&self, duration: Duration) {
        (**self).pause(duration)
    }
}

/// Blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Inclusive range a randomized pause is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingWindow {
    pub min: Duration,
    pub max: Duration,
}

impl PacingWindow {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn fixed(duration: Duration) -> Self {
        Self::new(duration, duration)
    }

    /// Draw a uniformly random duration from the window.
    pub fn sample(&self) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}
