//! Clock abstraction so time-dependent code (retry pauses, poll loops) can be
//! tested without real sleeps.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Blocking sleep. Only ever called from worker threads, never from the
    /// interactive task.
    fn sleep(&self, duration: Duration);
}

pub struct RealClock;

impl RealClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual-time clock for tests. `sleep` advances time instead of blocking.
pub struct TestClock {
    now: Mutex<Instant>,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock();
        *now += duration;
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

pub fn real_clock() -> Arc<dyn Clock> {
    Arc::new(RealClock::new())
}

pub fn test_clock() -> Arc<TestClock> {
    Arc::new(TestClock::new())
}
