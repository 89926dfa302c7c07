// SPDX-License-Identifier: MPL-2.0

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;

/// Source of "now" for ids and schedule times
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock that advances by a fixed step after every reading
#[derive(Debug)]
pub struct SteppingClock {
    next: Cell<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }

    /// A clock that always reports `at`
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::new(at, Duration::zero())
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}
