use std::cell::Cell;

use chrono::{DateTime, TimeZone, Utc};
use sendix_common::Millis;

/// Source of "now" for timestamps and read marks.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    fn now_millis(&self) -> Millis {
        self.now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests and replays.
///
/// Every reading advances the clock by `step` milliseconds, so consecutive
/// operations get distinct timestamps unless the step is zero.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<Millis>,
    step: Millis,
}

impl ManualClock {
    pub fn starting_at(millis: Millis) -> Self {
        Self {
            now: Cell::new(millis),
            step: 1,
        }
    }

    /// A clock that never moves on its own.
    pub fn frozen(millis: Millis) -> Self {
        Self {
            now: Cell::new(millis),
            step: 0,
        }
    }

    pub fn advance(&self, millis: Millis) {
        self.now.set(self.now.get() + millis);
    }

    pub fn set(&self, millis: Millis) {
        self.now.set(millis);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.now.get();
        self.now.set(millis + self.step);
        Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
    }
}
