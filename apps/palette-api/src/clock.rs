//! Wall-clock seam. Time-of-day, season and cache staleness all read from a `Clock`
//! so the generator can be driven deterministically in tests.

use chrono::{DateTime, FixedOffset, Local, Utc};

pub trait Clock: Send + Sync {
    /// Current local wall-clock time, carrying its UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }
}

/// The host's local clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

#[cfg(test)]
pub use manual::ManualClock;
