//! Calendar/timezone context.
//!
//! "Today" and the base date of an order are calendar dates in the viewing
//! context's timezone, not UTC dates. All date comparisons in the pipeline go
//! through [`Calendar`] so tests can pin the clock.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Timezone-aware calendar context.
#[derive(Clone)]
pub struct Calendar {
    tz: Tz,
    clock: Arc<dyn Clock>,
}

impl Calendar {
    pub fn new(tz: Tz, clock: Arc<dyn Clock>) -> Self {
        Self { tz, clock }
    }

    /// Calendar on the wall clock.
    pub fn system(tz: Tz) -> Self {
        Self::new(tz, Arc::new(SystemClock))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now_utc()
    }

    /// Today's calendar date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        self.local_date(self.clock.now_utc())
    }

    /// The calendar date of an instant in the configured timezone
    /// (time-of-day stripped).
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }
}

impl core::fmt::Debug for Calendar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Calendar").field("tz", &self.tz).finish()
    }
}
