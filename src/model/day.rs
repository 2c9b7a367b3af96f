//! `IsoDay`: a timezone-free calendar day.
//!
//! The temporal key for note entries and the unit of by-day grouping.
//! Wraps a civil date so validity, ordering, and `"YYYY-MM-DD"`
//! serialization come from one place.

use std::fmt;

use jiff::civil::Date;
use jiff::{Span, Zoned};
use serde::{Deserialize, Serialize};

/// A calendar day with no time-of-day and no timezone.
///
/// Ordering is chronological: year, then month, then day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IsoDay(Date);

impl IsoDay {
    /// Constructs a day from components. Fails on invalid calendar dates.
    pub fn new(year: i16, month: i8, day: i8) -> Result<Self, jiff::Error> {
        Date::new(year, month, day).map(Self)
    }

    /// Today, in the system timezone.
    #[must_use]
    pub fn today() -> Self {
        Self(Zoned::now().date())
    }

    /// Yesterday, in the system timezone.
    #[must_use]
    pub fn yesterday() -> Self {
        Self::today().add_days(-1)
    }

    /// The day `days` away from this one, clamped at the calendar bounds.
    #[must_use]
    pub fn add_days(self, days: i32) -> Self {
        self.0
            .checked_add(Span::new().days(i64::from(days)))
            .map_or(self, Self)
    }
}

impl fmt::Display for IsoDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
