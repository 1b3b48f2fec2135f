//! Unix timestamps and UTC calendar-day conversions

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Unix timestamp in seconds (always UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnixTimestamp(pub i64);

impl UnixTimestamp {
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }

    /// Creates a UnixTimestamp from a block header timestamp
    pub fn from_u64(ts: u64) -> Self {
        Self(i64::try_from(ts).unwrap_or(i64::MAX))
    }

    /// Absolute distance in seconds to another timestamp
    pub fn abs_diff(&self, other: UnixTimestamp) -> u64 {
        self.0.abs_diff(other.0)
    }

    /// UTC calendar date this timestamp falls on
    ///
    /// Returns `None` for timestamps outside chrono's representable range.
    pub fn utc_date(&self) -> Option<NaiveDate> {
        DateTime::<Utc>::from_timestamp(self.0, 0).map(|dt| dt.date_naive())
    }

    /// 00:00:00 UTC on `date`
    pub fn start_of_day(date: NaiveDate) -> Option<Self> {
        Utc.with_ymd_and_hms(date.year(), date.month(), date.day(), 0, 0, 0)
            .single()
            .map(Self::from_datetime)
    }

    /// 23:59:59 UTC on `date`
    pub fn end_of_day(date: NaiveDate) -> Option<Self> {
        let next = date.succ_opt()?;
        Self::start_of_day(next).map(|ts| Self(ts.0 - 1))
    }
}

impl std::fmt::Display for UnixTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_date() {
        let date = UnixTimestamp(100).utc_date().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
    }

    #[test]
    fn test_day_boundaries() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 10).unwrap();
        let start = UnixTimestamp::start_of_day(date).unwrap();
        let end = UnixTimestamp::end_of_day(date).unwrap();

        assert_eq!(start, UnixTimestamp(1728518400));
        assert_eq!(end, UnixTimestamp(1728604799));
        assert_eq!(start.utc_date(), Some(date));
        assert_eq!(end.utc_date(), Some(date));
        assert_eq!(UnixTimestamp(end.0 + 1).utc_date(), date.succ_opt());
    }

    #[test]
    fn test_from_u64_saturates() {
        assert_eq!(UnixTimestamp::from_u64(u64::MAX), UnixTimestamp(i64::MAX));
        assert_eq!(UnixTimestamp::from_u64(500), UnixTimestamp(500));
    }

    #[test]
    fn test_abs_diff() {
        assert_eq!(UnixTimestamp(100).abs_diff(UnixTimestamp(250)), 150);
        assert_eq!(UnixTimestamp(250).abs_diff(UnixTimestamp(100)), 150);
    }
}
