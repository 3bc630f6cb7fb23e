//! Reporting window: a range of calendar days in the reporting time zone.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{EngineError, ResultEngine};

/// Default reporting zone of the institute.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Kolkata;

/// Inclusive day range `[start, end]` interpreted in `tz`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportWindow {
    start: NaiveDate,
    end: NaiveDate,
    tz: Tz,
}

impl ReportWindow {
    /// Build a window. An `end` before `start` is moved up to `start`.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate, tz: Tz) -> Self {
        Self {
            start,
            end: end.max(start),
            tz,
        }
    }

    /// The single day containing `now` in `tz`.
    #[must_use]
    pub fn today(now: DateTime<Utc>, tz: Tz) -> Self {
        let day = now.with_timezone(&tz).date_naive();
        Self::new(day, day, tz)
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// UTC instants of the start of the first day and the last millisecond
    /// of the last day.
    pub fn bounds(&self) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
        let from = start_of_day(self.start, self.tz)?;
        let next = self
            .end
            .succ_opt()
            .ok_or_else(|| EngineError::InvalidWindow("end date out of range".to_string()))?;
        let to = start_of_day(next, self.tz)? - Duration::milliseconds(1);
        Ok((from, to))
    }

    /// `startDate` / `endDate` as sent to the backend (ISO-8601, UTC,
    /// millisecond precision).
    pub fn query_bounds(&self) -> ResultEngine<(String, String)> {
        let (from, to) = self.bounds()?;
        Ok((
            from.to_rfc3339_opts(SecondsFormat::Millis, true),
            to.to_rfc3339_opts(SecondsFormat::Millis, true),
        ))
    }
}

fn start_of_day(day: NaiveDate, tz: Tz) -> ResultEngine<DateTime<Utc>> {
    let midnight = day.and_hms_opt(0, 0, 0).ok_or_else(invalid_day)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(invalid_day)
}

fn invalid_day() -> EngineError {
    EngineError::InvalidWindow("day has no midnight in the reporting zone".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bounds_follow_reporting_zone() {
        let window = ReportWindow::new(day(2025, 3, 1), day(2025, 3, 2), DEFAULT_TIMEZONE);
        let (from, to) = window.query_bounds().unwrap();
        assert_eq!(from, "2025-02-28T18:30:00.000Z");
        assert_eq!(to, "2025-03-02T18:29:59.999Z");
    }

    #[test]
    fn end_before_start_is_clamped() {
        let window = ReportWindow::new(day(2025, 3, 5), day(2025, 3, 1), DEFAULT_TIMEZONE);
        assert_eq!(window.end(), day(2025, 3, 5));
    }

    #[test]
    fn today_uses_local_date() {
        let now = "2025-03-01T20:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let window = ReportWindow::today(now, DEFAULT_TIMEZONE);
        assert_eq!(window.start(), day(2025, 3, 2));
    }
}
