//! Business-hours calendar in a fixed IANA timezone.
//!
//! All engine timestamps are UTC; this module maps them onto the local wall
//! clock where opening/closing hours and time-of-day labels are defined.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Start of the lunch window, local hour.
pub const LUNCH_START_HOUR: u32 = 12;
/// End of the lunch window, local hour.
pub const LUNCH_END_HOUR: u32 = 13;

/// How many consecutive days we scan for a valid opening time before giving
/// up. Only matters for timezones whose opening hour falls in a DST gap.
const MAX_OPENING_SCAN_DAYS: u32 = 7;

/// Time-of-day label of a candidate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotLabel {
    Morning,
    Midday,
    Afternoon,
}

impl SlotLabel {
    /// Preference rank, lower is better.
    pub fn rank(self) -> u8 {
        match self {
            SlotLabel::Morning => 0,
            SlotLabel::Afternoon => 1,
            SlotLabel::Midday => 2,
        }
    }
}

/// Daily `[open_hour, close_hour)` window in `timezone`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusinessHours {
    open_hour: u32,
    close_hour: u32,
    timezone: Tz,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            open_hour: 9,
            close_hour: 18,
            timezone: Tz::UTC,
        }
    }
}

impl BusinessHours {
    /// # Errors
    /// Returns `EngineError::InvalidBusinessHours` unless `open < close <= 24`.
    pub fn new(open_hour: u32, close_hour: u32, timezone: Tz) -> Result<Self> {
        if open_hour >= close_hour || close_hour > 24 {
            return Err(EngineError::InvalidBusinessHours(format!(
                "open hour {} must be before close hour {} (max 24)",
                open_hour, close_hour
            )));
        }
        Ok(Self {
            open_hour,
            close_hour,
            timezone,
        })
    }

    /// Like [`BusinessHours::new`] but parses an IANA timezone name.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidTimezone` if `timezone` is not a valid IANA identifier.
    pub fn with_timezone_name(open_hour: u32, close_hour: u32, timezone: &str) -> Result<Self> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| EngineError::InvalidTimezone(timezone.to_string()))?;
        Self::new(open_hour, close_hour, tz)
    }

    pub fn open_hour(&self) -> u32 {
        self.open_hour
    }

    pub fn close_hour(&self) -> u32 {
        self.close_hour
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Number of bookable minutes per day.
    pub fn span_minutes(&self) -> i64 {
        i64::from(self.close_hour - self.open_hour) * 60
    }

    pub fn local(&self, t: DateTime<Utc>) -> DateTime<Tz> {
        t.with_timezone(&self.timezone)
    }

    /// Local calendar date of a UTC instant.
    pub fn local_date(&self, t: DateTime<Utc>) -> NaiveDate {
        self.local(t).date_naive()
    }

    /// UTC instant of `hour:00` local time on `date`. `hour` may be 24.
    ///
    /// Returns `None` when that wall-clock time does not exist (DST gap).
    pub fn at_hour(&self, date: NaiveDate, hour: u32) -> Option<DateTime<Utc>> {
        let (date, hour) = if hour >= 24 {
            (date.succ_opt()?, hour - 24)
        } else {
            (date, hour)
        };
        let naive = date.and_hms_opt(hour, 0, 0)?;
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn opening_on(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.at_hour(date, self.open_hour)
    }

    pub fn closing_on(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.at_hour(date, self.close_hour)
    }

    /// Opening time of the first day after `date` that has one.
    pub fn next_opening_after(&self, date: NaiveDate, exclude_weekends: bool) -> Option<DateTime<Utc>> {
        let mut day = date;
        for _ in 0..MAX_OPENING_SCAN_DAYS {
            day = day.succ_opt()?;
            if exclude_weekends && is_weekend(day) {
                continue;
            }
            if let Some(open) = self.opening_on(day) {
                return Some(open);
            }
        }
        None
    }

    /// True if `[start, end)` lies inside the business hours of `start`'s local day.
    pub fn contains(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let date = self.local_date(start);
        match (self.opening_on(date), self.closing_on(date)) {
            (Some(open), Some(close)) => open <= start && end <= close && start < end,
            _ => false,
        }
    }

    /// Label by local start hour: before noon is morning, the lunch hour is
    /// midday, everything later is afternoon.
    pub fn label(&self, start: DateTime<Utc>) -> SlotLabel {
        let hour = self.local(start).hour();
        if hour < LUNCH_START_HOUR {
            SlotLabel::Morning
        } else if hour < LUNCH_END_HOUR {
            SlotLabel::Midday
        } else {
            SlotLabel::Afternoon
        }
    }

    /// Lunch window on the local day of `t`.
    pub fn lunch_window(&self, t: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let date = self.local_date(t);
        Some((
            self.at_hour(date, LUNCH_START_HOUR)?,
            self.at_hour(date, LUNCH_END_HOUR)?,
        ))
    }

    /// Round `t` up onto the `granularity_minutes` grid measured from local midnight.
    pub fn align_up(&self, t: DateTime<Utc>, granularity_minutes: u32) -> DateTime<Utc> {
        let step = i64::from(granularity_minutes.max(1)) * 60;
        let local = self.local(t);
        let nanos = i64::from(local.nanosecond());
        let mut secs = i64::from(local.num_seconds_from_midnight());
        let mut shift = Duration::nanoseconds(-nanos);
        if nanos > 0 {
            shift += Duration::seconds(1);
            secs += 1;
        }
        let rem = secs % step;
        if rem != 0 {
            shift += Duration::seconds(step - rem);
        }
        // Saturates at the end of the representable range.
        t.checked_add_signed(shift).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(d: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, m, s).unwrap()
    }

    #[test]
    fn rejects_inverted_hours() {
        assert!(BusinessHours::new(18, 9, Tz::UTC).is_err());
        assert!(BusinessHours::new(9, 25, Tz::UTC).is_err());
        assert!(BusinessHours::new(9, 24, Tz::UTC).is_ok());
    }

    #[test]
    fn rejects_unknown_timezone() {
        let err = BusinessHours::with_timezone_name(9, 18, "Mars/Olympus").unwrap_err();
        assert_eq!(err, EngineError::InvalidTimezone("Mars/Olympus".to_string()));
    }

    #[test]
    fn aligns_up_to_grid() {
        let hours = BusinessHours::default();
        assert_eq!(hours.align_up(utc(16, 10, 0, 0), 15), utc(16, 10, 0, 0));
        assert_eq!(hours.align_up(utc(16, 10, 7, 0), 15), utc(16, 10, 15, 0));
        assert_eq!(hours.align_up(utc(16, 10, 15, 1), 15), utc(16, 10, 30, 0));
        assert_eq!(hours.align_up(utc(16, 23, 50, 0), 15), utc(17, 0, 0, 0));
    }

    #[test]
    fn labels_follow_local_clock() {
        // Asia/Kolkata is UTC+05:30, so 04:00Z is 09:30 local.
        let hours = BusinessHours::with_timezone_name(9, 18, "Asia/Kolkata").unwrap();
        assert_eq!(hours.label(utc(16, 4, 0, 0)), SlotLabel::Morning);
        assert_eq!(hours.label(utc(16, 6, 45, 0)), SlotLabel::Midday);
        assert_eq!(hours.label(utc(16, 8, 0, 0)), SlotLabel::Afternoon);
    }

    #[test]
    fn contains_checks_both_ends() {
        let hours = BusinessHours::default();
        assert!(hours.contains(utc(16, 9, 0, 0), utc(16, 18, 0, 0)));
        assert!(!hours.contains(utc(16, 8, 45, 0), utc(16, 9, 15, 0)));
        assert!(!hours.contains(utc(16, 17, 45, 0), utc(16, 18, 15, 0)));
    }

    #[test]
    fn next_opening_skips_weekends_when_asked() {
        let hours = BusinessHours::default();
        // 2026-03-20 is a Friday.
        let friday = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();
        assert_eq!(hours.next_opening_after(friday, false), Some(utc(21, 9, 0, 0)));
        assert_eq!(hours.next_opening_after(friday, true), Some(utc(23, 9, 0, 0)));
    }
}
