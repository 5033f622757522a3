//! Calendar bucketing for habit cadences.
//!
//! Timestamps are first converted to a calendar date in the user's zone, and
//! every key below is computed from that date alone. Two timestamps on the same
//! local day therefore always share a key.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::internal_error::{InternalError, InternalResult};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Daily => "daily",
            Cadence::Weekly => "weekly",
            Cadence::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cadence {
    type Err = InternalError;

    fn from_str(s: &str) -> InternalResult<Cadence> {
        match s {
            "daily" => Ok(Cadence::Daily),
            "weekly" => Ok(Cadence::Weekly),
            "monthly" => Ok(Cadence::Monthly),
            other => Err(InternalError::InvalidCadence(other.to_string())),
        }
    }
}

/// The zone calendar days are counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Local,
    Fixed(FixedOffset),
}

impl Zone {
    pub fn local_date(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        match self {
            Zone::Local => timestamp.with_timezone(&Local).date_naive(),
            Zone::Fixed(offset) => timestamp.with_timezone(offset).date_naive(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }
}

impl FromStr for Zone {
    type Err = InternalError;

    /// Accepts `local`, `Z`/`UTC`, or a `±HH:MM` offset.
    fn from_str(s: &str) -> InternalResult<Zone> {
        let s = s.trim();
        match s {
            "local" => return Ok(Zone::Local),
            "Z" | "UTC" | "utc" => return Ok(Zone::Fixed(Utc.fix())),
            _ => {}
        }

        let invalid = || InternalError::InvalidTimezone(s.to_string());

        let (sign, rest) = match s.chars().next() {
            Some('+') => (1, &s[1..]),
            Some('-') => (-1, &s[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
        if hours.len() != 2 || minutes.len() != 2 {
            return Err(invalid());
        }
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Zone::Fixed)
            .ok_or_else(invalid)
    }
}

/// Converts a timestamp to its calendar date in `zone`.
pub fn local_date(timestamp: DateTime<Utc>, zone: &Zone) -> NaiveDate {
    zone.local_date(timestamp)
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// ISO-8601 week key, using the ISO week-numbering year.
pub fn week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

pub fn period_key(date: NaiveDate, cadence: Cadence) -> String {
    match cadence {
        Cadence::Daily => day_key(date),
        Cadence::Weekly => week_key(date),
        Cadence::Monthly => month_key(date),
    }
}

/// First day of the period containing `date`.
pub fn period_start(date: NaiveDate, cadence: Cadence) -> NaiveDate {
    match cadence {
        Cadence::Daily => date,
        Cadence::Weekly => date - Duration::days(date.weekday().num_days_from_monday() as i64),
        Cadence::Monthly => date - Duration::days(date.day0() as i64),
    }
}

/// Start of the period immediately before the one starting at `start`.
///
/// Returns `None` only at the lower edge of the representable calendar.
pub fn previous_period_start(start: NaiveDate, cadence: Cadence) -> Option<NaiveDate> {
    let start = period_start(start, cadence);
    match cadence {
        Cadence::Daily => start.pred_opt(),
        Cadence::Weekly => start.checked_sub_signed(Duration::days(7)),
        Cadence::Monthly => start
            .pred_opt()
            .map(|last_day| period_start(last_day, Cadence::Monthly)),
    }
}

pub fn day_key_to_date(key: &str) -> InternalResult<NaiveDate> {
    let invalid = || InternalError::InvalidPeriodKey(key.to_string());
    if key.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(key, "%Y-%m-%d").map_err(|_| invalid())
}

/// Monday of the ISO week named by a `YYYY-Www` key.
pub fn week_key_to_date(key: &str) -> InternalResult<NaiveDate> {
    let invalid = || InternalError::InvalidPeriodKey(key.to_string());

    let (year, week) = key.split_once("-W").ok_or_else(invalid)?;
    let year = parse_digits(year, 4).ok_or_else(invalid)?;
    let week = parse_digits(week, 2).ok_or_else(invalid)?;

    NaiveDate::from_isoywd_opt(year as i32, week, Weekday::Mon).ok_or_else(invalid)
}

/// First day of the month named by a `YYYY-MM` key.
pub fn month_key_to_date(key: &str) -> InternalResult<NaiveDate> {
    let invalid = || InternalError::InvalidPeriodKey(key.to_string());

    let (year, month) = key.split_once('-').ok_or_else(invalid)?;
    let year = parse_digits(year, 4).ok_or_else(invalid)?;
    let month = parse_digits(month, 2).ok_or_else(invalid)?;

    NaiveDate::from_ymd_opt(year as i32, month, 1).ok_or_else(invalid)
}

/// Representative (start) date of the period a key names.
pub fn period_key_to_date(key: &str, cadence: Cadence) -> InternalResult<NaiveDate> {
    match cadence {
        Cadence::Daily => day_key_to_date(key),
        Cadence::Weekly => week_key_to_date(key),
        Cadence::Monthly => month_key_to_date(key),
    }
}

fn parse_digits(s: &str, len: usize) -> Option<u32> {
    if s.len() != len || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn keys_have_canonical_format() {
        let d = date(2024, 3, 5);
        assert_eq!(period_key(d, Cadence::Daily), "2024-03-05");
        assert_eq!(period_key(d, Cadence::Weekly), "2024-W10");
        assert_eq!(period_key(d, Cadence::Monthly), "2024-03");
    }

    #[test]
    fn week_key_uses_iso_year() {
        assert_eq!(week_key(date(2021, 1, 1)), "2020-W53");
        assert_eq!(week_key(date(2024, 12, 30)), "2025-W01");
    }

    #[test]
    fn same_local_day_shares_a_key() {
        let zone = Zone::Fixed(FixedOffset::east_opt(9 * 3600).unwrap());
        let just_after_midnight = Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap();
        let late_evening = Utc.with_ymd_and_hms(2024, 3, 11, 14, 0, 0).unwrap();

        let a = day_key(local_date(just_after_midnight, &zone));
        let b = day_key(local_date(late_evening, &zone));
        assert_eq!(a, "2024-03-11");
        assert_eq!(a, b);
    }

    #[test]
    fn negative_offset_shifts_day_back() {
        let zone: Zone = "-05:00".parse().unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        assert_eq!(day_key(local_date(ts, &zone)), "2023-12-31");
    }

    #[test]
    fn week_key_round_trips_to_monday_of_same_week() {
        let mut d = date(2020, 12, 20);
        for _ in 0..40 {
            let monday = week_key_to_date(&week_key(d)).unwrap();
            assert_eq!(monday.weekday(), Weekday::Mon);
            assert_eq!(monday.iso_week(), d.iso_week());
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn month_key_round_trips_to_first_of_month() {
        assert_eq!(month_key_to_date("2024-02").unwrap(), date(2024, 2, 1));
        assert_eq!(
            period_key_to_date(&month_key(date(2023, 11, 29)), Cadence::Monthly).unwrap(),
            date(2023, 11, 1)
        );
    }

    #[test]
    fn period_start_matches_key_round_trip() {
        let d = date(2024, 7, 18);
        for cadence in [Cadence::Daily, Cadence::Weekly, Cadence::Monthly] {
            let key = period_key(d, cadence);
            assert_eq!(period_key_to_date(&key, cadence).unwrap(), period_start(d, cadence));
        }
    }

    #[test]
    fn previous_period_steps_back_one_unit() {
        assert_eq!(
            previous_period_start(date(2024, 3, 1), Cadence::Daily),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            previous_period_start(date(2024, 1, 3), Cadence::Weekly),
            Some(date(2023, 12, 25))
        );
        assert_eq!(
            previous_period_start(date(2024, 1, 15), Cadence::Monthly),
            Some(date(2023, 12, 1))
        );
    }

    #[test]
    fn malformed_keys_are_rejected() {
        for key in ["2024-W5", "2024W05", "24-W05", "2024-W54", "2021-W53", "2024-Wxx"] {
            assert!(
                matches!(week_key_to_date(key), Err(InternalError::InvalidPeriodKey(_))),
                "{key}"
            );
        }
        for key in ["2024-13", "2024-1", "2024/01", ""] {
            assert!(month_key_to_date(key).is_err(), "{key}");
        }
        assert!(day_key_to_date("2024-02-30").is_err());
        assert!(day_key_to_date("2024-2-3").is_err());
    }

    #[test]
    fn unknown_cadence_fails() {
        assert_eq!("weekly".parse::<Cadence>().unwrap(), Cadence::Weekly);
        assert!(matches!(
            "hourly".parse::<Cadence>(),
            Err(InternalError::InvalidCadence(_))
        ));
        assert!("Daily".parse::<Cadence>().is_err());
    }

    #[test]
    fn zone_parsing() {
        assert_eq!("local".parse::<Zone>().unwrap(), Zone::Local);
        assert_eq!(
            "+05:30".parse::<Zone>().unwrap(),
            Zone::Fixed(FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap())
        );
        assert_eq!(
            "Z".parse::<Zone>().unwrap(),
            Zone::Fixed(FixedOffset::east_opt(0).unwrap())
        );
        for bad in ["", "5", "+5:00", "+24:00", "+01:60", "Europe/Paris"] {
            assert!(
                matches!(bad.parse::<Zone>(), Err(InternalError::InvalidTimezone(_))),
                "{bad}"
            );
        }
    }
}
