//! Packed SQL `DATE` and `TIME` values.
//!
//! Both are stored as a single `i32` with one field per byte:
//!
//! - date: `year << 16 | month << 8 | day`, year in `1..=9999`.
//! - time: `hour << 16 | minute << 8 | second`, hour in `0..=24` where 24 is
//!   only valid as `24:00:00`.
//!
//! Since every field occupies its own byte the packed integers order exactly
//! like the calendar values they represent. An encoded date of `0` and an
//! encoded time of `-1` stand for SQL NULL on disk.

mod parser;
pub mod locale;

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::{Result, TypeError};

pub use locale::{LocaleFormat, PatternLocale};

/// Encoded form of a NULL date.
pub const NULL_DATE: i32 = 0;
/// Encoded form of a NULL time.
pub const NULL_TIME: i32 = -1;

/// Days in each month of a non-leap year, 1-based.
const DAYS_IN_MONTH: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SqlDate {
    encoded: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SqlTime {
    encoded: i32,
}

const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub const fn days_in_month(year: i32, month: i32) -> i32 {
    match month == 2 && is_leap_year(year) {
        true => 29,
        _ => DAYS_IN_MONTH[month as usize] as i32,
    }
}

/// Packs a calendar date, rejecting fields outside the calendar.
pub fn compute_encoded_date(year: i32, month: i32, day: i32) -> Result<i32> {
    if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
        return Err(TypeError::DateTimeRange);
    }

    if day < 1 || day > days_in_month(year, month) {
        return Err(TypeError::DateTimeRange);
    }

    Ok((year << 16) | (month << 8) | day)
}

/// Packs a time of day. `24:00:00` is accepted as the end of the day.
pub fn compute_encoded_time(hour: i32, minute: i32, second: i32) -> Result<i32> {
    if hour == 24 {
        if minute != 0 || second != 0 {
            return Err(TypeError::DateTimeRange);
        }
    } else if !(0..=23).contains(&hour) {
        return Err(TypeError::DateTimeRange);
    }

    if !(0..=59).contains(&minute) || !(0..=59).contains(&second) {
        return Err(TypeError::DateTimeRange);
    }

    Ok((hour << 16) | (minute << 8) | second)
}

impl SqlDate {
    pub fn new(year: i32, month: i32, day: i32) -> Result<Self> {
        compute_encoded_date(year, month, day).map(|encoded| Self { encoded })
    }

    /// Validates an encoded date read from storage. `0` is NULL.
    pub fn from_encoded(encoded: i32) -> Result<Option<Self>> {
        if encoded == NULL_DATE {
            return Ok(None);
        }

        let date = Self { encoded };
        compute_encoded_date(date.year(), date.month(), date.day())
            .map_err(|_| TypeError::corrupted(format!("invalid encoded date {encoded:#x}")))?;

        Ok(Some(date))
    }

    pub const fn encoded(self) -> i32 {
        self.encoded
    }

    pub const fn year(self) -> i32 {
        self.encoded >> 16
    }

    pub const fn month(self) -> i32 {
        (self.encoded >> 8) & 0xFF
    }

    pub const fn day(self) -> i32 {
        self.encoded & 0xFF
    }

    /// Parses any of the ISO, USA or EUR layouts, trying `locale` when none
    /// of them match.
    pub fn parse(text: &str, locale: Option<&dyn LocaleFormat>) -> Result<Self> {
        let parsed = parser::parse_date(text).and_then(|(year, month, day)| Self::new(year, month, day));
        let original = match parsed {
            Ok(date) => return Ok(date),
            Err(err) => err,
        };

        if let Some(locale) = locale {
            if let Some((year, month, day)) = locale.parse_date(text.trim()) {
                tracing::debug!(text, "date parsed by locale fallback");
                if let Ok(date) = Self::new(year, month, day) {
                    return Ok(date);
                }
            }
        }

        Err(original)
    }

    pub fn encode(self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.encoded.to_be_bytes());
    }

    pub fn decode(bytes: &[u8]) -> Result<(Option<Self>, usize)> {
        let encoded = read_i32(bytes, 0)?;
        Ok((Self::from_encoded(encoded)?, 4))
    }
}

impl SqlTime {
    pub fn new(hour: i32, minute: i32, second: i32) -> Result<Self> {
        compute_encoded_time(hour, minute, second).map(|encoded| Self { encoded })
    }

    /// Validates an encoded time read from storage. `-1` is NULL.
    pub fn from_encoded(encoded: i32) -> Result<Option<Self>> {
        if encoded == NULL_TIME {
            return Ok(None);
        }

        let time = Self { encoded };
        compute_encoded_time(time.hour(), time.minute(), time.second())
            .map_err(|_| TypeError::corrupted(format!("invalid encoded time {encoded:#x}")))?;

        Ok(Some(time))
    }

    pub const fn encoded(self) -> i32 {
        self.encoded
    }

    pub const fn hour(self) -> i32 {
        self.encoded >> 16
    }

    pub const fn minute(self) -> i32 {
        (self.encoded >> 8) & 0xFF
    }

    pub const fn second(self) -> i32 {
        self.encoded & 0xFF
    }

    /// Parses `hh.mm[.ss]`, `hh[:mm] AM|PM`, `hh:mm[:ss]` or the time part
    /// of a timestamp, trying `locale` when none of them match.
    pub fn parse(text: &str, locale: Option<&dyn LocaleFormat>) -> Result<Self> {
        let parsed = parser::parse_time(text).and_then(|(hour, minute, second)| Self::new(hour, minute, second));
        let original = match parsed {
            Ok(time) => return Ok(time),
            Err(err) => err,
        };

        if let Some(locale) = locale {
            if let Some((hour, minute, second)) = locale.parse_time(text.trim()) {
                tracing::debug!(text, "time parsed by locale fallback");
                if let Ok(time) = Self::new(hour, minute, second) {
                    return Ok(time);
                }
            }
        }

        Err(original)
    }

    /// Two big-endian integers, the second is reserved for fractional
    /// seconds and always zero.
    pub fn encode(self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.encoded.to_be_bytes());
        buf.extend_from_slice(&0i32.to_be_bytes());
    }

    pub fn decode(bytes: &[u8]) -> Result<(Option<Self>, usize)> {
        let encoded = read_i32(bytes, 0)?;
        read_i32(bytes, 4)?;
        Ok((Self::from_encoded(encoded)?, 8))
    }
}

fn read_i32(bytes: &[u8], offset: usize) -> Result<i32> {
    bytes
        .get(offset..offset + 4)
        .and_then(|slice| slice.try_into().ok())
        .map(i32::from_be_bytes)
        .ok_or_else(|| TypeError::corrupted("truncated date/time value"))
}

impl FromStr for SqlDate {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, None)
    }
}

impl FromStr for SqlTime {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, None)
    }
}

impl Display for SqlDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl Display for SqlTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour(), self.minute(), self.second())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_years() {
        assert!(compute_encoded_date(2024, 2, 29).is_ok());
        assert!(compute_encoded_date(2000, 2, 29).is_ok());
        assert_eq!(compute_encoded_date(2023, 2, 29), Err(TypeError::DateTimeRange));
        assert_eq!(compute_encoded_date(1900, 2, 29), Err(TypeError::DateTimeRange));
    }

    #[test]
    fn date_bounds() {
        assert_eq!(compute_encoded_date(1, 1, 1), Ok(0x0001_0101));
        assert!(compute_encoded_date(9999, 12, 31).is_ok());
        assert_eq!(compute_encoded_date(10000, 1, 1), Err(TypeError::DateTimeRange));
        assert_eq!(compute_encoded_date(0, 1, 1), Err(TypeError::DateTimeRange));
        assert_eq!(compute_encoded_date(2024, 13, 1), Err(TypeError::DateTimeRange));
        assert_eq!(compute_encoded_date(2024, 4, 31), Err(TypeError::DateTimeRange));
        assert_eq!(compute_encoded_date(2024, 1, 0), Err(TypeError::DateTimeRange));
    }

    #[test]
    fn time_bounds() {
        assert_eq!(compute_encoded_time(24, 0, 0), Ok(24 << 16));
        assert_eq!(compute_encoded_time(24, 0, 1), Err(TypeError::DateTimeRange));
        assert_eq!(compute_encoded_time(24, 1, 0), Err(TypeError::DateTimeRange));
        assert_eq!(compute_encoded_time(23, 59, 59), Ok((23 << 16) | (59 << 8) | 59));
        assert_eq!(compute_encoded_time(25, 0, 0), Err(TypeError::DateTimeRange));
        assert_eq!(compute_encoded_time(12, 60, 0), Err(TypeError::DateTimeRange));
        assert_eq!(compute_encoded_time(-1, 0, 0), Err(TypeError::DateTimeRange));
    }

    #[test]
    fn packed_order_matches_calendar() {
        let earlier = SqlDate::new(2023, 12, 31).unwrap();
        let later = SqlDate::new(2024, 1, 1).unwrap();
        assert!(earlier < later);

        let noon = SqlTime::new(12, 0, 0).unwrap();
        let midnight = SqlTime::new(24, 0, 0).unwrap();
        assert!(noon < midnight);
    }

    #[test]
    fn display() {
        assert_eq!(SqlDate::new(987, 6, 5).unwrap().to_string(), "0987-06-05");
        assert_eq!(SqlTime::new(7, 8, 9).unwrap().to_string(), "07:08:09");
    }

    #[test]
    fn binary_format() {
        let mut buf = Vec::new();
        SqlDate::new(2024, 2, 29).unwrap().encode(&mut buf);
        assert_eq!(buf, vec![0x07, 0xE8, 0x02, 0x1D]);

        let mut buf = Vec::new();
        SqlTime::new(13, 45, 30).unwrap().encode(&mut buf);
        assert_eq!(buf, vec![0, 13, 45, 30, 0, 0, 0, 0]);
    }

    #[test]
    fn stored_nulls() {
        assert_eq!(SqlDate::decode(&[0, 0, 0, 0]), Ok((None, 4)));
        assert_eq!(SqlTime::decode(&[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0]), Ok((None, 8)));
    }

    #[test]
    fn corrupted_storage() {
        // month 13
        assert!(matches!(SqlDate::decode(&[0, 1, 13, 1]), Err(TypeError::Corrupted(_))));
        assert!(matches!(SqlTime::decode(&[0, 1, 2, 3]), Err(TypeError::Corrupted(_))));
    }

    #[test]
    fn parse_from_str() {
        let date: SqlDate = "2024-02-29".parse().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 2, 29));

        let time: SqlTime = "10:30 PM".parse().unwrap();
        assert_eq!(time.to_string(), "22:30:00");
    }

    #[test]
    fn locale_fallback() {
        let locale = PatternLocale::new(["yyyyMMdd"], ["HH'h'mm"]);

        let date = SqlDate::parse("20240115", Some(&locale)).unwrap();
        assert_eq!(date.to_string(), "2024-01-15");

        let time = SqlTime::parse("09h41", Some(&locale)).unwrap();
        assert_eq!(time.to_string(), "09:41:00");
    }

    #[test]
    fn fallback_failure_reports_original_error() {
        let locale = PatternLocale::new(["yyyyMMdd"], Vec::<String>::new());

        let direct = SqlDate::parse("2024/01/15", None).unwrap_err();
        let with_locale = SqlDate::parse("2024/01/15", Some(&locale)).unwrap_err();

        assert_eq!(direct, with_locale);
        assert!(matches!(direct, TypeError::DateTimeSyntax(_)));
    }
}
