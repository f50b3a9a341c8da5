//! Packed-integer calendar dates
//!
//! A [`Date`] packs its components into a single integer as
//! `year * 10000 + month * 100 + day`, so chronological order is plain
//! integer order and a date survives round-trips through configuration and
//! serialized text unchanged. A `Date` can always be constructed, even from
//! out-of-range components; validity is a separate predicate checked with
//! [`Date::is_valid`], never enforced at construction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of days in one 400-year Gregorian cycle
const DAYS_IN_ERA: i64 = 400 * 365 + 100 - 3;

/// Day number of 0001-01-01, counted from the 0000-03-01 epoch
const MIN_DAY_NUMBER: i64 = 306;

/// Day number of 9999-12-31, counted from the 0000-03-01 epoch
const MAX_DAY_NUMBER: i64 = 3_652_364;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar date packed as `year * 10000 + month * 100 + day`
///
/// Ordering on `Date` is ordering on the packed integer, which coincides
/// with chronological order for valid dates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Date(i32);

impl Date {
    /// The invalid-date sentinel returned by out-of-range shifts
    pub const INVALID: Date = Date(0);

    /// Create a date from components without validating them
    pub const fn from_ymd(year: i32, month: i32, day: i32) -> Self {
        Self(year * 10000 + month * 100 + day)
    }

    /// Create a date from its packed representation
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Get the packed representation
    pub const fn raw(&self) -> i32 {
        self.0
    }

    /// Get the year component
    pub const fn year(&self) -> i32 {
        self.0 / 10000
    }

    /// Get the month component
    pub const fn month(&self) -> i32 {
        self.0 / 100 % 100
    }

    /// Get the day component
    pub const fn day(&self) -> i32 {
        self.0 % 100
    }

    /// Replace the year component; the result may be invalid
    pub const fn with_year(&self, year: i32) -> Self {
        Self::from_ymd(year, self.month(), self.day())
    }

    /// Replace the month component; the result may be invalid
    pub const fn with_month(&self, month: i32) -> Self {
        Self::from_ymd(self.year(), month, self.day())
    }

    /// Replace the day component; the result may be invalid
    pub const fn with_day(&self, day: i32) -> Self {
        Self::from_ymd(self.year(), self.month(), day)
    }

    /// Check if a year number is representable (1 through 9999)
    pub const fn is_valid_year(year: i32) -> bool {
        year >= 1 && year <= 9999
    }

    /// Check if a month number is representable (1 through 12)
    pub const fn is_valid_month(month: i32) -> bool {
        month >= 1 && month <= 12
    }

    /// Check if a day number is representable in some month (1 through 31)
    pub const fn is_valid_day(day: i32) -> bool {
        day >= 1 && day <= 31
    }

    /// Check that all components form a real calendar date
    pub fn is_valid(&self) -> bool {
        let (y, m, d) = (self.year(), self.month(), self.day());
        Self::is_valid_year(y) && Self::is_valid_month(m) && d >= 1 && d <= Self::days_in_month(y, m)
    }

    /// Check if a year is a Gregorian leap year
    pub const fn is_leap_year(year: i32) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    /// Number of days in the given month of the given year
    pub const fn days_in_month(year: i32, month: i32) -> i32 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 => {
                if Self::is_leap_year(year) {
                    29
                } else {
                    28
                }
            }
            _ => 0,
        }
    }

    /// The current local date
    pub fn today() -> Self {
        use chrono::Datelike;
        let now = chrono::Local::now().date_naive();
        Self::from_ymd(now.year(), now.month() as i32, now.day() as i32)
    }

    /// Convert a valid date to its day number from the 0000-03-01 epoch
    ///
    /// Months are shifted so March is month 0 of the adjusted year; the
    /// 400-year era/year-of-era decomposition then makes the day-of-era a
    /// closed-form sum.
    fn day_number(&self) -> i64 {
        let (y, m, d) = (self.year() as i64, self.month() as i64, self.day() as i64);
        let y = y - if m < 3 { 1 } else { 0 };
        let m = m + if m < 3 { 9 } else { -3 };
        let era = if y >= 0 { y } else { y - 399 } / 400;
        let yoe = y - era * 400;
        let doy = (153 * m + 2) / 5 + d - 1;
        let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
        era * DAYS_IN_ERA + doe
    }

    /// Invert [`day_number`](Self::day_number)
    fn from_day_number(z: i64) -> Self {
        let era = if z >= 0 { z } else { z - (DAYS_IN_ERA - 1) } / DAYS_IN_ERA;
        let doe = z - era * DAYS_IN_ERA;
        let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
        let y = yoe + era * 400;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let d = doy - (153 * mp + 2) / 5 + 1;
        let m = mp + if mp < 10 { 3 } else { -9 };
        let y = y + if m <= 2 { 1 } else { 0 };
        Self::from_ymd(y as i32, m as i32, d as i32)
    }

    /// Shift a valid date by whole years
    ///
    /// The day of month is clamped to the target month's last day (for
    /// example Feb 29 shifts to Feb 28 of a common year). Returns
    /// [`Date::INVALID`] if the resulting year falls outside 1-9999.
    pub fn shift_year(&self, offset: i32) -> Self {
        let y = self.year() + offset;
        if !Self::is_valid_year(y) {
            return Self::INVALID;
        }
        let m = self.month();
        Self::from_ymd(y, m, self.day().min(Self::days_in_month(y, m)))
    }

    /// Shift a valid date by whole months, clamping the day of month
    ///
    /// Returns [`Date::INVALID`] if the resulting year falls outside 1-9999.
    pub fn shift_month(&self, offset: i32) -> Self {
        let months = self.year() as i64 * 12 + (self.month() as i64 - 1) + offset as i64;
        if months < 0 {
            return Self::INVALID;
        }
        let y = (months / 12) as i32;
        let m = (months % 12 + 1) as i32;
        if !Self::is_valid_year(y) {
            return Self::INVALID;
        }
        Self::from_ymd(y, m, self.day().min(Self::days_in_month(y, m)))
    }

    /// Shift a valid date by days through the linear day count
    ///
    /// Returns [`Date::INVALID`] if the result falls outside
    /// 0001-01-01 through 9999-12-31.
    pub fn shift_day(&self, offset: i32) -> Self {
        let z = self.day_number() + offset as i64;
        if !(MIN_DAY_NUMBER..=MAX_DAY_NUMBER).contains(&z) {
            return Self::INVALID;
        }
        Self::from_day_number(z)
    }

    /// Parse a strict `yyyy-mm-dd` string (10 characters, zero-padded)
    ///
    /// Only the shape is checked here; the returned date may be
    /// semantically invalid (e.g. `2001-02-29`) and callers that need a
    /// real date must also check [`Date::is_valid`]. Returns `None` if the
    /// shape is wrong.
    pub fn parse_iso(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() != 10 || b[4] != b'-' || b[7] != b'-' {
            return None;
        }
        for (i, c) in b.iter().enumerate() {
            if i != 4 && i != 7 && !c.is_ascii_digit() {
                return None;
            }
        }
        let y = s[0..4].parse::<i32>().ok()?;
        let m = s[5..7].parse::<i32>().ok()?;
        let d = s[8..10].parse::<i32>().ok()?;
        Some(Self::from_ymd(y, m, d))
    }

    /// The English three-letter abbreviation of a valid month number
    pub fn month_abbr(month: i32) -> &'static str {
        MONTH_ABBREVIATIONS
            .get(month as usize - 1)
            .copied()
            .unwrap_or("???")
    }

    /// Format a valid date as `Mon d, yyyy` (e.g. `Jan 5, 1999`)
    pub fn format_pretty(&self) -> String {
        format!(
            "{} {}, {:04}",
            Self::month_abbr(self.month()),
            self.day(),
            self.year()
        )
    }
}

impl fmt::Display for Date {
    /// Strict zero-padded ISO `yyyy-mm-dd`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.year(),
            self.month(),
            self.day()
        )
    }
}

/// Parse the signed integer tail of a relative spec such as `d-3` or `m+1`
///
/// An empty tail means an offset of zero.
fn parse_offset(tail: &str) -> Option<i32> {
    if tail.is_empty() {
        Some(0)
    } else {
        tail.parse::<i32>().ok()
    }
}

/// Parse a date spec: strict ISO `yyyy-mm-dd`, or `dN` = `today + N` days
///
/// `N` is a signed day offset, zero when omitted (`d` alone is today).
/// Returns `None` unless the result is a fully valid date.
pub fn parse_date_spec(s: &str, today: Date) -> Option<Date> {
    let date = match s.strip_prefix('d') {
        Some(tail) => today.shift_day(parse_offset(tail)?),
        None => Date::parse_iso(s)?,
    };
    date.is_valid().then_some(date)
}

/// Parse a month spec: a month number `1..=12`, or `mN` = current month + N
///
/// A relative result is not wrapped into `1..=12`; callers are expected to
/// normalize it with [`Date::shift_month`].
pub fn parse_month_spec(s: &str, today: Date) -> Option<i32> {
    if let Some(tail) = s.strip_prefix('m') {
        return Some(today.month() + parse_offset(tail)?);
    }
    let m = s.parse::<i32>().ok()?;
    Date::is_valid_month(m).then_some(m)
}

/// Parse a year spec: a year number `1..=9999`, or `yN` = current year + N
pub fn parse_year_spec(s: &str, today: Date) -> Option<i32> {
    if let Some(tail) = s.strip_prefix('y') {
        return Some(today.year() + parse_offset(tail)?);
    }
    let y = s.parse::<i32>().ok()?;
    Date::is_valid_year(y).then_some(y)
}
