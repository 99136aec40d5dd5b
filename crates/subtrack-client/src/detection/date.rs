use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::{ClientError, ClientResult};

/// Calendar year-month used to bucket transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month >= 12 {
            return Self {
                year: self.year + 1,
                month: 1,
            };
        }
        Self {
            year: self.year,
            month: self.month + 1,
        }
    }

    pub fn last_day(self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// Signed number of calendar months from `self` to `other`.
    pub fn months_until(self, other: MonthKey) -> i64 {
        let years = i64::from(other.year) - i64::from(self.year);
        let months = i64::from(other.month) - i64::from(self.month);
        years * 12 + months
    }

    /// Date in this month at `day`, clamped into `1..=last_day`.
    pub fn clamped_day(self, day: u32) -> Option<NaiveDate> {
        let clamped = day.clamp(1, self.last_day());
        NaiveDate::from_ymd_opt(self.year, self.month, clamped)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub fn format_iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if !looks_like_iso_date(trimmed) {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

pub(crate) fn parse_iso_date_field(value: &str, field_name: &str) -> ClientResult<NaiveDate> {
    parse_iso_date(value).ok_or_else(|| {
        ClientError::config_invalid(&format!(
            "`{field_name}` must use YYYY-MM-DD format with a real calendar date, got `{value}`."
        ))
    })
}

fn looks_like_iso_date(value: &str) -> bool {
    if value.len() != 10 {
        return false;
    }
    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return false;
        }
    }
    true
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
