use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Calendar day used as the store's grouping key. Ordered by
/// (year, month, day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey {
    year: i32,
    month: u8,
    day: u8,
}

impl DateKey {
    /// Month must be 1..=12 and day 1..=31. Day-of-month is not checked
    /// against the month length.
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidDate(format!("month value is invalid: {}", month)));
        }
        if !(1..=31).contains(&day) {
            return Err(Error::InvalidDate(format!("day value is invalid: {}", day)));
        }
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for DateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (year, month, day) = split_components(s).ok_or_else(|| wrong_format(s))?;

        let year: i32 = year.parse().map_err(|_| wrong_format(s))?;
        // Components too large for u8 are range errors, not format errors.
        let month: u32 = month.parse().map_err(|_| wrong_format(s))?;
        let day: u32 = day.parse().map_err(|_| wrong_format(s))?;

        let month = u8::try_from(month)
            .map_err(|_| Error::InvalidDate(format!("month value is invalid: {}", month)))?;
        let day = u8::try_from(day)
            .map_err(|_| Error::InvalidDate(format!("day value is invalid: {}", day)))?;

        DateKey::new(year, month, day)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn split_components(s: &str) -> Option<(&str, &str, &str)> {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !parts.iter().all(|&p| all_digits(p)) {
        return None;
    }
    Some((parts[0], parts[1], parts[2]))
}

fn wrong_format(s: &str) -> Error {
    Error::InvalidDate(format!("wrong date format: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn date(y: i32, m: u8, d: u8) -> DateKey {
        DateKey::new(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let d: DateKey = "2017-1-7".parse().unwrap();
        assert_eq!(d, date(2017, 1, 7));
        assert_eq!(d.to_string(), "2017-01-07");
    }

    #[test]
    fn test_display_pads_year() {
        assert_eq!(date(7, 3, 9).to_string(), "0007-03-09");
    }

    #[test]
    fn test_ordering() {
        assert!(date(2016, 12, 31) < date(2017, 1, 1));
        assert!(date(2017, 1, 2) < date(2017, 2, 1));
        assert!(date(2017, 2, 1) < date(2017, 2, 3));
    }

    #[test]
    fn test_invalid_month() {
        let err = "2017-13-01".parse::<DateKey>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDate);
        assert!(err.to_string().contains("month value is invalid: 13"));
    }

    #[test]
    fn test_invalid_day() {
        let err = "2017-01-32".parse::<DateKey>().unwrap_err();
        assert!(err.to_string().contains("day value is invalid: 32"));
        let err = "2017-01-300".parse::<DateKey>().unwrap_err();
        assert!(err.to_string().contains("day value is invalid: 300"));
    }

    #[test]
    fn test_wrong_format() {
        for input in ["2017-01", "2017/01/01", "2017-01-01x", "", "a-b-c"] {
            let err = input.parse::<DateKey>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidDate, "{}", input);
        }
    }
}
