// src/utils/dates.rs

//! Date parsing helpers.

use chrono::NaiveDate;
use regex::Regex;

use crate::error::Result;

/// Format used by the store and cursor files.
pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
pub fn parse_iso(text: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(text.trim(), ISO_FORMAT)?)
}

/// Parse a listing date such as `December 03, 2025`.
pub fn parse_long_date(text: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(text.trim(), "%B %d, %Y")?)
}

/// Find and parse the first `Month DD, YYYY` date inside free text.
pub fn find_long_date(text: &str) -> Option<NaiveDate> {
    let pattern = Regex::new(r"([A-Za-z]+ \d{1,2}, \d{4})").ok()?;
    let found = pattern.captures(text)?.get(1)?;
    parse_long_date(found.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso() {
        assert_eq!(parse_iso("2025-01-10").unwrap(), date(2025, 1, 10));
        assert_eq!(parse_iso(" 2025-01-10\n").unwrap(), date(2025, 1, 10));
        assert!(parse_iso("2025/01/10").is_err());
        assert!(parse_iso("").is_err());
    }

    #[test]
    fn test_parse_long_date() {
        assert_eq!(parse_long_date("December 03, 2025").unwrap(), date(2025, 12, 3));
        assert!(parse_long_date("Smarch 03, 2025").is_err());
    }

    #[test]
    fn test_find_long_date() {
        assert_eq!(
            find_long_date("  December 03, 2025 - Counter Terrorism Designations"),
            Some(date(2025, 12, 3))
        );
        assert_eq!(find_long_date("no date here"), None);
        assert_eq!(find_long_date("Notamonth 03, 2025 -"), None);
    }
}
