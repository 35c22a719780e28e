// SPDX-License-Identifier: MIT

//! Strict calendar-date parsing for session and birth dates.

use chrono::NaiveDate;

/// Parse a date in strict `YYYY-MM-DD` form.
///
/// Returns `None` for anything that is not four digits, a dash, two digits,
/// a dash, two digits, or that names a day the calendar doesn't have
/// (months outside 1-12, day 31 in a 30-day month, Feb 29 outside leap
/// years).
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    if !bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
    {
        return None;
    }

    let year: i32 = raw[0..4].parse().ok()?;
    let month: u32 = raw[5..7].parse().ok()?;
    let day: u32 = raw[8..10].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_dates() {
        assert!(parse_calendar_date("2024-01-31").is_some());
        assert!(parse_calendar_date("1999-12-01").is_some());
    }

    #[test]
    fn respects_leap_years() {
        assert!(parse_calendar_date("2024-02-29").is_some());
        assert!(parse_calendar_date("2023-02-29").is_none());
        // Century years are only leap when divisible by 400
        assert!(parse_calendar_date("2000-02-29").is_some());
        assert!(parse_calendar_date("1900-02-29").is_none());
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert!(parse_calendar_date("2024-13-01").is_none());
        assert!(parse_calendar_date("2024-00-01").is_none());
        assert!(parse_calendar_date("2024-04-31").is_none());
        assert!(parse_calendar_date("2024-01-00").is_none());
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(parse_calendar_date("2024-1-01").is_none());
        assert!(parse_calendar_date("24-01-01").is_none());
        assert!(parse_calendar_date("2024/01/01").is_none());
        assert!(parse_calendar_date("2024-01-01T00:00").is_none());
        assert!(parse_calendar_date("+024-01-01").is_none());
        assert!(parse_calendar_date("").is_none());
    }
}
