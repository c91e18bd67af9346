//! Lenient calendar-date parsing.
//!
//! Dates reach ProgressPad from people typing into the CLI and from spreadsheet
//! exports, so the same day can arrive as `2025-05-12`, `12/05/2025` or a bare
//! spreadsheet serial number. Everything funnels through [`normalize_date`],
//! which never fails: input it cannot read becomes "no date".
//!
//! Formats are tried in the order of [`DATE_FORMATS`] and the first match wins.
//! Day-first beats month-first, so `03/04/2025` is the 3rd of April.

use chrono::{Datelike, Duration, Local, NaiveDate};

/// Accepted textual formats, in precedence order.
pub const DATE_FORMATS: [&str; 5] = [
    "%Y-%m-%d", // 2025-05-12
    "%d/%m/%Y", // 12/05/2025
    "%m/%d/%Y", // 05/12/2025
    "%d-%m-%Y", // 12-05-2025
    "%Y/%m/%d", // 2025/05/12
];

/// Raw date input as it arrives from a form field or an imported cell.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    Absent,
    Text(String),
    Number(f64),
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

impl From<Option<&str>> for DateInput {
    fn from(s: Option<&str>) -> Self {
        match s {
            Some(s) => DateInput::Text(s.to_string()),
            None => DateInput::Absent,
        }
    }
}

impl From<f64> for DateInput {
    fn from(n: f64) -> Self {
        DateInput::Number(n)
    }
}

impl From<i64> for DateInput {
    fn from(n: i64) -> Self {
        DateInput::Number(n as f64)
    }
}

/// Normalise any supported date input into a calendar date.
///
/// Numbers are only tried as spreadsheet serials; text is only tried against
/// [`DATE_FORMATS`]. Returns `None` for absent, empty, zero or unreadable input.
pub fn normalize_date(input: &DateInput) -> Option<NaiveDate> {
    match input {
        DateInput::Absent => None,
        DateInput::Number(n) if *n == 0.0 => None,
        DateInput::Text(s) => normalize_text(s),
        DateInput::Number(n) => {
            // A number is first rendered as text, which never matches a
            // separator-based format, so it falls through to the serial path.
            normalize_text(&n.to_string()).or_else(|| from_spreadsheet_serial(*n))
        }
    }
}

/// Parse date text against [`DATE_FORMATS`] in order.
pub fn normalize_text(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Convert a legacy spreadsheet serial into a date.
///
/// Computed as 1900-01-01 plus `n - 2` days, which lands on the usual
/// 1899-12-30 epoch. Fractional parts are truncated.
pub fn from_spreadsheet_serial(n: f64) -> Option<NaiveDate> {
    if !n.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)?;
    let days = n.trunc() as i64 - 2;
    epoch.checked_add_signed(Duration::try_days(days)?)
}

/// Render a date in one of the accepted formats.
pub fn format_date(date: NaiveDate, fmt: &str) -> String {
    date.format(fmt).to_string()
}

/// Parse a due date typed on the command line.
///
/// Accepts "today", "tomorrow", "yesterday", "in Nd" and "in Nw" on top of
/// everything [`normalize_text`] reads.
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lowered = s.trim().to_lowercase();

    match lowered.as_str() {
        "today" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        "yesterday" => return today.pred_opt(),
        "eom" | "end of month" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            return NaiveDate::from_ymd_opt(year, month, 1).and_then(|d| d.pred_opt());
        }
        _ => {}
    }

    if let Some(rest) = lowered.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return today.checked_add_signed(Duration::try_days(days)?);
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return today.checked_add_signed(Duration::try_weeks(weeks)?);
            }
        }
    }

    normalize_text(s.trim())
}

/// Today's date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_each_format_round_trips() {
        let dates = [ymd(2025, 5, 12), ymd(2024, 2, 29), ymd(1999, 12, 31), ymd(2025, 1, 13)];
        for date in dates {
            for fmt in DATE_FORMATS {
                let text = format_date(date, fmt);
                let parsed = normalize_date(&DateInput::from(text.as_str()));
                // Day-first wins for slash dates, so a month-first rendering
                // only survives when the day cannot be read as a month.
                if fmt == "%m/%d/%Y" && date.day() <= 12 && date.day() != date.month() {
                    assert_ne!(parsed, Some(date), "{fmt} {text}");
                } else {
                    assert_eq!(parsed, Some(date), "{fmt} {text}");
                }
            }
        }
    }

    #[test]
    fn test_ambiguous_slash_date_is_day_first() {
        assert_eq!(normalize_text("03/04/2025"), Some(ymd(2025, 4, 3)));
        assert_eq!(normalize_text("01/02/2025"), Some(ymd(2025, 2, 1)));
    }

    #[test]
    fn test_month_first_used_when_day_first_impossible() {
        assert_eq!(normalize_text("05/13/2025"), Some(ymd(2025, 5, 13)));
    }

    #[test]
    fn test_invalid_calendar_date_is_no_date() {
        assert_eq!(normalize_text("29/02/2025"), None);
        assert_eq!(normalize_text("2025-02-30"), None);
    }

    #[test]
    fn test_garbage_and_absent_are_no_date() {
        assert_eq!(normalize_date(&DateInput::Absent), None);
        assert_eq!(normalize_date(&DateInput::from("")), None);
        assert_eq!(normalize_date(&DateInput::from("next sprint")), None);
    }

    #[test]
    fn test_spreadsheet_serial() {
        // 1900-01-01 + 43998 days
        assert_eq!(normalize_date(&DateInput::from(44000_i64)), Some(ymd(2020, 6, 18)));
        assert_eq!(normalize_date(&DateInput::Number(2.0)), Some(ymd(1900, 1, 1)));
        assert_eq!(normalize_date(&DateInput::Number(44000.75)), Some(ymd(2020, 6, 18)));
        assert_eq!(normalize_date(&DateInput::Number(f64::NAN)), None);
    }

    #[test]
    fn test_numeric_text_is_not_a_serial() {
        assert_eq!(normalize_date(&DateInput::from("44000")), None);
    }

    #[test]
    fn test_parse_due_input_relative_words() {
        let today = ymd(2025, 3, 10);
        assert_eq!(parse_due_input("today", today), Some(today));
        assert_eq!(parse_due_input("Tomorrow", today), Some(ymd(2025, 3, 11)));
        assert_eq!(parse_due_input("in 3d", today), Some(ymd(2025, 3, 13)));
        assert_eq!(parse_due_input("in 2w", today), Some(ymd(2025, 3, 24)));
        assert_eq!(parse_due_input("eom", today), Some(ymd(2025, 3, 31)));
        assert_eq!(parse_due_input("15/03/2025", today), Some(ymd(2025, 3, 15)));
        assert_eq!(parse_due_input("soon", today), None);
    }

    #[test]
    fn test_zero_is_no_date() {
        assert_eq!(normalize_date(&DateInput::Number(0.0)), None);
        assert_eq!(normalize_date(&DateInput::from(0_i64)), None);
    }

    #[test]
    fn test_out_of_range_relative_offset_is_no_date() {
        let today = ymd(2025, 3, 10);
        assert_eq!(parse_due_input("in 99999999d", today), None);
        assert_eq!(parse_due_input("in 9999999999999w", today), None);
        assert_eq!(parse_due_input("in -99999999d", today), None);
        assert_eq!(parse_due_input("yesterday", today), Some(ymd(2025, 3, 9)));
        assert_eq!(parse_due_input("eom", ymd(2025, 12, 5)), Some(ymd(2025, 12, 31)));
    }
}
