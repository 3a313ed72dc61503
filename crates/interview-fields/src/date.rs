use std::cmp::Ordering;

use serde_json::Value;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parses a strict `YYYY-MM-DD` string into a calendar date.
///
/// Components must be zero-padded and separated by `-`; impossible calendar
/// days such as `2021-02-30` are rejected.
pub fn parse_date(input: &str) -> Option<Date> {
    if input.len() != 10 || !input.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Date::parse(input, DATE_FORMAT).ok()
}

/// Canonical `YYYY-MM-DD` form of a date.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// Raw field value carrying a date, for inputs that hold a native date.
pub fn date_value(date: Date) -> Value {
    Value::String(format_date(date))
}

/// Compares two dates by calendar day: year, then month, then day.
pub fn compare_dates(a: Date, b: Date) -> Ordering {
    a.cmp(&b)
}
