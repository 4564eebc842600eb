//! Text normalization helpers shared by record building and fallback matching.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder values that mean "no data" in scanned forms.
const JUNK: &[&str] = &["N/A", "NA", "-", "", "None", "null", "NONE"];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse internal whitespace and trim. Junk placeholders become `None`.
pub fn clean(raw: &str) -> Option<String> {
    let s = WHITESPACE.replace_all(raw, " ").trim().to_string();
    if s.is_empty() || JUNK.contains(&s.as_str()) {
        None
    } else {
        Some(s)
    }
}

/// Date formats accepted by [`parse_date`], tried in order. Day-first
/// formats dominate because the source documents are customs/invoice forms.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%d/%m/%y", "%d-%m-%y", "%d%m%Y",
];

/// Normalize a date string to `YYYY-MM-DD`.
///
/// Returns the cleaned input unchanged when no known format matches, and
/// `None` only when the input cleans to nothing.
pub fn parse_date(raw: &str) -> Option<String> {
    let s = clean(raw)?;
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&s, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    Some(s)
}

static DECIMAL_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d,]+\.?\d*").unwrap());
static DECIMAL_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d*)?$").unwrap());

/// Extract the first numeric run as a canonical decimal string.
///
/// Thousands separators are stripped and a bare trailing `.` is dropped, so
/// `"$1,234.50"` becomes `"1234.50"` and `"99."` becomes `"99"`.
pub fn to_decimal(raw: &str) -> Option<String> {
    let run = DECIMAL_RUN.find(raw)?;
    let digits = run.as_str().replace(',', "");
    if !DECIMAL_SHAPE.is_match(&digits) {
        return None;
    }
    Some(digits.trim_end_matches('.').to_string())
}
