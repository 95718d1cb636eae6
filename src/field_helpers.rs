//! Shared field-parsing helpers for record transformers.
//!
//! These helpers never fail loudly: they return `None` (or an `Err` the caller
//! logs) so that one malformed field cannot abort the extraction of its
//! siblings.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use unicode_normalization::UnicodeNormalization;
use url::Url;

use crate::xml::XmlElement;

/// Whitespace-collapsed, NFC-normalized text of an element.
///
/// Returns `None` for elements without any text.
#[must_use]
pub fn element_text(element: &XmlElement) -> Option<String> {
    let text: String = element.text().nfc().collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Text of the first descendant matching `selector`.
#[must_use]
pub fn first_text(root: &XmlElement, selector: &str) -> Option<String> {
    root.select_first(selector).and_then(element_text)
}

/// Texts of all descendants matching `selector`, skipping empty ones.
#[must_use]
pub fn all_texts(root: &XmlElement, selector: &str) -> Vec<String> {
    root.select(selector)
        .into_iter()
        .filter_map(element_text)
        .collect()
}

/// Year of an XML Schema date or date-time.
///
/// Accepts RFC 3339 timestamps, zone-less date-times, plain dates, year-month
/// (`2015-03`) and bare years (`2015`), optionally negative.
#[must_use]
pub fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.year());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.year());
        }
    }
    if let Some(date) = parse_calendar_date(value) {
        return Some(date.year());
    }
    // xs:date may carry a zone designator
    if let Some(date) = value
        .get(..10)
        .and_then(parse_calendar_date)
        .filter(|_| is_zone_designator(&value[10..]))
    {
        return Some(date.year());
    }
    parse_partial_year(value)
}

/// Parses a `YYYY-MM-DD` calendar date.
#[must_use]
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parses a date that starts with `YYYY-MM-DD`, ignoring any trailing time.
#[must_use]
pub fn parse_leading_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    parse_calendar_date(value).or_else(|| value.get(..10).and_then(parse_calendar_date))
}

fn is_zone_designator(rest: &str) -> bool {
    rest == "Z"
        || ((rest.starts_with('+') || rest.starts_with('-'))
            && rest.len() == 6
            && rest.as_bytes()[3] == b':')
}

fn parse_partial_year(value: &str) -> Option<i32> {
    let (year_part, rest) = match value.split_once('-') {
        Some(("", _)) => {
            // Negative year: -0044 or -0044-03
            let (year, rest) = value[1..].split_once('-').unwrap_or((&value[1..], ""));
            return parse_year_month(year, rest).map(|y| -y);
        },
        Some((year, rest)) => (year, rest),
        None => (value, ""),
    };
    parse_year_month(year_part, rest)
}

fn parse_year_month(year: &str, month: &str) -> Option<i32> {
    if year.len() < 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !month.is_empty() {
        let month: u32 = month.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
    }
    year.parse().ok()
}

/// Parses a decimal coordinate.
///
/// # Errors
///
/// Returns the parse error for non-numeric or non-finite values.
pub fn parse_coordinate(value: &str) -> std::result::Result<f64, String> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| format!("'{value}': {e}"))?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(format!("'{value}': not a finite number"))
    }
}

/// Checks that a candidate link is an absolute, well-formed URL.
///
/// # Errors
///
/// Returns the parse error if the string is not a valid absolute URL.
pub fn validate_url(candidate: &str) -> std::result::Result<Url, url::ParseError> {
    Url::parse(candidate.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_formats() {
        assert_eq!(parse_year("2015-06-01T12:00:00Z"), Some(2015));
        assert_eq!(parse_year("2015-06-01T12:00:00+02:00"), Some(2015));
        assert_eq!(parse_year("2015-06-01T12:00:00"), Some(2015));
        assert_eq!(parse_year("2015-06-01T12:00:00.123"), Some(2015));
        assert_eq!(parse_year("2015-06-01"), Some(2015));
        assert_eq!(parse_year("2015-06-01Z"), Some(2015));
        assert_eq!(parse_year("2015-06"), Some(2015));
        assert_eq!(parse_year(" 2015 "), Some(2015));
        assert_eq!(parse_year("-0044"), Some(-44));
    }

    #[test]
    fn test_parse_year_rejects_garbage() {
        assert_eq!(parse_year("not a date"), None);
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("15"), None);
        assert_eq!(parse_year("2015-13"), None);
        assert_eq!(parse_year("2015-06-01garbage"), None);
    }

    #[test]
    fn test_parse_leading_date() {
        let date = parse_leading_date("2017-11-01T10:00:00Z").expect("date");
        assert_eq!(date.year(), 2017);
        assert!(parse_leading_date("2017").is_none());
        assert!(parse_leading_date("01.11.2017").is_none());
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate(" 10.5 "), Ok(10.5));
        assert_eq!(parse_coordinate("-180"), Ok(-180.0));
        assert!(parse_coordinate("ten").is_err());
        assert!(parse_coordinate("").is_err());
        assert!(parse_coordinate("NaN").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.org/data.zip").is_ok());
        assert!(validate_url("ftp://example.org/data").is_ok());
        assert!(validate_url("example.org/data").is_err());
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn test_element_text_normalizes_to_nfc() {
        // "e" followed by a combining acute accent
        let element = XmlElement::new("t").with_text("Caf\u{0065}\u{0301}");
        assert_eq!(element_text(&element).as_deref(), Some("Caf\u{00e9}"));
        assert_eq!(element_text(&XmlElement::new("t")), None);
    }
}
