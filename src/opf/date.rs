//! W3C-profile date parsing for `dc:date` and the strict `dcterms:modified`
//! form (§4.5.1).
//!
//! Both functions are pure and allocate only for their error-free happy
//! path; neither ever panics on malformed input, since a publication's date
//! metadata is attacker/author-controlled text the engine must merely
//! classify, never trust.

/// The granularity at which a W3C-profile date was expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePrecision {
    Year,
    YearMonth,
    Date,
    DateTime,
}

/// Validates a `dc:date` value against the W3C date-time profile accepted
/// forms, in order: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`,
/// `YYYY-MM-DDThh:mm:ss(.fff)?(Z|±hh:mm)?`.
///
/// Returns the precision at which the date was expressed on success.
///
/// # Examples
///
/// ```
/// use epubcheck_core::opf::date::{parse_w3c_date, DatePrecision};
///
/// assert_eq!(parse_w3c_date("2020"), Some(DatePrecision::Year));
/// assert_eq!(parse_w3c_date("2020-02-29"), Some(DatePrecision::Date));
/// assert_eq!(parse_w3c_date("2020-02-30"), None);
/// assert_eq!(parse_w3c_date("2020-01-01T10:00:00Z"), Some(DatePrecision::DateTime));
/// ```
#[must_use]
pub fn parse_w3c_date(value: &str) -> Option<DatePrecision> {
    let bytes = value.as_bytes();

    if bytes.len() == 4 {
        let year = parse_digits(bytes)?;
        return (year > 0).then_some(DatePrecision::Year);
    }

    if bytes.len() == 7 && bytes.get(4) == Some(&b'-') {
        let year = parse_digits(&bytes[0..4])?;
        let month = parse_digits(&bytes[5..7])?;
        return (year > 0 && (1..=12).contains(&month)).then_some(DatePrecision::YearMonth);
    }

    if bytes.len() == 10 && bytes.get(4) == Some(&b'-') && bytes.get(7) == Some(&b'-') {
        let (year, month, day) = parse_ymd(bytes)?;
        return is_valid_date(year, month, day).then_some(DatePrecision::Date);
    }

    if bytes.len() > 10 && bytes.get(10) == Some(&b'T') {
        return parse_datetime(value).then_some(DatePrecision::DateTime);
    }

    None
}

/// Validates the tight `CCYY-MM-DDThh:mm:ssZ` form EPUB 3 requires for
/// `dcterms:modified` — no fractional seconds, no numeric timezone offset,
/// literal trailing `Z`.
///
/// # Examples
///
/// ```
/// use epubcheck_core::opf::date::is_strict_modified_datetime;
///
/// assert!(is_strict_modified_datetime("2020-01-01T10:00:00Z"));
/// assert!(!is_strict_modified_datetime("2020-01-01T10:00:00.000Z"));
/// assert!(!is_strict_modified_datetime("2020-01-01T10:00:00+01:00"));
/// assert!(!is_strict_modified_datetime("2020-01-01"));
/// ```
#[must_use]
pub fn is_strict_modified_datetime(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 20 || bytes[19] != b'Z' {
        return false;
    }
    if bytes.get(4) != Some(&b'-') || bytes.get(7) != Some(&b'-') || bytes.get(10) != Some(&b'T') {
        return false;
    }
    if bytes.get(13) != Some(&b':') || bytes.get(16) != Some(&b':') {
        return false;
    }
    let Some((year, month, day)) = parse_ymd(&bytes[0..10]) else {
        return false;
    };
    if !is_valid_date(year, month, day) {
        return false;
    }
    let Some(hour) = parse_digits(&bytes[11..13]) else {
        return false;
    };
    let Some(minute) = parse_digits(&bytes[14..16]) else {
        return false;
    };
    let Some(second) = parse_digits(&bytes[17..19]) else {
        return false;
    };
    hour < 24 && minute < 60 && second < 60
}

fn parse_ymd(bytes: &[u8]) -> Option<(u32, u32, u32)> {
    let year = parse_digits(bytes.get(0..4)?)?;
    let month = parse_digits(bytes.get(5..7)?)?;
    let day = parse_digits(bytes.get(8..10)?)?;
    Some((year, month, day))
}

fn parse_datetime(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 19 {
        return false;
    }
    let Some((year, month, day)) = parse_ymd(&bytes[0..10]) else {
        return false;
    };
    if !is_valid_date(year, month, day) {
        return false;
    }
    if bytes.get(10) != Some(&b'T') || bytes.get(13) != Some(&b':') || bytes.get(16) != Some(&b':') {
        return false;
    }
    let Some(hour) = parse_digits(&bytes[11..13]) else {
        return false;
    };
    let Some(minute) = parse_digits(&bytes[14..16]) else {
        return false;
    };
    let Some(second) = parse_digits(&bytes[17..19]) else {
        return false;
    };
    if hour >= 24 || minute >= 60 || second >= 60 {
        return false;
    }

    let rest = &value[19..];
    if rest.is_empty() {
        return true;
    }
    if rest == "Z" {
        return true;
    }
    let rest = rest.strip_prefix('.').map_or(rest, |fraction| {
        let digits_end = fraction.find(|c: char| !c.is_ascii_digit()).unwrap_or(fraction.len());
        if digits_end == 0 {
            ""
        } else {
            &fraction[digits_end..]
        }
    });
    if rest.is_empty() {
        return true;
    }
    if rest == "Z" {
        return true;
    }
    is_valid_offset(rest)
}

fn is_valid_offset(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    if bytes.len() != 6 {
        return false;
    }
    if bytes[0] != b'+' && bytes[0] != b'-' {
        return false;
    }
    if bytes.get(3) != Some(&b':') {
        return false;
    }
    let Some(hour) = parse_digits(&bytes[1..3]) else {
        return false;
    };
    let Some(minute) = parse_digits(&bytes[4..6]) else {
        return false;
    };
    hour <= 14 && minute < 60
}

fn parse_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let mut value: u32 = 0;
    for &byte in bytes {
        value = value.checked_mul(10)?.checked_add(u32::from(byte - b'0'))?;
    }
    Some(value)
}

fn is_valid_date(year: u32, month: u32, day: u32) -> bool {
    if year == 0 || !(1..=12).contains(&month) {
        return false;
    }
    day >= 1 && day <= days_in_month(year, month)
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
