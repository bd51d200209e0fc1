// models/src/validation.rs
//
// Stateless format checks shared by the entity schemas. Nothing in here
// touches storage.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::errors::ValidationError;

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]?[0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z\s\-']+$").expect("name pattern"));
static INTL_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("international phone pattern"));
static LOCAL_PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+\d{1,2}\s?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}$").expect("phone pattern")
});
static BLOOD_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(A|B|AB|O)[+-]$").expect("blood type pattern"));
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url pattern"));

/// Parses a 24-hour `H:MM`/`HH:MM` string into hours and minutes.
pub fn parse_time(value: &str) -> Result<(u32, u32), ValidationError> {
    if !TIME_RE.is_match(value) {
        return Err(ValidationError::InvalidTimeFormat(value.to_string()));
    }
    let (h, m) = value
        .split_once(':')
        .ok_or_else(|| ValidationError::InvalidTimeFormat(value.to_string()))?;
    let hours = h
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidTimeFormat(value.to_string()))?;
    let minutes = m
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidTimeFormat(value.to_string()))?;
    Ok((hours, minutes))
}

pub fn is_valid_time(value: &str) -> bool {
    parse_time(value).is_ok()
}

/// Zero-padded `HH:MM` form of a valid time string, so `9:05` and `09:05` compare equal.
pub fn canonical_time(value: &str) -> Result<String, ValidationError> {
    let (h, m) = parse_time(value)?;
    Ok(format!("{:02}:{:02}", h, m))
}

pub fn minutes_of_day(value: &str) -> Result<u32, ValidationError> {
    let (h, m) = parse_time(value)?;
    Ok(h * 60 + m)
}

/// Combines a calendar date with a time string; an unparsable time falls back to midnight.
pub fn combine_date_time(date: NaiveDate, time: &str) -> NaiveDateTime {
    let t = parse_time(time)
        .ok()
        .and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0))
        .unwrap_or(NaiveTime::MIN);
    date.and_time(t)
}

/// Coerces `YYYY-MM-DD`, an RFC 3339 timestamp or a naive ISO timestamp into a
/// calendar date. Offsets are converted to the server's local zone first.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Local).date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ts.date());
    }
    Err(ValidationError::InvalidDateFormat(value.to_string()))
}

pub fn parse_uuid(value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| ValidationError::InvalidIdentifier(value.to_string()))
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn is_valid_name(value: &str) -> bool {
    NAME_RE.is_match(value)
}

/// E.164-style number used for doctors.
pub fn is_valid_international_phone(value: &str) -> bool {
    INTL_PHONE_RE.is_match(value)
}

/// North-American style number with optional country code, used for patients.
pub fn is_valid_local_phone(value: &str) -> bool {
    LOCAL_PHONE_RE.is_match(value)
}

pub fn is_valid_blood_type(value: &str) -> bool {
    BLOOD_TYPE_RE.is_match(value)
}

pub fn is_valid_url(value: &str) -> bool {
    URL_RE.is_match(value)
}

pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Trims every entry and drops repeats, keeping the first occurrence in place.
pub fn dedup_trimmed(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let trimmed = item.trim();
        if !out.iter().any(|seen| seen == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}
