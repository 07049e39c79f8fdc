//! Primitive value checking.
//!
//! Raw values travel as strings on the wire. `check_value` turns a raw string
//! into a typed [`FieldValue`] or explains why it does not fit the declared
//! type. Callers never pass `""` here: an empty string means the value was
//! left out on purpose and skips checking entirely.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(\d{2}):)?(\d{2}):(\d{2})$").expect("valid duration regex"));

static DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").expect("valid datetime regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveType {
    Int,
    Float,
    Duration,
    Text,
    Datetime,
    FiveStars,
    TenStars,
}

impl PrimitiveType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, PrimitiveType::Int | PrimitiveType::Float)
    }
}

/// A raw value after it passed [`check_value`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    /// Whole seconds.
    Duration(u32),
    Text(String),
    Datetime(NaiveDateTime),
    Stars(u8),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

pub fn check_value(kind: PrimitiveType, raw: &str) -> Result<FieldValue, ValidationError> {
    match kind {
        PrimitiveType::Int => raw
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|_| ValidationError::new(format!("'{}' is not an integer.", raw))),
        PrimitiveType::Float => match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(FieldValue::Float(f)),
            _ => Err(ValidationError::new(format!("'{}' is not a number.", raw))),
        },
        PrimitiveType::Duration => parse_duration(raw).map(FieldValue::Duration).ok_or_else(|| {
            ValidationError::new(format!(
                "'{}' is not a duration (expected HH:MM:SS or MM:SS).",
                raw
            ))
        }),
        PrimitiveType::Text => Ok(FieldValue::Text(raw.to_string())),
        PrimitiveType::Datetime => parse_datetime(raw).map(FieldValue::Datetime).ok_or_else(|| {
            ValidationError::new(format!(
                "'{}' is not a datetime (expected YYYY-MM-DD HH:MM:SS).",
                raw
            ))
        }),
        PrimitiveType::FiveStars => parse_stars(raw, 5),
        PrimitiveType::TenStars => parse_stars(raw, 10),
    }
}

fn parse_duration(raw: &str) -> Option<u32> {
    let caps = DURATION_RE.captures(raw)?;
    let group = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let hours = match caps.get(1) {
        Some(_) => group(1)?,
        None => 0,
    };
    let minutes = group(2)?;
    let seconds = group(3)?;
    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    if !DATETIME_RE.is_match(raw) {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).ok()
}

fn parse_stars(raw: &str, max: u8) -> Result<FieldValue, ValidationError> {
    match raw.parse::<i64>() {
        Ok(n) if (1..=i64::from(max)).contains(&n) => Ok(FieldValue::Stars(n as u8)),
        _ => Err(ValidationError::new(format!(
            "'{}' is not a rating between 1 and {}.",
            raw, max
        ))),
    }
}
