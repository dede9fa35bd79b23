//! Coercion of raw cell text into typed values.
//!
//! Every check that compares values goes through [`coerce`]. Missing values
//! (empty text or a null cell) coerce to [`TypedValue::Null`] for every type;
//! deciding whether a missing value is acceptable is the job of the `required`
//! and length checks, not of coercion.
//!
//! With `strict` set, each type uses its exact lexical grammar: integers are
//! `[+-]?digits`, numbers need a decimal point or an exponent (or are one of
//! `NaN`, `INF`, `-INF`), booleans are `true/True/TRUE/1` or
//! `false/False/FALSE/0`, and surrounding whitespace is rejected. Lenient
//! coercion trims the text first and accepts whatever the standard parsers
//! accept.

use cellcheck_core::{Cell, Field, FieldType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;
use validator::{ValidateEmail, ValidateUrl};

const DEFAULT_FORMAT: &str = "default";
const ANY_FORMAT: &str = "any";
const LEGACY_PATTERN_PREFIX: &str = "fmt:";

const ISO_DATE: &str = "%Y-%m-%d";
const ISO_TIME: &str = "%H:%M:%S";
const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";

const ANY_DATE_PATTERNS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d.%m.%Y", "%d-%m-%Y", "%Y%m%d",
    "%d %B %Y", "%B %d, %Y", "%d %b %Y", "%b %d, %Y",
];

const ANY_TIME_PATTERNS: &[&str] = &["%H:%M:%S", "%H:%M:%S%.f", "%H:%M", "%I:%M %p", "%I:%M:%S %p"];

const ANY_DATETIME_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// A cell value in the native representation of its field type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Missing value
    Null,
    /// Text
    String(String),
    /// Whole number
    Integer(i64),
    /// Floating point number
    Number(f64),
    /// Boolean
    Boolean(bool),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Date and time, normalized to UTC when a zone was given
    DateTime(NaiveDateTime),
    /// Calendar year
    Year(i32),
    /// JSON object
    Object(Map<String, Value>),
    /// JSON array
    Array(Vec<Value>),
    /// Uninterpreted text of an `any` field
    Any(String),
}

impl TypedValue {
    /// Returns true for the missing value.
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    /// Compares two values of the same type using the type's natural order.
    ///
    /// Integers and numbers compare with each other. Values of unrelated types,
    /// and NaN, have no order.
    pub fn compare(&self, other: &TypedValue) -> Option<Ordering> {
        use TypedValue as T;
        match (self, other) {
            (T::String(a), T::String(b)) => Some(a.cmp(b)),
            (T::Integer(a), T::Integer(b)) => Some(a.cmp(b)),
            (T::Number(a), T::Number(b)) => a.partial_cmp(b),
            (T::Integer(a), T::Number(b)) => (*a as f64).partial_cmp(b),
            (T::Number(a), T::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (T::Boolean(a), T::Boolean(b)) => Some(a.cmp(b)),
            (T::Date(a), T::Date(b)) => Some(a.cmp(b)),
            (T::Time(a), T::Time(b)) => Some(a.cmp(b)),
            (T::DateTime(a), T::DateTime(b)) => Some(a.cmp(b)),
            (T::Year(a), T::Year(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Null => Ok(()),
            TypedValue::String(s) | TypedValue::Any(s) => f.write_str(s),
            TypedValue::Integer(i) => write!(f, "{i}"),
            TypedValue::Number(n) => write!(f, "{n}"),
            TypedValue::Boolean(b) => write!(f, "{b}"),
            TypedValue::Date(d) => write!(f, "{d}"),
            TypedValue::Time(t) => write!(f, "{t}"),
            TypedValue::DateTime(dt) => write!(f, "{dt}"),
            TypedValue::Year(y) => write!(f, "{y}"),
            TypedValue::Object(map) => write!(f, "{}", Value::Object(map.clone())),
            TypedValue::Array(items) => write!(f, "{}", Value::Array(items.clone())),
        }
    }
}

/// A value that cannot be read as its declared type and format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {field_type} (format '{format}'): {reason}")]
pub struct CoercionError {
    /// Raw text
    pub value: String,
    /// Declared type
    pub field_type: String,
    /// Declared format
    pub format: String,
    /// Parser message
    pub reason: String,
}

/// Converts raw text to the typed value of `field_type`.
///
/// For `number` fields a failed parse is retried exactly once with `.0`
/// appended, so integral text is accepted where a decimal is declared.
///
/// ```rust
/// use cellcheck_core::FieldType;
/// use cellcheck_validator::{TypedValue, coerce};
///
/// let value = coerce("1965", &FieldType::Number, "default", true).unwrap();
/// assert_eq!(value, TypedValue::Number(1965.0));
/// assert!(coerce("abc", &FieldType::Number, "default", true).is_err());
/// ```
pub fn coerce(
    raw: &str,
    field_type: &FieldType,
    format: &str,
    strict: bool,
) -> Result<TypedValue, CoercionError> {
    match coerce_text(raw, field_type, format, strict) {
        Err(reason) if *field_type == FieldType::Number => {
            let patched = format!("{raw}.0");
            coerce_text(&patched, field_type, format, strict)
                .map_err(|_| coercion_error(raw, field_type, format, reason))
        }
        result => result.map_err(|reason| coercion_error(raw, field_type, format, reason)),
    }
}

fn coercion_error(raw: &str, field_type: &FieldType, format: &str, reason: String) -> CoercionError {
    CoercionError {
        value: raw.to_string(),
        field_type: field_type.to_string(),
        format: format.to_string(),
        reason,
    }
}

fn coerce_text(
    raw: &str,
    field_type: &FieldType,
    format: &str,
    strict: bool,
) -> Result<TypedValue, String> {
    let text = if strict { raw } else { raw.trim() };
    if text.is_empty() {
        return Ok(TypedValue::Null);
    }
    let is_text = matches!(
        field_type,
        FieldType::String | FieldType::Any | FieldType::Other(_)
    );
    if strict && !is_text && text.trim() != text {
        return Err("surrounding whitespace".to_string());
    }

    match field_type {
        FieldType::String => coerce_string(text, format),
        FieldType::Integer => parse_integer(text, strict).map(TypedValue::Integer),
        FieldType::Number => parse_number(text, strict).map(TypedValue::Number),
        FieldType::Boolean => parse_boolean(text, strict).map(TypedValue::Boolean),
        FieldType::Date => parse_date(text, format).map(TypedValue::Date),
        FieldType::Time => parse_time(text, format).map(TypedValue::Time),
        FieldType::DateTime => parse_datetime(text, format).map(TypedValue::DateTime),
        FieldType::Year => parse_year(text, strict).map(TypedValue::Year),
        FieldType::Object => match parse_json(text)? {
            Value::Object(map) => Ok(TypedValue::Object(map)),
            _ => Err("not a JSON object".to_string()),
        },
        FieldType::Array => match parse_json(text)? {
            Value::Array(items) => Ok(TypedValue::Array(items)),
            _ => Err("not a JSON array".to_string()),
        },
        // Types without a known grammar are read like `any`.
        FieldType::Any | FieldType::Other(_) => Ok(TypedValue::Any(text.to_string())),
    }
}

fn coerce_string(text: &str, format: &str) -> Result<TypedValue, String> {
    let valid = match format {
        "email" => text.validate_email(),
        "uri" => text.validate_url(),
        "uuid" => uuid::Uuid::parse_str(text).is_ok(),
        "binary" => is_base64(text),
        // default and unrecognized formats accept any text
        _ => true,
    };
    if valid {
        Ok(TypedValue::String(text.to_string()))
    } else {
        Err(format!("does not match format '{format}'"))
    }
}

fn parse_integer(text: &str, strict: bool) -> Result<i64, String> {
    if strict && !is_integer_literal(text) {
        return Err("not an integer literal".to_string());
    }
    text.parse::<i64>().map_err(|e| e.to_string())
}

fn parse_number(text: &str, strict: bool) -> Result<f64, String> {
    if strict {
        match text {
            "NaN" => return Ok(f64::NAN),
            "INF" => return Ok(f64::INFINITY),
            "-INF" => return Ok(f64::NEG_INFINITY),
            _ if !is_decimal_literal(text) => {
                return Err("not a decimal literal".to_string());
            }
            _ => {}
        }
    }
    text.parse::<f64>().map_err(|e| e.to_string())
}

fn parse_boolean(text: &str, strict: bool) -> Result<bool, String> {
    if strict {
        return match text {
            "true" | "True" | "TRUE" | "1" => Ok(true),
            "false" | "False" | "FALSE" | "0" => Ok(false),
            _ => Err("not a boolean literal".to_string()),
        };
    }
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Ok(false)
    } else {
        Err("not a boolean literal".to_string())
    }
}

fn parse_year(text: &str, strict: bool) -> Result<i32, String> {
    if strict {
        let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err("not a 4-digit year".to_string());
        }
    }
    text.parse::<i32>().map_err(|e| e.to_string())
}

fn parse_json(text: &str) -> Result<Value, String> {
    serde_json::from_str(text).map_err(|e| e.to_string())
}

fn explicit_pattern(format: &str) -> &str {
    format.strip_prefix(LEGACY_PATTERN_PREFIX).unwrap_or(format)
}

fn first_match<T>(
    text: &str,
    patterns: &[&str],
    parse: impl Fn(&str, &str) -> chrono::ParseResult<T>,
) -> Result<T, String> {
    patterns
        .iter()
        .find_map(|&pattern| parse(text, pattern).ok())
        .ok_or_else(|| "no known pattern matches".to_string())
}

fn parse_date(text: &str, format: &str) -> Result<NaiveDate, String> {
    match format {
        "" | DEFAULT_FORMAT => NaiveDate::parse_from_str(text, ISO_DATE).map_err(|e| e.to_string()),
        ANY_FORMAT => first_match(text, ANY_DATE_PATTERNS, NaiveDate::parse_from_str),
        pattern => NaiveDate::parse_from_str(text, explicit_pattern(pattern))
            .map_err(|e| e.to_string()),
    }
}

fn parse_time(text: &str, format: &str) -> Result<NaiveTime, String> {
    match format {
        "" | DEFAULT_FORMAT => NaiveTime::parse_from_str(text, ISO_TIME).map_err(|e| e.to_string()),
        ANY_FORMAT => first_match(text, ANY_TIME_PATTERNS, NaiveTime::parse_from_str),
        pattern => NaiveTime::parse_from_str(text, explicit_pattern(pattern))
            .map_err(|e| e.to_string()),
    }
}

fn parse_datetime(text: &str, format: &str) -> Result<NaiveDateTime, String> {
    match format {
        "" | DEFAULT_FORMAT => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.naive_utc())
            .or_else(|_| NaiveDateTime::parse_from_str(text, ISO_DATETIME))
            .map_err(|e| e.to_string()),
        ANY_FORMAT => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.naive_utc())
            .or_else(|_| first_match(text, ANY_DATETIME_PATTERNS, NaiveDateTime::parse_from_str)),
        pattern => {
            let pattern = explicit_pattern(pattern);
            NaiveDateTime::parse_from_str(text, pattern)
                .or_else(|_| DateTime::parse_from_str(text, pattern).map(|dt| dt.naive_utc()))
                .map_err(|e| e.to_string())
        }
    }
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn all_digits(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_digit())
}

/// `[+-]? (digits "." digits* | "." digits | digits) ([eE] [+-]? digits)?`,
/// with at least a decimal point or an exponent present.
fn is_decimal_literal(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };

    let mantissa_ok = all_digits(whole)
        && fraction.is_none_or(all_digits)
        && (!whole.is_empty() || fraction.is_some_and(|f| !f.is_empty()));
    let exponent_ok = exponent.is_none_or(|e| {
        let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
        !digits.is_empty() && all_digits(digits)
    });

    mantissa_ok && exponent_ok && (fraction.is_some() || exponent.is_some())
}

fn is_base64(text: &str) -> bool {
    let body = text.trim_end_matches('=');
    text.len() % 4 == 0
        && text.len() - body.len() <= 2
        && body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

/// Coerces the cells of one field.
#[derive(Debug, Clone)]
pub struct ValueCoercer {
    field_type: FieldType,
    format: String,
    strict: bool,
}

impl ValueCoercer {
    /// Creates a coercer for a type and format.
    pub fn new(field_type: FieldType, format: impl Into<String>, strict: bool) -> Self {
        Self {
            field_type,
            format: format.into(),
            strict,
        }
    }

    /// Creates a coercer for a field's declared type and format.
    pub fn for_field(field: &Field, strict: bool) -> Self {
        Self::new(field.field_type.clone(), field.format_or_default(), strict)
    }

    /// Returns the declared type.
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Returns the declared format.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Coerces raw text.
    pub fn coerce(&self, raw: &str) -> Result<TypedValue, CoercionError> {
        coerce(raw, &self.field_type, &self.format, self.strict)
    }

    /// Coerces a cell; an absent or missing cell is [`TypedValue::Null`].
    pub fn coerce_cell(&self, cell: Option<&Cell>) -> Result<TypedValue, CoercionError> {
        match cell {
            Some(cell) if !cell.is_missing() => self.coerce(&cell.text()),
            _ => Ok(TypedValue::Null),
        }
    }

    /// Coerces a constraint payload (a bound or an enum member).
    ///
    /// Payloads are always read leniently: `1962` and `"1962"` are the same
    /// bound for an integer field.
    pub fn coerce_payload(&self, payload: &Value) -> Result<TypedValue, CoercionError> {
        let text = match payload {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        coerce(&text, &self.field_type, &self.format, false)
    }
}
