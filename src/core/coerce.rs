//! Total mapping from loosely-typed user input to finite numbers.
//!
//! Every parameter the calculator accepts goes through [`to_finite`], so the
//! recurrence never sees NaN or infinity. Conversion follows the number rules
//! a browser form applies: `null` and blank text are zero, booleans are 0/1,
//! numeric text is parsed, everything else is not a number.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::de::value::{MapAccessDeserializer, SeqAccessDeserializer};

pub const MIN_YEARS: u32 = 1;
pub const MAX_YEARS: u32 = 60;

/// A parameter value as it arrived from a form, query string or JSON body.
///
/// An absent field is represented by `None` at the use site, not by a variant.
/// JSON numbers outside the `f64` range arrive as infinite `Number`s.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawValue {
    fn to_number(&self) -> f64 {
        match self {
            RawValue::Null => 0.0,
            RawValue::Bool(flag) => {
                if *flag {
                    1.0
                } else {
                    0.0
                }
            }
            RawValue::Number(value) => *value,
            RawValue::Text(text) => parse_numeric_text(text),
            RawValue::Other(_) => f64::NAN,
        }
    }

    fn is_blank_marker(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawValueVisitor)
    }
}

struct RawValueVisitor;

impl<'de> Visitor<'de> for RawValueVisitor {
    type Value = RawValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value or query-string text")
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawValue, E> {
        Ok(RawValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<RawValue, E> {
        Ok(RawValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<RawValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawValue::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<RawValue, E> {
        Ok(RawValue::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<RawValue, E> {
        Ok(RawValue::Number(value as f64))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<RawValue, E> {
        Ok(RawValue::Number(value as f64))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<RawValue, E> {
        Ok(RawValue::Number(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<RawValue, E> {
        Ok(RawValue::Text(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<RawValue, E> {
        Ok(RawValue::Text(value))
    }

    fn visit_seq<A>(self, seq: A) -> Result<RawValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        serde_json::Value::deserialize(SeqAccessDeserializer::new(seq)).map(RawValue::Other)
    }

    // serde_json hands arbitrary-precision numbers over as a single-entry map,
    // so a number too large for f64 is still read as its decimal text here.
    fn visit_map<A>(self, map: A) -> Result<RawValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let value = serde_json::Value::deserialize(MapAccessDeserializer::new(map))?;
        Ok(match value {
            serde_json::Value::Number(number) => RawValue::Number(json_number_to_f64(&number)),
            other => RawValue::Other(other),
        })
    }
}

fn json_number_to_f64(number: &serde_json::Number) -> f64 {
    number.to_string().parse::<f64>().unwrap_or(f64::NAN)
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

fn parse_numeric_text(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return parse_radix_digits(digits, radix);
        }
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

// Unsigned digits only; values past u64 keep growing as f64 instead of failing.
fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix)
                .map(|digit| acc * f64::from(radix) + f64::from(digit))
        })
        .unwrap_or(f64::NAN)
}

/// Converts `value` to a number, returning `fallback` unless the result is finite.
pub fn to_finite(value: Option<&RawValue>, fallback: f64) -> f64 {
    let number = value.map_or(f64::NAN, RawValue::to_number);
    if number.is_finite() { number } else { fallback }
}

/// Human percentage to fractional rate: `"15"` becomes `0.15`.
pub fn to_percent(value: Option<&RawValue>) -> f64 {
    to_finite(value, 0.0) / 100.0
}

/// Horizon in whole years, floored and clamped to `MIN_YEARS..=MAX_YEARS`.
pub fn coerce_years(value: Option<&RawValue>) -> u32 {
    let years = to_finite(value, f64::from(MIN_YEARS)).floor();
    years.clamp(f64::from(MIN_YEARS), f64::from(MAX_YEARS)) as u32
}

/// Share of the return rate credited on the current year's contribution.
///
/// Absent, `null` and the empty string mean full credit (`1`). Any other
/// value, including `0`, NaN or unparseable text, is coerced with a fallback
/// of `0`. The two cases are deliberately different: leaving the field out
/// is not the same as supplying something broken.
pub fn contribution_interest_factor(value: Option<&RawValue>) -> f64 {
    match value {
        None => 1.0,
        Some(raw) if raw.is_blank_marker() => 1.0,
        Some(raw) => to_finite(Some(raw), 0.0),
    }
}
