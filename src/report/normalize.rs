//! Conversion of raw attribute and tag values into JSON values.

use serde_json::{Number, Value};

use crate::error::NormalizeError;
use crate::source::{RawValue, TagValue};

/// Normalize a raw attribute value.
///
/// Tuples and sets become lists (sets keep the order they were read in).
/// Coded values become their name, or the bare code when it has none.
/// Non-finite floats become null. Data type objects and unit references
/// have no JSON form and are refused.
pub fn normalize(raw: &RawValue) -> Result<Value, NormalizeError> {
    match raw {
        RawValue::Null => Ok(Value::Null),
        RawValue::Bool(b) => Ok(Value::Bool(*b)),
        RawValue::Int(i) => Ok(Value::from(*i)),
        RawValue::UInt(u) => Ok(Value::from(*u)),
        RawValue::Float(f) => Ok(float(*f)),
        RawValue::Str(s) => Ok(Value::String(s.clone())),
        RawValue::Tuple(items) | RawValue::Set(items) => items
            .iter()
            .map(normalize)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        RawValue::Code(coded) => Ok(match coded.name {
            Some(name) => Value::String(name.to_string()),
            None => Value::from(coded.code),
        }),
        RawValue::DataType(_) | RawValue::Unit(_) => {
            Err(NormalizeError::Unrepresentable(raw.kind()))
        }
    }
}

/// Normalize a decoded tag value.
///
/// Byte buffers become `0x`-prefixed hex. Rationals become their quotient,
/// null for a zero denominator. A single number stays a scalar and several
/// become a list.
pub fn normalize_tag_value(value: &TagValue) -> Value {
    match value {
        TagValue::Bytes(bytes) => Value::String(format!("0x{}", hex::encode(bytes))),
        TagValue::Ascii(text) => Value::String(text.clone()),
        TagValue::Unsigned(values) => scalar_or_list(values.iter().map(|&v| Value::from(v))),
        TagValue::Signed(values) => scalar_or_list(values.iter().map(|&v| Value::from(v))),
        TagValue::Float(values) => scalar_or_list(values.iter().map(|&v| float(v))),
        TagValue::Rational(pairs) => {
            scalar_or_list(pairs.iter().map(|&(n, d)| quotient(n as f64, d as f64)))
        }
        TagValue::SRational(pairs) => {
            scalar_or_list(pairs.iter().map(|&(n, d)| quotient(n as f64, d as f64)))
        }
    }
}

/// `0x` and 8 lowercase hex digits of the lower 32 bits.
pub fn hash_hex(raw: i64) -> String {
    format!("0x{:08x}", (raw as u64) & 0xFFFF_FFFF)
}

/// Description of a SampleFormat code.
pub fn sampleformat_text(code: u64) -> &'static str {
    match code {
        1 => "Unsigned integer data",
        2 => "Two's complement signed integer data",
        3 => "IEEE floating-point data",
        4 => "Undefined data format",
        _ => "Unknown format",
    }
}

fn float(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn quotient(numerator: f64, denominator: f64) -> Value {
    if denominator == 0.0 {
        Value::Null
    } else {
        float(numerator / denominator)
    }
}

fn scalar_or_list(mut values: impl ExactSizeIterator<Item = Value>) -> Value {
    if values.len() == 1 {
        values.next().unwrap_or(Value::Null)
    } else {
        Value::Array(values.collect())
    }
}
