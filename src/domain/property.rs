//! Property data types, typed property values and reservation access

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::errors::ClientError;

/// Reservation access level, sent by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessType {
    ReadOnly,
    #[default]
    ReadWrite,
}

/// Data-type tag the chassis attaches to property values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyDataType {
    Bool,
    Double,
    Int32,
    Int64,
    String,
    Uint32,
    Uint64,
    BoolArray,
    DoubleArray,
    Int32Array,
    Int64Array,
    StringArray,
    Uint32Array,
    Uint64Array,
}

const ALL_DATA_TYPES: [PropertyDataType; 14] = [
    PropertyDataType::Bool,
    PropertyDataType::Double,
    PropertyDataType::Int32,
    PropertyDataType::Int64,
    PropertyDataType::String,
    PropertyDataType::Uint32,
    PropertyDataType::Uint64,
    PropertyDataType::BoolArray,
    PropertyDataType::DoubleArray,
    PropertyDataType::Int32Array,
    PropertyDataType::Int64Array,
    PropertyDataType::StringArray,
    PropertyDataType::Uint32Array,
    PropertyDataType::Uint64Array,
];

impl PropertyDataType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Double => "Double",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::String => "String",
            Self::Uint32 => "Uint32",
            Self::Uint64 => "Uint64",
            Self::BoolArray => "BoolArray",
            Self::DoubleArray => "DoubleArray",
            Self::Int32Array => "Int32Array",
            Self::Int64Array => "Int64Array",
            Self::StringArray => "StringArray",
            Self::Uint32Array => "Uint32Array",
            Self::Uint64Array => "Uint64Array",
        }
    }

    /// Numeric code, 1 (`Bool`) through 14 (`Uint64Array`).
    pub fn code(self) -> u64 {
        ALL_DATA_TYPES
            .iter()
            .position(|candidate| *candidate == self)
            .map_or(0, |index| index as u64 + 1)
    }

    pub fn from_code(code: u64) -> Option<Self> {
        let index = usize::try_from(code).ok()?.checked_sub(1)?;
        ALL_DATA_TYPES.get(index).copied()
    }

    /// Reads a raw tag as sent by the chassis: a name or a numeric code.
    pub fn from_tag(tag: &Value) -> Result<Self, ClientError> {
        match tag {
            Value::String(name) => name.parse(),
            Value::Number(number) => number
                .as_u64()
                .and_then(Self::from_code)
                .ok_or_else(|| ClientError::UnknownDataType(number.to_string())),
            other => Err(ClientError::UnknownDataType(other.to_string())),
        }
    }

    /// Decodes a raw result value against this tag.
    pub fn decode(self, value: &Value) -> Result<PropertyValue, ClientError> {
        let mismatch = || ClientError::value_mismatch(self.name(), value);

        let decoded = match self {
            Self::Bool => PropertyValue::Bool(value.as_bool().ok_or_else(mismatch)?),
            Self::Double => PropertyValue::Double(value.as_f64().ok_or_else(mismatch)?),
            Self::Int32 => PropertyValue::Int32(as_i32(value).ok_or_else(mismatch)?),
            Self::Int64 => PropertyValue::Int64(as_i64(value).ok_or_else(mismatch)?),
            Self::String => PropertyValue::String(value.as_str().ok_or_else(mismatch)?.to_string()),
            Self::Uint32 => PropertyValue::Uint32(as_u32(value).ok_or_else(mismatch)?),
            Self::Uint64 => PropertyValue::Uint64(as_u64(value).ok_or_else(mismatch)?),
            Self::BoolArray => {
                PropertyValue::BoolArray(decode_array(value, Value::as_bool).ok_or_else(mismatch)?)
            }
            Self::DoubleArray => {
                PropertyValue::DoubleArray(decode_array(value, Value::as_f64).ok_or_else(mismatch)?)
            }
            Self::Int32Array => {
                PropertyValue::Int32Array(decode_array(value, as_i32).ok_or_else(mismatch)?)
            }
            Self::Int64Array => {
                PropertyValue::Int64Array(decode_array(value, as_i64).ok_or_else(mismatch)?)
            }
            Self::StringArray => PropertyValue::StringArray(
                decode_array(value, |item| item.as_str().map(str::to_string))
                    .ok_or_else(mismatch)?,
            ),
            Self::Uint32Array => {
                PropertyValue::Uint32Array(decode_array(value, as_u32).ok_or_else(mismatch)?)
            }
            Self::Uint64Array => {
                PropertyValue::Uint64Array(decode_array(value, as_u64).ok_or_else(mismatch)?)
            }
        };

        Ok(decoded)
    }
}

impl fmt::Display for PropertyDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PropertyDataType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_DATA_TYPES
            .iter()
            .copied()
            .find(|candidate| candidate.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ClientError::UnknownDataType(s.to_string()))
    }
}

impl Serialize for PropertyDataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for PropertyDataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = Value::deserialize(deserializer)?;
        Self::from_tag(&tag).map_err(serde::de::Error::custom)
    }
}

/// A property value paired with its data type.
///
/// Serializes as the bare JSON value the chassis expects in `setProperty`.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Double(f64),
    Int32(i32),
    Int64(i64),
    String(String),
    Uint32(u32),
    Uint64(u64),
    BoolArray(Vec<bool>),
    DoubleArray(Vec<f64>),
    Int32Array(Vec<i32>),
    Int64Array(Vec<i64>),
    StringArray(Vec<String>),
    Uint32Array(Vec<u32>),
    Uint64Array(Vec<u64>),
}

impl PropertyValue {
    pub fn data_type(&self) -> PropertyDataType {
        match self {
            Self::Bool(_) => PropertyDataType::Bool,
            Self::Double(_) => PropertyDataType::Double,
            Self::Int32(_) => PropertyDataType::Int32,
            Self::Int64(_) => PropertyDataType::Int64,
            Self::String(_) => PropertyDataType::String,
            Self::Uint32(_) => PropertyDataType::Uint32,
            Self::Uint64(_) => PropertyDataType::Uint64,
            Self::BoolArray(_) => PropertyDataType::BoolArray,
            Self::DoubleArray(_) => PropertyDataType::DoubleArray,
            Self::Int32Array(_) => PropertyDataType::Int32Array,
            Self::Int64Array(_) => PropertyDataType::Int64Array,
            Self::StringArray(_) => PropertyDataType::StringArray,
            Self::Uint32Array(_) => PropertyDataType::Uint32Array,
            Self::Uint64Array(_) => PropertyDataType::Uint64Array,
        }
    }

    /// The bare JSON form; `Serialize` goes through here too.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(value) => Value::from(*value),
            Self::Double(value) => Value::from(*value),
            Self::Int32(value) => Value::from(*value),
            Self::Int64(value) => Value::from(*value),
            Self::String(value) => Value::from(value.as_str()),
            Self::Uint32(value) => Value::from(*value),
            Self::Uint64(value) => Value::from(*value),
            Self::BoolArray(values) => Value::from(values.clone()),
            Self::DoubleArray(values) => Value::from(values.clone()),
            Self::Int32Array(values) => Value::from(values.clone()),
            Self::Int64Array(values) => Value::from(values.clone()),
            Self::StringArray(values) => Value::from(values.clone()),
            Self::Uint32Array(values) => Value::from(values.clone()),
            Self::Uint64Array(values) => Value::from(values.clone()),
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_scalar!(
    bool => Bool,
    f64 => Double,
    i32 => Int32,
    i64 => Int64,
    String => String,
    u32 => Uint32,
    u64 => Uint64,
    Vec<bool> => BoolArray,
    Vec<f64> => DoubleArray,
    Vec<i32> => Int32Array,
    Vec<i64> => Int64Array,
    Vec<String> => StringArray,
    Vec<u32> => Uint32Array,
    Vec<u64> => Uint64Array,
);

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

// 64-bit integers may arrive as decimal strings.
fn as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|text| text.parse().ok()))
}

fn as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|text| text.parse().ok()))
}

fn as_i32(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|number| i32::try_from(number).ok())
}

fn as_u32(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|number| u32::try_from(number).ok())
}

fn decode_array<T>(value: &Value, item: impl Fn(&Value) -> Option<T>) -> Option<Vec<T>> {
    value.as_array()?.iter().map(item).collect()
}
