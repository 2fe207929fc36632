pub mod compare;

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use compare::TypeComparator;

/// The closed set of element types the median aggregate understands.
///
/// Every variant except `Unknown` has a stable wire identifier and a
/// physical layout class; the comparator resolver covers the same set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Unknown,
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    Numeric,
    String,
    Bytes,
    Date,
    Timestamp,
}

/// How values of a type are laid out in memory and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalClass {
    /// Fits in a machine word; encoded as raw fixed-width bytes.
    FixedInline(usize),
    /// Known fixed width, but held behind a reference (e.g. 16-byte decimals).
    /// Encoded identically to inline values.
    FixedByRef(usize),
    /// Length varies per value; encoded with a 4-byte length prefix.
    Variable,
}

impl DataType {
    /// Stable identifier used by the serialized state format. Must not be
    /// renumbered: old and new workers in the same parallel execution
    /// exchange these ids.
    pub fn wire_id(&self) -> u32 {
        match self {
            DataType::Unknown => 0,
            DataType::Bool => 1,
            DataType::Int32 => 2,
            DataType::Int64 => 3,
            DataType::Float32 => 4,
            DataType::Float64 => 5,
            DataType::Numeric => 6,
            DataType::String => 7,
            DataType::Bytes => 8,
            DataType::Date => 9,
            DataType::Timestamp => 10,
        }
    }

    pub fn from_wire_id(id: u32) -> Option<DataType> {
        match id {
            1 => Some(DataType::Bool),
            2 => Some(DataType::Int32),
            3 => Some(DataType::Int64),
            4 => Some(DataType::Float32),
            5 => Some(DataType::Float64),
            6 => Some(DataType::Numeric),
            7 => Some(DataType::String),
            8 => Some(DataType::Bytes),
            9 => Some(DataType::Date),
            10 => Some(DataType::Timestamp),
            _ => None,
        }
    }

    pub fn physical_class(&self) -> PhysicalClass {
        match self {
            DataType::Bool => PhysicalClass::FixedInline(1),
            DataType::Int32 | DataType::Float32 | DataType::Date => PhysicalClass::FixedInline(4),
            DataType::Int64 | DataType::Float64 | DataType::Timestamp => {
                PhysicalClass::FixedInline(8)
            }
            DataType::Numeric => PhysicalClass::FixedByRef(16),
            DataType::String | DataType::Bytes | DataType::Unknown => PhysicalClass::Variable,
        }
    }

    /// Whether an even-count median interpolates the two middle elements.
    /// Types outside this set fall back to the lower middle element.
    pub fn is_averaging(&self) -> bool {
        matches!(
            self,
            DataType::Int32
                | DataType::Int64
                | DataType::Float32
                | DataType::Float64
                | DataType::Numeric
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Unknown => write!(f, "UNKNOWN"),
            DataType::Bool => write!(f, "BOOL"),
            DataType::Int32 => write!(f, "INT32"),
            DataType::Int64 => write!(f, "INT64"),
            DataType::Float32 => write!(f, "FLOAT32"),
            DataType::Float64 => write!(f, "FLOAT64"),
            DataType::Numeric => write!(f, "NUMERIC"),
            DataType::String => write!(f, "STRING"),
            DataType::Bytes => write!(f, "BYTES"),
            DataType::Date => write!(f, "DATE"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

/// A single dynamically-typed datum.
///
/// Equality is structural and deliberately independent of the ordering
/// comparator; the moving-aggregate removal path matches on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Numeric(Decimal),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Value {
    #[inline]
    pub const fn null() -> Self {
        Value::Null
    }

    #[inline]
    pub const fn bool(value: bool) -> Self {
        Value::Bool(value)
    }

    #[inline]
    pub const fn int32(value: i32) -> Self {
        Value::Int32(value)
    }

    #[inline]
    pub const fn int64(value: i64) -> Self {
        Value::Int64(value)
    }

    #[inline]
    pub const fn float32(value: f32) -> Self {
        Value::Float32(value)
    }

    #[inline]
    pub const fn float64(value: f64) -> Self {
        Value::Float64(value)
    }

    #[inline]
    pub const fn numeric(value: Decimal) -> Self {
        Value::Numeric(value)
    }

    #[inline]
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    #[inline]
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(value.into())
    }

    #[inline]
    pub const fn date(value: NaiveDate) -> Self {
        Value::Date(value)
    }

    #[inline]
    pub const fn timestamp(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Unknown,
            Value::Bool(_) => DataType::Bool,
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::Float32(_) => DataType::Float32,
            Value::Float64(_) => DataType::Float64,
            Value::Numeric(_) => DataType::Numeric,
            Value::String(_) => DataType::String,
            Value::Bytes(_) => DataType::Bytes,
            Value::Date(_) => DataType::Date,
            Value::Timestamp(_) => DataType::Timestamp,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(i) => Some(i64::from(*i)),
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float32(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(f) => Some(f64::from(*f)),
            Value::Float64(f) => Some(*f),
            Value::Int32(i) => Some(f64::from(*i)),
            Value::Int64(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<Decimal> {
        match self {
            Value::Numeric(d) => Some(*d),
            Value::Int32(i) => Some(Decimal::from(*i)),
            Value::Int64(i) => Some(Decimal::from(*i)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Numeric(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Date(d) => write!(f, "{}", d),
            Value::Timestamp(ts) => write!(f, "{}", ts),
        }
    }
}
