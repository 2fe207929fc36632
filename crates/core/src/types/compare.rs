//! Per-type comparator resolution.
//!
//! A [`TypeComparator`] is resolved once when an aggregate state is created
//! (or recreated from the wire) and cached in the state, so the lookup cost
//! is not paid per comparison. The comparator itself is never serialized.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::types::{DataType, Value};

/// A cached three-way comparison capability for one element type.
#[derive(Debug, Clone, Copy)]
pub struct TypeComparator {
    element_type: DataType,
    cmp: fn(&Value, &Value) -> Ordering,
}

impl TypeComparator {
    /// Looks up the comparison function for `element_type`.
    ///
    /// Fails with [`Error::ComparatorNotFound`] when the type has no
    /// defined ordering; aggregation over such a type cannot proceed.
    pub fn resolve(element_type: &DataType) -> Result<Self> {
        let cmp = match element_type {
            DataType::Bool => compare_bool,
            DataType::Int32 => compare_int32,
            DataType::Int64 => compare_int64,
            DataType::Float32 => compare_float32,
            DataType::Float64 => compare_float64,
            DataType::Numeric => compare_numeric,
            DataType::String => compare_string,
            DataType::Bytes => compare_bytes,
            DataType::Date => compare_date,
            DataType::Timestamp => compare_timestamp,
            DataType::Unknown => {
                return Err(Error::comparator_not_found(element_type.to_string()));
            }
        };
        Ok(Self {
            element_type: *element_type,
            cmp,
        })
    }

    pub fn element_type(&self) -> &DataType {
        &self.element_type
    }

    #[inline]
    pub fn compare(&self, left: &Value, right: &Value) -> Ordering {
        (self.cmp)(left, right)
    }
}

// The engine only hands homogeneous, non-null pairs to a comparator;
// anything else sorts as equal rather than poisoning the sort.

fn compare_bool(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
        _ => Ordering::Equal,
    }
}

fn compare_int32(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Int32(l), Value::Int32(r)) => l.cmp(r),
        _ => Ordering::Equal,
    }
}

fn compare_int64(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Int64(l), Value::Int64(r)) => l.cmp(r),
        _ => Ordering::Equal,
    }
}

fn compare_float32(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Float32(l), Value::Float32(r)) => l.total_cmp(r),
        _ => Ordering::Equal,
    }
}

fn compare_float64(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Float64(l), Value::Float64(r)) => l.total_cmp(r),
        _ => Ordering::Equal,
    }
}

fn compare_numeric(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Numeric(l), Value::Numeric(r)) => l.cmp(r),
        _ => Ordering::Equal,
    }
}

fn compare_string(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::String(l), Value::String(r)) => l.cmp(r),
        _ => Ordering::Equal,
    }
}

fn compare_bytes(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bytes(l), Value::Bytes(r)) => l.cmp(r),
        _ => Ordering::Equal,
    }
}

fn compare_date(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Date(l), Value::Date(r)) => l.cmp(r),
        _ => Ordering::Equal,
    }
}

fn compare_timestamp(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Timestamp(l), Value::Timestamp(r)) => l.cmp(r),
        _ => Ordering::Equal,
    }
}
