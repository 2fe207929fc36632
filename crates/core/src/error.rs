use std::fmt;

use crate::diagnostics;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("could not identify a comparison function for type {0}")]
    ComparatorNotFound(String),

    #[error("invalid aggregate state: {0}")]
    InvalidState(String),

    #[error("corrupt serialized aggregate state: {0}")]
    CorruptWireData(String),

    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("Arithmetic overflow in {operation}: {left} and {right}")]
    ArithmeticOverflow {
        operation: String,

        left: String,

        right: String,
    },

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn type_mismatch(expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn type_mismatch_value(expected: impl fmt::Display, value: &crate::types::Value) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            actual: value.data_type().to_string(),
        }
    }

    pub fn comparator_not_found(type_name: impl fmt::Display) -> Self {
        Error::ComparatorNotFound(type_name.to_string())
    }

    pub fn invalid_state(msg: impl fmt::Display) -> Self {
        Error::InvalidState(msg.to_string())
    }

    pub fn corrupt_wire_data(msg: impl fmt::Display) -> Self {
        Error::CorruptWireData(msg.to_string())
    }

    pub fn unsupported_feature(msg: impl fmt::Display) -> Self {
        Error::UnsupportedFeature(msg.to_string())
    }

    pub fn arithmetic_overflow(
        operation: impl fmt::Display,
        left: impl fmt::Display,
        right: impl fmt::Display,
    ) -> Self {
        Error::ArithmeticOverflow {
            operation: operation.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn internal(msg: impl fmt::Display) -> Self {
        Error::InternalError(msg.to_string())
    }

    pub fn sqlstate(&self) -> &'static str {
        match self {
            Error::TypeMismatch { .. } => diagnostics::DATA_EXCEPTION.as_str(),
            Error::ComparatorNotFound(_) => diagnostics::UNDEFINED_FUNCTION.as_str(),
            Error::InvalidState(_) => diagnostics::OBJECT_NOT_IN_PREREQUISITE_STATE.as_str(),
            Error::CorruptWireData(_) => diagnostics::INVALID_BINARY_REPRESENTATION.as_str(),
            Error::UnsupportedFeature(_) => diagnostics::FEATURE_NOT_SUPPORTED.as_str(),
            Error::ArithmeticOverflow { .. } => diagnostics::NUMERIC_VALUE_OUT_OF_RANGE.as_str(),
            Error::InternalError(_) | Error::Other(_) => diagnostics::INTERNAL_ERROR.as_str(),
        }
    }

    pub fn details(&self) -> Option<String> {
        match self {
            Error::TypeMismatch { expected, actual } => Some(format!(
                "Expected type: {}, Actual type: {}",
                expected, actual
            )),
            Error::ArithmeticOverflow {
                operation,
                left,
                right,
            } => Some(format!(
                "Operation {} overflowed for operands {} and {}",
                operation, left, right
            )),
            _ => None,
        }
    }
}
