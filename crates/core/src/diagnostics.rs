//! SQLSTATE codes reported alongside errors, for hosts that surface them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlState(&'static str);

impl SqlState {
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

pub const DATA_EXCEPTION: SqlState = SqlState("22000");
pub const NUMERIC_VALUE_OUT_OF_RANGE: SqlState = SqlState("22003");
pub const INVALID_BINARY_REPRESENTATION: SqlState = SqlState("22P03");
pub const FEATURE_NOT_SUPPORTED: SqlState = SqlState("0A000");
pub const UNDEFINED_FUNCTION: SqlState = SqlState("42883");
pub const OBJECT_NOT_IN_PREREQUISITE_STATE: SqlState = SqlState("55000");
pub const INTERNAL_ERROR: SqlState = SqlState("XX000");
