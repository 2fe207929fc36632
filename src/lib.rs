//! Medley - a polymorphic MEDIAN aggregate for SQL engines.
//!
//! Medley computes the median of a dynamically-typed sequence of values
//! and supports the four execution modes an aggregation engine may ask
//! for: one-pass accumulation, moving-window accumulation with
//! retraction, parallel accumulation combined by merge, and transport of
//! partial state across process boundaries via a binary wire format.
//!
//! # Example
//!
//! ```rust
//! use medley::{Accumulator, MedianAccumulator, Value};
//!
//! let mut acc = MedianAccumulator::new();
//! for v in [1, 9, 2, 7, 2] {
//!     acc.accumulate(&Value::int64(v)).unwrap();
//! }
//! assert_eq!(acc.finalize().unwrap(), Value::int64(2));
//! ```
//!
//! Partial states built on different workers are combined with
//! [`Accumulator::merge`]; [`MedianAccumulator::serialize_state`] and
//! [`MedianAccumulator::from_serialized`] carry a state across a process
//! boundary first when the workers share no memory.

pub use medley_core::error::{Error, Result};
pub use medley_core::types::{DataType, PhysicalClass, TypeComparator, Value};
pub use medley_functions::{
    Accumulator, AggregateFunction, FunctionRegistry, MedianAccumulator, MedianFunction,
    MedianState,
};
