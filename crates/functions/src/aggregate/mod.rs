//! Aggregate function traits and implementations.

use std::any::Any;

use medley_core::error::{Error, Result};
use medley_core::types::{DataType, Value};

pub mod median;
pub mod wire;

pub use median::{MedianAccumulator, MedianFunction, MedianState};

/// Incremental computation state for one aggregation group.
///
/// An accumulator is owned and mutated by exactly one context; parallel
/// execution builds independent accumulators and combines them with
/// [`Accumulator::merge`].
pub trait Accumulator {
    /// Folds one input value into the state. Null inputs are ignored.
    fn accumulate(&mut self, value: &Value) -> Result<()>;

    /// Inverse of [`Accumulator::accumulate`], used in moving-aggregate
    /// (sliding window) mode. Aggregates without an inverse keep the
    /// default, which reports the feature as unsupported.
    fn retract(&mut self, _value: &Value) -> Result<()> {
        Err(Error::unsupported_feature(
            "aggregate does not support moving-aggregate retraction".to_string(),
        ))
    }

    /// Folds another accumulator of the same concrete type into this one.
    /// The source is not mutated.
    fn merge(&mut self, other: &dyn Accumulator) -> Result<()>;

    /// Produces the aggregate result. Does not consume the state.
    fn finalize(&self) -> Result<Value>;

    /// Returns the accumulator to its pristine, uninitialized condition.
    fn reset(&mut self);

    fn as_any(&self) -> &dyn Any;
}

/// Descriptor for an aggregate function: its name, signature and how to
/// create a fresh accumulator for it.
pub trait AggregateFunction {
    fn name(&self) -> &str;

    fn arg_types(&self) -> &[DataType];

    fn return_type(&self, arg_types: &[DataType]) -> Result<DataType>;

    fn create_accumulator(&self) -> Box<dyn Accumulator>;
}
