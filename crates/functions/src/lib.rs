//! Aggregate function implementations for Medley.
//!
//! The centerpiece is the MEDIAN aggregate: a polymorphic accumulator that
//! collects dynamically-typed values, supports moving-aggregate retraction,
//! merges partial states built in parallel, and round-trips its state
//! through a self-describing binary wire format.

#![warn(rustdoc::broken_intra_doc_links)]

pub mod aggregate;

mod registry;

pub use aggregate::{Accumulator, AggregateFunction, MedianAccumulator, MedianFunction, MedianState};
pub use registry::FunctionRegistry;
