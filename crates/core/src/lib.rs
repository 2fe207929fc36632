//! Core value model for the Medley median aggregate.
//!
//! This crate owns the dynamically-typed [`types::Value`] representation,
//! the [`types::DataType`] enumeration with its wire identifiers and
//! physical layout classes, per-type comparator resolution, and the shared
//! error type.

pub mod diagnostics;
pub mod error;
pub mod types;
