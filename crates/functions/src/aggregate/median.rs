//! The MEDIAN aggregate.
//!
//! Values are collected unordered into a growable buffer; sorting is
//! deferred until the final result is requested. Even-count medians are
//! interpolated only for types where an arithmetic mean is meaningful
//! (see [`DataType::is_averaging`]); ordinal-only types such as strings
//! and timestamps yield the lower of the two middle elements instead.

use debug_print::debug_eprintln;
use medley_core::error::{Error, Result};
use medley_core::types::{DataType, TypeComparator, Value};
use rust_decimal::Decimal;

use super::{wire, Accumulator, AggregateFunction};

const DYNAMIC_ARG: &[DataType] = &[DataType::Unknown];

pub(crate) const INITIAL_CAPACITY: usize = 8;

/// Working state for one median computation.
///
/// The state is created from the first input value seen for a group and
/// caches the comparator resolved for that value's type. `capacity` is
/// tracked explicitly (doubling on exhaustion) because it travels on the
/// wire as a preallocation hint for the receiving side.
#[derive(Debug, Clone)]
pub struct MedianState {
    element_type: DataType,
    values: Vec<Value>,
    capacity: usize,
    comparator: TypeComparator,
}

impl MedianState {
    pub fn new(element_type: DataType) -> Result<Self> {
        Self::with_capacity(element_type, INITIAL_CAPACITY)
    }

    pub fn with_capacity(element_type: DataType, capacity: usize) -> Result<Self> {
        let comparator = TypeComparator::resolve(&element_type)?;
        Ok(Self {
            element_type,
            values: Vec::with_capacity(capacity),
            capacity,
            comparator,
        })
    }

    pub fn element_type(&self) -> &DataType {
        &self.element_type
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Appends a non-null value. Amortized O(1): the tracked capacity
    /// doubles whenever the buffer is full. No ordering is imposed here.
    pub fn insert(&mut self, value: Value) -> Result<()> {
        if value.is_null() {
            return Err(Error::internal(
                "null values must be filtered before insertion",
            ));
        }
        if value.data_type() != self.element_type {
            return Err(Error::type_mismatch_value(&self.element_type, &value));
        }
        self.grow_for_push();
        self.values.push(value);
        Ok(())
    }

    /// Removes the first element structurally equal to `value`, shifting
    /// later elements left to close the gap. Returns whether a match was
    /// found; an absent value is a no-op, not an error, because a window
    /// may request eviction of a duplicate that an earlier removal already
    /// took out.
    pub fn remove(&mut self, value: &Value) -> bool {
        match self.values.iter().position(|v| v == value) {
            Some(idx) => {
                self.values.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Multiset union: folds every element of `source` into this state.
    ///
    /// An empty destination adopts a structural copy of the source
    /// (including its capacity hint); otherwise elements are re-inserted
    /// one by one. The resulting multiset is independent of merge order;
    /// the physical order is not.
    pub fn merge_from(&mut self, source: &MedianState) -> Result<()> {
        if self.values.is_empty() {
            *self = source.clone();
            return Ok(());
        }
        if source.element_type != self.element_type {
            return Err(Error::type_mismatch(
                &self.element_type,
                &source.element_type,
            ));
        }
        for value in &source.values {
            self.insert(value.clone())?;
        }
        Ok(())
    }

    /// Computes the median without consuming the state.
    ///
    /// Sorts a copy of the buffer with the cached comparator; ties are
    /// unordered relative to each other. Empty input yields SQL NULL.
    pub fn median(&self) -> Result<Value> {
        if self.values.is_empty() {
            return Ok(Value::null());
        }

        let mut sorted = self.values.clone();
        let comparator = self.comparator;
        sorted.sort_unstable_by(|a, b| comparator.compare(a, b));

        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            Ok(sorted[mid].clone())
        } else {
            average_pair(&self.element_type, &sorted[mid - 1], &sorted[mid])
        }
    }

    fn grow_for_push(&mut self) {
        if self.values.len() >= self.capacity {
            self.capacity = (self.capacity * 2).max(INITIAL_CAPACITY);
            self.values
                .reserve_exact(self.capacity - self.values.len());
        }
    }

    /// Used by wire decoding, which preallocates from the decoded capacity
    /// hint and may legitimately carry explicit nulls.
    pub(crate) fn push_decoded(&mut self, value: Value) {
        self.grow_for_push();
        self.values.push(value);
    }
}

/// Arithmetic mean of the two middle elements, with each averaging type's
/// own add/divide semantics. Integer division truncates; NUMERIC division
/// is exact. Non-averaging types fall back to the lower middle element.
fn average_pair(element_type: &DataType, left: &Value, right: &Value) -> Result<Value> {
    match element_type {
        DataType::Int32 => {
            let l = left
                .as_i32()
                .ok_or_else(|| Error::type_mismatch_value(element_type, left))?;
            let r = right
                .as_i32()
                .ok_or_else(|| Error::type_mismatch_value(element_type, right))?;
            // Widen so the sum cannot overflow; the mean always fits back.
            let avg = (i64::from(l) + i64::from(r)) / 2;
            Ok(Value::int32(avg as i32))
        }
        DataType::Int64 => {
            let l = left
                .as_i64()
                .ok_or_else(|| Error::type_mismatch_value(element_type, left))?;
            let r = right
                .as_i64()
                .ok_or_else(|| Error::type_mismatch_value(element_type, right))?;
            let avg = (i128::from(l) + i128::from(r)) / 2;
            Ok(Value::int64(avg as i64))
        }
        DataType::Float32 => {
            let l = left
                .as_f32()
                .ok_or_else(|| Error::type_mismatch_value(element_type, left))?;
            let r = right
                .as_f32()
                .ok_or_else(|| Error::type_mismatch_value(element_type, right))?;
            Ok(Value::float32((l + r) / 2.0))
        }
        DataType::Float64 => {
            let l = left
                .as_f64()
                .ok_or_else(|| Error::type_mismatch_value(element_type, left))?;
            let r = right
                .as_f64()
                .ok_or_else(|| Error::type_mismatch_value(element_type, right))?;
            Ok(Value::float64((l + r) / 2.0))
        }
        DataType::Numeric => {
            let l = left
                .as_numeric()
                .ok_or_else(|| Error::type_mismatch_value(element_type, left))?;
            let r = right
                .as_numeric()
                .ok_or_else(|| Error::type_mismatch_value(element_type, right))?;
            let sum = l
                .checked_add(r)
                .ok_or_else(|| Error::arithmetic_overflow("NUMERIC average", l, r))?;
            let avg = sum
                .checked_div(Decimal::TWO)
                .ok_or_else(|| Error::arithmetic_overflow("NUMERIC average", l, r))?;
            Ok(Value::numeric(avg))
        }
        // No meaningful mean: the lower of the two middle elements.
        _ => Ok(left.clone()),
    }
}

/// Accumulator for the MEDIAN aggregate.
///
/// The inner state is created lazily from the first non-null input, which
/// fixes the element type for the rest of the aggregation.
#[derive(Debug, Clone, Default)]
pub struct MedianAccumulator {
    state: Option<MedianState>,
}

impl MedianAccumulator {
    pub fn new() -> Self {
        Self { state: None }
    }

    pub fn state(&self) -> Option<&MedianState> {
        self.state.as_ref()
    }

    /// Encodes the state for transport across a worker boundary.
    /// An accumulator that has seen no input has no state to encode.
    pub fn serialize_state(&self) -> Result<Vec<u8>> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| Error::invalid_state("cannot serialize an uninitialized accumulator"))?;
        wire::encode(state)
    }

    /// Recreates an accumulator from bytes produced by
    /// [`MedianAccumulator::serialize_state`] in another context.
    pub fn from_serialized(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            state: Some(wire::decode(bytes)?),
        })
    }
}

impl Accumulator for MedianAccumulator {
    fn accumulate(&mut self, value: &Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        let state = match &mut self.state {
            Some(state) => state,
            slot => slot.insert(MedianState::new(value.data_type())?),
        };
        state.insert(value.clone())
    }

    fn retract(&mut self, value: &Value) -> Result<()> {
        let state = self.state.as_mut().ok_or_else(|| {
            Error::invalid_state("MEDIAN retraction requested before any input was accumulated")
        })?;
        if value.is_null() {
            return Ok(());
        }
        if !state.remove(value) {
            // The matching duplicate may already have been evicted.
            debug_eprintln!("[aggregate::median] retract of absent value {} ignored", value);
        }
        Ok(())
    }

    fn merge(&mut self, other: &dyn Accumulator) -> Result<()> {
        let other = other
            .as_any()
            .downcast_ref::<MedianAccumulator>()
            .ok_or_else(|| Error::internal("MEDIAN merge requires a MEDIAN accumulator"))?;
        let source = match &other.state {
            Some(source) => source,
            None => return Ok(()),
        };
        match &mut self.state {
            Some(destination) => destination.merge_from(source),
            None => {
                self.state = Some(source.clone());
                Ok(())
            }
        }
    }

    fn finalize(&self) -> Result<Value> {
        match &self.state {
            Some(state) => state.median(),
            None => Ok(Value::null()),
        }
    }

    fn reset(&mut self) {
        self.state = None;
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MedianFunction;

impl AggregateFunction for MedianFunction {
    fn name(&self) -> &str {
        "MEDIAN"
    }

    fn arg_types(&self) -> &[DataType] {
        DYNAMIC_ARG
    }

    fn return_type(&self, arg_types: &[DataType]) -> Result<DataType> {
        Ok(arg_types.first().copied().unwrap_or(DataType::Unknown))
    }

    fn create_accumulator(&self) -> Box<dyn Accumulator> {
        Box::new(MedianAccumulator::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulate_ints(values: &[i64]) -> MedianAccumulator {
        let mut acc = MedianAccumulator::new();
        for v in values {
            acc.accumulate(&Value::int64(*v)).unwrap();
        }
        acc
    }

    #[test]
    fn test_odd_count_integer_median() {
        let acc = accumulate_ints(&[1, 2, 2, 2, 7, 9, -3]);
        assert_eq!(acc.finalize().unwrap(), Value::int64(2));
    }

    #[test]
    fn test_three_values_median() {
        let acc = accumulate_ints(&[0, 7, 99]);
        assert_eq!(acc.finalize().unwrap(), Value::int64(7));
    }

    #[test]
    fn test_even_count_integer_median_truncates() {
        let acc = accumulate_ints(&[0, 7, 99, 2]);
        // sorted {0, 2, 7, 99}: (2 + 7) / 2 with integer division
        assert_eq!(acc.finalize().unwrap(), Value::int64(4));
    }

    #[test]
    fn test_even_count_int32_median() {
        let mut acc = MedianAccumulator::new();
        for v in [10i32, 21, 30, 40] {
            acc.accumulate(&Value::int32(v)).unwrap();
        }
        assert_eq!(acc.finalize().unwrap(), Value::int32(25));
    }

    #[test]
    fn test_even_count_float_median() {
        let mut acc = MedianAccumulator::new();
        for v in [1.0f64, 2.0, 3.0, 4.0] {
            acc.accumulate(&Value::float64(v)).unwrap();
        }
        assert_eq!(acc.finalize().unwrap(), Value::float64(2.5));
    }

    #[test]
    fn test_even_count_float32_median() {
        let mut acc = MedianAccumulator::new();
        for v in [1.0f32, 2.0] {
            acc.accumulate(&Value::float32(v)).unwrap();
        }
        assert_eq!(acc.finalize().unwrap(), Value::float32(1.5));
    }

    #[test]
    fn test_even_count_numeric_median_is_exact() {
        let mut acc = MedianAccumulator::new();
        for v in ["1.1", "2.2", "3.3", "4.4"] {
            let d: Decimal = v.parse().unwrap();
            acc.accumulate(&Value::numeric(d)).unwrap();
        }
        let expected: Decimal = "2.75".parse().unwrap();
        assert_eq!(acc.finalize().unwrap(), Value::numeric(expected));
    }

    #[test]
    fn test_even_count_text_median_uses_lower_middle() {
        let mut acc = MedianAccumulator::new();
        for s in ["apple", "banana", "cherry", "date"] {
            acc.accumulate(&Value::string(s)).unwrap();
        }
        assert_eq!(acc.finalize().unwrap(), Value::string("banana"));
    }

    #[test]
    fn test_even_count_timestamp_median_uses_lower_middle() {
        use chrono::DateTime;
        let early = DateTime::from_timestamp_micros(1_000_000).unwrap();
        let late = DateTime::from_timestamp_micros(9_000_000).unwrap();
        let mut acc = MedianAccumulator::new();
        acc.accumulate(&Value::timestamp(late)).unwrap();
        acc.accumulate(&Value::timestamp(early)).unwrap();
        assert_eq!(acc.finalize().unwrap(), Value::timestamp(early));
    }

    #[test]
    fn test_empty_accumulator_finalizes_to_null() {
        let acc = MedianAccumulator::new();
        assert_eq!(acc.finalize().unwrap(), Value::null());
    }

    #[test]
    fn test_nulls_are_skipped() {
        let mut acc = MedianAccumulator::new();
        acc.accumulate(&Value::null()).unwrap();
        acc.accumulate(&Value::int64(5)).unwrap();
        acc.accumulate(&Value::null()).unwrap();
        assert_eq!(acc.finalize().unwrap(), Value::int64(5));
    }

    #[test]
    fn test_accumulate_mismatched_type_fails() {
        let mut acc = accumulate_ints(&[1]);
        let err = acc.accumulate(&Value::string("x")).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_retract_before_accumulate_is_fatal() {
        let mut acc = MedianAccumulator::new();
        let err = acc.retract(&Value::int64(1)).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[test]
    fn test_retract_absent_value_is_noop() {
        let mut acc = accumulate_ints(&[100, 200, 150]);
        acc.retract(&Value::int64(999)).unwrap();
        let state = acc.state().unwrap();
        assert_eq!(state.len(), 3);
        assert_eq!(acc.finalize().unwrap(), Value::int64(150));
    }

    #[test]
    fn test_retract_removes_first_occurrence_only() {
        let mut acc = accumulate_ints(&[5, 5, 7]);
        acc.retract(&Value::int64(5)).unwrap();
        let state = acc.state().unwrap();
        assert_eq!(state.values(), &[Value::int64(5), Value::int64(7)]);
    }

    #[test]
    fn test_sliding_window_scenario() {
        let mut acc = accumulate_ints(&[100, 200, 150]);
        acc.retract(&Value::int64(100)).unwrap();
        acc.accumulate(&Value::int64(300)).unwrap();
        // window multiset {200, 150, 300}
        assert_eq!(acc.finalize().unwrap(), Value::int64(200));
    }

    #[test]
    fn test_merge_into_empty_adopts_source() {
        let mut dst = MedianAccumulator::new();
        let src = accumulate_ints(&[3, 1, 2]);
        dst.merge(&src).unwrap();
        assert_eq!(dst.finalize().unwrap(), Value::int64(2));
        assert_eq!(
            dst.state().unwrap().capacity(),
            src.state().unwrap().capacity()
        );
        // source untouched
        assert_eq!(src.finalize().unwrap(), Value::int64(2));
    }

    #[test]
    fn test_merge_with_empty_source_is_noop() {
        let mut dst = accumulate_ints(&[1, 2, 3]);
        let src = MedianAccumulator::new();
        dst.merge(&src).unwrap();
        assert_eq!(dst.finalize().unwrap(), Value::int64(2));
    }

    #[test]
    fn test_merge_realizes_multiset_union() {
        let mut left = accumulate_ints(&[1, 2, 2]);
        let right = accumulate_ints(&[2, 7, 9, -3]);
        left.merge(&right).unwrap();
        assert_eq!(left.state().unwrap().len(), 7);
        assert_eq!(left.finalize().unwrap(), Value::int64(2));
    }

    #[test]
    fn test_merge_mismatched_types_fails() {
        let mut left = accumulate_ints(&[1]);
        let mut right = MedianAccumulator::new();
        right.accumulate(&Value::string("a")).unwrap();
        let err = left.merge(&right).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_reset_returns_to_uninitialized() {
        let mut acc = accumulate_ints(&[1, 2, 3]);
        acc.reset();
        assert!(acc.state().is_none());
        assert_eq!(acc.finalize().unwrap(), Value::null());
        assert!(acc.retract(&Value::int64(1)).is_err());
    }

    #[test]
    fn test_capacity_doubles_on_growth() {
        let mut state = MedianState::new(DataType::Int64).unwrap();
        assert_eq!(state.capacity(), INITIAL_CAPACITY);
        for i in 0..(INITIAL_CAPACITY as i64 + 1) {
            state.insert(Value::int64(i)).unwrap();
        }
        assert_eq!(state.capacity(), INITIAL_CAPACITY * 2);
        assert!(state.capacity() >= state.len());
    }

    #[test]
    fn test_median_function_descriptor() {
        let func = MedianFunction;
        assert_eq!(func.name(), "MEDIAN");
        assert_eq!(
            func.return_type(&[DataType::Int64]).unwrap(),
            DataType::Int64
        );
        let mut acc = func.create_accumulator();
        acc.accumulate(&Value::int64(4)).unwrap();
        assert_eq!(acc.finalize().unwrap(), Value::int64(4));
    }
}
