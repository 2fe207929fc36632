//! Binary wire format for median aggregate state.
//!
//! Layout (integers little-endian):
//!
//! | field                  | size    |
//! |------------------------|---------|
//! | element type wire id   | 4 bytes |
//! | count                  | 8 bytes, signed |
//! | capacity               | 8 bytes, signed |
//! | per element: null flag | 1 byte (0 = present, 1 = absent) |
//! | per element: payload   | by physical class |
//!
//! Fixed-width types encode as raw bytes of their declared width;
//! variable-length types carry a 4-byte length prefix. The comparator is
//! never serialized: decoding re-resolves it from the element type. This
//! layout is the external contract for state transport and must stay
//! stable across interoperating versions.

use chrono::{DateTime, Duration, NaiveDate};
use medley_core::error::{Error, Result};
use medley_core::types::{DataType, PhysicalClass, Value};
use rust_decimal::Decimal;

use super::median::{MedianState, INITIAL_CAPACITY};

pub fn encode(state: &MedianState) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(32 + state.len() * 9);
    buf.extend_from_slice(&state.element_type().wire_id().to_le_bytes());
    buf.extend_from_slice(&(state.len() as i64).to_le_bytes());
    buf.extend_from_slice(&(state.capacity() as i64).to_le_bytes());

    for value in state.values() {
        if value.is_null() {
            // Never produced by accumulation, but the format carries it.
            buf.push(1);
            continue;
        }
        buf.push(0);
        let payload = value_payload(state.element_type(), value)?;
        if let PhysicalClass::Variable = state.element_type().physical_class() {
            if payload.len() > i32::MAX as usize {
                return Err(Error::internal("variable-length value exceeds 2 GiB"));
            }
            buf.extend_from_slice(&(payload.len() as i32).to_le_bytes());
        }
        buf.extend_from_slice(&payload);
    }
    Ok(buf)
}

pub fn decode(bytes: &[u8]) -> Result<MedianState> {
    let mut reader = Reader::new(bytes);

    let type_id = u32::from_le_bytes(read_array(reader.take(4)?)?);
    let element_type = DataType::from_wire_id(type_id)
        .ok_or_else(|| Error::corrupt_wire_data(format!("unknown element type id {}", type_id)))?;
    let count = i64::from_le_bytes(read_array(reader.take(8)?)?);
    let capacity = i64::from_le_bytes(read_array(reader.take(8)?)?);
    if count < 0 {
        return Err(Error::corrupt_wire_data(format!(
            "negative element count {}",
            count
        )));
    }
    if capacity < 0 {
        return Err(Error::corrupt_wire_data(format!(
            "negative capacity {}",
            capacity
        )));
    }
    // Every present element occupies at least its null-flag byte, so a
    // count beyond the remaining input is corruption, not a large state.
    // Check before allocating anything from the header fields.
    let count = count as usize;
    if count > reader.remaining() {
        return Err(Error::corrupt_wire_data(format!(
            "element count {} exceeds {} remaining input bytes",
            count,
            reader.remaining()
        )));
    }
    // The capacity is a preallocation hint: bounded by what the frame can
    // actually contain, never below count.
    let capacity = (capacity as usize)
        .min(reader.remaining().max(INITIAL_CAPACITY))
        .max(count);

    let mut state = MedianState::with_capacity(element_type, capacity)?;
    for _ in 0..count {
        let flag = reader.take(1)?[0];
        match flag {
            1 => state.push_decoded(Value::null()),
            0 => {
                let payload = match element_type.physical_class() {
                    PhysicalClass::FixedInline(width) | PhysicalClass::FixedByRef(width) => {
                        reader.take(width)?
                    }
                    PhysicalClass::Variable => {
                        let len = i32::from_le_bytes(read_array(reader.take(4)?)?);
                        if len < 0 {
                            return Err(Error::corrupt_wire_data(format!(
                                "negative payload length {}",
                                len
                            )));
                        }
                        reader.take(len as usize)?
                    }
                };
                state.push_decoded(decode_payload(&element_type, payload)?);
            }
            other => {
                return Err(Error::corrupt_wire_data(format!(
                    "invalid null flag {}",
                    other
                )));
            }
        }
    }

    if reader.remaining() != 0 {
        return Err(Error::corrupt_wire_data(format!(
            "{} trailing bytes after {} elements",
            reader.remaining(),
            count
        )));
    }
    Ok(state)
}

fn value_payload(element_type: &DataType, value: &Value) -> Result<Vec<u8>> {
    let bytes = match (element_type, value) {
        (DataType::Bool, Value::Bool(b)) => vec![*b as u8],
        (DataType::Int32, Value::Int32(i)) => i.to_le_bytes().to_vec(),
        (DataType::Int64, Value::Int64(i)) => i.to_le_bytes().to_vec(),
        (DataType::Float32, Value::Float32(f)) => f.to_le_bytes().to_vec(),
        (DataType::Float64, Value::Float64(f)) => f.to_le_bytes().to_vec(),
        (DataType::Numeric, Value::Numeric(d)) => d.serialize().to_vec(),
        (DataType::String, Value::String(s)) => s.as_bytes().to_vec(),
        (DataType::Bytes, Value::Bytes(b)) => b.clone(),
        (DataType::Date, Value::Date(d)) => days_since_epoch(*d).to_le_bytes().to_vec(),
        (DataType::Timestamp, Value::Timestamp(ts)) => {
            ts.timestamp_micros().to_le_bytes().to_vec()
        }
        _ => return Err(Error::type_mismatch_value(element_type, value)),
    };
    Ok(bytes)
}

fn decode_payload(element_type: &DataType, bytes: &[u8]) -> Result<Value> {
    let value = match element_type {
        DataType::Bool => Value::bool(bytes[0] != 0),
        DataType::Int32 => Value::int32(i32::from_le_bytes(read_array(bytes)?)),
        DataType::Int64 => Value::int64(i64::from_le_bytes(read_array(bytes)?)),
        DataType::Float32 => Value::float32(f32::from_le_bytes(read_array(bytes)?)),
        DataType::Float64 => Value::float64(f64::from_le_bytes(read_array(bytes)?)),
        DataType::Numeric => Value::numeric(Decimal::deserialize(read_array(bytes)?)),
        DataType::String => {
            let s = String::from_utf8(bytes.to_vec())
                .map_err(|_| Error::corrupt_wire_data("string payload is not valid UTF-8"))?;
            Value::string(s)
        }
        DataType::Bytes => Value::bytes(bytes.to_vec()),
        DataType::Date => {
            let days = i32::from_le_bytes(read_array(bytes)?);
            let date = NaiveDate::default()
                .checked_add_signed(Duration::days(i64::from(days)))
                .ok_or_else(|| Error::corrupt_wire_data(format!("date out of range: {}", days)))?;
            Value::date(date)
        }
        DataType::Timestamp => {
            let micros = i64::from_le_bytes(read_array(bytes)?);
            let ts = DateTime::from_timestamp_micros(micros).ok_or_else(|| {
                Error::corrupt_wire_data(format!("timestamp out of range: {}", micros))
            })?;
            Value::timestamp(ts)
        }
        DataType::Unknown => {
            return Err(Error::internal("cannot decode values of unknown type"));
        }
    };
    Ok(value)
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    // NaiveDate::default() is the Unix epoch, 1970-01-01.
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}

fn read_array<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| Error::internal("fixed-width payload size mismatch"))
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.buf.len() - self.pos < n {
            return Err(Error::corrupt_wire_data(format!(
                "truncated input: need {} bytes at offset {}, have {}",
                n,
                self.pos,
                self.buf.len() - self.pos
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}
