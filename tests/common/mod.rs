//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::io;

use durable_list::{encode_uvarint, BoundedInput, DurableCollection, ElementCodec};

// ============================================================================
// TEST CODECS
// ============================================================================

/// Length-prefixed UTF-8 strings: varint byte length, then the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf8Codec;

impl ElementCodec for Utf8Codec {
    type Value = String;

    fn encode(&self, value: &String, buf: &mut Vec<u8>) {
        encode_uvarint(value.len() as u64, buf);
        buf.extend_from_slice(value.as_bytes());
    }

    fn decode(&self, input: &mut BoundedInput) -> io::Result<String> {
        let len = input.read_uvarint()?;
        let mut bytes = vec![0u8; len as usize];
        input.read_exact(&mut bytes)?;
        String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {e}")))
    }
}

/// Fixed-width u32 records, little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedU32Codec;

impl ElementCodec for FixedU32Codec {
    type Value = u32;

    fn encode(&self, value: &u32, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&value.to_le_bytes());
    }

    fn decode(&self, input: &mut BoundedInput) -> io::Result<u32> {
        input.read_u32()
    }
}

/// Variable-width u32 records. Same value type as [`FixedU32Codec`] but a
/// different wire shape, for cross-encoding equality tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarintU32Codec;

impl ElementCodec for VarintU32Codec {
    type Value = u32;

    fn encode(&self, value: &u32, buf: &mut Vec<u8>) {
        encode_uvarint(u64::from(*value), buf);
    }

    fn decode(&self, input: &mut BoundedInput) -> io::Result<u32> {
        let raw = input.read_uvarint()?;
        u32::try_from(raw).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Value {raw} does not fit in u32"),
            )
        })
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Drain an input into a plain byte vector, starting at its cursor.
pub fn input_to_vec(input: &mut BoundedInput) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.remaining() as usize);
    let mut scratch = [0u8; 512];
    loop {
        let n = input.read_into(&mut scratch);
        if n == 0 {
            break;
        }
        out.extend_from_slice(&scratch[..n]);
    }
    out
}

/// The full saved byte region backing a durable collection.
pub fn saved_bytes<C: DurableCollection>(collection: &C) -> Vec<u8> {
    input_to_vec(&mut collection.bytes())
}

/// Deterministic string fixtures: "item-0", "item-1", ...
pub fn sample_strings(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("item-{i}")).collect()
}
