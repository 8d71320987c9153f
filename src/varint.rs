// Copyright 2026-present The durable-list developers
// SPDX-License-Identifier: Apache-2.0

//! LEB128 varint primitives for the skip-table and element framing.
//!
//! Little-endian base-128: seven payload bits per byte, high bit is the
//! continuation flag. Small values dominate both the skip table (deltas
//! between sampled offsets) and typical element framing, so varints keep
//! the saved form compact without any entropy coder.
//!
//! # References
//!
//! - **Varint (LEB128)**: Little-endian base-128 variable-length integer encoding.
//!   Originally from DWARF debugging format, popularized by Protocol Buffers.
//!   See: <https://protobuf.dev/programming-guides/encoding/>

use std::io;

/// Maximum varint bytes (u64 needs at most 10 bytes).
///
/// A decoder that reads more than this is looking at malformed or
/// malicious input, not a large value.
pub const MAX_VARINT_BYTES: usize = 10;

/// Encode a u64 as a varint, appending to `buf`.
pub fn encode_uvarint(mut value: u64, buf: &mut Vec<u8>) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Decode a varint from the front of `bytes`, returning the value and the
/// number of bytes consumed.
///
/// An empty or mid-varint buffer is `UnexpectedEof`; a continuation chain
/// running past [`MAX_VARINT_BYTES`] is `InvalidData`.
pub fn decode_uvarint(bytes: &[u8]) -> io::Result<(u64, usize)> {
    let mut result: u64 = 0;
    for (i, &byte) in bytes.iter().take(MAX_VARINT_BYTES).enumerate() {
        result |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }

    if bytes.len() >= MAX_VARINT_BYTES {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Varint exceeds maximum length (possible corruption)",
        ))
    } else if bytes.is_empty() {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Empty buffer for varint",
        ))
    } else {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Incomplete varint",
        ))
    }
}

// ============================================================================
// KANI PROOF HARNESSES
// ============================================================================
//
// Run with: cargo kani
//
// Everything the rest of the crate assumes about varints is pinned here:
// encoding any u64 yields a terminated chain of at most MAX_VARINT_BYTES,
// decoding arbitrary bytes cannot panic, and decode inverts encode exactly.

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    #[kani::proof]
    fn encoded_form_is_well_terminated() {
        let value: u64 = kani::any();
        let mut buf = Vec::new();
        encode_uvarint(value, &mut buf);

        kani::assert(
            (1..=MAX_VARINT_BYTES).contains(&buf.len()),
            "encoded length out of range",
        );
        kani::assert(
            buf.last().map_or(false, |&b| b & 0x80 == 0),
            "final byte still carries the continuation bit",
        );
    }

    #[kani::proof]
    #[kani::unwind(12)]
    fn decode_is_total_over_arbitrary_bytes() {
        let bytes: [u8; 11] = kani::any();
        let len: usize = kani::any_where(|&n| n <= bytes.len());

        if let Ok((_, consumed)) = decode_uvarint(&bytes[..len]) {
            kani::assert(consumed >= 1 && consumed <= len, "consumed count out of range");
        }
    }

    #[kani::proof]
    fn decode_inverts_encode() {
        let value: u64 = kani::any();
        let mut buf = Vec::new();
        encode_uvarint(value, &mut buf);

        match decode_uvarint(&buf) {
            Ok((decoded, consumed)) => {
                kani::assert(decoded == value, "value changed across the wire");
                kani::assert(consumed == buf.len(), "decode left encoded bytes behind");
            }
            Err(_) => kani::assert(false, "self-produced varint failed to decode"),
        }
    }
}
