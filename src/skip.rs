// Copyright 2026-present The durable-list developers
// SPDX-License-Identifier: Apache-2.0

//! Sparse skip table over a variable-length element stream.
//!
//! The element stream has no per-element index; records are framed by their
//! codec and can only be decoded forward. The producer therefore samples an
//! entry `(logical index, byte offset)` every `SKIP_INTERVAL` elements.
//! Random access becomes: floor-lookup the nearest preceding entry, seek
//! there, decode forward at most interval−1 discarded elements. Lookup cost
//! is proportional to the producer's sampling density, never to the list
//! length.
//!
//! The table is built once by the encoder and deserialized read-only; it
//! never mutates.
//!
//! # References
//!
//! - **Skip Lists**: Pugh (1990): "Skip Lists: A Probabilistic Alternative
//!   to Balanced Trees", Communications of the ACM 33(6). This table is the
//!   degenerate single-level form over a strictly sorted index column.

use std::io;

use crate::header::MAX_SKIP_ENTRIES;
use crate::input::BoundedInput;
use crate::varint::encode_uvarint;

/// Default sampling interval for the save pipeline: one entry per this
/// many elements.
pub const SKIP_INTERVAL: u64 = 32;

/// One sampled point in the element stream: the byte offset where the
/// element at `index` begins, both relative to the stream start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipEntry {
    pub index: u64,
    pub offset: u64,
}

impl SkipEntry {
    /// Sentinel for "no indexing available": decode from the very start.
    pub const ORIGIN: SkipEntry = SkipEntry {
        index: 0,
        offset: 0,
    };
}

/// Sorted sparse index mapping logical element positions to byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipTable {
    entries: Vec<SkipEntry>,
}

impl SkipTable {
    /// Build from entries, validating the ordering invariant: strictly
    /// increasing indices, non-decreasing offsets.
    pub fn from_entries(entries: Vec<SkipEntry>) -> io::Result<SkipTable> {
        if entries.len() > MAX_SKIP_ENTRIES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Too many skip entries: {} (max {})",
                    entries.len(),
                    MAX_SKIP_ENTRIES
                ),
            ));
        }
        for pair in entries.windows(2) {
            if pair[1].index <= pair[0].index || pair[1].offset < pair[0].offset {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "Skip entries out of order: ({}, {}) then ({}, {})",
                        pair[0].index, pair[0].offset, pair[1].index, pair[1].offset
                    ),
                ));
            }
        }
        Ok(SkipTable { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SkipEntry] {
        &self.entries
    }

    /// The entry with the greatest `index <= logical_index`, or ORIGIN when
    /// the target precedes every stored entry. O(log m) binary search.
    pub fn floor(&self, logical_index: u64) -> SkipEntry {
        let i = self
            .entries
            .partition_point(|entry| entry.index <= logical_index);
        if i == 0 {
            SkipEntry::ORIGIN
        } else {
            self.entries[i - 1]
        }
    }

    /// Encode as varint count followed by delta-encoded entries.
    ///
    /// Both columns are monotone, so deltas stay small: the index column
    /// advances by the sampling interval, the offset column by one run's
    /// worth of encoded bytes.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        encode_uvarint(self.entries.len() as u64, buf);
        let mut prev = SkipEntry::ORIGIN;
        for (i, entry) in self.entries.iter().enumerate() {
            if i == 0 {
                encode_uvarint(entry.index, buf);
                encode_uvarint(entry.offset, buf);
            } else {
                encode_uvarint(entry.index - prev.index, buf);
                encode_uvarint(entry.offset - prev.offset, buf);
            }
            prev = *entry;
        }
    }

    /// Decode a table from its section, validating entry count, delta
    /// overflow, and the ordering invariant.
    pub fn decode(input: &mut BoundedInput) -> io::Result<SkipTable> {
        let count = input.read_uvarint()?;

        // Each entry needs at least two varint bytes, so a count beyond
        // the remaining bytes is corrupt before any entry is read.
        if count > input.remaining() || count as usize > MAX_SKIP_ENTRIES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Skip entry count {} exceeds section capacity ({} bytes remaining)",
                    count,
                    input.remaining()
                ),
            ));
        }

        let mut entries = Vec::with_capacity(count as usize);
        let mut prev = SkipEntry::ORIGIN;
        for i in 0..count {
            let index_delta = input.read_uvarint()?;
            let offset_delta = input.read_uvarint()?;
            let entry = if i == 0 {
                SkipEntry {
                    index: index_delta,
                    offset: offset_delta,
                }
            } else {
                if index_delta == 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Skip entry {} repeats logical index {}", i, prev.index),
                    ));
                }
                let index = prev.index.checked_add(index_delta).ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Skip entry {} index overflows", i),
                    )
                })?;
                let offset = prev.offset.checked_add(offset_delta).ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Skip entry {} offset overflows", i),
                    )
                })?;
                SkipEntry { index, offset }
            };
            entries.push(entry);
            prev = entry;
        }

        Ok(SkipTable { entries })
    }
}

/// Floor lookup that degrades to ORIGIN when no table exists, so callers
/// do not scatter absence checks.
pub fn floor_or_origin(table: Option<&SkipTable>, logical_index: u64) -> SkipEntry {
    match table {
        Some(table) => table.floor(logical_index),
        None => SkipEntry::ORIGIN,
    }
}
