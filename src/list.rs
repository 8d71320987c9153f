// Copyright 2026-present The durable-list developers
// SPDX-License-Identifier: Apache-2.0

//! The durable list: skip-table-indexed random access over a saved
//! element stream.
//!
//! A list is decoded once from a finished byte region and never mutates.
//! `nth` answers positional lookups without a linear scan: floor-lookup the
//! skip table for the nearest preceding sampled entry, seek a fresh
//! duplicate of the element input to that byte offset, then decode forward
//! through at most interval−1 discarded elements. The trade is deliberate:
//! re-decoding a short prefix per lookup instead of paying memory for a
//! dense per-element index, which keeps random access amortized
//! sub-linear in the sampling density rather than the list length.
//!
//! [`save`] is the sole producer boundary: it stream-encodes a sequence
//! plus periodic skip entries, then immediately decodes the finished buffer
//! back into a list. Persisting and self-validating are the same act: if
//! the decode half disagrees with the encode half, `save` fails instead of
//! handing back unreadable bytes.
//!
//! [`save`]: DurableList::save

use std::io;

use crate::encoding::{ElementCodec, ElementEncoding};
use crate::header::{
    ListFlags, ListFooter, ListHeader, MAX_ELEMENT_COUNT, MAX_SAVED_SIZE, VERSION,
};
use crate::input::BoundedInput;
use crate::output::AccumulatorOutput;
use crate::sequence::{sequences_equal, DurableCollection, OrderedSequence, Root};
use crate::skip::{floor_or_origin, SkipEntry, SkipTable, SKIP_INTERVAL};

/// A durable, immutable, randomly accessible sequence decoded from a
/// saved byte region.
pub struct DurableList<E: ElementEncoding> {
    /// The whole saved region (header through footer).
    bytes: BoundedInput,
    root: Option<Root>,
    size: u64,
    skip_table: Option<SkipTable>,
    /// The element-stream section, sliced out of `bytes`.
    elements: BoundedInput,
    encoding: E,
}

impl<E: ElementEncoding> DurableList<E> {
    // ========================================================================
    // DECODE
    // ========================================================================

    /// Decode a saved list from a finished byte region.
    ///
    /// Validates, in order: size limits, footer magic, CRC32 over the
    /// content bytes, header magic and version, and section-length
    /// arithmetic. Only then are the skip table and element stream sliced
    /// out (zero-copy) and the list constructed.
    pub fn decode(input: BoundedInput, root: Option<Root>, encoding: E) -> io::Result<Self> {
        let total = input.size();
        if total > MAX_SAVED_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Saved list too large: {} bytes (max {})", total, MAX_SAVED_SIZE),
            ));
        }
        let min_size = (ListHeader::SIZE + ListFooter::SIZE) as u64;
        if total < min_size {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("Saved list too small: {} bytes (minimum {})", total, min_size),
            ));
        }

        // Footer first: a bad checksum means nothing else is trustworthy.
        let footer_start = total - ListFooter::SIZE as u64;
        let mut footer_input = input.slice(footer_start, total)?;
        let footer = ListFooter::read(&mut footer_input)?;

        let mut content = input.slice(0, footer_start)?;
        let computed = ListFooter::compute_crc32_stream(&mut content);
        if footer.crc32 != computed {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "CRC32 mismatch: expected {:#010x}, got {:#010x} (saved list corrupted)",
                    footer.crc32, computed
                ),
            ));
        }

        let mut header_input = input.slice(0, ListHeader::SIZE as u64)?;
        let header = ListHeader::read(&mut header_input)?;

        if header.version != VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unsupported version: {} (expected {})", header.version, VERSION),
            ));
        }
        if header.size > MAX_ELEMENT_COUNT {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Too many elements: {} (max {})",
                    header.size, MAX_ELEMENT_COUNT
                ),
            ));
        }
        if !header.flags.has_skip_table() && header.skip_len != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Skip-table section of {} bytes present but not flagged",
                    header.skip_len
                ),
            ));
        }

        let offsets = header.section_offsets()?;
        if offsets.total_size() != total {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Section lengths mismatch: header claims {} bytes, got {}",
                    offsets.total_size(),
                    total
                ),
            ));
        }

        let skip_table = if header.flags.has_skip_table() {
            let mut skip_input = input.slice(offsets.skip_table.0, offsets.skip_table.1)?;
            let table = SkipTable::decode(&mut skip_input)?;
            if skip_input.remaining() != 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "{} trailing bytes in skip-table section",
                        skip_input.remaining()
                    ),
                ));
            }
            Some(table)
        } else {
            None
        };

        let elements = input.slice(offsets.elements.0, offsets.elements.1)?;

        Ok(DurableList {
            bytes: input,
            root,
            size: header.size,
            skip_table,
            elements,
            encoding,
        })
    }

    // ========================================================================
    // SAVE / ROUND-TRIP PIPELINE
    // ========================================================================

    /// Encode a sequence with the default sampling interval and decode the
    /// result back into a list. See [`save_with_interval`].
    ///
    /// [`save_with_interval`]: DurableList::save_with_interval
    pub fn save<I>(values: I, encoding: E, root: Option<Root>) -> io::Result<Self>
    where
        I: IntoIterator<Item = E::Value>,
    {
        Self::save_with_interval(values, encoding, root, SKIP_INTERVAL)
    }

    /// Stream-encode `values` with a skip entry every `interval` elements,
    /// assemble header + skip table + element stream + CRC32 footer, then
    /// decode the finished buffer.
    ///
    /// The decoded list reproduces the input exactly: `nth(i)` yields the
    /// i-th element of `values` in original order, for every `i`. A skip
    /// table is emitted only when it would index beyond the origin entry
    /// (`count > interval`); shorter lists degrade to an origin-only scan.
    pub fn save_with_interval<I>(
        values: I,
        encoding: E,
        root: Option<Root>,
        interval: u64,
    ) -> io::Result<Self>
    where
        I: IntoIterator<Item = E::Value>,
    {
        if interval == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "sampling interval must be positive",
            ));
        }

        let mut out = AccumulatorOutput::new();
        let mut entries: Vec<SkipEntry> = Vec::new();
        let mut scratch: Vec<u8> = Vec::new();
        let mut codec: Option<E::Codec> = None;
        let mut count: u64 = 0;

        for value in values {
            if count % interval == 0 {
                entries.push(SkipEntry {
                    index: count,
                    offset: out.position(),
                });
                codec = None; // run boundary: next fetch governs this run
            }
            let codec = codec.get_or_insert_with(|| encoding.element_codec(count));
            scratch.clear();
            codec.encode(&value, &mut scratch);
            out.write(&scratch);
            count += 1;
        }

        if count > MAX_ELEMENT_COUNT {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Too many elements: {} (max {})", count, MAX_ELEMENT_COUNT),
            ));
        }

        let element_bytes = out.contents();

        // An origin-only table indexes nothing; flag it absent instead.
        let mut skip_bytes = Vec::new();
        let has_table = entries.len() > 1;
        if has_table {
            SkipTable::from_entries(entries)?.encode(&mut skip_bytes);
        }

        let total = ListHeader::SIZE + skip_bytes.len() + element_bytes.len() + ListFooter::SIZE;
        if total as u64 > MAX_SAVED_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Saved list too large: {} bytes (max {})", total, MAX_SAVED_SIZE),
            ));
        }

        let header = ListHeader {
            version: VERSION,
            flags: if has_table {
                ListFlags::new().with_skip_table()
            } else {
                ListFlags::new()
            },
            size: count,
            skip_len: skip_bytes.len() as u32,
            elements_len: element_bytes.len() as u64,
        };

        let mut buf = Vec::with_capacity(total);
        header.write(&mut buf);
        buf.extend_from_slice(&skip_bytes);
        buf.extend_from_slice(&element_bytes);
        let crc32 = ListFooter::compute_crc32(&buf);
        ListFooter { crc32 }.write(&mut buf);

        Self::decode(BoundedInput::wrap(buf), root, encoding)
    }

    // ========================================================================
    // ACCESSORS AND LOOKUP
    // ========================================================================

    /// Stored element count, O(1).
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The element at `index`.
    ///
    /// Fails with `InvalidInput` when `index >= size()`. Decode errors from
    /// the element codec propagate unchanged. A failed call never
    /// invalidates the list: all cursor state is local to a per-call
    /// duplicate.
    pub fn nth(&self, index: u64) -> io::Result<E::Value> {
        if index >= self.size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("index {} must be within [0, {})", index, self.size),
            ));
        }

        let entry = floor_or_origin(self.skip_table.as_ref(), index);
        let mut input = self.elements.duplicate();
        input.seek(entry.offset)?;
        let codec = self.encoding.element_codec(entry.index);
        let mut run = ElementRun::new(input, codec, self.size - entry.index);
        match run.nth((index - entry.index) as usize) {
            Some(value) => value,
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("element stream ended before index {}", index),
            )),
        }
    }

    /// The encoding capability this list decodes with.
    pub fn encoding(&self) -> &E {
        &self.encoding
    }

    /// The decoded skip table, if the producer emitted one.
    pub fn skip_table(&self) -> Option<&SkipTable> {
        self.skip_table.as_ref()
    }

    /// Sequential decode of the whole stream, refreshing the codec at each
    /// skip-boundary run. Cheaper than `nth` in a loop: each element is
    /// decoded exactly once.
    pub fn iter(&self) -> Elements<'_, E> {
        let boundaries = match &self.skip_table {
            Some(table) => {
                let entries = table.entries();
                // The origin run's codec is fetched lazily at index 0.
                match entries.first() {
                    Some(first) if first.index == 0 => &entries[1..],
                    _ => entries,
                }
            }
            None => &[],
        };
        Elements {
            encoding: &self.encoding,
            boundaries,
            input: self.elements.duplicate(),
            codec: None,
            next_index: 0,
            size: self.size,
        }
    }
}

impl<E: ElementEncoding> OrderedSequence for DurableList<E> {
    type Item = E::Value;

    fn size(&self) -> u64 {
        self.size
    }

    fn nth(&self, index: u64) -> io::Result<E::Value> {
        DurableList::nth(self, index)
    }
}

impl<E: ElementEncoding> DurableCollection for DurableList<E> {
    fn bytes(&self) -> BoundedInput {
        self.bytes.duplicate()
    }

    fn root(&self) -> Option<&Root> {
        self.root.as_ref()
    }
}

/// Cloning shares the saved bytes; the structure is immutable once
/// constructed, so a clone is the same logical value without copying.
impl<E: ElementEncoding + Clone> Clone for DurableList<E> {
    fn clone(&self) -> Self {
        DurableList {
            bytes: self.bytes.duplicate(),
            root: self.root.clone(),
            size: self.size,
            skip_table: self.skip_table.clone(),
            elements: self.elements.duplicate(),
            encoding: self.encoding.clone(),
        }
    }
}

/// Equality is the ordered-sequence contract: same length, pairwise-equal
/// elements in order, including across two different encodings of the
/// same value type. A list whose elements fail to decode compares unequal.
impl<E, F> PartialEq<DurableList<F>> for DurableList<E>
where
    E: ElementEncoding,
    F: ElementEncoding<Value = E::Value>,
    E::Value: PartialEq,
{
    fn eq(&self, other: &DurableList<F>) -> bool {
        sequences_equal(self, other).unwrap_or(false)
    }
}

impl<E: ElementEncoding> std::fmt::Debug for DurableList<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableList")
            .field("size", &self.size)
            .field(
                "skip_entries",
                &self.skip_table.as_ref().map_or(0, SkipTable::len),
            )
            .finish()
    }
}

// ============================================================================
// FORWARD DECODE ITERATORS
// ============================================================================

/// A restartable, finite, forward-only decode walk over one codec run.
///
/// This is the only way elements come out of storage: the skip table feeds
/// it a starting offset, and it decodes forward from there. It deliberately
/// supports no seeking of its own.
pub struct ElementRun<C: ElementCodec> {
    input: BoundedInput,
    codec: C,
    remaining: u64,
}

impl<C: ElementCodec> ElementRun<C> {
    pub fn new(input: BoundedInput, codec: C, remaining: u64) -> ElementRun<C> {
        ElementRun {
            input,
            codec,
            remaining,
        }
    }
}

impl<C: ElementCodec> Iterator for ElementRun<C> {
    type Item = io::Result<C::Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.codec.decode(&mut self.input))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.remaining as usize;
        (left, Some(left))
    }
}

/// Sequential iterator over a whole list, one decode per element.
pub struct Elements<'a, E: ElementEncoding> {
    encoding: &'a E,
    /// Skip entries still ahead of the cursor, each starting a new run.
    boundaries: &'a [SkipEntry],
    input: BoundedInput,
    codec: Option<E::Codec>,
    next_index: u64,
    size: u64,
}

impl<E: ElementEncoding> Iterator for Elements<'_, E> {
    type Item = io::Result<E::Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.size {
            return None;
        }
        if let Some((first, rest)) = self.boundaries.split_first() {
            if first.index == self.next_index {
                self.boundaries = rest;
                self.codec = None; // run boundary: refetch below
            }
        }
        if self.codec.is_none() {
            self.codec = Some(self.encoding.element_codec(self.next_index));
        }
        let result = match self.codec.as_ref() {
            Some(codec) => codec.decode(&mut self.input),
            // Unreachable: the branch above just filled it.
            None => return None,
        };
        self.next_index += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.size - self.next_index) as usize;
        (left, Some(left))
    }
}
