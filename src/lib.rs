// Copyright 2026-present The durable-list developers
// SPDX-License-Identifier: Apache-2.0

//! Durable, immutable list storage with skip-table random access.
//!
//! This crate is the binary-storage core for a durable sequence collection:
//! a list is encoded once into a self-validating byte region (header, skip
//! table, codec-framed element stream, CRC32 footer) and afterwards read in
//! place, with no mutation and no per-element memory overhead.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  bounds.rs  │────▶│   input.rs   │────▶│   list.rs    │
//! │ (hierarchic │     │(BoundedInput:│     │ (DurableList:│
//! │  [start,end)│     │ slice, dup,  │     │  save, nth,  │
//! │  windows)   │     │ close-once)  │     │  iter)       │
//! └─────────────┘     └──────────────┘     └──────────────┘
//!                            │                    ▲
//!                            ▼                    │
//!                     ┌──────────────┐     ┌──────────────┐
//!                     │  header.rs   │     │   skip.rs    │
//!                     │ (wire layout,│     │ (SkipTable:  │
//!                     │  CRC footer) │     │ floor lookup)│
//!                     └──────────────┘     └──────────────┘
//! ```
//!
//! Element payloads are opaque to the core: an [`ElementEncoding`]
//! capability supplies the [`ElementCodec`] for each run of positions,
//! while framing, indexing, and integrity checking stay in this crate.
//!
//! # Usage
//!
//! ```ignore
//! use durable_list::{DurableList, Uniform};
//!
//! let list = DurableList::save(values, Uniform(MyCodec), None)?;
//! let third = list.nth(2)?;
//! for value in list.iter() {
//!     let value = value?;
//! }
//! ```

pub mod bounds;
pub mod encoding;
pub mod header;
pub mod input;
pub mod list;
pub mod output;
pub mod sequence;
pub mod skip;
pub mod varint;

pub use bounds::Bounds;
pub use encoding::{ElementCodec, ElementEncoding, Uniform};
pub use header::{ListFlags, ListFooter, ListHeader, SectionOffsets, VERSION};
pub use input::{BoundedInput, CloseFn, InputPool};
pub use list::{DurableList, ElementRun, Elements};
pub use output::AccumulatorOutput;
pub use sequence::{
    sequence_hash, sequence_to_string, sequences_equal, DurableCollection, OrderedSequence, Root,
    SequenceIter,
};
pub use skip::{SkipEntry, SkipTable, SKIP_INTERVAL};
pub use varint::{decode_uvarint, encode_uvarint, MAX_VARINT_BYTES};
