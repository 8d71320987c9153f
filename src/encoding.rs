// Copyright 2026-present The durable-list developers
// SPDX-License-Identifier: Apache-2.0

//! Capability interfaces for pluggable per-position element codecs.
//!
//! This crate defines no codecs of its own. The collaborator that owns the
//! value type supplies an [`ElementEncoding`], and the core only ever asks
//! it one question: which codec governs the run of elements starting at a
//! given logical index? That single seam is what lets a stream carry
//! heterogeneous or evolving encodings without the storage core knowing
//! anything about them.
//!
//! Codec granularity is the skip-table run: the save pipeline fetches a
//! codec at every sampling boundary, and the lookup path fetches one at the
//! floor entry it seeks to. A codec is therefore always asked to decode
//! exactly the run whose first logical index it was fetched for.

use std::io;

use crate::input::BoundedInput;

/// Decode strategy for a contiguous run of elements.
///
/// A codec frames its own records: `decode` must consume exactly the bytes
/// `encode` produced for one value, since the stream carries no per-element
/// length fields of its own.
pub trait ElementCodec {
    type Value;

    /// Append one encoded value to `buf`.
    fn encode(&self, value: &Self::Value, buf: &mut Vec<u8>);

    /// Decode one value at the input's cursor, advancing past it.
    ///
    /// Errors propagate unchanged through [`DurableList::nth`]; the core
    /// neither interprets nor wraps them.
    ///
    /// [`DurableList::nth`]: crate::list::DurableList::nth
    fn decode(&self, input: &mut BoundedInput) -> io::Result<Self::Value>;
}

/// Capability supplying the codec for each logical position.
pub trait ElementEncoding {
    type Value;
    type Codec: ElementCodec<Value = Self::Value>;

    /// The codec valid for the run of elements starting at `index`.
    fn element_codec(&self, index: u64) -> Self::Codec;
}

/// Adapter for the common case of one codec governing every position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uniform<C>(pub C);

impl<C: ElementCodec + Clone> ElementEncoding for Uniform<C> {
    type Value = C::Value;
    type Codec = C;

    fn element_codec(&self, _index: u64) -> C {
        self.0.clone()
    }
}
