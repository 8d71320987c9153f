// Copyright 2026-present The durable-list developers
// SPDX-License-Identifier: Apache-2.0

//! Ordered-sequence and durable-collection capability traits, plus the
//! shared equality/hash/string helpers.
//!
//! Two sequences holding the same logical elements in the same order must
//! compare equal and hash identically no matter which concrete type holds
//! them. That contract lives in free functions over [`OrderedSequence`],
//! not in any one implementation, so every implementor gets it by
//! delegation instead of re-deriving it.

use std::any::Any;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};
use std::io;
use std::sync::Arc;

use crate::input::BoundedInput;

/// A finite, randomly addressable sequence whose element access may fail
/// (durable implementations decode from storage on every lookup).
pub trait OrderedSequence {
    type Item;

    /// Logical element count.
    fn size(&self) -> u64;

    /// The element at `index`, or an error for an out-of-range index or a
    /// failed decode.
    fn nth(&self, index: u64) -> io::Result<Self::Item>;

    /// Iterate elements in order via repeated `nth`. Implementations with
    /// a cheaper sequential path expose their own iterator and use it in
    /// preference to this one.
    fn iter(&self) -> SequenceIter<'_, Self>
    where
        Self: Sized,
    {
        SequenceIter { seq: self, next: 0 }
    }
}

/// Iterator over an [`OrderedSequence`] by repeated positional lookup.
#[derive(Debug)]
pub struct SequenceIter<'a, S: OrderedSequence> {
    seq: &'a S,
    next: u64,
}

impl<S: OrderedSequence> Iterator for SequenceIter<'_, S> {
    type Item = io::Result<S::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.seq.size() {
            return None;
        }
        let item = self.seq.nth(self.next);
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.seq.size() - self.next) as usize;
        (left, Some(left))
    }
}

/// A collection backed by a saved byte region.
pub trait DurableCollection {
    /// An independent duplicate over the saved bytes, never the live
    /// cursor, so no caller can corrupt another reader's position.
    fn bytes(&self) -> BoundedInput;

    /// The reference-resolution context this collection was decoded under.
    fn root(&self) -> Option<&Root>;
}

/// Opaque context handle for resolving nested durable references.
///
/// Passed through decode and lookup paths untouched; this crate never
/// inspects its contents. The layer that owns cross-collection references
/// downcasts it back to whatever it stored.
#[derive(Clone)]
pub struct Root(Arc<dyn Any + Send + Sync>);

impl Root {
    pub fn new<T: Any + Send + Sync>(context: T) -> Root {
        Root(Arc::new(context))
    }

    /// Recover the stored context. Returns `None` when `T` is not the
    /// stored type.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl std::fmt::Debug for Root {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Root")
    }
}

// ============================================================================
// CROSS-IMPLEMENTATION EQUALITY CONTRACT
// ============================================================================

/// Two sequences are equal iff they have the same length and pairwise-equal
/// elements in order. Decode failures propagate.
pub fn sequences_equal<A, B>(a: &A, b: &B) -> io::Result<bool>
where
    A: OrderedSequence,
    B: OrderedSequence<Item = A::Item>,
    A::Item: PartialEq,
{
    if a.size() != b.size() {
        return Ok(false);
    }
    for (left, right) in a.iter().zip(b.iter()) {
        if left? != right? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Order-sensitive hash: the length, then each element, folded into one
/// hasher. Any two sequences that satisfy [`sequences_equal`] produce the
/// same value.
pub fn sequence_hash<S>(seq: &S) -> io::Result<u64>
where
    S: OrderedSequence,
    S::Item: Hash,
{
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    hasher.write_u64(seq.size());
    for item in seq.iter() {
        item?.hash(&mut hasher);
    }
    Ok(hasher.finish())
}

/// Render as `[a, b, c]`, the shared form for all ordered sequences.
pub fn sequence_to_string<S>(seq: &S) -> io::Result<String>
where
    S: OrderedSequence,
    S::Item: std::fmt::Debug,
{
    let mut out = String::from("[");
    for (i, item) in seq.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        // Writing to a String cannot fail.
        let _ = write!(out, "{:?}", item?);
    }
    out.push(']');
    Ok(out)
}
