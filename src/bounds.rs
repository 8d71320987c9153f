// Copyright 2026-present The durable-list developers
// SPDX-License-Identifier: Apache-2.0

//! Parent-linked byte-range descriptors.
//!
//! A `Bounds` pins down a `[start, end)` window in absolute offsets over the
//! backing buffer, with a cheap link to the range it was narrowed from. The
//! parent chain exists so a failed range check can be diagnosed without
//! re-deriving anything from the raw buffer; reads only ever consult the
//! absolute range.
//!
//! Bounds are pure values: created once per slice or initial wrap, immutable
//! afterwards, cloned freely (the parent link is an `Arc`).

use std::io;
use std::sync::Arc;

/// Immutable description of a byte sub-range relative to an optional
/// enclosing range.
///
/// Invariants: `start <= end`, and a child's `[start, end)` is always
/// contained in its parent's absolute range.
#[derive(Debug, Clone)]
pub struct Bounds {
    parent: Option<Arc<Bounds>>,
    start: u64,
    end: u64,
}

impl Bounds {
    /// A parentless bounds whose offsets are absolute positions in the
    /// backing buffer.
    pub fn root(start: u64, end: u64) -> Bounds {
        debug_assert!(start <= end, "root bounds [{}, {}) inverted", start, end);
        Bounds {
            parent: None,
            start,
            end,
        }
    }

    /// Narrow to `[new_start, new_end)`, expressed relative to this range.
    ///
    /// The returned bounds records `self` as its parent and stores absolute
    /// offsets. Fails with `InvalidInput` when the requested range is not
    /// within `[0, self.size()]` or is inverted.
    pub fn narrow(&self, new_start: u64, new_end: u64) -> io::Result<Bounds> {
        if new_end > self.size() || new_end < new_start {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "[{}, {}) is not within [0, {})",
                    new_start,
                    new_end,
                    self.size()
                ),
            ));
        }

        Ok(Bounds {
            parent: Some(Arc::new(self.clone())),
            start: self.start + new_start,
            end: self.start + new_end,
        })
    }

    /// Absolute start offset in the backing buffer.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Absolute end offset (exclusive) in the backing buffer.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Bytes covered by this range.
    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    /// The range this bounds was narrowed from, if any.
    pub fn parent(&self) -> Option<&Bounds> {
        self.parent.as_deref()
    }
}

// Equality is over the absolute range; the provenance chain is not part of
// the value.
impl PartialEq for Bounds {
    fn eq(&self, other: &Bounds) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl Eq for Bounds {}
