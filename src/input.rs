// Copyright 2026-present The durable-list developers
// SPDX-License-Identifier: Apache-2.0

//! Bounded, duplicable cursors over shared immutable bytes.
//!
//! A `BoundedInput` is the reading abstraction everything else is built on:
//! one expensive resource (a decoded buffer, a mapped region handed over by
//! the storage layer) shared read-only by any number of cheap views. Each
//! view owns exactly three things of its own: a [`Bounds`], a cursor, and
//! possibly the teardown action for the underlying resource.
//!
//! The ownership rule for teardown is strict: at most one input in a
//! derivation tree carries the close action. `slice` and `duplicate` never
//! inherit it, so however many views get derived, the resource is released
//! exactly once. `close` is idempotent, and `Drop` calls it, so the action
//! fires on every exit path without the caller threading a guard around.
//!
//! A single `BoundedInput` is not safe for concurrent use (the cursor is
//! plain mutable state). Concurrency is spelled `duplicate()` (one cursor
//! per reader over the same bytes) or an [`InputPool`] when a fresh cursor
//! is needed repeatedly.
//!
//! All fixed-width reads are little-endian; that is the wire convention for
//! every producer this crate consumes.

use std::io;
use std::sync::Arc;

use crate::bounds::Bounds;
use crate::varint::MAX_VARINT_BYTES;

/// Teardown action for the resource backing a `BoundedInput`.
///
/// Owned by exactly one input in a derivation tree; runs exactly once.
pub type CloseFn = Box<dyn FnOnce() + Send>;

/// A mutable-cursor reader over an immutable shared byte region,
/// constrained by a [`Bounds`].
pub struct BoundedInput {
    buffer: Arc<[u8]>,
    bounds: Bounds,
    position: u64,
    close_fn: Option<CloseFn>,
}

impl BoundedInput {
    /// Wrap a finished buffer. The input covers the whole buffer and owns
    /// no teardown action.
    pub fn wrap(buffer: impl Into<Arc<[u8]>>) -> BoundedInput {
        let buffer = buffer.into();
        let bounds = Bounds::root(0, buffer.len() as u64);
        BoundedInput {
            buffer,
            bounds,
            position: 0,
            close_fn: None,
        }
    }

    /// Wrap a finished buffer and take ownership of the release action for
    /// the resource behind it. Only this instance will run it; derived
    /// views never do.
    pub fn wrap_with_close(buffer: impl Into<Arc<[u8]>>, close_fn: CloseFn) -> BoundedInput {
        let mut input = BoundedInput::wrap(buffer);
        input.close_fn = Some(close_fn);
        input
    }

    fn derived(&self, bounds: Bounds) -> BoundedInput {
        BoundedInput {
            buffer: Arc::clone(&self.buffer),
            bounds,
            position: 0,
            close_fn: None,
        }
    }

    /// The window of backing bytes this input may read.
    fn window(&self) -> &[u8] {
        &self.buffer[self.bounds.start() as usize..self.bounds.end() as usize]
    }

    /// Bytes available per the current bounds.
    pub fn size(&self) -> u64 {
        self.bounds.size()
    }

    /// Bytes between the cursor and the end of the bounds.
    pub fn remaining(&self) -> u64 {
        self.size() - self.position
    }

    /// Current cursor position, relative to the bounds.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The bounds constraining this input.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Move the cursor to `pos`. Fluent, so a seek can feed directly into
    /// a read: `input.seek(off)?.read_u32()?`.
    ///
    /// Fails with `InvalidInput` when `pos` is outside `[0, size()]`.
    pub fn seek(&mut self, pos: u64) -> io::Result<&mut Self> {
        if pos > self.size() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("position {} is not within [0, {}]", pos, self.size()),
            ));
        }
        self.position = pos;
        Ok(self)
    }

    /// Zero-copy view over `[start, end)` of this input's range.
    ///
    /// The slice has narrowed bounds, a cursor at 0, and no teardown
    /// action; this input keeps whatever it owned. Fails with
    /// `InvalidInput` under the same conditions as [`Bounds::narrow`].
    pub fn slice(&self, start: u64, end: u64) -> io::Result<BoundedInput> {
        Ok(self.derived(self.bounds.narrow(start, end)?))
    }

    /// An independent cursor over the same bounds and bytes, starting at
    /// position 0, with no teardown action.
    ///
    /// Reads and seeks through the duplicate never move this input's
    /// cursor, and vice versa. This is the mechanism for concurrent
    /// readers over shared storage.
    pub fn duplicate(&self) -> BoundedInput {
        self.derived(self.bounds.clone())
    }

    /// A factory for fresh duplicates seeked to 0, for callers that need
    /// repeatable independent scans without re-deriving bounds each time.
    pub fn pool(&self) -> InputPool {
        InputPool {
            buffer: Arc::clone(&self.buffer),
            bounds: self.bounds.clone(),
        }
    }

    /// Bulk transfer of up to `min(remaining(), dst.len())` bytes into
    /// `dst`, advancing the cursor by the transferred count.
    ///
    /// Returns the count; 0 at exhaustion is not an error.
    pub fn read_into(&mut self, dst: &mut [u8]) -> usize {
        let n = self.remaining().min(dst.len() as u64) as usize;
        let start = self.position as usize;
        dst[..n].copy_from_slice(&self.window()[start..start + n]);
        self.position += n as u64;
        n
    }

    /// Fill `dst` exactly, or fail with `UnexpectedEof` and leave the
    /// cursor unmoved.
    pub fn read_exact(&mut self, dst: &mut [u8]) -> io::Result<()> {
        if self.remaining() < dst.len() as u64 {
            return Err(self.underflow(dst.len()));
        }
        let start = self.position as usize;
        dst.copy_from_slice(&self.window()[start..start + dst.len()]);
        self.position += dst.len() as u64;
        Ok(())
    }

    fn underflow(&self, wanted: usize) -> io::Error {
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "read of {} bytes overruns input: {} remaining",
                wanted,
                self.remaining()
            ),
        )
    }

    fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        if self.remaining() < N as u64 {
            return Err(self.underflow(N));
        }
        let start = self.position as usize;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.window()[start..start + N]);
        self.position += N as u64;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        Ok(u8::from_le_bytes(self.read_array()?))
    }

    pub fn read_i8(&mut self) -> io::Result<i8> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> io::Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> io::Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> io::Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> io::Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> io::Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> io::Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> io::Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Decode a LEB128 varint at the cursor, advancing past it.
    ///
    /// Fails with `UnexpectedEof` on a truncated varint and `InvalidData`
    /// past [`MAX_VARINT_BYTES`].
    pub fn read_uvarint(&mut self) -> io::Result<u64> {
        let mut result: u64 = 0;
        let mut shift = 0;
        for _ in 0..MAX_VARINT_BYTES {
            let byte = self.read_u8()?;
            result |= ((byte & 0x7F) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Varint exceeds maximum length (possible corruption)",
        ))
    }

    /// Run the owned teardown action, if this instance carries one.
    ///
    /// Idempotent: repeated calls are no-ops, and inputs without an owned
    /// action do nothing. Also invoked by `Drop`, so an early `?` return
    /// still releases the resource.
    pub fn close(&mut self) {
        if let Some(close_fn) = self.close_fn.take() {
            close_fn();
        }
    }
}

impl Drop for BoundedInput {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for BoundedInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedInput")
            .field("bounds", &self.bounds)
            .field("position", &self.position)
            .field("owns_close", &self.close_fn.is_some())
            .finish()
    }
}

/// Zero-argument factory for fresh cursors over one bounded region.
#[derive(Debug, Clone)]
pub struct InputPool {
    buffer: Arc<[u8]>,
    bounds: Bounds,
}

impl InputPool {
    /// A fresh duplicate seeked to 0, with no teardown action.
    pub fn get(&self) -> BoundedInput {
        BoundedInput {
            buffer: Arc::clone(&self.buffer),
            bounds: self.bounds.clone(),
            position: 0,
            close_fn: None,
        }
    }
}
