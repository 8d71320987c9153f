// Copyright 2026-present The durable-list developers
// SPDX-License-Identifier: Apache-2.0

//! Saved-list header and footer wire structs.
//!
//! The header is 28 bytes of fixed-size fields, parsed in one read before
//! anything else. It carries the element count and the section lengths, so
//! a decoder can slice directly to the skip table or the element stream.
//!
//! The footer is 8 bytes: a CRC32 checksum over everything before it, plus
//! a magic number ("TSLD", the header magic reversed). A wrong footer means
//! corruption or truncation; the data is not to be trusted.
//!
//! `SectionOffsets` is the single source of truth for the layout. Every
//! piece of code that reads or writes sections MUST use it; the write path
//! and the read path are not allowed to drift apart.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ HEADER (28 bytes)                                    │
//! │   magic: [u8; 4] = "DLST"                            │
//! │   version: u8 = 1                                    │
//! │   flags: u8 (bit 0: HAS_SKIP_TABLE)                  │
//! │   size: u64          element count                   │
//! │   skip_len: u32      skip-table section bytes        │
//! │   elements_len: u64  element-stream section bytes    │
//! │   reserved: [u8; 2]                                  │
//! ├──────────────────────────────────────────────────────┤
//! │ SKIP TABLE (skip_len bytes, present iff flag set)    │
//! ├──────────────────────────────────────────────────────┤
//! │ ELEMENTS (elements_len bytes, codec-framed records)  │
//! ├──────────────────────────────────────────────────────┤
//! │ FOOTER (8 bytes): crc32 + magic "TSLD"               │
//! └──────────────────────────────────────────────────────┘
//! ```

use std::io;

use crc32fast::Hasher as Crc32Hasher;

use crate::input::BoundedInput;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Magic bytes: "DLST" in ASCII (header)
pub const MAGIC: [u8; 4] = [0x44, 0x4C, 0x53, 0x54];

/// Footer magic: "TSLD" (reversed, marks valid file end)
pub const FOOTER_MAGIC: [u8; 4] = [0x54, 0x53, 0x4C, 0x44];

/// Current format version.
pub const VERSION: u8 = 1;

// ============================================================================
// SECURITY LIMITS (prevent resource exhaustion from malicious input)
// ============================================================================

/// Maximum saved-list size: 1 GiB.
pub const MAX_SAVED_SIZE: u64 = 1 << 30;

/// Maximum number of elements.
pub const MAX_ELEMENT_COUNT: u64 = 1_000_000_000;

/// Maximum number of skip-table entries.
pub const MAX_SKIP_ENTRIES: usize = 10_000_000;

// ============================================================================
// FLAGS
// ============================================================================

/// Header flag byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFlags(pub(crate) u8);

impl ListFlags {
    pub const HAS_SKIP_TABLE: u8 = 0b0000_0001;

    pub fn new() -> Self {
        Self(0)
    }

    pub fn with_skip_table(mut self) -> Self {
        self.0 |= Self::HAS_SKIP_TABLE;
        self
    }

    pub fn has_skip_table(self) -> bool {
        self.0 & Self::HAS_SKIP_TABLE != 0
    }
}

// ============================================================================
// HEADER
// ============================================================================

/// Saved-list header (28 bytes fixed size).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListHeader {
    pub version: u8,
    pub flags: ListFlags,
    /// Logical element count.
    pub size: u64,
    /// Skip-table section length in bytes (0 when the table is absent).
    pub skip_len: u32,
    /// Element-stream section length in bytes.
    pub elements_len: u64,
}

impl ListHeader {
    // 4 (magic) + 1 (version) + 1 (flags) + 8 + 4 + 8 + 2 (reserved) = 28
    pub const SIZE: usize = 28;

    /// Compute section byte offsets for this header.
    /// This is the SINGLE SOURCE OF TRUTH for the saved layout.
    ///
    /// Fails with `InvalidData` when the claimed section lengths overflow;
    /// the header fields are untrusted input until this succeeds.
    pub fn section_offsets(&self) -> io::Result<SectionOffsets> {
        SectionOffsets::from_header(self)
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&MAGIC);
        buf.push(self.version);
        buf.push(self.flags.0);
        buf.extend_from_slice(&self.size.to_le_bytes());
        buf.extend_from_slice(&self.skip_len.to_le_bytes());
        buf.extend_from_slice(&self.elements_len.to_le_bytes());
        buf.extend_from_slice(&[0u8; 2]); // reserved
    }

    pub fn read(input: &mut BoundedInput) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        input.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid magic: expected DLST, got {:?}", magic),
            ));
        }

        let version = input.read_u8()?;
        let flags = ListFlags(input.read_u8()?);
        let size = input.read_u64()?;
        let skip_len = input.read_u32()?;
        let elements_len = input.read_u64()?;
        let mut reserved = [0u8; 2];
        input.read_exact(&mut reserved)?;

        Ok(Self {
            version,
            flags,
            size,
            skip_len,
            elements_len,
        })
    }
}

// ============================================================================
// SECTION OFFSETS (SINGLE SOURCE OF TRUTH for the saved layout)
// ============================================================================

/// Section byte offsets within one saved list, in `(start, end)` pairs
/// relative to the start of the saved region.
#[derive(Debug, Clone, Copy)]
pub struct SectionOffsets {
    pub skip_table: (u64, u64),
    pub elements: (u64, u64),
    pub footer: (u64, u64),
}

impl SectionOffsets {
    /// Derive the layout from a header's claimed lengths.
    ///
    /// The lengths come straight off the wire, so every addition is
    /// checked: a forged `elements_len` near `u64::MAX` must surface as
    /// `InvalidData`, never as an arithmetic panic.
    pub fn from_header(h: &ListHeader) -> io::Result<Self> {
        let overflow = || {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Section lengths overflow: skip_len {} + elements_len {}",
                    h.skip_len, h.elements_len
                ),
            )
        };

        let skip_start = ListHeader::SIZE as u64;
        let skip_end = skip_start
            .checked_add(u64::from(h.skip_len))
            .ok_or_else(overflow)?;
        let elements_end = skip_end
            .checked_add(h.elements_len)
            .ok_or_else(overflow)?;
        let footer_end = elements_end
            .checked_add(ListFooter::SIZE as u64)
            .ok_or_else(overflow)?;

        Ok(Self {
            skip_table: (skip_start, skip_end),
            elements: (skip_end, elements_end),
            footer: (elements_end, footer_end),
        })
    }

    /// Expected content size (everything before the footer).
    pub fn content_size(&self) -> u64 {
        self.footer.0
    }

    /// Total saved size including the footer.
    pub fn total_size(&self) -> u64 {
        self.footer.1
    }
}

// ============================================================================
// FOOTER (8 bytes)
// ============================================================================

/// Footer with CRC32 checksum and magic number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFooter {
    /// CRC32 checksum of header + all sections (everything before footer).
    pub crc32: u32,
}

impl ListFooter {
    pub const SIZE: usize = 8; // 4 bytes CRC32 + 4 bytes magic

    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.crc32.to_le_bytes());
        buf.extend_from_slice(&FOOTER_MAGIC);
    }

    /// Read the footer from an input positioned over exactly the footer
    /// bytes, verifying the trailing magic.
    pub fn read(input: &mut BoundedInput) -> io::Result<Self> {
        let crc32 = input.read_u32()?;
        let mut magic = [0u8; 4];
        input.read_exact(&mut magic)?;
        if magic != FOOTER_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid footer magic: expected TSLD, got {:?}", magic),
            ));
        }
        Ok(Self { crc32 })
    }

    /// Compute CRC32 over the given bytes.
    pub fn compute_crc32(data: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Compute CRC32 over an input's full range, streaming through a
    /// scratch buffer. The input is consumed from its current position;
    /// callers pass a slice or fresh duplicate covering the content bytes.
    pub fn compute_crc32_stream(input: &mut BoundedInput) -> u32 {
        let mut hasher = Crc32Hasher::new();
        let mut scratch = [0u8; 4096];
        loop {
            let n = input.read_into(&mut scratch);
            if n == 0 {
                break;
            }
            hasher.update(&scratch[..n]);
        }
        hasher.finalize()
    }
}
