// Copyright 2026-present The durable-list developers
// SPDX-License-Identifier: Apache-2.0

//! Block-accumulated output buffer for the save pipeline.
//!
//! Streaming an element sequence of unknown total size into one growable
//! `Vec` means repeated full reallocation and copying. The accumulator
//! instead appends into fixed-size blocks and concatenates them once at the
//! end, so the encode path copies each byte exactly twice: once into its
//! block, once into the finished buffer.

/// Default block size for accumulation (16 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 16 << 10;

/// A growable output buffer accumulated in fixed-size blocks.
#[derive(Debug)]
pub struct AccumulatorOutput {
    blocks: Vec<Vec<u8>>,
    block_size: usize,
    written: u64,
}

impl AccumulatorOutput {
    pub fn new() -> AccumulatorOutput {
        AccumulatorOutput::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    pub fn with_block_size(block_size: usize) -> AccumulatorOutput {
        assert!(block_size > 0, "block size must be positive");
        AccumulatorOutput {
            blocks: Vec::new(),
            block_size,
            written: 0,
        }
    }

    /// Total bytes written so far. This is the byte offset the next write
    /// will land at, which is what the skip-table sampler records.
    pub fn position(&self) -> u64 {
        self.written
    }

    /// Append `bytes`, spilling across block boundaries as needed. No
    /// block is ever reallocated once created.
    pub fn write(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            let need_block = match self.blocks.last() {
                Some(block) => block.len() == self.block_size,
                None => true,
            };
            if need_block {
                self.blocks.push(Vec::with_capacity(self.block_size));
            }
            let Some(block) = self.blocks.last_mut() else {
                break;
            };
            let take = bytes.len().min(self.block_size - block.len());
            block.extend_from_slice(&bytes[..take]);
            bytes = &bytes[take..];
            self.written += take as u64;
        }
    }

    pub fn write_u8(&mut self, byte: u8) {
        self.write(&[byte]);
    }

    /// Concatenate the blocks into the finished buffer.
    pub fn contents(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.written as usize);
        for block in &self.blocks {
            out.extend_from_slice(block);
        }
        out
    }
}

impl Default for AccumulatorOutput {
    fn default() -> AccumulatorOutput {
        AccumulatorOutput::new()
    }
}
