// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Byte lookup table construction.
//!
//! Each key gets one table. For every base character set unit the builder
//! records `(unit ^ key) & 0xFF` as a lower-byte source and, for units at or
//! above `0x80`, also `(unit ^ key) >> 8` as an upper-byte source. The
//! distinct byte values are then doubled (every value occurs exactly twice)
//! and Fisher-Yates shuffled with the value stream, so a decoded byte is
//! referenced by table position rather than by value, with at least two valid
//! positions to choose from.
//!
//! The parallel provenance array exists only so an emitter can annotate the
//! rendered table with debug commentary. Decode logic never reads it.

use crate::codec::charset::BaseCharSet;
use crate::codec::rng::SeedStream;

/// Which base unit a table byte was derived from, and whether it came from
/// the unit's upper byte. Commentary only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provenance {
    pub unit: u16,
    pub upper: bool,
}

/// A shuffled, duplicated array of key-encoded byte values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteTable {
    bytes: Vec<u8>,
    provenance: Vec<Provenance>,
}

impl ByteTable {
    /// Build the table for `key` from the base character set, doubling and
    /// shuffling with draws from `stream`.
    pub fn build(charset: &BaseCharSet, key: u16, stream: &mut SeedStream) -> Self {
        let mut bytes: Vec<u8> = Vec::new();
        let mut provenance: Vec<Provenance> = Vec::new();
        let mut seen = [false; 256];

        for &unit in charset.units() {
            let encoded = unit ^ key;
            let low = (encoded & 0xFF) as u8;
            if !seen[low as usize] {
                seen[low as usize] = true;
                bytes.push(low);
                provenance.push(Provenance { unit, upper: false });
            }
            if unit >= 0x80 {
                let high = (encoded >> 8) as u8;
                if !seen[high as usize] {
                    seen[high as usize] = true;
                    bytes.push(high);
                    provenance.push(Provenance { unit, upper: true });
                }
            }
        }

        // Double: every distinct byte value occurs exactly twice.
        bytes.extend_from_within(..);
        provenance.extend_from_within(..);

        // Fisher-Yates, bytes and provenance in lockstep.
        for i in (1..bytes.len()).rev() {
            let j = stream.next_u32(i as u32 + 1) as usize;
            bytes.swap(i, j);
            provenance.swap(i, j);
        }

        Self { bytes, provenance }
    }

    /// Index of the first occurrence of `byte`, if present.
    pub fn first_index_of(&self, byte: u8) -> Option<usize> {
        self.bytes.iter().position(|&b| b == byte)
    }

    /// Index of the last occurrence of `byte`, if present.
    pub fn last_index_of(&self, byte: u8) -> Option<usize> {
        self.bytes.iter().rposition(|&b| b == byte)
    }

    pub fn get(&self, index: usize) -> u8 {
        self.bytes[index]
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn provenance(&self) -> &[Provenance] {
        &self.provenance
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
