// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Entries and the base character set.
//!
//! The codec works on UTF-16 code units: surrogate pairs are encoded as two
//! independent units and reassembled on decode. The base character set is the
//! ordered, deduplicated list of every unit any entry value needs, followed by
//! a fixed auxiliary alphabet. The auxiliary units guarantee the tables can
//! also encode common credential characters that never appear in the real
//! values, which keeps table sizes from leaking value contents.

use std::collections::HashSet;

use crate::codec::error::CodecError;

/// Auxiliary alphabet appended to the base character set (where not already
/// present): letters, digits, and common credential punctuation.
pub const AUX_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/-_=:.?&#";

/// Check a candidate entry name against ASCII identifier rules:
/// `[A-Za-z_][A-Za-z0-9_]*`, and not the bare wildcard `_`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if !chars.clone().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    name != "_"
}

/// An immutable `(name, value)` pair.
///
/// The name is validated as a legal identifier on construction; the value is
/// arbitrary Unicode text and may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    value: String,
}

impl Entry {
    /// Create an entry, rejecting illegal identifier names.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, CodecError> {
        let name = name.into();
        if !is_valid_identifier(&name) {
            return Err(CodecError::InvalidIdentifier(name));
        }
        Ok(Self { name, value: value.into() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The ordered set of distinct UTF-16 units across all entry values,
/// first-occurrence order, with [`AUX_ALPHABET`] appended.
///
/// Invariant: every unit any entry needs, plus every auxiliary unit, appears
/// exactly once, in an order that depends only on the entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseCharSet {
    units: Vec<u16>,
}

impl BaseCharSet {
    /// Build the set from the given entries.
    pub fn build(entries: &[Entry]) -> Self {
        let mut units = Vec::new();
        let mut seen = HashSet::new();

        for entry in entries {
            for unit in entry.value().encode_utf16() {
                if seen.insert(unit) {
                    units.push(unit);
                }
            }
        }

        for unit in AUX_ALPHABET.encode_utf16() {
            if seen.insert(unit) {
                units.push(unit);
            }
        }

        Self { units }
    }

    pub fn units(&self) -> &[u16] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
