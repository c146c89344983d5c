// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Error types for the obfuscation codec.
//!
//! Input-validation failures abort generation for the one target they belong
//! to; callers running multiple targets wrap each generation independently so
//! a bad entry never poisons its siblings. Non-fatal conditions are reported
//! as [`Warning`](crate::codec::Warning) values, not errors.

use core::fmt;

/// Errors that can occur during codec generation or decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// An entry name is not a legal identifier.
    InvalidIdentifier(String),
    /// Two entries resolved to the same identifier.
    DuplicateIdentifier(String),
    /// A decoded unit sequence is not valid UTF-16 (unpaired surrogates).
    /// Real entries never hit this; decoy routines can.
    InvalidUtf16(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIdentifier(name) => {
                write!(f, "entry name '{name}' is not a valid identifier")
            }
            Self::DuplicateIdentifier(name) => {
                write!(f, "duplicate entry identifier '{name}'")
            }
            Self::InvalidUtf16(name) => {
                write!(f, "routine '{name}' decoded to invalid UTF-16")
            }
        }
    }
}

impl std::error::Error for CodecError {}
