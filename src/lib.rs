// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! # veil-core
//!
//! Obfuscation codec for small, sensitive string constants (credentials,
//! tokens) embedded in compiled artifacts. The codec hides values from casual
//! static inspection — string dumps, decompilation — while letting the running
//! program reconstruct the plaintext on demand, or check a candidate against
//! it without ever materializing the plaintext for comparison.
//!
//! Generation is fully deterministic per `(seed, target identity)`: the same
//! inputs always produce byte-identical keys, lookup tables, and call
//! descriptors. Different targets (or different seeds) produce unrelated
//! layouts, so the compiled output carries no repeating pattern to grep for.
//!
//! This is **not** cryptography. An adversary who can execute the program and
//! instrument the decode path recovers everything; the target threat model is
//! static analysis only.
//!
//! # Quick start
//!
//! ```rust
//! use veil_core::{obfuscate, Entry};
//!
//! let entries = vec![Entry::new("API_KEY", "hunter2").unwrap()];
//! let obf = obfuscate(&entries, "my_app::Secrets", Some(42)).unwrap();
//!
//! let decoder = obf.decoder();
//! assert_eq!(decoder.decode_value(&obf.routines[0]).unwrap(), "hunter2");
//! assert!(decoder.validate(&obf.routines[0], "hunter2"));
//! assert!(!decoder.validate(&obf.routines[0], "hunter3"));
//! ```

pub mod codec;
pub mod env;

pub use codec::charset::{BaseCharSet, Entry, AUX_ALPHABET};
pub use codec::decode::{decode_unit, Decoder};
pub use codec::decoy::DecoyRoutine;
pub use codec::encode::{CallDescriptor, CallLayout, EntryRoutine};
pub use codec::error::CodecError;
pub use codec::keys::KeyPair;
pub use codec::table::ByteTable;
pub use codec::{obfuscate, obfuscate_env_block, Obfuscation, Warning};
pub use env::{parse_env_block, sanitize_identifier, ParsedEnv};
