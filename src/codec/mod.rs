// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! The obfuscation generation pipeline.
//!
//! One call to [`obfuscate`] runs the whole codec for one target:
//!
//! 1. derive the effective seed from `(user seed, target identity)` and spawn
//!    the value stream and the independent naming/decoy stream,
//! 2. generate the odd/even XOR key pair,
//! 3. build the base character set and both decoy-laden byte tables,
//! 4. draw the per-generation call layout,
//! 5. encode every entry value into call-descriptor sequences, and
//! 6. generate inert decoy routines from the naming stream.
//!
//! Everything is a pure function of `(seed, identity, entries)`: no globals,
//! no shared mutable state, nothing mutated after construction. Callers may
//! run generations for different targets concurrently; a validation error in
//! one target must never abort its siblings, so wrap each call independently.

pub mod charset;
pub mod decode;
pub mod decoy;
pub mod encode;
pub mod error;
pub mod keys;
pub mod rng;
pub mod seed;
pub mod table;

use core::fmt;
use std::collections::HashSet;

use charset::{BaseCharSet, Entry};
use decode::Decoder;
use decoy::DecoyRoutine;
use encode::{CallLayout, Encoder, EntryRoutine};
use error::CodecError;
use keys::KeyPair;
use rng::SeedStream;
use table::ByteTable;

/// Non-fatal conditions observed during generation.
///
/// Generation proceeds; the caller is expected to surface these as
/// diagnostics, not to fail the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Seed 0 was passed explicitly. Valid and deterministic, but easy to
    /// mistake for "unset" — omit the seed for a random one.
    SeedZero,
    /// No valid entries; the codec is essentially empty.
    NoEntries,
    /// Malformed env lines were skipped.
    InvalidLines { count: usize, sample: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SeedZero => write!(
                f,
                "seed 0 is valid but deterministic; omit the seed for a random one"
            ),
            Self::NoEntries => write!(f, "no valid entries; generating an empty codec"),
            Self::InvalidLines { count, sample } => {
                write!(f, "ignored {count} invalid env line(s); first: '{sample}'")
            }
        }
    }
}

/// The complete output of one generation, consumed by an emitter.
///
/// The tables and keys are opaque binary data with no external format; the
/// routines are call-descriptor sequences to be rendered as calls to the
/// shared decode primitive.
#[derive(Debug)]
pub struct Obfuscation {
    /// The derived seed that drove all pseudorandom decisions.
    pub effective_seed: u32,
    pub keys: KeyPair,
    pub odd_table: ByteTable,
    pub even_table: ByteTable,
    pub layout: CallLayout,
    /// One decode/validate routine per entry, in entry order.
    pub routines: Vec<EntryRoutine>,
    /// Inert sibling routines for the emitter to interleave.
    pub decoys: Vec<DecoyRoutine>,
    pub warnings: Vec<Warning>,
}

impl Obfuscation {
    /// A decoder over this generation's tables, keys, and layout.
    pub fn decoder(&self) -> Decoder<'_> {
        Decoder::new(&self.odd_table, &self.even_table, self.keys, self.layout)
    }
}

/// Run the codec for one target.
///
/// `identity` is a stable, unique-enough string for the owning declaration
/// (namespace + type path + name + arity). `seed: None` draws a fresh seed
/// from the OS RNG; `Some(0)` is valid and deterministic but flagged with
/// [`Warning::SeedZero`].
///
/// # Errors
/// [`CodecError::DuplicateIdentifier`] if two entries share a name. Entry
/// names themselves are validated at [`Entry::new`].
pub fn obfuscate(
    entries: &[Entry],
    identity: &str,
    seed: Option<i32>,
) -> Result<Obfuscation, CodecError> {
    let mut used = HashSet::new();
    for entry in entries {
        if !used.insert(entry.name()) {
            return Err(CodecError::DuplicateIdentifier(entry.name().to_string()));
        }
    }

    let mut warnings = Vec::new();
    if seed == Some(0) {
        warnings.push(Warning::SeedZero);
    }
    if entries.is_empty() {
        warnings.push(Warning::NoEntries);
    }

    let user_seed = seed.unwrap_or_else(seed::random_seed);
    let effective = seed::effective_seed(user_seed, identity);

    let mut value_stream = SeedStream::new(effective);
    let mut naming_stream = SeedStream::new(effective ^ seed::NAMING_STREAM_XOR);

    let keys = keys::generate_keys(&mut value_stream);
    let charset = BaseCharSet::build(entries);
    let odd_table = ByteTable::build(&charset, keys.odd, &mut value_stream);
    let even_table = ByteTable::build(&charset, keys.even, &mut value_stream);
    let layout = CallLayout::draw(&mut value_stream);

    let (routines, decoys) = {
        let encoder = Encoder::new(&charset, keys, &odd_table, &even_table, layout);
        let routines: Vec<EntryRoutine> = entries
            .iter()
            .map(|entry| {
                let calls = encoder.encode_value(entry.value(), &mut value_stream);
                EntryRoutine {
                    name: entry.name().to_string(),
                    unit_len: calls.len(),
                    calls,
                }
            })
            .collect();
        let decoys =
            decoy::generate_decoys(&charset, &encoder, entries.len(), &mut naming_stream);
        (routines, decoys)
    };

    Ok(Obfuscation {
        effective_seed: effective,
        keys,
        odd_table,
        even_table,
        layout,
        routines,
        decoys,
        warnings,
    })
}

/// Convenience front end: parse a `key=value` env block, sanitize keys into
/// identifiers (deduplicating with numeric suffixes), and run [`obfuscate`].
///
/// Malformed lines and unsanitizable keys are skipped and reported via
/// [`Warning::InvalidLines`].
pub fn obfuscate_env_block(
    env_text: &str,
    identity: &str,
    seed: Option<i32>,
) -> Result<Obfuscation, CodecError> {
    let parsed = crate::env::parse_env_block(env_text);
    let mut invalid = parsed.invalid_lines;

    let mut used: HashSet<String> = HashSet::new();
    let mut entries = Vec::with_capacity(parsed.entries.len());
    for (key, value) in parsed.entries {
        let ident = match crate::env::sanitize_identifier(&key) {
            Some(ident) => ident,
            None => {
                invalid.push(key);
                continue;
            }
        };
        let ident = if used.insert(ident.clone()) {
            ident
        } else {
            let mut suffix = 1usize;
            loop {
                let candidate = format!("{ident}_{suffix}");
                if used.insert(candidate.clone()) {
                    break candidate;
                }
                suffix += 1;
            }
        };
        entries.push(Entry::new(ident, value)?);
    }

    let mut obfuscation = obfuscate(&entries, identity, seed)?;
    if !invalid.is_empty() {
        obfuscation.warnings.push(Warning::InvalidLines {
            count: invalid.len(),
            sample: invalid[0].clone(),
        });
    }
    Ok(obfuscation)
}
