// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Decoy routine generation.
//!
//! Decoys are never-invoked sibling routines with the same descriptor shape
//! as the real ones, for an emitter to interleave so real and inert routines
//! are indistinguishable in a decompiled artifact. Their names and gibberish
//! contents come entirely from the naming stream, so adding or removing
//! decoys never shifts the value stream that real entries encode against.

use crate::codec::charset::BaseCharSet;
use crate::codec::encode::{CallDescriptor, Encoder};
use crate::codec::rng::SeedStream;

/// Gibberish length bounds for decoy values, in UTF-16 units.
const DECOY_MIN_UNITS: u32 = 4;
const DECOY_MAX_UNITS: u32 = 24;

/// An inert sibling routine. Decodes to gibberish (or to nothing at all when
/// the units happen to form invalid UTF-16); its only job is shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoyRoutine {
    pub name: String,
    pub unit_len: usize,
    pub calls: Vec<CallDescriptor>,
}

/// Generate a 32-character lowercase hex identifier from the naming stream.
///
/// The first character is forced into `a..=f` so the result is always a legal
/// identifier start.
pub fn hex_name(stream: &mut SeedStream) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut buf = Vec::with_capacity(32);
    for _ in 0..16 {
        let byte = stream.next_byte();
        buf.push(HEX[usize::from(byte >> 4)]);
        buf.push(HEX[usize::from(byte & 0x0F)]);
    }
    buf[0] = b'a' + stream.next_u32(6) as u8;
    String::from_utf8(buf).expect("hex digits are valid UTF-8")
}

/// Generate the decoy routines for one target.
///
/// The count is drawn from the naming stream in `[1, 2 * entry_count + 2)`,
/// so every target carries at least one decoy and busier targets carry
/// proportionally more.
pub fn generate_decoys(
    charset: &BaseCharSet,
    encoder: &Encoder<'_>,
    entry_count: usize,
    stream: &mut SeedStream,
) -> Vec<DecoyRoutine> {
    let count = stream.next_range(1, 2 * entry_count as u32 + 2);
    (0..count)
        .map(|_| {
            let name = hex_name(stream);
            let len = stream.next_range(DECOY_MIN_UNITS, DECOY_MAX_UNITS + 1) as usize;
            let units: Vec<u16> = (0..len)
                .map(|_| charset.units()[stream.next_u32(charset.len() as u32) as usize])
                .collect();
            let calls = encoder.encode_units(&units, stream);
            DecoyRoutine { name, unit_len: len, calls }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::charset::{is_valid_identifier, Entry};
    use crate::codec::encode::CallLayout;
    use crate::codec::keys::generate_keys;
    use crate::codec::table::ByteTable;

    #[test]
    fn hex_names_are_valid_identifiers() {
        let mut stream = SeedStream::new(17);
        for _ in 0..64 {
            let name = hex_name(&mut stream);
            assert_eq!(name.len(), 32);
            assert!(name.as_bytes()[0].is_ascii_lowercase());
            assert!(('a'..='f').contains(&(name.as_bytes()[0] as char)));
            assert!(name.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
            assert!(is_valid_identifier(&name));
        }
    }

    #[test]
    fn hex_names_differ() {
        let mut stream = SeedStream::new(8);
        let a = hex_name(&mut stream);
        let b = hex_name(&mut stream);
        assert_ne!(a, b);
    }

    #[test]
    fn decoys_have_routine_shape() {
        let entries = vec![Entry::new("A", "token-1").unwrap(), Entry::new("B", "").unwrap()];
        let charset = BaseCharSet::build(&entries);
        let mut value_stream = SeedStream::new(100);
        let keys = generate_keys(&mut value_stream);
        let odd = ByteTable::build(&charset, keys.odd, &mut value_stream);
        let even = ByteTable::build(&charset, keys.even, &mut value_stream);
        let layout = CallLayout::draw(&mut value_stream);
        let encoder = Encoder::new(&charset, keys, &odd, &even, layout);

        let mut naming = SeedStream::new(101);
        let decoys = generate_decoys(&charset, &encoder, entries.len(), &mut naming);

        assert!(!decoys.is_empty());
        assert!(decoys.len() < 2 * entries.len() + 2);
        for decoy in &decoys {
            assert_eq!(decoy.calls.len(), decoy.unit_len);
            assert!((DECOY_MIN_UNITS as usize..=DECOY_MAX_UNITS as usize)
                .contains(&decoy.unit_len));
            for call in &decoy.calls {
                let table = if call.low.odd { &odd } else { &even };
                assert!(call.low.index < table.len());
            }
        }
    }

    #[test]
    fn decoy_generation_deterministic() {
        let entries = vec![Entry::new("K", "v").unwrap()];
        let charset = BaseCharSet::build(&entries);
        let mut vs = SeedStream::new(5);
        let keys = generate_keys(&mut vs);
        let odd = ByteTable::build(&charset, keys.odd, &mut vs);
        let even = ByteTable::build(&charset, keys.even, &mut vs);
        let layout = CallLayout::draw(&mut vs);
        let encoder = Encoder::new(&charset, keys, &odd, &even, layout);

        let a = generate_decoys(&charset, &encoder, 1, &mut SeedStream::new(9));
        let b = generate_decoys(&charset, &encoder, 1, &mut SeedStream::new(9));
        assert_eq!(a, b);
    }
}
