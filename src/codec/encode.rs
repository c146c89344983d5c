// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Per-character encoding into table-index references.
//!
//! Each occurrence of each value unit becomes one [`CallDescriptor`]: a flags
//! byte, a low-byte table reference, and a high-byte table reference. The
//! encoder picks, per occurrence, which key/table parity serves the low and
//! high byte, and whether the first or last occurrence of that byte value in
//! the table is referenced — so repeated characters rarely produce repeated
//! descriptors.
//!
//! ASCII units (< 0x80) have no real upper byte. Their high reference is pure
//! noise: a random index into a randomly chosen table, ignored on decode.
//! This keeps every call site the same shape regardless of content.
//!
//! The three semantic flag bits sit at a pseudorandom contiguous 3-bit window
//! inside an otherwise random byte. The window offset and the packed byte
//! order are drawn once per generation ([`CallLayout`]), not per character,
//! so the rendered call sites stay uniform.

use std::collections::HashMap;

use crate::codec::charset::BaseCharSet;
use crate::codec::keys::KeyPair;
use crate::codec::rng::SeedStream;
use crate::codec::table::ByteTable;

/// Sentinel for upper-byte occurrence slots of ASCII units.
pub const NO_INDEX: usize = usize::MAX;

/// Semantic flag bits, before shifting into the layout's window.
pub const FLAG_ASCII: u8 = 0b001;
pub const FLAG_LOW_ODD: u8 = 0b010;
pub const FLAG_HIGH_ODD: u8 = 0b100;

/// Width of the semantic flag window in bits.
pub const FLAG_WINDOW_BITS: u32 = 3;

/// Per-generation call-site layout: where the flag window sits inside the
/// flags byte, and in which order the two source bytes are packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallLayout {
    /// Bit offset of the 3-bit semantic window, in `[0, 5]`.
    pub flag_shift: u8,
    /// Low byte in the low half of the packed value when true.
    pub low_byte_first: bool,
}

impl CallLayout {
    /// Draw the layout from the value stream, once per generation.
    pub fn draw(stream: &mut SeedStream) -> Self {
        Self {
            flag_shift: stream.next_u32(8 - FLAG_WINDOW_BITS + 1) as u8,
            low_byte_first: stream.next_bool(),
        }
    }

    /// Mask covering the semantic window at this layout's offset.
    pub fn window_mask(self) -> u8 {
        0b111 << self.flag_shift
    }
}

/// First and last table positions of one byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrences {
    pub first: usize,
    pub last: usize,
}

/// Precomputed table references for one base character set unit: odd/even
/// table × lower/upper byte, each as first and last occurrence.
///
/// Upper slots hold [`NO_INDEX`] for ASCII units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObfuscatedChar {
    pub unit: u16,
    pub odd_low: Occurrences,
    pub even_low: Occurrences,
    pub odd_high: Occurrences,
    pub even_high: Occurrences,
}

/// A table reference: which table (parity) and which position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRef {
    /// Odd table/key when true, even otherwise.
    pub odd: bool,
    pub index: usize,
}

/// One argument triple for the shared decode primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallDescriptor {
    pub flags: u8,
    pub low: ByteRef,
    pub high: ByteRef,
}

/// The decode/validate call sequence for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRoutine {
    pub name: String,
    /// Value length in UTF-16 units; equals `calls.len()`.
    pub unit_len: usize,
    pub calls: Vec<CallDescriptor>,
}

/// Encoder for one generation: the index map over the base character set,
/// plus the tables, keys, and layout it encodes against.
pub struct Encoder<'a> {
    odd_table: &'a ByteTable,
    even_table: &'a ByteTable,
    layout: CallLayout,
    map: HashMap<u16, ObfuscatedChar>,
}

impl<'a> Encoder<'a> {
    /// Precompute the per-unit index map.
    ///
    /// The tables are built from the same character set, so every lookup is
    /// infallible by construction.
    pub fn new(
        charset: &BaseCharSet,
        keys: KeyPair,
        odd_table: &'a ByteTable,
        even_table: &'a ByteTable,
        layout: CallLayout,
    ) -> Self {
        let mut map = HashMap::with_capacity(charset.len());
        for &unit in charset.units() {
            map.insert(
                unit,
                ObfuscatedChar {
                    unit,
                    odd_low: low_occurrences(odd_table, unit, keys.odd),
                    even_low: low_occurrences(even_table, unit, keys.even),
                    odd_high: high_occurrences(odd_table, unit, keys.odd),
                    even_high: high_occurrences(even_table, unit, keys.even),
                },
            );
        }
        Self { odd_table, even_table, layout, map }
    }

    pub fn layout(&self) -> CallLayout {
        self.layout
    }

    /// Encode one value, drawing all per-occurrence choices from `stream`.
    pub fn encode_value(&self, value: &str, stream: &mut SeedStream) -> Vec<CallDescriptor> {
        let units: Vec<u16> = value.encode_utf16().collect();
        self.encode_units(&units, stream)
    }

    /// Encode a raw unit sequence (used for values and for decoy gibberish).
    pub fn encode_units(&self, units: &[u16], stream: &mut SeedStream) -> Vec<CallDescriptor> {
        units.iter().map(|&unit| self.encode_unit(unit, stream)).collect()
    }

    fn encode_unit(&self, unit: u16, stream: &mut SeedStream) -> CallDescriptor {
        let oc = self
            .map
            .get(&unit)
            .expect("unit is in the base character set by construction");
        let ascii = unit < 0x80;

        let low_odd = stream.next_bool();
        let low_first = stream.next_bool();
        let low_occ = if low_odd { oc.odd_low } else { oc.even_low };
        let low_index = if low_first { low_occ.first } else { low_occ.last };

        let (high_odd, high_index) = if ascii {
            // No real upper byte: noise index into a randomly chosen table.
            let high_odd = stream.next_bool();
            let len = if high_odd { self.odd_table.len() } else { self.even_table.len() };
            (high_odd, stream.next_u32(len as u32) as usize)
        } else {
            let high_odd = stream.next_bool();
            let high_first = stream.next_bool();
            let occ = if high_odd { oc.odd_high } else { oc.even_high };
            (high_odd, if high_first { occ.first } else { occ.last })
        };

        let mut bits = 0u8;
        if ascii {
            bits |= FLAG_ASCII;
        }
        if low_odd {
            bits |= FLAG_LOW_ODD;
        }
        if high_odd {
            bits |= FLAG_HIGH_ODD;
        }
        let filler = stream.next_byte();
        let flags = (filler & !self.layout.window_mask()) | (bits << self.layout.flag_shift);

        CallDescriptor {
            flags,
            low: ByteRef { odd: low_odd, index: low_index },
            high: ByteRef { odd: high_odd, index: high_index },
        }
    }
}

fn low_occurrences(table: &ByteTable, unit: u16, key: u16) -> Occurrences {
    let byte = ((unit ^ key) & 0xFF) as u8;
    Occurrences {
        first: table
            .first_index_of(byte)
            .expect("lower byte is in the table by construction"),
        last: table
            .last_index_of(byte)
            .expect("lower byte is in the table by construction"),
    }
}

fn high_occurrences(table: &ByteTable, unit: u16, key: u16) -> Occurrences {
    if unit < 0x80 {
        return Occurrences { first: NO_INDEX, last: NO_INDEX };
    }
    let byte = ((unit ^ key) >> 8) as u8;
    Occurrences {
        first: table
            .first_index_of(byte)
            .expect("upper byte is in the table by construction"),
        last: table
            .last_index_of(byte)
            .expect("upper byte is in the table by construction"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::charset::Entry;
    use crate::codec::keys::generate_keys;

    struct Fixture {
        charset: BaseCharSet,
        keys: KeyPair,
        odd: ByteTable,
        even: ByteTable,
        layout: CallLayout,
        stream: SeedStream,
    }

    fn fixture(value: &str, seed: u32) -> Fixture {
        let charset = BaseCharSet::build(&[Entry::new("V", value).unwrap()]);
        let mut stream = SeedStream::new(seed);
        let keys = generate_keys(&mut stream);
        let odd = ByteTable::build(&charset, keys.odd, &mut stream);
        let even = ByteTable::build(&charset, keys.even, &mut stream);
        let layout = CallLayout::draw(&mut stream);
        Fixture { charset, keys, odd, even, layout, stream }
    }

    #[test]
    fn layout_shift_stays_in_window() {
        for seed in 0..128u32 {
            let layout = CallLayout::draw(&mut SeedStream::new(seed));
            assert!(layout.flag_shift <= 5, "shift {} out of range", layout.flag_shift);
        }
    }

    #[test]
    fn descriptors_reference_correct_bytes() {
        let mut fx = fixture("aZ9", 21);
        let enc = Encoder::new(&fx.charset, fx.keys, &fx.odd, &fx.even, fx.layout);
        let calls = enc.encode_value("aZ9", &mut fx.stream);
        assert_eq!(calls.len(), 3);

        for (call, unit) in calls.iter().zip("aZ9".encode_utf16()) {
            let key = if call.low.odd { fx.keys.odd } else { fx.keys.even };
            let table = if call.low.odd { &fx.odd } else { &fx.even };
            assert_eq!(table.get(call.low.index), ((unit ^ key) & 0xFF) as u8);
            // ASCII: high reference must still be a valid table index.
            let high_table = if call.high.odd { &fx.odd } else { &fx.even };
            assert!(call.high.index < high_table.len());
        }
    }

    #[test]
    fn non_ascii_high_byte_is_real() {
        let value = "ä🎉テ";
        let mut fx = fixture(value, 33);
        let enc = Encoder::new(&fx.charset, fx.keys, &fx.odd, &fx.even, fx.layout);
        let calls = enc.encode_value(value, &mut fx.stream);

        for (call, unit) in calls.iter().zip(value.encode_utf16()) {
            assert!(unit >= 0x80);
            let key = if call.high.odd { fx.keys.odd } else { fx.keys.even };
            let table = if call.high.odd { &fx.odd } else { &fx.even };
            assert_eq!(table.get(call.high.index), ((unit ^ key) >> 8) as u8);
        }
    }

    #[test]
    fn flag_bits_land_in_the_window() {
        let mut fx = fixture("Aä", 55);
        let enc = Encoder::new(&fx.charset, fx.keys, &fx.odd, &fx.even, fx.layout);
        let calls = enc.encode_value("Aä", &mut fx.stream);

        let shift = fx.layout.flag_shift;
        let ascii_call = calls[0];
        let wide_call = calls[1];
        assert_ne!((ascii_call.flags >> shift) & FLAG_ASCII, 0);
        assert_eq!((wide_call.flags >> shift) & FLAG_ASCII, 0);

        for call in &calls {
            let bits = (call.flags >> shift) & 0b111;
            assert_eq!((bits & FLAG_LOW_ODD != 0), call.low.odd);
            assert_eq!((bits & FLAG_HIGH_ODD != 0), call.high.odd);
        }
    }

    #[test]
    fn repeated_characters_vary() {
        // 32 occurrences of the same character: with random parity and
        // first/last choices, they cannot all collapse to one descriptor.
        let value = "HHHHHHHHHHHHHHHHHHHHHHHHHHHHHHHH";
        let mut fx = fixture(value, 13);
        let enc = Encoder::new(&fx.charset, fx.keys, &fx.odd, &fx.even, fx.layout);
        let calls = enc.encode_value(value, &mut fx.stream);
        let first = calls[0];
        assert!(calls.iter().any(|c| c.low != first.low || c.flags != first.flags));
    }

    #[test]
    fn ascii_units_have_sentinel_upper_slots() {
        let fx = fixture("x", 3);
        let enc = Encoder::new(&fx.charset, fx.keys, &fx.odd, &fx.even, fx.layout);
        let oc = enc.map[&u16::from(b'x')];
        assert_eq!(oc.odd_high.first, NO_INDEX);
        assert_eq!(oc.even_high.last, NO_INDEX);
    }

    #[test]
    fn empty_value_yields_no_calls() {
        let mut fx = fixture("", 1);
        let enc = Encoder::new(&fx.charset, fx.keys, &fx.odd, &fx.even, fx.layout);
        assert!(enc.encode_value("", &mut fx.stream).is_empty());
    }
}
