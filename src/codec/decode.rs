// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! The shared decode primitive, the value decoder, and the validator.
//!
//! [`decode_unit`] is the single primitive every call site shares: it takes
//! the packed flags, the packed byte pair, and the packed key pair, and
//! returns one UTF-16 unit. [`Decoder`] holds the tables, keys, and layout of
//! one generation by reference and resolves descriptors into primitive calls.
//!
//! The validator runs the identical arithmetic per position but OR-accumulates
//! the XOR difference against the candidate across *all* positions instead of
//! building a string — the only early return is the length check before any
//! per-character work begins, which cannot leak per-character timing.

use zeroize::Zeroizing;

use crate::codec::encode::{
    ByteRef, CallDescriptor, CallLayout, EntryRoutine, FLAG_ASCII, FLAG_HIGH_ODD, FLAG_LOW_ODD,
};
use crate::codec::error::CodecError;
use crate::codec::keys::KeyPair;
use crate::codec::table::ByteTable;

/// Reconstruct one UTF-16 unit from a packed call-descriptor triple.
///
/// Bit-exact contract: the low byte always XORs with the low 8 bits of its
/// selected key, the high byte with the high 8 bits of its selected key. When
/// the ASCII flag is set the high byte is inert noise and the result is the
/// 8-bit low unit.
pub fn decode_unit(flags: u8, packed_bytes: u16, packed_keys: u32, layout: CallLayout) -> u16 {
    let bits = (flags >> layout.flag_shift) & 0b111;
    let ascii = bits & FLAG_ASCII != 0;
    let low_odd = bits & FLAG_LOW_ODD != 0;
    let high_odd = bits & FLAG_HIGH_ODD != 0;

    let (low_raw, high_raw) = if layout.low_byte_first {
        ((packed_bytes & 0xFF) as u8, (packed_bytes >> 8) as u8)
    } else {
        ((packed_bytes >> 8) as u8, (packed_bytes & 0xFF) as u8)
    };

    let odd_key = (packed_keys >> 16) as u16;
    let even_key = packed_keys as u16;

    let low_key = if low_odd { odd_key } else { even_key };
    let low = low_raw ^ (low_key & 0xFF) as u8;
    if ascii {
        return u16::from(low);
    }

    let high_key = if high_odd { odd_key } else { even_key };
    let high = high_raw ^ (high_key >> 8) as u8;
    (u16::from(high) << 8) | u16::from(low)
}

/// Decoder for one generation: tables, keys, and call layout.
///
/// Conceptually a closure over "the tables and keys of this generation",
/// made explicit so emitters can reproduce it in any target language.
pub struct Decoder<'a> {
    odd_table: &'a ByteTable,
    even_table: &'a ByteTable,
    keys: KeyPair,
    layout: CallLayout,
}

impl<'a> Decoder<'a> {
    pub fn new(
        odd_table: &'a ByteTable,
        even_table: &'a ByteTable,
        keys: KeyPair,
        layout: CallLayout,
    ) -> Self {
        Self { odd_table, even_table, keys, layout }
    }

    fn resolve(&self, byte_ref: ByteRef) -> u8 {
        if byte_ref.odd {
            self.odd_table.get(byte_ref.index)
        } else {
            self.even_table.get(byte_ref.index)
        }
    }

    /// Pack the two source bytes in the layout's order, as a rendered call
    /// site would.
    fn pack_bytes(&self, call: &CallDescriptor) -> u16 {
        let low = u16::from(self.resolve(call.low));
        let high = u16::from(self.resolve(call.high));
        if self.layout.low_byte_first {
            (high << 8) | low
        } else {
            (low << 8) | high
        }
    }

    /// Decode one descriptor into a UTF-16 unit.
    pub fn decode_call(&self, call: &CallDescriptor) -> u16 {
        decode_unit(call.flags, self.pack_bytes(call), self.keys.packed(), self.layout)
    }

    /// Reconstruct an entry's plaintext value.
    pub fn decode_value(&self, routine: &EntryRoutine) -> Result<String, CodecError> {
        let mut units = Zeroizing::new(Vec::with_capacity(routine.calls.len()));
        for call in &routine.calls {
            units.push(self.decode_call(call));
        }
        String::from_utf16(&units).map_err(|_| CodecError::InvalidUtf16(routine.name.clone()))
    }

    /// Check a candidate against an entry without materializing the decoded
    /// plaintext.
    ///
    /// Accumulates the XOR difference over every position unconditionally;
    /// returns early only on a length mismatch, before any per-character work.
    pub fn validate(&self, routine: &EntryRoutine, candidate: &str) -> bool {
        let units: Zeroizing<Vec<u16>> = Zeroizing::new(candidate.encode_utf16().collect());
        if units.len() != routine.unit_len {
            return false;
        }

        let mut diff: u16 = 0;
        for (call, &unit) in routine.calls.iter().zip(units.iter()) {
            diff |= self.decode_call(call) ^ unit;
        }
        diff == 0
    }
}
