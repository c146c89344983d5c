// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/veilcore

//! Effective-seed derivation.
//!
//! Every pseudorandom decision for one target derives from a single
//! *effective seed*: `mix32(user_seed ^ fnv1a_utf16(identity))`. The identity
//! hash is deliberately weak (32-bit FNV-1a) — two targets colliding in 32
//! bits simply share a codec layout, which is accepted behavior. The mixer is
//! a splitmix-style avalanche so small or similar user seeds still spread
//! across the full 32-bit space before driving any stream.
//!
//! When the caller supplies no seed, a fresh one comes from the operating
//! system RNG — never from a weak source like time or PID.

use rand::rngs::OsRng;
use rand::Rng;

/// XOR constant separating the naming/decoy stream seed from the value
/// stream seed, so the two streams never interfere.
pub const NAMING_STREAM_XOR: u32 = 0x6D2B_79F5;

/// 32-bit avalanche mixer (splitmix-style add / xor-shift / multiply).
///
/// Applied once when deriving the effective seed and once more inside
/// [`SeedStream::new`](crate::codec::rng::SeedStream::new), so raw seeds with
/// weak low-order bits never reach a generator directly.
pub fn mix32(seed: u32) -> u32 {
    let mut x = seed;
    x = x.wrapping_add(0x9E37_79B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EB_CA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2_AE35);
    x ^= x >> 16;
    x
}

/// 32-bit FNV-1a over the UTF-16 code units of `identity`.
///
/// Stable across platforms and deliberately not collision-resistant.
pub fn fnv1a_utf16(identity: &str) -> u32 {
    let mut hash: u32 = 0x811C_9DC5;
    for unit in identity.encode_utf16() {
        hash ^= u32::from(unit);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Combine a user seed with the target identity into the effective seed.
pub fn effective_seed(user_seed: i32, identity: &str) -> u32 {
    mix32(user_seed as u32 ^ fnv1a_utf16(identity))
}

/// Generate a fresh positive 31-bit seed from the OS RNG.
///
/// Used when the caller omits the seed entirely. `0` is never produced, so a
/// generated seed can't be confused with the explicit-zero case.
pub fn random_seed() -> i32 {
    OsRng.gen_range(1..i32::MAX)
}
