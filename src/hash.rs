// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Key hash functions.
//!
//! Every function maps a 32-bit key to a 32-bit digest. The digest is *not*
//! bounded by the table capacity, callers reduce it with `% capacity`.
//! The reducing functions ([`fold`], [`shift_reduce`], [`shift_reduce_square`])
//! iterate until the value drops below [`THRESHOLD`].

use std::str::FromStr;

/// Modulus of [`division`], and the bound the reducing functions iterate to
pub const THRESHOLD: u32 = 10_000;

/// Modulus of [`division_prime`], the largest prime below [`THRESHOLD`]
pub const PRIME_MODULUS: u32 = 9_973;

/// `key % 10000`
#[must_use]
pub fn division(key: u32) -> u32 {
    key % THRESHOLD
}

/// `key % 9973`
#[must_use]
pub fn division_prime(key: u32) -> u32 {
    key % PRIME_MODULUS
}

/// Number of significant bits
fn bit_len(value: u64) -> u32 {
    u64::BITS - value.leading_zeros()
}

/// Smallest `n` such that `2^n >= value`
fn ceil_log2(value: u64) -> u32 {
    debug_assert!(value > 0);
    bit_len(value - 1)
}

/// Keeps the lowest `bits` bits
fn low_bits(value: u64, bits: u32) -> u64 {
    if bits >= u64::BITS {
        value
    } else {
        value & ((1 << bits) - 1)
    }
}

/// Digit folding over the binary representation.
///
/// Splits the significant bits into a high and a low half and adds them,
/// until the value is below [`THRESHOLD`].
///
/// With `b` significant bits (rounded up to even) and `h = b / 2`, the sum is
/// below `2^(h + 1)` while the input is at least `2^(2h - 2)`. For any input
/// at or above the threshold `h >= 7`, so every round strictly shrinks the
/// value and the loop ends after a handful of rounds.
#[must_use]
pub fn fold(key: u32) -> u32 {
    let mut value = u64::from(key);

    while value >= u64::from(THRESHOLD) {
        let bits = bit_len(value);
        let half = bits.div_ceil(2);

        let high = value >> half;
        let low = low_bits(value, half);

        value = high + low;
    }

    // NOTE: Loop ends below THRESHOLD
    #[allow(clippy::cast_possible_truncation)]
    let value = value as u32;

    value
}

/// Shift-based reduction.
///
/// Alternates between halving the value and masking it down to the bit
/// width of the input key, until the value is below [`THRESHOLD`].
/// Keys below the threshold (including `0`) are returned unchanged, so the
/// logarithm is never taken of zero.
#[must_use]
pub fn shift_reduce(key: u32) -> u32 {
    let mut value = u64::from(key);
    let mut round = 0u32;

    while value >= u64::from(THRESHOLD) {
        if round % 2 == 0 {
            value >>= 1;
        } else {
            value = low_bits(value, ceil_log2(u64::from(key)));
        }
        round += 1;
    }

    // NOTE: Loop ends below THRESHOLD
    #[allow(clippy::cast_possible_truncation)]
    let value = value as u32;

    value
}

/// Shift-based reduction of the squared key.
///
/// The square is computed in 64 bits, so no high bits are lost before the
/// reduction starts. The masking rounds use the bit width of the current
/// value; an exact power of two therefore collapses to zero.
#[must_use]
pub fn shift_reduce_square(key: u32) -> u32 {
    let mut value = u64::from(key) * u64::from(key);
    let mut round = 0u32;

    while value >= u64::from(THRESHOLD) {
        if round % 2 == 0 {
            value >>= 1;
        } else {
            value = low_bits(value, ceil_log2(value));
        }
        round += 1;
    }

    // NOTE: Loop ends below THRESHOLD
    #[allow(clippy::cast_possible_truncation)]
    let value = value as u32;

    value
}

/// Hash function a table hashes its keys with
#[derive(Copy, Clone, Debug, Default)]
pub enum HashFunction {
    /// See [`division`]
    #[default]
    Division,

    /// See [`division_prime`]
    DivisionPrime,

    /// See [`fold`]
    Fold,

    /// See [`shift_reduce`]
    ShiftReduce,

    /// See [`shift_reduce_square`]
    ShiftReduceSquare,

    /// User supplied function
    Custom(fn(u32) -> u32),
}

impl HashFunction {
    /// All built-in hash functions
    pub const BUILTIN: [Self; 5] = [
        Self::ShiftReduce,
        Self::ShiftReduceSquare,
        Self::Division,
        Self::DivisionPrime,
        Self::Fold,
    ];

    /// Hashes a key.
    #[must_use]
    pub fn hash(&self, key: u32) -> u32 {
        match self {
            Self::Division => division(key),
            Self::DivisionPrime => division_prime(key),
            Self::Fold => fold(key),
            Self::ShiftReduce => shift_reduce(key),
            Self::ShiftReduceSquare => shift_reduce_square(key),
            Self::Custom(f) => f(key),
        }
    }

    /// Stable name, used in file names and on the command line.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Division => "division",
            Self::DivisionPrime => "division-prime",
            Self::Fold => "fold",
            Self::ShiftReduce => "shift-reduce",
            Self::ShiftReduceSquare => "shift-reduce-square",
            Self::Custom(_) => "custom",
        }
    }
}

impl std::fmt::Display for HashFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HashFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::BUILTIN
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("unknown hash function {s:?}"))
    }
}
