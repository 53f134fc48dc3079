//! Probabilistic membership filter.
//!
//! A classic Bloom filter sized from an expected capacity and a target
//! false-positive rate. Bit positions come from double hashing
//! (`g_i = h1 + i * h2 mod m`) over a SHA-256 of the fingerprint text, so
//! the layout is stable across builds and platforms.
//!
//! There is no removal. Shrinking the set means building a new filter from
//! the record store.

// Sizing math moves between f64 and integer widths on purpose.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use crate::models::Fingerprint;
use sha2::{Digest, Sha256};
use std::f64::consts::LN_2;

/// Largest bit array a filter may be configured with: 2^34 bits (2 GiB).
pub const MAX_FILTER_BITS: u64 = 1 << 34;

/// In-memory approximate set of fingerprints.
///
/// `might_contain` never returns `false` for an added fingerprint. It may
/// return `true` for one that was never added, at roughly the configured
/// rate once `capacity` items are in; beyond capacity the rate rises
/// gradually.
#[derive(Debug, Clone)]
pub struct MembershipFilter {
    bits: Vec<u64>,
    bit_len: u64,
    hash_count: u32,
    capacity: usize,
    error_rate: f64,
    inserted: usize,
}

impl MembershipFilter {
    /// Creates a filter for `capacity` items at `error_rate` false positives.
    ///
    /// A zero capacity is treated as one; the error rate is clamped into
    /// `(0, 1)`. Configuration validation rejects both before this point.
    #[must_use]
    pub fn new(capacity: usize, error_rate: f64) -> Self {
        let capacity = capacity.max(1);
        let error_rate = if error_rate.is_finite() {
            error_rate.clamp(f64::MIN_POSITIVE, 1.0 - f64::EPSILON)
        } else {
            0.1
        };
        let bit_len = Self::optimal_bit_len(capacity, error_rate);
        let hash_count = Self::optimal_hash_count(bit_len, capacity);
        Self {
            bits: vec![0; bit_len.div_ceil(64) as usize],
            bit_len,
            hash_count,
            capacity,
            error_rate,
            inserted: 0,
        }
    }

    /// Bit array size: `ceil(-n * ln(p) / ln(2)^2)`, at least 64.
    #[must_use]
    pub fn optimal_bit_len(capacity: usize, error_rate: f64) -> u64 {
        let n = capacity.max(1) as f64;
        let m = (-n * error_rate.ln() / (LN_2 * LN_2)).ceil();
        (m as u64).max(64)
    }

    /// Hash function count: `round(m / n * ln(2))`, at least 1.
    #[must_use]
    pub fn optimal_hash_count(bit_len: u64, capacity: usize) -> u32 {
        let k = (bit_len as f64 / capacity.max(1) as f64 * LN_2).round();
        (k as u32).max(1)
    }

    /// Adds a fingerprint. Idempotent.
    pub fn add(&mut self, fingerprint: &Fingerprint) {
        let (h1, h2) = Self::base_hashes(fingerprint);
        for i in 0..u64::from(self.hash_count) {
            let bit = Self::position(h1, h2, i, self.bit_len);
            self.bits[(bit / 64) as usize] |= 1 << (bit % 64);
        }
        self.inserted = self.inserted.saturating_add(1);
    }

    /// Returns `true` if every bit for the fingerprint is set.
    #[must_use]
    pub fn might_contain(&self, fingerprint: &Fingerprint) -> bool {
        let (h1, h2) = Self::base_hashes(fingerprint);
        (0..u64::from(self.hash_count)).all(|i| {
            let bit = Self::position(h1, h2, i, self.bit_len);
            self.bits[(bit / 64) as usize] & (1 << (bit % 64)) != 0
        })
    }

    /// Clears every bit.
    pub fn clear(&mut self) {
        self.bits.fill(0);
        self.inserted = 0;
    }

    /// Number of `add` calls, including repeats.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inserted
    }

    /// Returns `true` if nothing has been added.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    /// Size of the bit array.
    #[must_use]
    pub const fn bit_len(&self) -> u64 {
        self.bit_len
    }

    /// Number of hash functions.
    #[must_use]
    pub const fn hash_count(&self) -> u32 {
        self.hash_count
    }

    /// Designed capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Target false-positive rate at capacity.
    #[must_use]
    pub const fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Fraction of bits set.
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        let set: u64 = self.bits.iter().map(|w| u64::from(w.count_ones())).sum();
        set as f64 / self.bit_len as f64
    }

    /// Expected false-positive rate for the current insert count:
    /// `(1 - e^(-k * n / m))^k`.
    #[must_use]
    pub fn estimated_error_rate(&self) -> f64 {
        let k = f64::from(self.hash_count);
        let exponent = -k * self.inserted as f64 / self.bit_len as f64;
        (1.0 - exponent.exp()).powf(k)
    }

    fn base_hashes(fingerprint: &Fingerprint) -> (u64, u64) {
        let digest = Sha256::digest(fingerprint.as_str().as_bytes());
        let mut h1 = [0u8; 8];
        let mut h2 = [0u8; 8];
        h1.copy_from_slice(&digest[..8]);
        h2.copy_from_slice(&digest[8..16]);
        // h2 forced odd
        (u64::from_le_bytes(h1), u64::from_le_bytes(h2) | 1)
    }

    const fn position(h1: u64, h2: u64, i: u64, bit_len: u64) -> u64 {
        h1.wrapping_add(i.wrapping_mul(h2)) % bit_len
    }
}
