// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Index compression.
//!
//! A symmetric kernel takes the same value at `i/n` and `(n-i)/n`, so only
//! the representatives `min(i, n-i)` need physical storage. Sums over the
//! compressed array are corrected by counting every folded slot twice.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Compression applied to the logical point index space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Compress {
    /// Identity mapping.
    None,
    /// Fold `i` and `n - i` onto the same slot.
    Symmetric,
}

impl Compress {
    pub fn symmetric(self) -> bool {
        self == Compress::Symmetric
    }

    /// Number of physical slots needed for `n` logical indices.
    pub fn size(self, n: u64) -> u64 {
        match self {
            Compress::None => n,
            Compress::Symmetric if n == 0 => 0,
            Compress::Symmetric => n / 2 + 1,
        }
    }

    /// Compressed representative of logical index `i` in `[0, n)`.
    pub fn compress_index(self, i: u64, n: u64) -> u64 {
        match self {
            Compress::None => i,
            Compress::Symmetric => i.min(n - i),
        }
    }

    /// How many logical indices fold onto compressed slot `i`.
    pub fn index_compression_ratio(self, i: u64, n: u64) -> u64 {
        match self {
            Compress::None => 1,
            Compress::Symmetric if i == 0 || (n % 2 == 0 && i == n / 2) => 1,
            Compress::Symmetric => 2,
        }
    }

    /// How many logical indices fold onto each slot of embedded level `level`.
    ///
    /// Level 0 holds only the origin. In base 2, level 1 holds only `n/2`,
    /// which is its own mirror image.
    pub fn level_compression_ratio(self, base: u64, level: u32) -> u64 {
        let first_folded = if base == 2 { 2 } else { 1 };
        match self {
            Compress::Symmetric if level >= first_folded => 2,
            _ => 1,
        }
    }

    /// Sum over all logical indices of a vector stored in compressed form.
    pub fn compressed_sum(self, values: &[f64], n: u64) -> f64 {
        let sum: f64 = values.iter().sum();
        match (self, values.first(), values.last()) {
            (Compress::Symmetric, Some(first), Some(last)) => {
                let mut total = 2.0 * sum - first;
                if n % 2 == 0 {
                    total -= last;
                }
                total
            }
            _ => sum,
        }
    }
}
