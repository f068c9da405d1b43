// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use std::collections::BTreeSet;
use std::fmt;

/// Largest supported dimension. Subsets of the coordinates are enumerated
/// as the bits of a `u64`.
pub const MAX_DIMENSION: usize = 63;

/// A set of coordinate indices.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Projection(BTreeSet<usize>);

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, j: usize) -> bool {
        self.0.contains(&j)
    }

    pub fn largest(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Copy with `j` added.
    pub fn with(&self, j: usize) -> Self {
        let mut out = self.clone();
        out.0.insert(j);
        out
    }

    /// Copy with the largest coordinate removed.
    pub fn without_largest(&self) -> Self {
        let mut out = self.clone();
        out.0.pop_last();
        out
    }

    /// All `2^d` subsets of `{0, .., d-1}`, smallest first by bit pattern.
    /// `d` must not exceed [`MAX_DIMENSION`].
    pub fn subsets(d: usize) -> impl Iterator<Item = Projection> {
        let end = 1u64 << d.min(MAX_DIMENSION);
        (0u64..end).map(move |bits| (0..d).filter(|j| bits >> j & 1 == 1).collect())
    }
}

impl FromIterator<usize> for Projection {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Projection(iter.into_iter().collect())
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|j| j.to_string()).collect();
        write!(f, "{{{}}}", parts.join(","))
    }
}
