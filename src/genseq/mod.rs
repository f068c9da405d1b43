// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Index enumeration: ordered sequences of generating values.
//!
//! # Architecture
//!
//! - [`GeneratingValues`]: every value coprime with a modulus, in CRT order.
//!   Works for integer and GF(2) polynomial moduli.
//! - [`CyclicGroup`]: the units modulo a prime power as powers of a
//!   generator. This is the ordering the multilevel storage and the fast CBC
//!   rely on.
//! - [`RandomTraversal`]: reproducible random sampling from either sequence.
//!
//! Both sequences are cheap value types: elements are computed on demand from
//! a handful of constants, never stored.

pub mod cyclic;
pub mod traversal;
pub mod values;

pub use cyclic::{CyclicGroup, GroupOrder};
pub use traversal::RandomTraversal;
pub use values::GeneratingValues;

use crate::error::Result;

/// A finite indexed sequence of generating values.
pub trait GenSeq {
    fn size(&self) -> usize;

    fn modulus(&self) -> u64;

    /// Element at index `i`, or `IndexOutOfRange`.
    fn element(&self, i: usize) -> Result<u64>;

    /// All elements in index order.
    fn values(&self) -> Vec<u64> {
        (0..self.size()).filter_map(|i| self.element(i).ok()).collect()
    }
}
