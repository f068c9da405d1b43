// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Storage engine: the layout of per-point vectors in memory.
//!
//! A storage maps the logical point indices `0..virtual_size()` onto a
//! physical array of `size()` slots. Two operators are exposed:
//!
//! - **Unpermute**: logical index to physical slot, in natural order.
//! - **Stride**: physical slot to physical slot, the reordering induced by
//!   multiplying every logical index by a generating value `a`.
//!
//! # Architecture
//!
//! The storage is an immutable value. Its tables are built once by
//! [`Storage::new`] and shared through an `Arc`, so clones are cheap and can
//! be handed to worker threads.
//!
//! | layout | slot order | stride cost |
//! |---|---|---|
//! | unilevel | natural, compressed | O(1) arithmetic |
//! | multilevel BASIC | level blocks, ascending | one table pass per `a` |
//! | multilevel CYCLIC | level blocks, inverse generator powers | O(1) shift |
//!
//! Symmetric compression folds `i` and `n - i` onto one slot. It is only
//! available for ordinary lattices.

pub mod stride;
mod tables;

pub use stride::Stride;

use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::{LatticeError, Result};
use crate::genseq::CyclicGroup;
use crate::merit::MeritValue;
use crate::size::{Compress, LatticeType, SizeParam};
use tables::LevelTables;

/// Order of the indices within each level block of a multilevel storage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PerLevelOrder {
    #[default]
    Basic,
    Cyclic,
}

#[derive(Debug)]
enum Tables {
    Unilevel,
    Multilevel(LevelTables),
}

/// A physical layout for vectors indexed by lattice points.
#[derive(Debug, Clone)]
pub struct Storage {
    size_param: SizeParam,
    compress: Compress,
    order: PerLevelOrder,
    tables: Arc<Tables>,
}

impl Storage {
    pub fn new(size_param: SizeParam, compress: Compress, order: PerLevelOrder) -> Result<Self> {
        let lattice = size_param.lattice_type();
        if lattice == LatticeType::Polynomial && compress.symmetric() {
            return Err(LatticeError::NoSymmetricKernel { lattice });
        }
        if order == PerLevelOrder::Cyclic {
            if !size_param.is_embedded() {
                return Err(LatticeError::InvalidCyclicOrder {
                    reason: "unilevel storage",
                });
            }
            if lattice == LatticeType::Polynomial {
                return Err(LatticeError::InvalidCyclicOrder {
                    reason: "polynomial lattices",
                });
            }
        }
        let tables = if size_param.is_embedded() {
            Tables::Multilevel(LevelTables::build(&size_param, compress, order)?)
        } else {
            Tables::Unilevel
        };
        Ok(Self {
            size_param,
            compress,
            order,
            tables: Arc::new(tables),
        })
    }

    /// Unilevel storage for `size_param` with the given compression.
    pub fn unilevel(size_param: SizeParam, compress: Compress) -> Result<Self> {
        Self::new(size_param.unilevel(), compress, PerLevelOrder::Basic)
    }

    pub fn size_param(&self) -> &SizeParam {
        &self.size_param
    }

    pub fn compress(&self) -> Compress {
        self.compress
    }

    pub fn symmetric(&self) -> bool {
        self.compress.symmetric()
    }

    pub fn order(&self) -> PerLevelOrder {
        self.order
    }

    pub fn is_multilevel(&self) -> bool {
        matches!(*self.tables, Tables::Multilevel(_))
    }

    pub(crate) fn level_tables(&self) -> Option<&LevelTables> {
        match &*self.tables {
            Tables::Unilevel => None,
            Tables::Multilevel(t) => Some(t),
        }
    }

    /// Number of logical indices.
    pub fn virtual_size(&self) -> usize {
        self.size_param.num_points() as usize
    }

    /// Number of physical slots.
    pub fn size(&self) -> usize {
        self.compress.size(self.size_param.num_points()) as usize
    }

    /// Physical slot of logical index `i`.
    pub fn unpermute(&self, i: u64) -> Result<usize> {
        let n = self.size_param.num_points();
        let out_of_range = LatticeError::IndexOutOfRange {
            index: i as usize,
            size: n as usize,
        };
        if i >= n {
            return Err(out_of_range);
        }
        let k = self.compress.compress_index(i, n);
        match self.level_tables() {
            None => Ok(k as usize),
            Some(t) => t.address.get(&k).copied().ok_or(out_of_range),
        }
    }

    /// Logical index stored in physical slot `slot`.
    pub fn representative(&self, slot: usize) -> u64 {
        match self.level_tables() {
            None => slot as u64,
            Some(t) => t.elements[slot],
        }
    }

    /// `v` read in natural logical order, one value per logical index.
    pub fn unpermuted(&self, v: &[f64]) -> Result<Vec<f64>> {
        (0..self.virtual_size() as u64)
            .map(|i| self.unpermute(i).map(|slot| v[slot]))
            .collect()
    }

    pub fn stride(&self, a: u64) -> Result<Stride<'_>> {
        Stride::new(self, a)
    }

    /// `v` reordered so that slot `i` holds the value at logical index `a * x_i`.
    pub fn strided(&self, v: &[f64], a: u64) -> Result<Vec<f64>> {
        let stride = self.stride(a)?;
        Ok(stride.iter().map(|j| v[j]).collect())
    }

    /// Discrete-log row of `a` in the max-level generator group.
    ///
    /// Only CYCLIC storages have rows. A value that is not a unit has none.
    pub fn find_row(&self, a: u64) -> Result<usize> {
        let n = self.size_param.modulus();
        let generators = self
            .level_tables()
            .and_then(|t| t.generators.as_ref())
            .ok_or(LatticeError::InvalidCyclicOrder {
                reason: "row lookup on a non-cyclic storage",
            })?;
        let key = self.compress.compress_index(a % n, n);
        generators
            .rows
            .get(&key)
            .copied()
            .ok_or(LatticeError::NotCoprime { value: a, modulus: n })
    }

    /// The max-level generator group (DIRECT order) of a CYCLIC storage.
    pub fn generators(&self) -> Option<&CyclicGroup> {
        self.level_tables()
            .and_then(|t| t.generators.as_ref())
            .map(|g| &g.group)
    }

    /// Physical ranges of the level blocks. A unilevel storage has one range.
    pub fn level_ranges(&self) -> Vec<Range<usize>> {
        match self.level_tables() {
            None => vec![0..self.size()],
            Some(t) => t.ranges.clone(),
        }
    }

    pub fn create_merit_value(&self, x: f64) -> MeritValue {
        if self.is_multilevel() {
            MeritValue::Levels(vec![x; self.size_param.max_level() as usize + 1])
        } else {
            MeritValue::Scalar(x)
        }
    }

    /// Sum over all logical indices of a vector in this layout.
    ///
    /// For a multilevel storage the result holds one partial sum per level,
    /// each including all lower levels.
    pub fn compressed_sum(&self, v: &[f64]) -> MeritValue {
        match self.level_tables() {
            None => {
                let n = self.size_param.num_points();
                MeritValue::Scalar(self.compress.compressed_sum(v, n))
            }
            Some(t) => {
                let base = self.size_param.base();
                let mut total = 0.0;
                let levels = t
                    .ranges
                    .iter()
                    .enumerate()
                    .map(|(level, r)| {
                        let ratio = self.compress.level_compression_ratio(base, level as u32);
                        total += ratio as f64 * v[r.clone()].iter().sum::<f64>();
                        total
                    })
                    .collect();
                MeritValue::Levels(levels)
            }
        }
    }

    pub fn normalize(&self, merit: &mut MeritValue) {
        self.size_param.normalize(merit);
    }

    /// Same size parameter, ignoring compression and order.
    pub fn matches(&self, size_param: &SizeParam) -> bool {
        self.size_param == *size_param
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn logical(storage: &Storage, slot: usize) -> u64 {
        storage.representative(slot)
    }

    #[test]
    fn test_unilevel_symmetric_layout() {
        let storage = Storage::unilevel(SizeParam::ordinary(12), Compress::Symmetric).unwrap();
        assert_eq!(storage.size(), 7);
        assert_eq!(storage.virtual_size(), 12);
        assert_eq!(storage.unpermute(5).unwrap(), 5);
        assert_eq!(storage.unpermute(7).unwrap(), 5);
        assert!(storage.unpermute(12).is_err());
        assert_eq!(storage.level_ranges(), vec![0..7]);
    }

    #[test]
    fn test_unilevel_stride() {
        let storage = Storage::unilevel(SizeParam::ordinary(12), Compress::Symmetric).unwrap();
        let v: Vec<f64> = (0..7).map(|i| i as f64).collect();
        // slot i holds compress(5 i mod 12)
        assert_eq!(
            storage.strided(&v, 5).unwrap(),
            vec![0.0, 5.0, 2.0, 3.0, 4.0, 1.0, 6.0]
        );
    }

    #[test]
    fn test_multilevel_unpermute_is_bijective() {
        for (base, level) in [(2u64, 4u32), (3, 3)] {
            for compress in [Compress::None, Compress::Symmetric] {
                for order in [PerLevelOrder::Basic, PerLevelOrder::Cyclic] {
                    let size = SizeParam::embedded(base, level).unwrap();
                    let storage = Storage::new(size, compress, order).unwrap();
                    let slots: HashSet<usize> = (0..storage.virtual_size() as u64)
                        .map(|i| storage.unpermute(i).unwrap())
                        .collect();
                    assert_eq!(slots.len(), storage.size());
                    assert!(slots.iter().all(|&s| s < storage.size()));
                }
            }
        }
    }

    #[test]
    fn test_cyclic_stride_matches_address_lookup() {
        for (base, level) in [(2u64, 5u32), (3, 3), (5, 2)] {
            for compress in [Compress::None, Compress::Symmetric] {
                let size = SizeParam::embedded(base, level).unwrap();
                let storage = Storage::new(size, compress, PerLevelOrder::Cyclic).unwrap();
                let n = size.modulus();
                for a in (1..n).filter(|a| crate::arith::gcd(*a, n) == 1) {
                    let stride = storage.stride(a).unwrap();
                    for slot in 0..storage.size() {
                        let target = crate::arith::mul_mod(logical(&storage, slot), a, n);
                        assert_eq!(
                            stride.index(slot),
                            storage.unpermute(target).unwrap(),
                            "{}^{} {:?} a={} slot={}",
                            base,
                            level,
                            compress,
                            a,
                            slot
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_basic_stride_rejects_non_units() {
        let size = SizeParam::embedded(3, 2).unwrap();
        let storage = Storage::new(size, Compress::None, PerLevelOrder::Basic).unwrap();
        assert_eq!(
            storage.stride(3).map(|_| ()),
            Err(LatticeError::NotCoprime {
                value: 3,
                modulus: 9
            })
        );
    }

    #[test]
    fn test_construction_errors() {
        let poly = SizeParam::polynomial(0b1011).unwrap();
        assert_eq!(
            Storage::unilevel(poly, Compress::Symmetric).map(|_| ()),
            Err(LatticeError::NoSymmetricKernel {
                lattice: LatticeType::Polynomial
            })
        );
        assert!(matches!(
            Storage::new(SizeParam::ordinary(16), Compress::None, PerLevelOrder::Cyclic),
            Err(LatticeError::InvalidCyclicOrder { .. })
        ));
        let poly_emb = SizeParam::polynomial_embedded(0b11, 3).unwrap();
        assert!(matches!(
            Storage::new(poly_emb, Compress::None, PerLevelOrder::Cyclic),
            Err(LatticeError::InvalidCyclicOrder { .. })
        ));
    }

    #[test]
    fn test_compressed_sum_per_level() {
        let size = SizeParam::embedded(2, 3).unwrap();
        let storage = Storage::new(size, Compress::Symmetric, PerLevelOrder::Cyclic).unwrap();
        assert_eq!(storage.size(), 5);
        let ones = vec![1.0; storage.size()];
        // every level counts all of its logical points
        assert_eq!(
            storage.compressed_sum(&ones),
            MeritValue::Levels(vec![1.0, 2.0, 4.0, 8.0])
        );
        let mut merit = storage.compressed_sum(&ones);
        storage.normalize(&mut merit);
        assert_eq!(merit, MeritValue::Levels(vec![1.0; 4]));
    }

    #[test]
    fn test_find_row() {
        let size = SizeParam::embedded(3, 2).unwrap();
        let storage = Storage::new(size, Compress::None, PerLevelOrder::Cyclic).unwrap();
        assert_eq!(storage.find_row(1).unwrap(), 0);
        assert_eq!(storage.find_row(2).unwrap(), 1);
        assert!(storage.find_row(3).is_err());
        let basic = Storage::new(size, Compress::None, PerLevelOrder::Basic).unwrap();
        assert!(basic.find_row(2).is_err());
    }
}
