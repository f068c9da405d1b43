// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Per-level index tables of a multilevel storage.
//!
//! Physical slot 0 holds the origin. Block `k` then holds the indices at
//! exact level `k`, that is `base^(m-k) * U(base^k)`. Within a block the
//! indices are listed either in natural order (BASIC) or as inverse powers
//! of the cyclic generator (CYCLIC).

use std::collections::HashMap;
use std::ops::Range;

use tracing::debug;

use crate::arith::Gf2Poly;
use crate::error::{LatticeError, Result};
use crate::genseq::{CyclicGroup, GenSeq, GeneratingValues, GroupOrder};
use crate::size::{Compress, LatticeType, SizeParam};
use crate::storage::PerLevelOrder;

/// The max-level generator group and the discrete-log row of each element.
#[derive(Debug)]
pub(crate) struct Generators {
    pub(crate) group: CyclicGroup,
    pub(crate) rows: HashMap<u64, usize>,
}

#[derive(Debug)]
pub(crate) struct LevelTables {
    pub(crate) ranges: Vec<Range<usize>>,
    /// Compressed logical index stored in each physical slot.
    pub(crate) elements: Vec<u64>,
    /// Inverse of `elements`.
    pub(crate) address: HashMap<u64, usize>,
    /// Present for CYCLIC order only.
    pub(crate) generators: Option<Generators>,
}

impl LevelTables {
    pub(crate) fn build(
        size_param: &SizeParam,
        compress: Compress,
        order: PerLevelOrder,
    ) -> Result<Self> {
        let max_level = size_param.max_level();
        let mut elements = vec![0u64];
        let mut ranges = vec![0..1];
        let generators = match order {
            PerLevelOrder::Cyclic => {
                let base = size_param.base();
                let inverse = CyclicGroup::new(base, max_level, compress, GroupOrder::Inverse)?;
                let n = size_param.modulus();
                let mut mult = n;
                for level in 1..=max_level {
                    mult /= base;
                    let start = elements.len();
                    let subgroup = inverse.subgroup(level)?.values();
                    elements.extend(subgroup.into_iter().map(|g| mult * g));
                    ranges.push(start..elements.len());
                }
                let group = inverse.inverse();
                let rows = group.rows();
                Some(Generators { group, rows })
            }
            PerLevelOrder::Basic => {
                for level in 1..=max_level {
                    let units = GeneratingValues::new(
                        size_param.lattice_type(),
                        size_param.level_modulus(level),
                        compress,
                    )?;
                    let mult = level_multiplier(size_param, level);
                    let mut block: Vec<u64> = units
                        .values()
                        .into_iter()
                        .map(|u| match size_param.lattice_type() {
                            LatticeType::Ordinary => mult * u,
                            LatticeType::Polynomial => Gf2Poly(mult).mul(Gf2Poly(u)).bits(),
                        })
                        .collect();
                    block.sort_unstable();
                    let start = elements.len();
                    elements.extend(block);
                    ranges.push(start..elements.len());
                }
                None
            }
        };
        let tables = Self {
            address: index_address(&elements)?,
            ranges,
            elements,
            generators,
        };
        tables.validate(size_param, compress)?;
        debug!(
            size = %size_param,
            ?order,
            slots = tables.elements.len(),
            levels = tables.ranges.len(),
            "built multilevel tables"
        );
        Ok(tables)
    }

    /// Every block must have exactly the slots its level range reserves.
    fn validate(&self, size_param: &SizeParam, compress: Compress) -> Result<()> {
        let mut previous = 0u64;
        for (level, range) in self.ranges.iter().enumerate() {
            let points = size_param.num_points_on_level(level as u32);
            let expected = previous as usize..compress.size(points) as usize;
            if *range != expected {
                return Err(LatticeError::InvalidConfig(format!(
                    "level {} of {} occupies slots {:?}, expected {:?}",
                    level, size_param, range, expected
                )));
            }
            previous = compress.size(points);
        }
        Ok(())
    }

    pub(crate) fn level_of(&self, slot: usize) -> usize {
        self.ranges.partition_point(|r| r.end <= slot)
    }
}

/// `base^(max_level - level)`, the factor lifting level-`level` units to the
/// full modulus.
fn level_multiplier(size_param: &SizeParam, level: u32) -> u64 {
    let rest = size_param.max_level() - level;
    match size_param.lattice_type() {
        LatticeType::Ordinary => size_param.base().pow(rest),
        LatticeType::Polynomial => Gf2Poly(size_param.base()).pow(rest).bits(),
    }
}

fn index_address(elements: &[u64]) -> Result<HashMap<u64, usize>> {
    let mut address = HashMap::with_capacity(elements.len());
    for (slot, &e) in elements.iter().enumerate() {
        if let Some(other) = address.insert(e, slot) {
            return Err(LatticeError::InvalidConfig(format!(
                "index {} appears in slots {} and {}",
                e, other, slot
            )));
        }
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_blocks_base_two() {
        let size = SizeParam::embedded(2, 4).unwrap();
        let tables = LevelTables::build(&size, Compress::None, PerLevelOrder::Cyclic).unwrap();
        assert_eq!(tables.ranges, vec![0..1, 1..2, 2..4, 4..8, 8..16]);
        assert_eq!(&tables.elements[..4], &[0, 8, 4, 12]);
        // inverse powers of 5 modulo 16: 1, 13, 9, 5, then negated
        assert_eq!(&tables.elements[8..12], &[1, 13, 9, 5]);
        assert_eq!(&tables.elements[12..], &[15, 3, 7, 11]);
    }

    #[test]
    fn test_basic_blocks_are_sorted() {
        let size = SizeParam::embedded(3, 2).unwrap();
        let tables = LevelTables::build(&size, Compress::Symmetric, PerLevelOrder::Basic).unwrap();
        assert_eq!(tables.ranges, vec![0..1, 1..2, 2..5]);
        assert_eq!(tables.elements, vec![0, 3, 1, 2, 4]);
        assert_eq!(tables.level_of(0), 0);
        assert_eq!(tables.level_of(3), 2);
    }

    #[test]
    fn test_polynomial_basic_blocks() {
        let size = SizeParam::polynomial_embedded(0b11, 3).unwrap();
        let tables = LevelTables::build(&size, Compress::None, PerLevelOrder::Basic).unwrap();
        assert_eq!(tables.elements.len(), 8);
        assert_eq!(tables.ranges, vec![0..1, 1..2, 2..4, 4..8]);
        assert!(tables.generators.is_none());
    }
}
