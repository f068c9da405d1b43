// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The stride operator.
//!
//! `Stride` for a generating value `a` maps physical slot `i` to the slot of
//! the logical index `a * x_i`, where `x_i` is the index stored in slot `i`.
//! Reading a vector through it gives the values the kernel takes on the new
//! coordinate of the lattice.

use tracing::trace;

use crate::error::{LatticeError, Result};
use crate::storage::tables::LevelTables;
use crate::storage::Storage;

#[derive(Debug, Clone)]
enum Rule {
    Unilevel { a: u64 },
    /// Precomputed permutation through the address table.
    Basic { map: Vec<usize> },
    /// Cyclic shift by the discrete-log row of `a`.
    Cyclic { row: usize, seq_size: usize },
}

/// Physical-to-physical index map induced by multiplying by `a`.
#[derive(Debug, Clone)]
pub struct Stride<'a> {
    storage: &'a Storage,
    rule: Rule,
}

impl<'a> Stride<'a> {
    pub(crate) fn new(storage: &'a Storage, a: u64) -> Result<Self> {
        let rule = match storage.level_tables() {
            None => Rule::Unilevel { a },
            Some(tables) => match &tables.generators {
                Some(generators) => Rule::Cyclic {
                    row: storage.find_row(a)?,
                    seq_size: generators.rows.len(),
                },
                None => Rule::Basic {
                    map: basic_map(storage, tables, a)?,
                },
            },
        };
        trace!(a, size = %storage.size_param(), "stride");
        Ok(Self { storage, rule })
    }

    pub fn len(&self) -> usize {
        self.storage.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot read by slot `i` of a strided vector.
    pub fn index(&self, i: usize) -> usize {
        match &self.rule {
            Rule::Unilevel { a } => {
                let sp = self.storage.size_param();
                let n = sp.modulus();
                let product = sp.lattice_type().mul_mod(i as u64, *a, n);
                self.storage.compress().compress_index(product, sp.num_points()) as usize
            }
            Rule::Basic { map } => map[i],
            Rule::Cyclic { row, seq_size } => self.cyclic_index(i, *row, *seq_size),
        }
    }

    fn cyclic_index(&self, i: usize, row: usize, seq_size: usize) -> usize {
        let Some(tables) = self.storage.level_tables() else {
            return i;
        };
        let block = &tables.ranges[tables.level_of(i)];
        let j = i - block.start;
        let mut start = block.start;
        let mut len = block.len();
        // base 2 has two circulant half-blocks per level
        if !self.storage.symmetric() && self.storage.size_param().base() == 2 && len >= 2 {
            let reverse = row >= seq_size / 2;
            len /= 2;
            if (j >= len) ^ reverse {
                start += len;
            }
        }
        start + (j % len + len - row % len) % len
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).map(move |i| self.index(i))
    }
}

fn basic_map(storage: &Storage, tables: &LevelTables, a: u64) -> Result<Vec<usize>> {
    let sp = storage.size_param();
    let lattice = sp.lattice_type();
    let n = sp.modulus();
    if !lattice.is_coprime(a, n) {
        return Err(LatticeError::NotCoprime {
            value: a,
            modulus: n,
        });
    }
    tables
        .elements
        .iter()
        .map(|&x| {
            let k = storage
                .compress()
                .compress_index(lattice.mul_mod(x, a, n), sp.num_points());
            tables
                .address
                .get(&k)
                .copied()
                .ok_or(LatticeError::IndexOutOfRange {
                    index: k as usize,
                    size: tables.elements.len(),
                })
        })
        .collect()
}
