// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The multiplicative group modulo a prime power, as powers of a generator.
//!
//! For an odd prime `p` the units modulo `p^m` form a cyclic group. For
//! `p = 2` they do not: the group is `<5> x <-1>`. Element `i` is then `5^i`
//! for the first half of the indices and `-5^i` for the second half.

use std::collections::HashMap;

use crate::arith;
use crate::error::{LatticeError, Result};
use crate::genseq::GenSeq;
use crate::size::Compress;

/// Whether elements are listed as powers of the generator or of its inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupOrder {
    Direct,
    Inverse,
}

/// Units modulo `base^power` indexed by discrete logarithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicGroup {
    base: u64,
    power: u32,
    modulus: u64,
    gen: u64,
    compress: Compress,
    order: GroupOrder,
}

impl CyclicGroup {
    pub fn new(base: u64, power: u32, compress: Compress, order: GroupOrder) -> Result<Self> {
        let modulus = arith::int_pow(base, power)?;
        let mut group = Self {
            base,
            power,
            modulus,
            gen: 0,
            compress,
            order: GroupOrder::Direct,
        };
        if base >= 2 {
            if !arith::is_prime(base) {
                return Err(LatticeError::NotPrime { value: base });
            }
            group.gen = Self::smallest_generator(base, power)?;
            group.validate()?;
        }
        Ok(match order {
            GroupOrder::Direct => group,
            GroupOrder::Inverse => group.inverse(),
        })
    }

    /// Smallest generator of the units modulo `base^power`.
    ///
    /// Candidates are tried in increasing order and accepted when no proper
    /// divisor `(p-1)/q` of the group order sends them to 1. A primitive root
    /// modulo `p` that fails to be one modulo `p^2` is shifted by `p`.
    pub fn smallest_generator(base: u64, power: u32) -> Result<u64> {
        if base == 2 {
            return Ok(5);
        }
        if base < 2 {
            return Err(LatticeError::NotPrime { value: base });
        }
        let factors = arith::prime_factors(base - 1);
        let g = (2..=base)
            .find(|&g| {
                factors
                    .iter()
                    .all(|&q| arith::modular_pow(g, (base - 1) / q, base) != 1)
            })
            .ok_or(LatticeError::NotPrime { value: base })?;
        if power <= 1 {
            return Ok(g);
        }
        let square = base.checked_mul(base).ok_or_else(|| {
            LatticeError::InvalidConfig(format!("{}^2 overflows", base))
        })?;
        if arith::modular_pow(g, base - 1, square) == 1 {
            Ok(g + base)
        } else {
            Ok(g)
        }
    }

    /// The same group listed in the opposite order.
    pub fn inverse(&self) -> Self {
        let gen = if self.base >= 2 {
            arith::modular_pow(self.gen, self.full_size() - 1, self.modulus)
        } else {
            self.gen
        };
        let order = match self.order {
            GroupOrder::Direct => GroupOrder::Inverse,
            GroupOrder::Inverse => GroupOrder::Direct,
        };
        Self {
            gen,
            order,
            ..self.clone()
        }
    }

    /// The group modulo `base^level`, sharing this group's generator.
    pub fn subgroup(&self, level: u32) -> Result<Self> {
        if level > self.power {
            return Err(LatticeError::InvalidConfig(format!(
                "subgroup level {} is above group level {}",
                level, self.power
            )));
        }
        let modulus = arith::int_pow(self.base, level)?;
        let sub = Self {
            power: level,
            modulus,
            gen: if modulus > 0 { self.gen % modulus } else { 0 },
            ..self.clone()
        };
        if self.base >= 2 {
            sub.validate()?;
        }
        Ok(sub)
    }

    fn validate(&self) -> Result<()> {
        if self.modulus <= 1 {
            return Ok(());
        }
        let full = self.full_size();
        let expected = if self.base == 2 { (full / 2).max(1) } else { full };
        let mut x = self.gen % self.modulus;
        let mut order = 1u64;
        while x != 1 && order <= full {
            x = arith::mul_mod(x, self.gen, self.modulus);
            order += 1;
        }
        if order != expected {
            return Err(LatticeError::GeneratorMismatch {
                generator: self.gen,
                order: order as usize,
                expected: expected as usize,
                modulus: self.modulus,
            });
        }
        Ok(())
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn power(&self) -> u32 {
        self.power
    }

    pub fn generator(&self) -> u64 {
        self.gen
    }

    pub fn order(&self) -> GroupOrder {
        self.order
    }

    /// Number of units, `(b-1) b^(m-1)`, ignoring compression.
    pub fn full_size(&self) -> u64 {
        if self.power == 0 {
            1
        } else {
            self.modulus / self.base * (self.base - 1)
        }
    }

    /// Map from each element to its index, the discrete-log row.
    pub fn rows(&self) -> HashMap<u64, usize> {
        let mut rows = HashMap::with_capacity(self.size());
        for i in 0..self.size() {
            rows.entry(self.element_unchecked(i as u64)).or_insert(i);
        }
        rows
    }

    fn element_unchecked(&self, i: u64) -> u64 {
        let m = self.modulus;
        if i == 0 {
            return 1 % m;
        }
        let mut k = arith::modular_pow(self.gen, i, m);
        if self.base == 2 && i >= self.size() as u64 / 2 {
            k = arith::mul_mod(k, m - 1, m);
        }
        self.compress.compress_index(k, m)
    }
}

impl GenSeq for CyclicGroup {
    fn size(&self) -> usize {
        match self.modulus {
            0 => 0,
            1 => 1,
            m => (self.compress.size(m) - self.compress.size(m / self.base)) as usize,
        }
    }

    fn modulus(&self) -> u64 {
        self.modulus
    }

    fn element(&self, i: usize) -> Result<u64> {
        if i >= self.size() {
            return Err(LatticeError::IndexOutOfRange {
                index: i,
                size: self.size(),
            });
        }
        Ok(self.element_unchecked(i as u64))
    }
}
