// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Values coprime with a modulus, enumerated through the Chinese remainder
//! theorem.
//!
//! The modulus is factored as `prod b_j^k_j`. Each factor contributes one
//! mixed-radix digit of the index: digit `r` in `[0, totient_j)` selects the
//! rank-`r` residue modulo `b_j^k_j` that is not divisible by `b_j`, which is
//! lifted to the full modulus by the idempotent `elem_j`.
//!
//! Under symmetric compression only the first `ceil(phi/2)` indices are kept:
//! negation maps index `i` to `phi - 1 - i`, so the first half holds exactly
//! one of each pair `{k, n - k}`.

use crate::arith::{self, Gf2Poly};
use crate::error::{LatticeError, Result};
use crate::genseq::GenSeq;
use crate::size::{Compress, LatticeType};

#[derive(Debug, Clone, PartialEq, Eq)]
struct BasisElement {
    totient: u64,
    leap: u64,
    elem: u64,
    prime_base: u64,
}

/// The ordered sequence of values coprime with a modulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratingValues {
    lattice: LatticeType,
    compress: Compress,
    modulus: u64,
    size: usize,
    basis: Vec<BasisElement>,
}

impl GeneratingValues {
    pub fn new(lattice: LatticeType, modulus: u64, compress: Compress) -> Result<Self> {
        if lattice == LatticeType::Polynomial && compress.symmetric() {
            return Err(LatticeError::NoSymmetricKernel { lattice });
        }
        if modulus == 0 {
            return Ok(Self {
                lattice,
                compress,
                modulus,
                size: 0,
                basis: Vec::new(),
            });
        }
        let basis = match lattice {
            LatticeType::Ordinary => ordinary_basis(modulus)?,
            LatticeType::Polynomial => polynomial_basis(modulus),
        };
        let full: u64 = basis.iter().map(|e| e.totient).product();
        let size = (compress.size(full + 1) - 1) as usize;
        Ok(Self {
            lattice,
            compress,
            modulus,
            size,
            basis,
        })
    }

    /// Unit sequence of an ordinary modulus.
    pub fn ordinary(modulus: u64, compress: Compress) -> Result<Self> {
        Self::new(LatticeType::Ordinary, modulus, compress)
    }

    pub fn lattice_type(&self) -> LatticeType {
        self.lattice
    }

    pub fn compress(&self) -> Compress {
        self.compress
    }

    fn element_unchecked(&self, mut i: u64) -> u64 {
        match self.lattice {
            LatticeType::Ordinary => {
                let n = self.modulus as u128;
                let mut ret = 0u128;
                for e in &self.basis {
                    let (q, r) = (i / e.totient, i % e.totient);
                    i = q;
                    let residue = (r + r / e.leap + 1) as u128;
                    ret = (ret + residue * e.elem as u128) % n;
                }
                self.compress.compress_index(ret as u64, self.modulus)
            }
            LatticeType::Polynomial => {
                let p = Gf2Poly(self.modulus);
                let mut ret = Gf2Poly::ZERO;
                for e in &self.basis {
                    let (q, r) = (i / e.totient, i % e.totient);
                    i = q;
                    let high = Gf2Poly(e.prime_base).mul(Gf2Poly(r / e.leap));
                    let low = Gf2Poly(r % e.leap + 1);
                    let residue = Gf2Poly(high.bits() ^ low.bits());
                    ret = Gf2Poly(ret.bits() ^ residue.mul_mod(Gf2Poly(e.elem), p).bits());
                }
                ret.rem(p).bits()
            }
        }
    }
}

fn ordinary_basis(modulus: u64) -> Result<Vec<BasisElement>> {
    arith::prime_factors_map(modulus)
        .into_iter()
        .map(|(p, k)| {
            let bk = arith::int_pow(p, k)?;
            let m = modulus / bk;
            let inv = arith::mod_inverse(m % bk, bk).ok_or(LatticeError::NotCoprime {
                value: m,
                modulus: bk,
            })?;
            Ok(BasisElement {
                totient: bk / p * (p - 1),
                leap: p - 1,
                elem: arith::mul_mod(m, inv, modulus),
                prime_base: p,
            })
        })
        .collect()
}

fn polynomial_basis(modulus: u64) -> Vec<BasisElement> {
    let p = Gf2Poly(modulus);
    p.factor()
        .into_iter()
        .map(|(b, k)| {
            let d = b.degree().unwrap_or(0);
            let bk = b.pow(k);
            let m = p.div_rem(bk).0;
            let (_, _, t) = Gf2Poly::xgcd(bk, m);
            let q = 1u64 << d;
            BasisElement {
                totient: (1u64 << (d * k)) / q * (q - 1),
                leap: q - 1,
                elem: m.mul_mod(t, p).bits(),
                prime_base: b.bits(),
            }
        })
        .collect()
}

impl GenSeq for GeneratingValues {
    fn size(&self) -> usize {
        self.size
    }

    fn modulus(&self) -> u64 {
        self.modulus
    }

    fn element(&self, i: usize) -> Result<u64> {
        if i >= self.size {
            return Err(LatticeError::IndexOutOfRange {
                index: i,
                size: self.size,
            });
        }
        Ok(self.element_unchecked(i as u64))
    }
}
