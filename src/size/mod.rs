// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Point-set sizes and lattice definitions.
//!
//! A [`SizeParam`] says how many points a lattice has and whether it is
//! embedded (a nested family of point sets at levels `0..=max_level`). A
//! [`LatDef`] pairs a size with a generating vector.
//!
//! Two residue arithmetics are supported, selected by [`LatticeType`]:
//!
//! - **Ordinary**: integers modulo `n`, with `n` points.
//! - **Polynomial**: GF(2) polynomials modulo `P(z)`, with `2^deg(P)` points.
//!   Values are encoded as coefficient bit patterns (see [`Gf2Poly`]).

pub mod compress;

pub use compress::Compress;

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::arith::{self, Gf2Poly};
use crate::error::{LatticeError, Result};
use crate::merit::MeritValue;

/// Residue arithmetic of the generating values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LatticeType {
    Ordinary,
    Polynomial,
}

impl LatticeType {
    /// Modulus of the one-point-per-unit sequence used for the first
    /// coordinate: 2 for integers and `z` for polynomials. Both have the
    /// single unit `1`.
    pub fn trivial_modulus(self) -> u64 {
        2
    }

    /// Number of points of a unilevel lattice with this modulus.
    pub fn num_points(self, modulus: u64) -> u64 {
        match self {
            LatticeType::Ordinary => modulus,
            LatticeType::Polynomial => match Gf2Poly(modulus).degree() {
                Some(d) => 1u64 << d,
                None => 0,
            },
        }
    }

    /// `a * b` reduced modulo `modulus`.
    pub fn mul_mod(self, a: u64, b: u64, modulus: u64) -> u64 {
        match self {
            LatticeType::Ordinary => arith::mul_mod(a, b, modulus),
            LatticeType::Polynomial => Gf2Poly(a).mul_mod(Gf2Poly(b), Gf2Poly(modulus)).bits(),
        }
    }

    /// `a^exp` reduced modulo `modulus`.
    pub fn pow_mod(self, a: u64, exp: u64, modulus: u64) -> u64 {
        match self {
            LatticeType::Ordinary => arith::modular_pow(a, exp, modulus),
            LatticeType::Polynomial => {
                let m = Gf2Poly(modulus);
                let mut result = Gf2Poly::ONE.rem(m);
                let mut base = Gf2Poly(a).rem(m);
                let mut e = exp;
                while e > 0 {
                    if e & 1 == 1 {
                        result = result.mul_mod(base, m);
                    }
                    base = base.mul_mod(base, m);
                    e >>= 1;
                }
                result.bits()
            }
        }
    }

    pub fn is_coprime(self, a: u64, modulus: u64) -> bool {
        match self {
            LatticeType::Ordinary => arith::gcd(a, modulus) == 1,
            LatticeType::Polynomial => Gf2Poly::gcd(Gf2Poly(a), Gf2Poly(modulus)) == Gf2Poly::ONE,
        }
    }

    /// Number of units modulo `modulus`.
    pub fn totient(self, modulus: u64) -> u64 {
        match self {
            LatticeType::Ordinary => arith::totient(modulus),
            LatticeType::Polynomial => Gf2Poly(modulus).totient(),
        }
    }

    /// Numerator of the point coordinate of index `i`, over [`Self::num_points`].
    pub fn kernel_index(self, i: u64, modulus: u64) -> u64 {
        match self {
            LatticeType::Ordinary => i,
            LatticeType::Polynomial => Gf2Poly(i).to_kernel_index(Gf2Poly(modulus)),
        }
    }
}

/// Base and maximum level of an embedded point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Embedding {
    pub base: u64,
    pub max_level: u32,
}

/// Number of points of a lattice, possibly stratified into levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizeParam {
    lattice: LatticeType,
    modulus: u64,
    embedding: Option<Embedding>,
}

impl SizeParam {
    /// Unilevel ordinary lattice with `n` points.
    pub fn ordinary(n: u64) -> Self {
        Self {
            lattice: LatticeType::Ordinary,
            modulus: n,
            embedding: None,
        }
    }

    /// Unilevel polynomial lattice with modulus `p(z)`.
    pub fn polynomial(modulus: u64) -> Result<Self> {
        match Gf2Poly(modulus).degree() {
            Some(d) if d <= 62 => Ok(Self {
                lattice: LatticeType::Polynomial,
                modulus,
                embedding: None,
            }),
            _ => Err(LatticeError::InvalidConfig(format!(
                "polynomial modulus {:#b} must be nonzero with degree at most 62",
                modulus
            ))),
        }
    }

    /// Embedded ordinary lattice with `base^max_level` points.
    pub fn embedded(base: u64, max_level: u32) -> Result<Self> {
        if !arith::is_prime(base) {
            return Err(LatticeError::NotPrime { value: base });
        }
        let modulus = arith::int_pow(base, max_level)?;
        Ok(Self {
            lattice: LatticeType::Ordinary,
            modulus,
            embedding: Some(Embedding { base, max_level }),
        })
    }

    /// Embedded polynomial lattice with modulus `base(z)^max_level`.
    pub fn polynomial_embedded(base: u64, max_level: u32) -> Result<Self> {
        let b = Gf2Poly(base);
        if !b.is_irreducible() {
            return Err(LatticeError::NotIrreducible { poly: base });
        }
        let degree = b.degree().unwrap_or(0) * max_level;
        if degree > 62 {
            return Err(LatticeError::InvalidConfig(format!(
                "({})^{} has degree {} above 62",
                b, max_level, degree
            )));
        }
        Ok(Self {
            lattice: LatticeType::Polynomial,
            modulus: b.pow(max_level).bits(),
            embedding: Some(Embedding { base, max_level }),
        })
    }

    /// Embedded size whose top level has the given modulus, which must be a
    /// prime power (or irreducible power).
    pub fn embedded_from_modulus(lattice: LatticeType, modulus: u64) -> Result<Self> {
        match lattice {
            LatticeType::Ordinary => match arith::prime_power(modulus) {
                Some((p, k)) => Self::embedded(p, k),
                None => Err(LatticeError::NotPrimePower { modulus }),
            },
            LatticeType::Polynomial => match Gf2Poly(modulus).factor().as_slice() {
                [(p, k)] => Self::polynomial_embedded(p.bits(), *k),
                _ => Err(LatticeError::NotPrimePower { modulus }),
            },
        }
    }

    /// The same size seen as a unilevel point set.
    pub fn unilevel(&self) -> Self {
        Self {
            embedding: None,
            ..*self
        }
    }

    pub fn lattice_type(&self) -> LatticeType {
        self.lattice
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn is_embedded(&self) -> bool {
        self.embedding.is_some()
    }

    pub fn embedding(&self) -> Option<Embedding> {
        self.embedding
    }

    /// Base of the embedding, or the modulus itself for unilevel sets.
    pub fn base(&self) -> u64 {
        self.embedding.map_or(self.modulus, |e| e.base)
    }

    /// Highest level; 0 for unilevel sets.
    pub fn max_level(&self) -> u32 {
        self.embedding.map_or(0, |e| e.max_level)
    }

    pub fn num_points(&self) -> u64 {
        self.lattice.num_points(self.modulus)
    }

    /// Modulus of the point set at `level` (`base^level`).
    pub fn level_modulus(&self, level: u32) -> u64 {
        match (self.embedding, self.lattice) {
            (None, _) => self.modulus,
            (Some(e), LatticeType::Ordinary) => e.base.pow(level),
            (Some(e), LatticeType::Polynomial) => Gf2Poly(e.base).pow(level).bits(),
        }
    }

    pub fn num_points_on_level(&self, level: u32) -> u64 {
        self.lattice.num_points(self.level_modulus(level))
    }

    /// Divides a merit value by the number of points, level by level.
    pub fn normalize(&self, merit: &mut MeritValue) {
        match merit {
            MeritValue::Scalar(x) => *x /= self.num_points() as f64,
            MeritValue::Levels(levels) => {
                for (level, x) in levels.iter_mut().enumerate() {
                    *x /= self.num_points_on_level(level as u32) as f64;
                }
            }
        }
    }
}

impl fmt::Display for SizeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lattice, self.embedding) {
            (LatticeType::Ordinary, None) => write!(f, "{}", self.modulus),
            (LatticeType::Ordinary, Some(e)) => write!(f, "{}^{}", e.base, e.max_level),
            (LatticeType::Polynomial, None) => write!(f, "{}", Gf2Poly(self.modulus)),
            (LatticeType::Polynomial, Some(e)) => {
                write!(f, "({})^{}", Gf2Poly(e.base), e.max_level)
            }
        }
    }
}

/// A lattice: a size and a (possibly partial) generating vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatDef {
    size_param: SizeParam,
    gen: Vec<u64>,
}

impl LatDef {
    /// Lattice of dimension 0.
    pub fn new(size_param: SizeParam) -> Self {
        Self {
            size_param,
            gen: Vec::new(),
        }
    }

    pub fn with_gen(size_param: SizeParam, gen: Vec<u64>) -> Self {
        Self { size_param, gen }
    }

    /// Korobov lattice `(1, a, a^2, ...)` of the given dimension.
    pub fn korobov(size_param: SizeParam, a: u64, dimension: usize) -> Self {
        let lattice = size_param.lattice_type();
        let modulus = size_param.modulus();
        let gen = (0..dimension as u64)
            .map(|j| lattice.pow_mod(a, j, modulus))
            .collect();
        Self { size_param, gen }
    }

    /// Copy of this lattice extended by one coordinate.
    pub fn extended(&self, value: u64) -> Self {
        let mut gen = self.gen.clone();
        gen.push(value);
        Self {
            size_param: self.size_param,
            gen,
        }
    }

    pub fn size_param(&self) -> &SizeParam {
        &self.size_param
    }

    pub fn gen(&self) -> &[u64] {
        &self.gen
    }

    pub fn dimension(&self) -> usize {
        self.gen.len()
    }
}

impl fmt::Display for LatDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gen: Vec<String> = match self.size_param.lattice_type() {
            LatticeType::Ordinary => self.gen.iter().map(|g| g.to_string()).collect(),
            LatticeType::Polynomial => self.gen.iter().map(|g| Gf2Poly(*g).to_string()).collect(),
        };
        write!(f, "lattice({}, [{}])", self.size_param, gen.join(", "))
    }
}
