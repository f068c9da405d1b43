// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Polynomials over GF(2).
//!
//! A polynomial is stored as the bit pattern of its coefficients: bit `k`
//! is the coefficient of `z^k`. The same integer doubles as the point index
//! of a polynomial lattice, so converting between "index" and "generating
//! value" is the identity on the bits.
//!
//! Moduli are limited to degree 62 so that one left shift never overflows.

use std::fmt;

/// A polynomial over GF(2) of degree at most 63.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Gf2Poly(pub u64);

impl Gf2Poly {
    pub const ZERO: Gf2Poly = Gf2Poly(0);
    pub const ONE: Gf2Poly = Gf2Poly(1);
    /// The polynomial `z`.
    pub const Z: Gf2Poly = Gf2Poly(2);

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Degree, or `None` for the zero polynomial.
    pub fn degree(self) -> Option<u32> {
        if self.0 == 0 {
            None
        } else {
            Some(63 - self.0.leading_zeros())
        }
    }

    /// Coefficient of `z^k`.
    pub fn coeff(self, k: u32) -> bool {
        k < 64 && (self.0 >> k) & 1 == 1
    }

    /// Quotient and remainder of `self / divisor`.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is zero.
    pub fn div_rem(self, divisor: Gf2Poly) -> (Gf2Poly, Gf2Poly) {
        let d = match divisor.degree() {
            Some(d) => d,
            None => panic!("polynomial division by zero"),
        };
        let mut q = 0u64;
        let mut r = self.0;
        while let Some(dr) = Gf2Poly(r).degree() {
            if dr < d {
                break;
            }
            let shift = dr - d;
            q |= 1 << shift;
            r ^= divisor.0 << shift;
        }
        (Gf2Poly(q), Gf2Poly(r))
    }

    pub fn rem(self, modulus: Gf2Poly) -> Gf2Poly {
        self.div_rem(modulus).1
    }

    /// Carry-less product. The caller guarantees the degree sum stays below 64.
    pub fn mul(self, other: Gf2Poly) -> Gf2Poly {
        let mut result = 0u64;
        let mut a = self.0;
        let mut b = other.0;
        while b != 0 {
            if b & 1 == 1 {
                result ^= a;
            }
            a <<= 1;
            b >>= 1;
        }
        Gf2Poly(result)
    }

    /// `self * other mod modulus`, reducing as it goes.
    pub fn mul_mod(self, other: Gf2Poly, modulus: Gf2Poly) -> Gf2Poly {
        let m = match modulus.degree() {
            Some(m) => m,
            None => return self.mul(other),
        };
        if m == 0 {
            return Gf2Poly::ZERO;
        }
        let a = self.rem(modulus).0;
        let b = other.rem(modulus).0;
        let top = 1u64 << m;
        let mut result = 0u64;
        for k in (0..m).rev() {
            result <<= 1;
            if result & top != 0 {
                result ^= modulus.0;
            }
            if (b >> k) & 1 == 1 {
                result ^= a;
            }
        }
        Gf2Poly(result)
    }

    /// `self^exp` without reduction.
    pub fn pow(self, exp: u32) -> Gf2Poly {
        (0..exp).fold(Gf2Poly::ONE, |acc, _| acc.mul(self))
    }

    /// Extended Euclid: returns `(g, s, t)` with `a*s + b*t = g`.
    pub fn xgcd(a: Gf2Poly, b: Gf2Poly) -> (Gf2Poly, Gf2Poly, Gf2Poly) {
        let (mut old_r, mut r) = (a, b);
        let (mut old_s, mut s) = (Gf2Poly::ONE, Gf2Poly::ZERO);
        let (mut old_t, mut t) = (Gf2Poly::ZERO, Gf2Poly::ONE);
        while !r.is_zero() {
            let (q, rem) = old_r.div_rem(r);
            (old_r, r) = (r, rem);
            (old_s, s) = (s, Gf2Poly(old_s.0 ^ q.mul(s).0));
            (old_t, t) = (t, Gf2Poly(old_t.0 ^ q.mul(t).0));
        }
        (old_r, old_s, old_t)
    }

    pub fn gcd(a: Gf2Poly, b: Gf2Poly) -> Gf2Poly {
        Gf2Poly::xgcd(a, b).0
    }

    /// Factorization into irreducible powers, ordered by increasing factor.
    ///
    /// Trial division in increasing bit order: the first divisor found is
    /// necessarily irreducible.
    pub fn factor(self) -> Vec<(Gf2Poly, u32)> {
        let mut factors = Vec::new();
        let mut rest = self;
        let mut d = 2u64;
        loop {
            let deg_rest = match rest.degree() {
                Some(deg) if deg >= 1 => deg,
                _ => break,
            };
            let deg_d = 63 - d.leading_zeros();
            if 2 * deg_d > deg_rest {
                factors.push((rest, 1));
                break;
            }
            let divisor = Gf2Poly(d);
            let mut k = 0;
            loop {
                let (q, r) = rest.div_rem(divisor);
                if !r.is_zero() {
                    break;
                }
                rest = q;
                k += 1;
            }
            if k > 0 {
                factors.push((divisor, k));
            }
            d += 1;
        }
        factors
    }

    pub fn is_irreducible(self) -> bool {
        matches!(self.degree(), Some(d) if d >= 1) && self.factor() == vec![(self, 1)]
    }

    /// Number of units modulo `self`, the polynomial analogue of Euler's totient.
    pub fn totient(self) -> u64 {
        self.factor().into_iter().fold(1u64, |acc, (p, k)| {
            let q = 1u64 << p.degree().unwrap_or(0);
            acc * (q - 1) * (1u64 << (p.degree().unwrap_or(0) * (k - 1)))
        })
    }

    /// The `m` leading binary digits of the Laurent expansion of `self / modulus`,
    /// read as an integer in `[0, 2^m)`, where `m = deg(modulus)`.
    ///
    /// Divided by `2^m` this is the point coordinate of a polynomial lattice.
    pub fn to_kernel_index(self, modulus: Gf2Poly) -> u64 {
        let m = match modulus.degree() {
            Some(m) => m,
            None => return 0,
        };
        let mut w = vec![false; m as usize];
        for i in 0..m {
            let mut bit = self.coeff(m - i - 1);
            for j in 0..i {
                bit ^= w[j as usize] && modulus.coeff(m - (i - j));
            }
            w[i as usize] = bit;
        }
        w.iter().fold(0u64, |acc, &b| (acc << 1) | b as u64)
    }
}

impl fmt::Display for Gf2Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(deg) = self.degree() else {
            return write!(f, "0");
        };
        let terms: Vec<String> = (0..=deg)
            .rev()
            .filter(|&k| self.coeff(k))
            .map(|k| match k {
                0 => "1".to_string(),
                1 => "z".to_string(),
                _ => format!("z^{}", k),
            })
            .collect();
        write!(f, "{}", terms.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_and_display() {
        assert_eq!(Gf2Poly(0).degree(), None);
        assert_eq!(Gf2Poly(1).degree(), Some(0));
        assert_eq!(Gf2Poly(0b1011).degree(), Some(3));
        assert_eq!(Gf2Poly(0b1011).to_string(), "z^3 + z + 1");
        assert_eq!(Gf2Poly(0).to_string(), "0");
    }

    #[test]
    fn test_div_rem() {
        // (z^3 + z + 1) = (z + 1)(z^2 + z) + 1
        let (q, r) = Gf2Poly(0b1011).div_rem(Gf2Poly(0b11));
        assert_eq!(q, Gf2Poly(0b110));
        assert_eq!(r, Gf2Poly(1));
        assert_eq!(q.mul(Gf2Poly(0b11)).0 ^ r.0, 0b1011);
    }

    #[test]
    fn test_mul_mod_matches_mul_then_rem() {
        let m = Gf2Poly(0b10011); // z^4 + z + 1
        for a in 0..16u64 {
            for b in 0..16u64 {
                let expected = Gf2Poly(a).mul(Gf2Poly(b)).rem(m);
                assert_eq!(Gf2Poly(a).mul_mod(Gf2Poly(b), m), expected);
            }
        }
    }

    #[test]
    fn test_xgcd() {
        let a = Gf2Poly(0b10011);
        let b = Gf2Poly(0b110);
        let (g, s, t) = Gf2Poly::xgcd(a, b);
        assert_eq!(g, Gf2Poly(1));
        assert_eq!(a.mul(s).0 ^ b.mul(t).0, 1);
    }

    #[test]
    fn test_factor() {
        // z^4 + z^2 = z^2 (z + 1)^2
        assert_eq!(
            Gf2Poly(0b10100).factor(),
            vec![(Gf2Poly(0b10), 2), (Gf2Poly(0b11), 2)]
        );
        assert_eq!(Gf2Poly(0b10011).factor(), vec![(Gf2Poly(0b10011), 1)]);
        assert!(Gf2Poly(0b10011).is_irreducible());
        assert!(Gf2Poly(0b111).is_irreducible());
        assert!(!Gf2Poly(0b101).is_irreducible());
        assert!(!Gf2Poly(1).is_irreducible());
    }

    #[test]
    fn test_totient() {
        assert_eq!(Gf2Poly(0b10011).totient(), 15);
        // z^4 + z^2: units of GF(2)[z]/(z^2) x GF(2)[z]/((z+1)^2) = 2 * 2
        assert_eq!(Gf2Poly(0b10100).totient(), 4);
        assert_eq!(Gf2Poly(0b10).pow(5).totient(), 16);
    }

    #[test]
    fn test_to_kernel_index_is_identity_for_monomial_modulus() {
        // h / z^m = sum of h_k z^(k-m), so the binary digits are the coefficients of h
        let m = Gf2Poly(0b1000);
        for h in 0..8u64 {
            assert_eq!(Gf2Poly(h).to_kernel_index(m), h);
        }
    }

    #[test]
    fn test_to_kernel_index_is_bijective() {
        let m = Gf2Poly(0b1011);
        let mut seen: Vec<u64> = (0..8).map(|h| Gf2Poly(h).to_kernel_index(m)).collect();
        seen.sort();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
    }
}
