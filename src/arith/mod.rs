// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Integer arithmetic used by index enumeration and storage tables.
//!
//! Everything here is pure and works on `u64` moduli. Products are taken in
//! `u128` so that `a * b mod n` never overflows for any `n < 2^64`.
//!
//! GF(2) polynomial arithmetic lives in [`poly`].

pub mod poly;

pub use poly::Gf2Poly;

use crate::error::{LatticeError, Result};

/// `base^exp` without reduction, or `Overflow` past `u64::MAX`.
pub fn int_pow(base: u64, exp: u32) -> Result<u64> {
    base.checked_pow(exp).ok_or(LatticeError::Overflow { base, exp })
}

/// `a * b mod modulus`.
pub fn mul_mod(a: u64, b: u64, modulus: u64) -> u64 {
    ((a as u128 * b as u128) % modulus as u128) as u64
}

/// `base^exp mod modulus` by binary exponentiation.
pub fn modular_pow(base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let m = modulus as u128;
    let mut b = base as u128 % m;
    let mut result = 1u128;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * b % m;
        }
        b = b * b % m;
        exp >>= 1;
    }
    result as u64
}

/// Greatest common divisor.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Extended Euclid: returns `(g, x, y)` with `a*x + b*y = g`.
pub fn egcd(a: i128, b: i128) -> (i128, i128, i128) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_s, mut s) = (1i128, 0i128);
    let (mut old_t, mut t) = (0i128, 1i128);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
        (old_t, t) = (t, old_t - q * t);
    }
    (old_r, old_s, old_t)
}

/// Multiplicative inverse of `a` modulo `modulus`, if it exists.
pub fn mod_inverse(a: u64, modulus: u64) -> Option<u64> {
    if modulus == 1 {
        return Some(0);
    }
    let (g, x, _) = egcd(a as i128, modulus as i128);
    if g != 1 {
        return None;
    }
    Some(x.rem_euclid(modulus as i128) as u64)
}

/// Prime factorization as `(prime, exponent)` pairs in increasing order.
///
/// `0` and `1` have no factors.
pub fn prime_factors_map(mut n: u64) -> Vec<(u64, u32)> {
    let mut factors = Vec::new();
    if n < 2 {
        return factors;
    }
    let mut p = 2u64;
    while p.saturating_mul(p) <= n {
        if n % p == 0 {
            let mut k = 0;
            while n % p == 0 {
                n /= p;
                k += 1;
            }
            factors.push((p, k));
        }
        p += if p == 2 { 1 } else { 2 };
    }
    if n > 1 {
        factors.push((n, 1));
    }
    factors
}

/// Distinct prime factors in increasing order.
pub fn prime_factors(n: u64) -> Vec<u64> {
    prime_factors_map(n).into_iter().map(|(p, _)| p).collect()
}

pub fn is_prime(n: u64) -> bool {
    matches!(prime_factors_map(n).as_slice(), [(_, 1)]) && n > 1
}

/// Returns `(p, k)` when `n = p^k` for a prime `p`.
pub fn prime_power(n: u64) -> Option<(u64, u32)> {
    match prime_factors_map(n).as_slice() {
        [(p, k)] => Some((*p, *k)),
        _ => None,
    }
}

/// Euler's totient. `totient(0)` is 0 and `totient(1)` is 1.
pub fn totient(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    prime_factors_map(n)
        .into_iter()
        .fold(n, |acc, (p, _)| acc / p * (p - 1))
}

/// Rounded integer division, `floor(a/b + 1/2)`.
///
/// Ties go toward positive infinity for both signs: `5/2 -> 3` and
/// `-5/2 -> -2`. [`divide_round_f64`] follows the same convention.
///
/// # Panics
///
/// Panics if `b == 0`.
pub fn divide_round(a: i64, b: i64) -> i64 {
    let (a, b) = if b < 0 {
        (-(a as i128), -(b as i128))
    } else {
        (a as i128, b as i128)
    };
    (2 * a + b).div_euclid(2 * b) as i64
}

/// Real rounded division, `floor(a/b + 1/2)`.
pub fn divide_round_f64(a: f64, b: f64) -> f64 {
    (a / b + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modular_pow() {
        assert_eq!(modular_pow(3, 4, 7), 4);
        assert_eq!(modular_pow(5, 0, 16), 1);
        assert_eq!(modular_pow(5, 4, 16), 1);
        assert_eq!(modular_pow(2, 10, 1), 0);
        assert_eq!(modular_pow(u64::MAX - 1, 2, u64::MAX), 1);
    }

    #[test]
    fn test_int_pow_overflow() {
        assert_eq!(int_pow(3, 40), Ok(12157665459056928801));
        assert_eq!(int_pow(2, 64), Err(LatticeError::Overflow { base: 2, exp: 64 }));
        assert_eq!(int_pow(0, 0), Ok(1));
    }

    #[test]
    fn test_prime_factors_map() {
        assert_eq!(prime_factors_map(1), vec![]);
        assert_eq!(prime_factors_map(12), vec![(2, 2), (3, 1)]);
        assert_eq!(prime_factors_map(1024), vec![(2, 10)]);
        assert_eq!(prime_factors_map(3 * 3 * 7 * 11), vec![(3, 2), (7, 1), (11, 1)]);
        assert_eq!(prime_factors(60), vec![2, 3, 5]);
    }

    #[test]
    fn test_primality_and_powers() {
        assert!(is_prime(2));
        assert!(is_prime(19));
        assert!(!is_prime(1));
        assert!(!is_prime(9));
        assert_eq!(prime_power(243), Some((3, 5)));
        assert_eq!(prime_power(12), None);
        assert_eq!(prime_power(1), None);
    }

    #[test]
    fn test_totient() {
        assert_eq!(totient(0), 0);
        assert_eq!(totient(1), 1);
        assert_eq!(totient(12), 4);
        assert_eq!(totient(16), 8);
        assert_eq!(totient(19), 18);
        assert_eq!(totient(1000), 400);
    }

    #[test]
    fn test_egcd_and_inverse() {
        let (g, x, y) = egcd(240, 46);
        assert_eq!(g, 2);
        assert_eq!(240 * x + 46 * y, 2);
        assert_eq!(mod_inverse(5, 16), Some(13));
        assert_eq!(mod_inverse(4, 12), None);
        assert_eq!(mod_inverse(3, 1), Some(0));
    }

    #[test]
    fn test_divide_round_ties() {
        assert_eq!(divide_round(5, 2), 3);
        assert_eq!(divide_round(-5, 2), -2);
        assert_eq!(divide_round(7, 2), 4);
        assert_eq!(divide_round(-7, 2), -3);
        assert_eq!(divide_round(5, -2), -2);
        assert_eq!(divide_round(-5, -2), 3);
    }

    #[test]
    fn test_divide_round_non_ties() {
        assert_eq!(divide_round(4, 3), 1);
        assert_eq!(divide_round(-4, 3), -1);
        assert_eq!(divide_round(5, 3), 2);
        assert_eq!(divide_round(-5, 3), -2);
        assert_eq!(divide_round(0, 7), 0);
    }

    #[test]
    fn test_divide_round_matches_real_version() {
        for a in -20i64..=20 {
            for b in [-4i64, -3, -2, -1, 1, 2, 3, 4] {
                assert_eq!(
                    divide_round(a, b) as f64,
                    divide_round_f64(a as f64, b as f64),
                    "a={} b={}",
                    a,
                    b
                );
            }
        }
    }
}
