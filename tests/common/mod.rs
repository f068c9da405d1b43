// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use lattice_search::arith;
use lattice_search::kernel::Kernel;
use lattice_search::weights::{Projection, Weights};
use lattice_search::MeritValue;

/// `|a - b| <= rel * max(|a|, |b|)`, or both tiny.
pub fn approx_eq(a: f64, b: f64, rel: f64) -> bool {
    let scale = a.abs().max(b.abs());
    (a - b).abs() <= rel * scale || scale < 1e-300
}

pub fn assert_merits_close(a: &MeritValue, b: &MeritValue, rel: f64) {
    assert_eq!(a.components().len(), b.components().len(), "{} vs {}", a, b);
    for (x, y) in a.components().iter().zip(b.components()) {
        assert!(approx_eq(*x, *y, rel), "{} vs {}", a, b);
    }
}

/// Units modulo `n`, ascending.
pub fn units(n: u64) -> Vec<u64> {
    (1..n.max(1)).filter(|&a| arith::gcd(a, n) == 1).collect()
}

/// Weighted coordinate-uniform merit of the ordinary lattice `gen` with `n`
/// points, summed over every non-empty projection on the explicit points.
pub fn explicit_merit(n: u64, gen: &[u64], kernel: &dyn Kernel, weights: &dyn Weights) -> f64 {
    let d = gen.len();
    Projection::subsets(d)
        .filter(|u| !u.is_empty())
        .map(|u| {
            let w = weights.weight(&u);
            if w == 0.0 {
                return 0.0;
            }
            let sum: f64 = (0..n)
                .map(|i| {
                    u.iter()
                        .map(|j| {
                            let x = arith::mul_mod(i, gen[j], n) as f64 / n as f64;
                            kernel.value(x, n)
                        })
                        .product::<f64>()
                })
                .sum();
            w * sum / n as f64
        })
        .sum()
}

/// First candidate minimising the explicit merit of `prefix` extended by it.
pub fn brute_force_min(
    n: u64,
    prefix: &[u64],
    candidates: &[u64],
    kernel: &dyn Kernel,
    weights: &dyn Weights,
) -> Option<(u64, f64)> {
    let mut best: Option<(u64, f64)> = None;
    for &a in candidates {
        let mut trial = prefix.to_vec();
        trial.push(a);
        let m = explicit_merit(n, &trial, kernel, weights);
        if best.map_or(true, |(_, b)| m < b) {
            best = Some((a, m));
        }
    }
    best
}
