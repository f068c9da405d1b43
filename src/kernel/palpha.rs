// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The `P_alpha` kernels.

use std::f64::consts::PI;

use crate::error::{LatticeError, Result};
use crate::kernel::Kernel;

/// Bernoulli polynomial `B_alpha(x)` for even `alpha` in 2..=8.
fn bernoulli(alpha: u32, x: f64) -> f64 {
    let x2 = x * x;
    match alpha {
        2 => x2 - x + 1.0 / 6.0,
        4 => x2 * (x2 - 2.0 * x + 1.0) - 1.0 / 30.0,
        6 => {
            let x4 = x2 * x2;
            x4 * (x2 - 3.0 * x + 2.5) - 0.5 * x2 + 1.0 / 42.0
        }
        _ => {
            let x4 = x2 * x2;
            x4 * (x4 - 4.0 * x2 * x + 14.0 / 3.0 * x2 - 7.0 / 3.0) + 2.0 / 3.0 * x2 - 1.0 / 30.0
        }
    }
}

fn check_alpha(kernel: &'static str, alpha: u32) -> Result<()> {
    match alpha {
        2 | 4 | 6 | 8 => Ok(()),
        _ => Err(LatticeError::InvalidAlpha {
            kernel,
            alpha,
            allowed: "2, 4, 6, 8",
        }),
    }
}

/// `P_alpha` for ordinary lattices: a scaled Bernoulli polynomial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PAlpha {
    alpha: u32,
    scaling: f64,
}

impl PAlpha {
    pub fn new(alpha: u32) -> Result<Self> {
        check_alpha("P_alpha", alpha)?;
        // -i^alpha (2 pi)^alpha / alpha!
        let sign = if (alpha / 2) % 2 == 0 { -1.0 } else { 1.0 };
        let factorial: f64 = (1..=alpha).map(f64::from).product();
        Ok(Self {
            alpha,
            scaling: sign * (2.0 * PI).powi(alpha as i32) / factorial,
        })
    }

    pub fn alpha(&self) -> u32 {
        self.alpha
    }
}

impl Kernel for PAlpha {
    fn name(&self) -> String {
        format!("P{}", self.alpha)
    }

    fn symmetric(&self) -> bool {
        true
    }

    fn value(&self, x: f64, _num_points: u64) -> f64 {
        self.scaling * bernoulli(self.alpha, x)
    }
}

/// `P_alpha` for polynomial lattices, a Walsh-series kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PAlphaPlr {
    alpha: u32,
    mu: f64,
}

impl PAlphaPlr {
    pub fn new(alpha: u32) -> Result<Self> {
        check_alpha("P_alpha-PLR", alpha)?;
        Ok(Self {
            alpha,
            mu: 1.0 / (1.0 - 2f64.powi(1 - alpha as i32)),
        })
    }
}

impl Kernel for PAlphaPlr {
    fn name(&self) -> String {
        format!("P{}-PLR", self.alpha)
    }

    fn symmetric(&self) -> bool {
        false
    }

    fn value(&self, x: f64, _num_points: u64) -> f64 {
        if x == 0.0 {
            return self.mu;
        }
        let exponent = (x.log2().floor() + 1.0) * (self.alpha as f64 - 1.0);
        self.mu - 2f64.powf(exponent) * (self.mu + 1.0)
    }
}
