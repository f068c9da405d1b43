// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The `R_alpha` kernel: the Fourier series of `P_alpha` truncated to the
//! frequencies a lattice with `n` points can resolve.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::error::{LatticeError, Result};
use crate::fft;
use crate::kernel::Kernel;
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RAlpha {
    alpha: f64,
}

impl RAlpha {
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha.is_finite()) {
            return Err(LatticeError::InvalidConfig(format!(
                "R_alpha: alpha must be positive, got {}",
                alpha
            )));
        }
        Ok(Self { alpha })
    }
}

impl Kernel for RAlpha {
    fn name(&self) -> String {
        format!("R{}", self.alpha)
    }

    fn symmetric(&self) -> bool {
        true
    }

    fn value(&self, x: f64, num_points: u64) -> f64 {
        let n = num_points;
        let mut sum: f64 = (1..=(n.saturating_sub(1)) / 2)
            .map(|h| 2.0 * (h as f64).powf(-self.alpha) * (2.0 * PI * h as f64 * x).cos())
            .sum();
        if n % 2 == 0 && n > 0 {
            sum += ((n / 2) as f64).powf(-self.alpha) * (PI * n as f64 * x).cos();
        }
        sum
    }

    /// All point values at once, as one inverse transform of the Fourier
    /// coefficients `h^-alpha`.
    fn values_vector(&self, storage: &Storage) -> Result<Vec<f64>> {
        let sp = storage.size_param();
        let n = sp.num_points() as usize;
        if n == 0 || sp.lattice_type() != crate::size::LatticeType::Ordinary {
            return Err(LatticeError::InvalidConfig(format!(
                "{} needs an ordinary lattice with at least one point",
                self.name()
            )));
        }
        let mut coeffs = vec![Complex64::new(0.0, 0.0); n];
        for h in 1..=n / 2 {
            let c = Complex64::new((h as f64).powf(-self.alpha), 0.0);
            coeffs[h] = c;
            coeffs[n - h] = c;
        }
        let point_values = fft::ifft(&coeffs);
        let mut values = vec![0.0; storage.size()];
        for (i, v) in point_values.iter().enumerate() {
            values[storage.unpermute(i as u64)?] = v.re * n as f64;
        }
        Ok(values)
    }
}
