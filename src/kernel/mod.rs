// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! One-dimensional kernels of coordinate-uniform figures of merit.
//!
//! A coordinate-uniform figure sums, over all points, products of a kernel
//! `omega(x_j)` taken on each coordinate. The CBC engine only ever needs the
//! kernel's values on the points `i/n`, laid out in a storage: see
//! [`Kernel::values_vector`].

pub mod palpha;
pub mod ralpha;

pub use palpha::{PAlpha, PAlphaPlr};
pub use ralpha::RAlpha;

use std::fmt;
use std::sync::Arc;

use crate::error::{LatticeError, Result};
use crate::size::Compress;
use crate::storage::Storage;

pub trait Kernel: Send + Sync + fmt::Debug {
    fn name(&self) -> String;

    /// `omega(x) == omega(1 - x)` for all `x`.
    fn symmetric(&self) -> bool;

    fn suggested_compression(&self) -> Compress {
        if self.symmetric() {
            Compress::Symmetric
        } else {
            Compress::None
        }
    }

    /// Kernel value at `x` in `[0, 1)` for a point set of `num_points` points.
    fn value(&self, x: f64, num_points: u64) -> f64;

    /// Kernel values on the lattice points, laid out in `storage`.
    fn values_vector(&self, storage: &Storage) -> Result<Vec<f64>> {
        if storage.symmetric() && !self.symmetric() {
            return Err(LatticeError::NonSymmetricKernel {
                kernel: self.name(),
                compress: storage.compress(),
            });
        }
        let sp = storage.size_param();
        let lattice = sp.lattice_type();
        let n = sp.num_points();
        let mut values = vec![0.0; storage.size()];
        for i in 0..n {
            let slot = storage.unpermute(i)?;
            let x = lattice.kernel_index(i, sp.modulus()) as f64 / n as f64;
            values[slot] = self.value(x, n);
        }
        Ok(values)
    }
}

/// Parses a kernel name: `P{alpha}`, `R{alpha}` or `P{alpha}-PLR`.
pub fn parse(name: &str) -> Result<Arc<dyn Kernel>> {
    let bad = || LatticeError::InvalidConfig(format!("unknown kernel `{}`", name));
    if let Some(alpha) = name.strip_prefix('P').and_then(|s| s.strip_suffix("-PLR")) {
        let alpha = alpha.parse::<u32>().map_err(|_| bad())?;
        return Ok(Arc::new(PAlphaPlr::new(alpha)?));
    }
    if let Some(alpha) = name.strip_prefix('P') {
        let alpha = alpha.parse::<u32>().map_err(|_| bad())?;
        return Ok(Arc::new(PAlpha::new(alpha)?));
    }
    if let Some(alpha) = name.strip_prefix('R') {
        let alpha = alpha.parse::<f64>().map_err(|_| bad())?;
        return Ok(Arc::new(RAlpha::new(alpha)?));
    }
    Err(bad())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::SizeParam;
    use crate::storage::PerLevelOrder;

    #[test]
    fn test_parse() {
        assert_eq!(parse("P2").unwrap().name(), "P2");
        assert_eq!(parse("R1.5").unwrap().name(), "R1.5");
        assert_eq!(parse("P4-PLR").unwrap().name(), "P4-PLR");
        assert!(parse("Q2").is_err());
        assert!(matches!(
            parse("P3"),
            Err(LatticeError::InvalidAlpha { alpha: 3, .. })
        ));
    }

    #[test]
    fn test_values_vector_follows_layout() {
        let kernel = PAlpha::new(2).unwrap();
        let size = SizeParam::embedded(2, 3).unwrap();
        let storage = Storage::new(size, Compress::Symmetric, PerLevelOrder::Cyclic).unwrap();
        let values = kernel.values_vector(&storage).unwrap();
        for i in 0..8u64 {
            let slot = storage.unpermute(i).unwrap();
            assert!((values[slot] - kernel.value(i as f64 / 8.0, 8)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_asymmetric_kernel_needs_uncompressed_storage() {
        let kernel = PAlphaPlr::new(2).unwrap();
        let storage = Storage::unilevel(SizeParam::ordinary(8), Compress::Symmetric).unwrap();
        assert!(matches!(
            kernel.values_vector(&storage),
            Err(LatticeError::NonSymmetricKernel { .. })
        ));
    }
}
