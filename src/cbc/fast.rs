// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Inner products of a weighted state with every strided kernel vector.
//!
//! The direct product costs `O(n)` per candidate. On a CYCLIC storage the
//! strided kernel vectors of a level block are the cyclic shifts of one
//! vector, so the products for all candidates at once form a circular
//! correlation, computed per block with the FFT in `O(n log n)`.

use std::ops::Range;

use num_complex::Complex64;
use tracing::debug;

use crate::error::Result;
use crate::fft::FftPlan;
use crate::genseq::GenSeq;
use crate::kernel::Kernel;
use crate::merit::MeritValue;
use crate::size::SizeParam;
use crate::storage::{PerLevelOrder, Storage};

/// `sum_i state_i * kernel_{stride_a(i)}` for one storage, one `a` at a time.
#[derive(Debug, Clone)]
pub struct DirectInnerProduct {
    storage: Storage,
    kernel_values: Vec<f64>,
}

impl DirectInnerProduct {
    pub fn new(storage: &Storage, kernel: &dyn Kernel) -> Result<Self> {
        Ok(Self {
            storage: storage.clone(),
            kernel_values: kernel.values_vector(storage)?,
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn kernel_values(&self) -> &[f64] {
        &self.kernel_values
    }

    pub fn product(&self, state: &[f64], a: u64) -> Result<MeritValue> {
        let stride = self.storage.stride(a)?;
        let v: Vec<f64> = state
            .iter()
            .zip(stride.iter())
            .map(|(s, j)| s * self.kernel_values[j])
            .collect();
        Ok(self.storage.compressed_sum(&v))
    }
}

#[derive(Debug, Clone)]
enum Blocks {
    /// The level block is one circulant.
    Whole {
        plan: FftPlan,
        kernel: Vec<Complex64>,
    },
    /// Base 2 without compression: two circulant halves, swapped for the
    /// second half of the generator rows.
    Halves {
        plan: FftPlan,
        first: Vec<Complex64>,
        second: Vec<Complex64>,
    },
}

#[derive(Debug, Clone)]
struct LevelPlan {
    range: Range<usize>,
    ratio: f64,
    blocks: Blocks,
}

/// Products for every generator row, cumulative over levels.
#[derive(Debug, Clone)]
pub struct RowProducts {
    direct: Vec<Vec<f64>>,
    /// Present only when some level is split in halves.
    reversed: Option<Vec<Vec<f64>>>,
}

/// Products of one state with the strided kernels of all generator rows.
#[derive(Debug, Clone)]
pub struct FastInnerProduct {
    external: Storage,
    internal: Storage,
    kernel_values: Vec<f64>,
    levels: Vec<LevelPlan>,
    seq_size: usize,
}

impl FastInnerProduct {
    /// Plans the transforms on an embedded CYCLIC storage of the same
    /// modulus as `external`, which must be a prime power.
    pub fn new(external: &Storage, kernel: &dyn Kernel) -> Result<Self> {
        let internal = if external.is_multilevel() && external.order() == PerLevelOrder::Cyclic {
            external.clone()
        } else {
            let sp = external.size_param();
            let embedded = if sp.is_embedded() {
                *sp
            } else {
                SizeParam::embedded_from_modulus(sp.lattice_type(), sp.modulus())?
            };
            Storage::new(embedded, external.compress(), PerLevelOrder::Cyclic)?
        };
        let kernel_values = kernel.values_vector(&internal)?;
        let split = !internal.symmetric() && internal.size_param().base() == 2;
        let base = internal.size_param().base();
        let levels = internal
            .level_ranges()
            .into_iter()
            .enumerate()
            .map(|(level, range)| {
                let block = &kernel_values[range.clone()];
                let ratio = internal.compress().level_compression_ratio(base, level as u32) as f64;
                let blocks = if split && block.len() >= 2 {
                    let half = block.len() / 2;
                    let plan = FftPlan::new(half);
                    Blocks::Halves {
                        first: plan.forward_real(&transposed(&block[..half])),
                        second: plan.forward_real(&transposed(&block[half..])),
                        plan,
                    }
                } else {
                    let plan = FftPlan::new(block.len());
                    Blocks::Whole {
                        kernel: plan.forward_real(&transposed(block)),
                        plan,
                    }
                };
                LevelPlan {
                    range,
                    ratio,
                    blocks,
                }
            })
            .collect();
        let seq_size = internal.generators().map(|g| g.size()).unwrap_or(0);
        debug!(
            storage = %internal.size_param(),
            compress = %internal.compress(),
            seq_size,
            "planned fast inner product"
        );
        Ok(Self {
            external: external.clone(),
            internal,
            kernel_values,
            levels,
            seq_size,
        })
    }

    /// Storage the CBC states must be kept in.
    pub fn internal_storage(&self) -> &Storage {
        &self.internal
    }

    /// Kernel values in the internal layout.
    pub fn kernel_values(&self) -> &[f64] {
        &self.kernel_values
    }

    /// Products of `state` with every generator row, one transform per block.
    pub fn row_products(&self, state: &[f64]) -> RowProducts {
        let mut direct: Vec<Vec<f64>> = Vec::with_capacity(self.levels.len());
        let mut reversed: Option<Vec<Vec<f64>>> = None;
        for level in &self.levels {
            let block = &state[level.range.clone()];
            let (d, r) = match &level.blocks {
                Blocks::Whole { plan, kernel } => {
                    let f = plan.forward_real(block);
                    let d = real_part(plan, f.iter().zip(kernel).map(|(x, k)| x * k), level.ratio);
                    (d.clone(), d)
                }
                Blocks::Halves {
                    plan,
                    first,
                    second,
                } => {
                    let half = plan.len();
                    let f1 = plan.forward_real(&block[..half]);
                    let f2 = plan.forward_real(&block[half..]);
                    let d = (0..half).map(|k| f1[k] * first[k] + f2[k] * second[k]);
                    let d = real_part(plan, d, level.ratio);
                    let r = (0..half).map(|k| f1[k] * second[k] + f2[k] * first[k]);
                    let r = real_part(plan, r, level.ratio);
                    reversed.get_or_insert_with(|| direct.clone());
                    (d, r)
                }
            };
            push_cumulative(&mut direct, d);
            if let Some(reversed) = reversed.as_mut() {
                push_cumulative(reversed, r);
            }
        }
        RowProducts { direct, reversed }
    }

    /// Product for one generating value, read from precomputed row products.
    pub fn product(&self, products: &RowProducts, a: u64) -> Result<MeritValue> {
        let row = self.internal.find_row(a)?;
        let levels = match &products.reversed {
            Some(reversed) if row >= self.seq_size / 2 => reversed,
            _ => &products.direct,
        };
        let values: Vec<f64> = levels.iter().map(|v| v[row % v.len()]).collect();
        Ok(if self.external.is_multilevel() {
            MeritValue::Levels(values)
        } else {
            MeritValue::Scalar(values.last().copied().unwrap_or(0.0))
        })
    }
}

/// `t_i = k_{-i mod len}`: turns the circular correlation into a convolution.
fn transposed(block: &[f64]) -> Vec<f64> {
    let len = block.len();
    (0..len).map(|i| block[(len - i) % len]).collect()
}

fn real_part(plan: &FftPlan, spectrum: impl Iterator<Item = Complex64>, ratio: f64) -> Vec<f64> {
    let spectrum: Vec<Complex64> = spectrum.collect();
    plan.inverse(&spectrum).into_iter().map(|x| ratio * x.re).collect()
}

/// Appends `level` after adding the previous cumulative level, which has a
/// length dividing that of `level`.
fn push_cumulative(levels: &mut Vec<Vec<f64>>, mut level: Vec<f64>) {
    if let Some(prev) = levels.last() {
        let len = prev.len();
        for (i, x) in level.iter_mut().enumerate() {
            *x += prev[i % len];
        }
    }
    levels.push(level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{PAlpha, PAlphaPlr};
    use crate::size::Compress;

    fn state(len: usize) -> Vec<f64> {
        (0..len).map(|i| 1.0 + ((i * 7) % 5) as f64 * 0.25).collect()
    }

    fn assert_close(a: &MeritValue, b: &MeritValue) {
        for (x, y) in a.components().iter().zip(b.components()) {
            assert!((x - y).abs() <= 1e-9 * y.abs().max(1.0), "{} vs {}", a, b);
        }
    }

    fn compare(external: Storage, kernel: &dyn Kernel) {
        let fast = FastInnerProduct::new(&external, kernel).unwrap();
        let direct = DirectInnerProduct::new(fast.internal_storage(), kernel).unwrap();
        let s = state(fast.internal_storage().size());
        let rows = fast.row_products(&s);
        let group = fast.internal_storage().generators().unwrap().clone();
        for a in group.values() {
            let expected = direct.product(&s, a).unwrap();
            let got = fast.product(&rows, a).unwrap();
            match (&got, &expected) {
                (MeritValue::Scalar(x), MeritValue::Levels(v)) => {
                    assert!((x - v[v.len() - 1]).abs() < 1e-9 * x.abs().max(1.0))
                }
                _ => assert_close(&got, &expected),
            }
        }
    }

    #[test]
    fn test_fast_matches_direct_symmetric() {
        let sp = SizeParam::embedded(2, 6).unwrap();
        let storage = Storage::new(sp, Compress::Symmetric, PerLevelOrder::Basic).unwrap();
        compare(storage, &PAlpha::new(2).unwrap());
    }

    #[test]
    fn test_fast_matches_direct_base2_halves() {
        let sp = SizeParam::embedded(2, 5).unwrap();
        let storage = Storage::new(sp, Compress::None, PerLevelOrder::Cyclic).unwrap();
        compare(storage, &PAlphaPlr::new(2).unwrap());
    }

    #[test]
    fn test_fast_matches_direct_odd_base() {
        let storage = Storage::unilevel(SizeParam::ordinary(243), Compress::Symmetric).unwrap();
        compare(storage, &PAlpha::new(4).unwrap());
    }

    #[test]
    fn test_fast_requires_prime_power() {
        let storage = Storage::unilevel(SizeParam::ordinary(12), Compress::Symmetric).unwrap();
        assert!(FastInnerProduct::new(&storage, &PAlpha::new(2).unwrap()).is_err());
    }
}
