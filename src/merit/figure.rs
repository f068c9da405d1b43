// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Weighted figures of merit evaluated projection by projection.
//!
//! ```text
//! D(P) = ACC_u  gamma_u * D_u(P)^(q/2)
//! ```
//!
//! where `ACC` is a sum or a maximum over projections `u` and `D_u` is the
//! merit of the point set projected on `u`. Progress observers see the
//! partial value after each projection and may vote to abandon it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::trace;

use crate::error::{LatticeError, Result};
use crate::kernel::Kernel;
use crate::merit::MeritValue;
use crate::size::LatDef;
use crate::storage::Storage;
use crate::weights::{AnyWeights, Projection, Weights, MAX_DIMENSION};

/// How projection contributions are combined.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Accumulator {
    #[default]
    Sum,
    Max,
}

impl Accumulator {
    pub fn accumulate(self, acc: &mut MeritValue, x: &MeritValue) {
        match self {
            Accumulator::Sum => *acc += x,
            Accumulator::Max => *acc = acc.max(x),
        }
    }
}

/// Merit of one projection of a lattice.
pub trait ProjectionMerit: fmt::Debug + Send + Sync {
    fn name(&self) -> String;

    fn merit(&self, storage: &Storage, lat: &LatDef, projection: &Projection) -> Result<MeritValue>;
}

/// Coordinate-uniform merit of a projection: the normalized sum over all
/// points of the product of kernel values on the projected coordinates.
#[derive(Debug, Clone)]
pub struct CoordUniformProjectionMerit {
    kernel: Arc<dyn Kernel>,
    values: Vec<f64>,
}

impl CoordUniformProjectionMerit {
    pub fn new(kernel: Arc<dyn Kernel>, storage: &Storage) -> Result<Self> {
        let values = kernel.values_vector(storage)?;
        Ok(Self { kernel, values })
    }
}

impl ProjectionMerit for CoordUniformProjectionMerit {
    fn name(&self) -> String {
        format!("CU:{}", self.kernel.name())
    }

    fn merit(
        &self,
        storage: &Storage,
        lat: &LatDef,
        projection: &Projection,
    ) -> Result<MeritValue> {
        if projection.is_empty() {
            return Err(LatticeError::EmptyProjection);
        }
        let mut product = vec![1.0; storage.size()];
        for j in projection.iter() {
            let a = *lat.gen().get(j).ok_or(LatticeError::NoSuchProjection {
                coordinate: j,
                dimension: lat.dimension(),
            })?;
            let stride = storage.stride(a)?;
            for (p, k) in product.iter_mut().zip(stride.iter()) {
                *p *= self.values[k];
            }
        }
        let mut merit = storage.compressed_sum(&product);
        storage.normalize(&mut merit);
        Ok(merit)
    }
}

type ProgressFn = Box<dyn FnMut(&MeritValue) -> bool + Send>;
type AbortFn = Box<dyn FnMut(&LatDef) + Send>;

/// Callbacks fired while a figure is evaluated.
///
/// Each progress callback returns `true` to continue. Evaluation stops only
/// when at least one callback is registered and all of them return `false`.
#[derive(Default)]
pub struct ProgressObservers {
    on_progress: Vec<ProgressFn>,
    on_abort: Vec<AbortFn>,
}

impl fmt::Debug for ProgressObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressObservers")
            .field("on_progress", &self.on_progress.len())
            .field("on_abort", &self.on_abort.len())
            .finish()
    }
}

impl ProgressObservers {
    pub fn on_progress(&mut self, f: impl FnMut(&MeritValue) -> bool + Send + 'static) {
        self.on_progress.push(Box::new(f));
    }

    pub fn on_abort(&mut self, f: impl FnMut(&LatDef) + Send + 'static) {
        self.on_abort.push(Box::new(f));
    }

    pub fn clear(&mut self) {
        self.on_progress.clear();
        self.on_abort.clear();
    }

    /// `true` when evaluation should go on.
    fn progress(&mut self, partial: &MeritValue) -> bool {
        let votes: Vec<bool> = self.on_progress.iter_mut().map(|f| f(partial)).collect();
        votes.is_empty() || votes.iter().any(|&keep_going| keep_going)
    }

    fn abort(&mut self, lat: &LatDef) {
        for f in &mut self.on_abort {
            f(lat);
        }
    }
}

/// A weighted figure of merit evaluated projection by projection.
#[derive(Debug)]
pub struct WeightedFigure {
    weights: Arc<AnyWeights>,
    norm_type: f64,
    accumulator: Accumulator,
    projection_merit: Box<dyn ProjectionMerit>,
}

impl WeightedFigure {
    pub fn new(
        weights: Arc<AnyWeights>,
        norm_type: f64,
        accumulator: Accumulator,
        projection_merit: Box<dyn ProjectionMerit>,
    ) -> Self {
        Self {
            weights,
            norm_type,
            accumulator,
            projection_merit,
        }
    }

    pub fn name(&self) -> String {
        format!(
            "{} of {}^{} weighted",
            self.accumulator,
            self.projection_merit.name(),
            self.norm_type
        )
    }

    pub fn weights(&self) -> &AnyWeights {
        &self.weights
    }

    pub fn accumulator(&self) -> Accumulator {
        self.accumulator
    }

    /// Accumulates the weighted merits of `projections` onto `initial`.
    ///
    /// If the observers stop the evaluation the result is infinite.
    pub fn evaluate(
        &self,
        storage: &Storage,
        lat: &LatDef,
        projections: impl IntoIterator<Item = Projection>,
        initial: MeritValue,
        observers: &mut ProgressObservers,
    ) -> Result<MeritValue> {
        let mut acc = initial;
        let exponent = self.norm_type / 2.0;
        for projection in projections {
            let weight = self.weights.weight(&projection);
            if weight == 0.0 {
                continue;
            }
            let merit = self.projection_merit.merit(storage, lat, &projection)?;
            let term = merit.map(|m| weight * m.powf(exponent));
            self.accumulator.accumulate(&mut acc, &term);
            trace!(%projection, weight, merit = %term, "projection");
            if !observers.progress(&acc) {
                observers.abort(lat);
                return Ok(acc.filled_like(f64::INFINITY));
            }
        }
        Ok(acc)
    }

    /// Value over every non-empty projection of `lat`.
    pub fn evaluate_all(&self, storage: &Storage, lat: &LatDef) -> Result<MeritValue> {
        if lat.dimension() > MAX_DIMENSION {
            return Err(LatticeError::DimensionTooLarge {
                dimension: lat.dimension(),
                max: MAX_DIMENSION,
            });
        }
        let projections = Projection::subsets(lat.dimension()).filter(|p| !p.is_empty());
        self.evaluate(
            storage,
            lat,
            projections,
            storage.create_merit_value(0.0),
            &mut ProgressObservers::default(),
        )
    }
}
