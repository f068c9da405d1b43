// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::cbc::fast::{DirectInnerProduct, FastInnerProduct};
use crate::cbc::state::CoordUniformState;
use crate::cbc::{CbcSearch, MeritSeq};
use crate::error::Result;
use crate::kernel::Kernel;
use crate::merit::MeritValue;
use crate::size::LatDef;
use crate::storage::Storage;
use crate::weights::AnyWeights;

/// How candidate merits are computed from the weighted state.
#[derive(Debug, Clone)]
pub enum InnerProduct {
    Direct(DirectInnerProduct),
    Fast(FastInnerProduct),
}

impl InnerProduct {
    /// Layout of the CBC states.
    fn state_storage(&self) -> &Storage {
        match self {
            InnerProduct::Direct(p) => p.storage(),
            InnerProduct::Fast(p) => p.internal_storage(),
        }
    }

    fn kernel_values(&self) -> &[f64] {
        match self {
            InnerProduct::Direct(p) => p.kernel_values(),
            InnerProduct::Fast(p) => p.kernel_values(),
        }
    }
}

/// CBC for a coordinate-uniform figure with `q = 2`.
///
/// The merit of an extension by `a` is the base merit plus the normalized
/// compressed sum of `weighted_state * stride_a(kernel)`.
#[derive(Debug)]
pub struct CoordUniformCbc {
    storage: Storage,
    kernel: Arc<dyn Kernel>,
    inner: InnerProduct,
    states: Vec<CoordUniformState>,
    base_lat: LatDef,
    base_merit: MeritValue,
    parallel: bool,
}

impl CoordUniformCbc {
    pub fn new(
        storage: &Storage,
        kernel: Arc<dyn Kernel>,
        weights: &AnyWeights,
        fast: bool,
    ) -> Result<Self> {
        let inner = if fast {
            InnerProduct::Fast(FastInnerProduct::new(storage, kernel.as_ref())?)
        } else {
            InnerProduct::Direct(DirectInnerProduct::new(storage, kernel.as_ref())?)
        };
        let states = CoordUniformState::for_weights(weights, inner.state_storage());
        debug!(
            storage = %storage.size_param(),
            kernel = %kernel.name(),
            states = states.len(),
            fast,
            "coordinate-uniform CBC"
        );
        Ok(Self {
            storage: storage.clone(),
            kernel,
            inner,
            states,
            base_lat: LatDef::new(*storage.size_param()),
            base_merit: storage.create_merit_value(0.0),
            parallel: false,
        })
    }

    /// Evaluates direct inner products on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_fast(&self) -> bool {
        matches!(self.inner, InnerProduct::Fast(_))
    }

    fn weighted_state(&self) -> Result<Vec<f64>> {
        let mut total = vec![0.0; self.inner.state_storage().size()];
        for state in &self.states {
            for (t, x) in total.iter_mut().zip(state.weighted_state()?) {
                *t += x;
            }
        }
        Ok(total)
    }

    fn finish(&self, mut raw: MeritValue) -> MeritValue {
        self.storage.normalize(&mut raw);
        raw += &self.base_merit;
        raw
    }
}

impl CbcSearch for CoordUniformCbc {
    fn name(&self) -> String {
        let method = if self.is_fast() { "fast CBC" } else { "CBC" };
        format!("{} of CU:{}", method, self.kernel.name())
    }

    fn storage(&self) -> &Storage {
        &self.storage
    }

    fn base_lat(&self) -> &LatDef {
        &self.base_lat
    }

    fn base_merit(&self) -> &MeritValue {
        &self.base_merit
    }

    fn merit_seq<'a>(&'a mut self, candidates: &'a [u64]) -> Result<MeritSeq<'a>> {
        let state = self.weighted_state()?;
        let this: &'a Self = self;
        match &this.inner {
            InnerProduct::Fast(fast) => {
                let rows = fast.row_products(&state);
                Ok(Box::new(candidates.iter().map(move |&a| {
                    fast.product(&rows, a).map(|raw| this.finish(raw))
                })))
            }
            InnerProduct::Direct(direct) if this.parallel => {
                let merits: Vec<Result<MeritValue>> = candidates
                    .par_iter()
                    .map(|&a| direct.product(&state, a).map(|raw| this.finish(raw)))
                    .collect();
                Ok(Box::new(merits.into_iter()))
            }
            InnerProduct::Direct(direct) => Ok(Box::new(candidates.iter().map(move |&a| {
                direct.product(&state, a).map(|raw| this.finish(raw))
            }))),
        }
    }

    fn select(&mut self, gen: u64, merit: MeritValue) -> Result<()> {
        for state in &mut self.states {
            state.update(self.inner.kernel_values(), gen)?;
        }
        self.base_lat = self.base_lat.extended(gen);
        self.base_merit = merit;
        Ok(())
    }

    fn reset(&mut self) {
        for state in &mut self.states {
            state.reset();
        }
        self.base_lat = LatDef::new(*self.storage.size_param());
        self.base_merit = self.storage.create_merit_value(0.0);
    }
}
