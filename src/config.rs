// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search configuration.
//!
//! [`SearchConfig`] is read from JSON by the binary. Every field has a
//! default, so a file only names what differs:
//!
//! ```json
//! {
//!   "modulus": 1021,
//!   "dimension": 8,
//!   "method": "fast-cbc",
//!   "kernel": "P2",
//!   "weights": { "type": "product", "default": 0.7 }
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::debug;

use crate::cbc::{Cbc, CbcSearch, CoordUniformCbc};
use crate::engine::{Candidates, CbcTask, EvalTask, LatSeq, LatSeqTask, SearchTask};
use crate::error::{LatticeError, Result};
use crate::genseq::{CyclicGroup, GenSeq, GeneratingValues, GroupOrder};
use crate::kernel::{self, Kernel};
use crate::merit::{
    Accumulator, Combiner, CoordUniformProjectionMerit, FilterChain, LowPass, WeightedFigure,
};
use crate::size::{Compress, LatDef, LatticeType, SizeParam};
use crate::storage::{PerLevelOrder, Storage};
use crate::weights::{AnyWeights, MAX_DIMENSION};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    #[default]
    Cbc,
    FastCbc,
    RandomCbc,
    Korobov,
    RandomKorobov,
    Exhaustive,
    /// Every extension of the lattice `gen` with `extend-from` points.
    Extend,
    Eval,
}

/// How the figure of merit is evaluated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Evaluation {
    /// Incremental states, one inner product per candidate.
    #[default]
    CoordUniform,
    /// Projection by projection.
    Projection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SearchConfig {
    pub lattice: LatticeType,
    /// Number of points, or the polynomial modulus. Exclusive with `base`.
    pub modulus: Option<u64>,
    /// Embedded point sets: `base^max_level` points.
    pub base: Option<u64>,
    pub max_level: Option<u32>,
    /// Defaults to the kernel's suggestion.
    pub compress: Option<Compress>,
    pub order: PerLevelOrder,
    pub dimension: usize,
    pub method: Method,
    pub kernel: String,
    pub evaluation: Evaluation,
    pub norm_type: f64,
    pub accumulator: Accumulator,
    pub weights: AnyWeights,
    pub combiner: Combiner,
    pub low_pass: Option<f64>,
    pub samples: usize,
    pub seed: u64,
    pub parallel: bool,
    pub truncate_sum: bool,
    /// Generating vector for `eval` and `extend`.
    pub gen: Vec<u64>,
    /// Number of points, or the polynomial modulus, of the lattice `extend`
    /// starts from.
    pub extend_from: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            lattice: LatticeType::Ordinary,
            modulus: Some(101),
            base: None,
            max_level: None,
            compress: None,
            order: PerLevelOrder::Basic,
            dimension: 5,
            method: Method::Cbc,
            kernel: "P2".into(),
            evaluation: Evaluation::CoordUniform,
            norm_type: 2.0,
            accumulator: Accumulator::Sum,
            weights: AnyWeights::default(),
            combiner: Combiner::Max,
            low_pass: None,
            samples: 100,
            seed: 0,
            parallel: false,
            truncate_sum: false,
            gen: Vec::new(),
            extend_from: None,
        }
    }
}

impl SearchConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| LatticeError::InvalidConfig(e.to_string()))
    }

    pub fn size_param(&self) -> Result<SizeParam> {
        match (self.modulus, self.base, self.max_level) {
            (Some(n), None, None) => match self.lattice {
                LatticeType::Ordinary => Ok(SizeParam::ordinary(n)),
                LatticeType::Polynomial => SizeParam::polynomial(n),
            },
            (None, Some(base), Some(level)) => match self.lattice {
                LatticeType::Ordinary => SizeParam::embedded(base, level),
                LatticeType::Polynomial => SizeParam::polynomial_embedded(base, level),
            },
            _ => Err(LatticeError::InvalidConfig(
                "give either `modulus`, or both `base` and `max-level`".into(),
            )),
        }
    }

    fn target_dimension(&self) -> Result<usize> {
        let dimension = match self.method {
            Method::Eval | Method::Extend => {
                let dimension = if self.dimension == 0 {
                    self.gen.len()
                } else {
                    self.dimension
                };
                if dimension > self.gen.len() {
                    return Err(LatticeError::DimensionMismatch {
                        requested: dimension,
                        available: self.gen.len(),
                    });
                }
                dimension
            }
            _ => self.dimension,
        };
        if dimension == 0 {
            return Err(LatticeError::InvalidConfig("dimension must be positive".into()));
        }
        if dimension > MAX_DIMENSION {
            return Err(LatticeError::DimensionTooLarge {
                dimension,
                max: MAX_DIMENSION,
            });
        }
        Ok(dimension)
    }

    fn search(&self, storage: &Storage, kernel: Arc<dyn Kernel>) -> Result<Box<dyn CbcSearch>> {
        let coord_uniform = self.evaluation == Evaluation::CoordUniform
            && self.norm_type == 2.0
            && self.accumulator == Accumulator::Sum;
        let fast = self.method == Method::FastCbc;
        if coord_uniform {
            let cbc = CoordUniformCbc::new(storage, kernel, &self.weights, fast)?
                .with_parallel(self.parallel);
            return Ok(Box::new(cbc));
        }
        if fast {
            return Err(LatticeError::InvalidConfig(
                "fast CBC needs a coordinate-uniform figure with norm type 2 and a sum".into(),
            ));
        }
        let merit = CoordUniformProjectionMerit::new(kernel, storage)?;
        let figure = WeightedFigure::new(
            Arc::new(self.weights.clone()),
            self.norm_type,
            self.accumulator,
            Box::new(merit),
        );
        Ok(Box::new(Cbc::new(storage, figure)))
    }

    /// Validates the configuration and assembles the search task.
    pub fn build(&self) -> Result<Box<dyn SearchTask>> {
        let size_param = self.size_param()?;
        let dimension = self.target_dimension()?;
        let kernel = kernel::parse(&self.kernel)?;
        let compress = self.compress.unwrap_or_else(|| match size_param.lattice_type() {
            LatticeType::Ordinary => kernel.suggested_compression(),
            LatticeType::Polynomial => Compress::None,
        });
        let storage = Storage::new(size_param, compress, self.order)?;
        debug!(
            size = %size_param,
            compress = %compress,
            order = %storage.order(),
            method = %self.method,
            "configuring search"
        );
        let search = self.search(&storage, kernel)?;
        let filters = FilterChain {
            combiner: self.combiner,
            filters: self.low_pass.into_iter().map(LowPass::new).collect(),
        };
        let values =
            || GeneratingValues::new(size_param.lattice_type(), size_param.modulus(), compress);
        let task: Box<dyn SearchTask> = match self.method {
            Method::Cbc => Box::new(
                CbcTask::new(search, dimension, Candidates::all(&values()?), filters)
                    .with_truncated_sums(self.truncate_sum),
            ),
            Method::FastCbc => {
                let embedded = SizeParam::embedded_from_modulus(
                    size_param.lattice_type(),
                    size_param.modulus(),
                )?;
                let group = CyclicGroup::new(
                    embedded.base(),
                    embedded.max_level(),
                    compress,
                    GroupOrder::Direct,
                )?;
                debug!(generator = group.generator(), size = group.size(), "fast CBC candidates");
                Box::new(CbcTask::new(search, dimension, Candidates::all(&group), filters))
            }
            Method::RandomCbc => Box::new(
                CbcTask::new(
                    search,
                    dimension,
                    Candidates::random(&values()?, self.samples, self.seed),
                    filters,
                )
                .with_truncated_sums(self.truncate_sum),
            ),
            Method::Korobov => Box::new(LatSeqTask::new(
                search,
                LatSeq::Korobov {
                    values: values()?.values(),
                },
                dimension,
                filters,
            )),
            Method::RandomKorobov => Box::new(LatSeqTask::new(
                search,
                LatSeq::random_korobov(&values()?, self.samples, self.seed),
                dimension,
                filters,
            )),
            Method::Exhaustive => Box::new(LatSeqTask::new(
                search,
                LatSeq::Exhaustive {
                    values: values()?.values(),
                },
                dimension,
                filters,
            )),
            Method::Extend => {
                let grain = self.extend_from.ok_or_else(|| {
                    LatticeError::InvalidConfig("`extend` needs `extend-from`".into())
                })?;
                let seq = LatSeq::extend(&size_param, grain, &self.gen[..dimension])?;
                Box::new(LatSeqTask::new(search, seq, dimension, filters))
            }
            Method::Eval => {
                let lat = LatDef::with_gen(size_param, self.gen[..dimension].to_vec());
                Box::new(EvalTask::new(search, lat, filters))
            }
        };
        Ok(task)
    }
}
