// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Merit filters and multilevel combiners.
//!
//! A search may reduce a multilevel merit to a scalar with a [`Combiner`],
//! then pass it through a list of [`LowPass`] filters. A filter either lets
//! the value through or rejects the candidate.

use serde::{Deserialize, Serialize};

use crate::error::Rejection;
use crate::merit::MeritValue;

/// Reduction of a per-level merit vector to one real.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Combiner {
    /// Sum over levels.
    Sum,
    /// Maximum over levels.
    #[default]
    Max,
    /// The value at one level.
    Level { level: usize },
}

impl Combiner {
    pub fn combine(&self, merit: &MeritValue) -> f64 {
        match merit {
            MeritValue::Scalar(x) => *x,
            MeritValue::Levels(v) => match self {
                Combiner::Sum => v.iter().sum(),
                Combiner::Max => v.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                Combiner::Level { level } => v.get(*level).copied().unwrap_or(f64::INFINITY),
            },
        }
    }
}

/// Rejects merit values above a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPass {
    threshold: f64,
}

impl LowPass {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }

    pub fn apply(&self, merit: f64) -> Result<f64, Rejection> {
        if merit > self.threshold {
            Err(Rejection::Filtered)
        } else {
            Ok(merit)
        }
    }
}

/// A combiner followed by filters.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    pub combiner: Combiner,
    pub filters: Vec<LowPass>,
}

impl FilterChain {
    /// Scalar merit, or the reason the candidate is rejected.
    pub fn apply(&self, merit: &MeritValue) -> Result<f64, Rejection> {
        if !merit.is_finite() {
            return Err(Rejection::NonFinite);
        }
        let scalar = self.combiner.combine(merit);
        self.filters.iter().try_fold(scalar, |x, f| f.apply(x))
    }
}
