// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Figures of merit and their values.
//!
//! - [`MeritValue`]: scalar or per-level merit.
//! - [`WeightedFigure`]: the generic projection-by-projection figure, with
//!   progress observers that can abandon a candidate early.
//! - [`Combiner`], [`LowPass`], [`FilterChain`]: reduction of multilevel
//!   values and rejection of poor candidates.

pub mod figure;
pub mod filter;
pub mod value;

pub use figure::{
    Accumulator, CoordUniformProjectionMerit, ProgressObservers, ProjectionMerit, WeightedFigure,
};
pub use filter::{Combiner, FilterChain, LowPass};
pub use value::MeritValue;
