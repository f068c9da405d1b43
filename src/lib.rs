// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Component-by-component search for rank-1 lattice rules.
//!
//! A rank-1 lattice rule with `n` points and generating vector
//! `(a_1, .., a_s)` uses the points `x_i = (i a_j / n mod 1)_j`. The search
//! picks the `a_j` one at a time, each minimising a weighted figure of merit
//! given the coordinates already chosen.
//!
//! # Architecture
//!
//! The implementation separates immutable tables from mutable search state.
//!
//! ## Tables (immutable, shared)
//!
//! - [`size`]: lattice type, number of points, embedding levels.
//! - [`genseq`]: the generating values, in CRT or cyclic-group order.
//! - [`storage`]: the physical layout of per-point vectors. Symmetric
//!   compression folds `i` and `n - i` together; embedded storages place
//!   each level in its own block, and the CYCLIC order turns every stride
//!   into a cyclic shift within each block.
//! - [`kernel`] and [`weights`]: the ingredients of the figure of merit.
//!
//! ## State (mutable, per search)
//!
//! - [`cbc`]: one coordinate-uniform state per weight family, updated as
//!   each coordinate is selected, and the inner products that turn a state
//!   into candidate merits. The fast path computes all of them at once with
//!   the [`fft`].
//! - [`engine`]: minimum search with observers, statistics, and the tasks
//!   the binary runs, configured through [`config`].
//!
//! # References
//!
//! - Nuyens, D. and Cools, R. (2006). "Fast algorithms for component-by-component
//!   construction of rank-1 lattice rules in shift-invariant reproducing kernel
//!   Hilbert spaces." Mathematics of Computation 75, 903-920.
//! - L'Ecuyer, P. and Munger, D. (2016). "Algorithm 958: Lattice Builder: A General
//!   Software Tool for Constructing Rank-1 Lattice Rules." ACM TOMS 42(2).

pub mod arith;
pub mod cbc;
pub mod config;
pub mod engine;
pub mod error;
pub mod fft;
pub mod genseq;
pub mod kernel;
pub mod merit;
pub mod size;
pub mod storage;
pub mod weights;

// Re-export commonly used types
pub use cbc::{Cbc, CbcSearch, CoordUniformCbc};
pub use config::SearchConfig;
pub use engine::{SearchTask, Statistics};
pub use error::{LatticeError, Rejection, Result};
pub use merit::MeritValue;
pub use size::{Compress, LatDef, LatticeType, SizeParam};
pub use storage::{PerLevelOrder, Storage};
