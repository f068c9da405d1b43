// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search engine.
//!
//! This module drives CBC searches to a best lattice. The moving parts:
//!
//! - [`MinElement`]: one pass over evaluated candidates, keeping the first
//!   strict minimum of the filtered score. Listeners ([`MinListener`]) see
//!   the start, every visited element, every new minimum and the stop, and
//!   can vote to end the pass early.
//! - [`MinObserver`]: the standard listener. It counts accepted and rejected
//!   candidates, stops at the configured limits, and publishes the best
//!   score as the threshold used to truncate projection sums.
//! - [`Statistics`]: counters for a whole task, one per [`Counters`] entry
//!   and one per rejection reason.
//! - [`SearchTask`]: the unit the binary runs. See [`CbcTask`],
//!   [`EvalTask`] and [`LatSeqTask`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use lattice_search::cbc::CoordUniformCbc;
//! use lattice_search::engine::{Candidates, CbcTask, SearchTask};
//! use lattice_search::genseq::GeneratingValues;
//! use lattice_search::kernel::PAlpha;
//! use lattice_search::merit::FilterChain;
//! use lattice_search::size::{Compress, SizeParam};
//! use lattice_search::storage::Storage;
//! use lattice_search::weights::AnyWeights;
//!
//! let storage = Storage::unilevel(SizeParam::ordinary(101), Compress::Symmetric).unwrap();
//! let kernel = Arc::new(PAlpha::new(2).unwrap());
//! let cbc = CoordUniformCbc::new(&storage, kernel, &AnyWeights::default(), false).unwrap();
//! let values = GeneratingValues::ordinary(101, Compress::Symmetric).unwrap();
//! let mut task = CbcTask::new(Box::new(cbc), 3, Candidates::all(&values), FilterChain::default());
//! task.execute().unwrap();
//! assert_eq!(task.best_lattice().unwrap().dimension(), 3);
//! ```

pub mod min;
pub mod statistics;
pub mod task;

pub use min::{Candidate, Evaluated, MinElement, MinListener, MinObserver, SharedThreshold};
pub use statistics::{Counters, Statistics};
pub use task::{
    CbcTask, Candidates, EvalTask, LatSeq, LatSeqTask, LatticeSelected, SearchTask,
};
