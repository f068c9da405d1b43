// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Component-by-component construction.
//!
//! A CBC search holds a base lattice of dimension `d` and its merit. For a
//! list of candidate values it yields the merit of each extension to
//! dimension `d + 1`; selecting one makes it the new base.
//!
//! - [`CoordUniformCbc`]: coordinate-uniform figures, with incrementally
//!   updated states and either the direct or the FFT inner product.
//! - [`Cbc`]: any [`WeightedFigure`](crate::merit::WeightedFigure),
//!   evaluated projection by projection.

pub mod coord;
pub mod fast;
pub mod generic;
pub mod state;

pub use coord::{CoordUniformCbc, InnerProduct};
pub use fast::{DirectInnerProduct, FastInnerProduct};
pub use generic::Cbc;
pub use state::CoordUniformState;

use crate::error::{LatticeError, Result};
use crate::merit::{MeritValue, ProgressObservers};
use crate::size::LatDef;
use crate::storage::Storage;

/// Lazily evaluated merits of candidate extensions, in candidate order.
pub type MeritSeq<'a> = Box<dyn Iterator<Item = Result<MeritValue>> + 'a>;

pub trait CbcSearch: Send {
    fn name(&self) -> String;

    fn storage(&self) -> &Storage;

    fn base_lat(&self) -> &LatDef;

    fn base_merit(&self) -> &MeritValue;

    /// Merits of `base_lat` extended by each of `candidates`.
    fn merit_seq<'a>(&'a mut self, candidates: &'a [u64]) -> Result<MeritSeq<'a>>;

    /// Makes `base_lat` extended by `gen` the new base, with merit `merit`.
    fn select(&mut self, gen: u64, merit: MeritValue) -> Result<()>;

    /// Back to dimension 0.
    fn reset(&mut self);

    /// Observers of partial merits, for searches that support early abort.
    fn observers_mut(&mut self) -> Option<&mut ProgressObservers> {
        None
    }

    /// Merit of `lat`, rebuilt one coordinate at a time from dimension 0.
    fn evaluate(&mut self, lat: &LatDef) -> Result<MeritValue> {
        check_size_param(self.storage(), lat)?;
        self.reset();
        for &a in lat.gen() {
            let merit = {
                let candidates = [a];
                let mut seq = self.merit_seq(&candidates)?;
                let first = seq.next();
                first.unwrap_or_else(|| {
                    Err(LatticeError::InvalidConfig("empty merit sequence".into()))
                })?
            };
            self.select(a, merit)?;
        }
        Ok(self.base_merit().clone())
    }
}

pub(crate) fn check_size_param(storage: &Storage, lat: &LatDef) -> Result<()> {
    if storage.matches(lat.size_param()) {
        Ok(())
    } else {
        Err(LatticeError::SizeParamMismatch {
            storage: storage.size_param().to_string(),
            lattice: lat.size_param().to_string(),
        })
    }
}
