// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use crate::cbc::{CbcSearch, MeritSeq};
use crate::error::{LatticeError, Result};
use crate::merit::{MeritValue, ProgressObservers, WeightedFigure};
use crate::size::LatDef;
use crate::storage::Storage;
use crate::weights::{Projection, MAX_DIMENSION};

/// CBC for any weighted figure.
///
/// Extending the base lattice by coordinate `d` adds the terms of the
/// projections `u ∪ {d}` for every `u ⊆ {0, .., d-1}` to the base merit.
/// Each candidate is evaluated when the sequence reaches it, so observers
/// can abandon it part way.
#[derive(Debug)]
pub struct Cbc {
    storage: Storage,
    figure: WeightedFigure,
    base_lat: LatDef,
    base_merit: MeritValue,
    observers: ProgressObservers,
}

impl Cbc {
    pub fn new(storage: &Storage, figure: WeightedFigure) -> Self {
        Self {
            storage: storage.clone(),
            figure,
            base_lat: LatDef::new(*storage.size_param()),
            base_merit: storage.create_merit_value(0.0),
            observers: ProgressObservers::default(),
        }
    }

    pub fn figure(&self) -> &WeightedFigure {
        &self.figure
    }
}

impl CbcSearch for Cbc {
    fn name(&self) -> String {
        format!("CBC of {}", self.figure.name())
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
        let d = self.base_lat.dimension();
        if d >= MAX_DIMENSION {
            return Err(LatticeError::DimensionTooLarge {
                dimension: d + 1,
                max: MAX_DIMENSION,
            });
        }
        let Self {
            storage,
            figure,
            base_lat,
            base_merit,
            observers,
        } = self;
        Ok(Box::new(candidates.iter().map(move |&a| {
            let lat = base_lat.extended(a);
            let projections = Projection::subsets(d).map(|u| u.with(d));
            figure.evaluate(storage, &lat, projections, base_merit.clone(), observers)
        })))
    }

    fn select(&mut self, gen: u64, merit: MeritValue) -> Result<()> {
        self.base_lat = self.base_lat.extended(gen);
        self.base_merit = merit;
        Ok(())
    }

    fn reset(&mut self) {
        self.base_lat = LatDef::new(*self.storage.size_param());
        self.base_merit = self.storage.create_merit_value(0.0);
    }

    fn observers_mut(&mut self) -> Option<&mut ProgressObservers> {
        Some(&mut self.observers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cbc::CoordUniformCbc;
    use crate::kernel::{Kernel, PAlpha};
    use crate::merit::{Accumulator, CoordUniformProjectionMerit};
    use crate::size::{Compress, SizeParam};
    use crate::weights::{AnyWeights, OrderDependentWeights};
    use std::sync::Arc;

    #[test]
    fn test_generic_matches_coordinate_uniform() {
        let storage = Storage::unilevel(SizeParam::ordinary(23), Compress::Symmetric).unwrap();
        let kernel: Arc<dyn Kernel> = Arc::new(PAlpha::new(2).unwrap());
        let mut od = OrderDependentWeights::uniform(0.0);
        od.orders.set(1, 1.0);
        od.orders.set(2, 0.5);
        od.orders.set(3, 0.25);
        let weights = AnyWeights::OrderDependent(od);
        let merit = CoordUniformProjectionMerit::new(kernel.clone(), &storage).unwrap();
        let figure = WeightedFigure::new(
            Arc::new(weights.clone()),
            2.0,
            Accumulator::Sum,
            Box::new(merit),
        );
        let mut generic = Cbc::new(&storage, figure);
        let mut cu = CoordUniformCbc::new(&storage, kernel, &weights, false).unwrap();
        let lat = LatDef::with_gen(*storage.size_param(), vec![1, 5, 9]);
        let a = generic.evaluate(&lat).unwrap().last();
        let b = cu.evaluate(&lat).unwrap().last();
        assert!((a - b).abs() < 1e-12 * a.abs());
    }

    #[test]
    fn test_dimension_limit() {
        let storage = Storage::unilevel(SizeParam::ordinary(7), Compress::Symmetric).unwrap();
        let kernel: Arc<dyn Kernel> = Arc::new(PAlpha::new(2).unwrap());
        let weights = AnyWeights::OrderDependent(OrderDependentWeights::uniform(0.5));
        let merit = CoordUniformProjectionMerit::new(kernel, &storage).unwrap();
        let figure = WeightedFigure::new(Arc::new(weights), 2.0, Accumulator::Sum, Box::new(merit));
        let mut generic = Cbc::new(&storage, figure);
        for _ in 0..MAX_DIMENSION {
            generic.select(1, storage.create_merit_value(0.0)).unwrap();
        }
        assert_eq!(generic.base_lat().dimension(), 63);
        assert_eq!(
            generic.merit_seq(&[1]).err(),
            Some(LatticeError::DimensionTooLarge {
                dimension: 64,
                max: 63
            })
        );
    }
}
