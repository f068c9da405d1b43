// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Incrementally updated CBC states of coordinate-uniform figures.
//!
//! After coordinates `0..d` have been chosen, each state holds per-point
//! vectors from which the weighted sum over all projections `u ∪ {d}` can be
//! read in a single pass: [`CoordUniformState::weighted_state`]. Choosing
//! coordinate `d` folds its strided kernel values into the state:
//! [`CoordUniformState::update`].

use std::collections::HashMap;

use crate::error::{LatticeError, Result};
use crate::storage::Storage;
use crate::weights::{
    AnyWeights, OrderDependentWeights, PodWeights, ProductWeights, Projection,
    ProjectionDependentWeights,
};

#[derive(Debug, Clone)]
enum Kind {
    /// `prod_{j<d} (1 + gamma_j w_j)`.
    Product {
        weights: ProductWeights,
        state: Vec<f64>,
    },
    /// `state[k]`: sum over `k`-subsets of the chosen coordinates.
    OrderDependent {
        weights: OrderDependentWeights,
        state: Vec<Vec<f64>>,
    },
    /// As order-dependent, with each coordinate scaled by its product weight.
    Pod {
        weights: PodWeights,
        state: Vec<Vec<f64>>,
    },
    /// One vector per projection, created on demand.
    ProjectionDependent {
        weights: ProjectionDependentWeights,
        state: HashMap<Projection, Vec<f64>>,
        gen: Vec<u64>,
    },
}

/// CBC state for one weight family, laid out in one storage.
#[derive(Debug, Clone)]
pub struct CoordUniformState {
    storage: Storage,
    dimension: usize,
    kind: Kind,
}

impl CoordUniformState {
    /// One state per weight component; combined weights yield several.
    pub fn for_weights(weights: &AnyWeights, storage: &Storage) -> Vec<Self> {
        weights
            .components()
            .into_iter()
            .filter_map(|w| {
                let kind = match w {
                    AnyWeights::Product(w) => Kind::Product {
                        weights: w.clone(),
                        state: Vec::new(),
                    },
                    AnyWeights::OrderDependent(w) => Kind::OrderDependent {
                        weights: w.clone(),
                        state: Vec::new(),
                    },
                    AnyWeights::Pod(w) => Kind::Pod {
                        weights: w.clone(),
                        state: Vec::new(),
                    },
                    AnyWeights::ProjectionDependent { weights } => Kind::ProjectionDependent {
                        weights: weights.clone(),
                        state: HashMap::new(),
                        gen: Vec::new(),
                    },
                    AnyWeights::Combined { .. } => return None,
                };
                let mut state = Self {
                    storage: storage.clone(),
                    dimension: 0,
                    kind,
                };
                state.reset();
                Some(state)
            })
            .collect()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn reset(&mut self) {
        self.dimension = 0;
        let ones = vec![1.0; self.storage.size()];
        match &mut self.kind {
            Kind::Product { state, .. } => *state = ones,
            Kind::OrderDependent { state, .. } | Kind::Pod { state, .. } => *state = vec![ones],
            Kind::ProjectionDependent { state, gen, .. } => {
                state.clear();
                state.insert(Projection::new(), ones);
                gen.clear();
            }
        }
    }

    /// Folds the chosen value `a` of the next coordinate into the state.
    pub fn update(&mut self, kernel_values: &[f64], a: u64) -> Result<()> {
        let strided = self.storage.strided(kernel_values, a)?;
        let new_coordinate = self.dimension;
        self.dimension += 1;
        let size = self.storage.size();
        match &mut self.kind {
            Kind::Product { weights, state } => {
                let w = weights.weight_for_coordinate(new_coordinate);
                for (s, k) in state.iter_mut().zip(&strided) {
                    *s *= 1.0 + w * k;
                }
            }
            Kind::OrderDependent { state, .. } => fold_orders(state, &strided, 1.0, size),
            Kind::Pod { weights, state } => {
                let w = weights.product.weight_for_coordinate(new_coordinate);
                fold_orders(state, &strided, w, size);
            }
            Kind::ProjectionDependent {
                weights,
                state,
                gen,
            } => {
                gen.push(a);
                let next = self.dimension;
                let bases: Vec<Projection> = weights
                    .weights_for_largest_index(next)
                    .map(|(p, _)| p.without_largest())
                    .collect();
                for base in bases {
                    create_projection_state(state, &self.storage, kernel_values, gen, &base)?;
                }
            }
        }
        Ok(())
    }

    /// Weighted sum, over projections ending at the next coordinate, of the
    /// state vectors of their remaining coordinates.
    pub fn weighted_state(&self) -> Result<Vec<f64>> {
        let size = self.storage.size();
        let next = self.dimension;
        let mut out = vec![0.0; size];
        match &self.kind {
            Kind::Product { weights, state } => {
                let w = weights.weight_for_coordinate(next);
                for (o, s) in out.iter_mut().zip(state) {
                    *o = w * s;
                }
            }
            Kind::OrderDependent { weights, state } => {
                add_orders(&mut out, state, |order| weights.weight_for_order(order), 1.0)
            }
            Kind::Pod { weights, state } => add_orders(
                &mut out,
                state,
                |order| weights.order.weight_for_order(order),
                weights.product.weight_for_coordinate(next),
            ),
            Kind::ProjectionDependent { weights, state, .. } => {
                for (p, w) in weights.weights_for_largest_index(next) {
                    let base = p.without_largest();
                    let v = state.get(&base).ok_or_else(|| {
                        LatticeError::InvalidConfig(format!(
                            "no CBC state for projection {} at dimension {}",
                            base, next
                        ))
                    })?;
                    for (o, s) in out.iter_mut().zip(v) {
                        *o += w * s;
                    }
                }
            }
        }
        Ok(out)
    }
}

/// `state[k] += w * strided * state[k-1]`, highest order first.
fn fold_orders(state: &mut Vec<Vec<f64>>, strided: &[f64], w: f64, size: usize) {
    state.push(vec![0.0; size]);
    for order in (1..state.len()).rev() {
        let (lower, upper) = state.split_at_mut(order);
        let prev = &lower[order - 1];
        for ((s, k), p) in upper[0].iter_mut().zip(strided).zip(prev) {
            *s += w * k * p;
        }
    }
}

/// `out += scale * sum_k Gamma_{k+1} state[k]`, skipping zero weights.
fn add_orders(out: &mut [f64], state: &[Vec<f64>], gamma: impl Fn(usize) -> f64, scale: f64) {
    for (order, s) in state.iter().enumerate() {
        let w = gamma(order + 1);
        if w == 0.0 {
            continue;
        }
        for (o, x) in out.iter_mut().zip(s) {
            *o += scale * w * x;
        }
    }
}

fn create_projection_state(
    state: &mut HashMap<Projection, Vec<f64>>,
    storage: &Storage,
    kernel_values: &[f64],
    gen: &[u64],
    projection: &Projection,
) -> Result<()> {
    if state.contains_key(projection) {
        return Ok(());
    }
    let Some(largest) = projection.largest() else {
        state.insert(Projection::new(), vec![1.0; storage.size()]);
        return Ok(());
    };
    let base = projection.without_largest();
    create_projection_state(state, storage, kernel_values, gen, &base)?;
    let a = *gen.get(largest).ok_or(LatticeError::NoSuchProjection {
        coordinate: largest,
        dimension: gen.len(),
    })?;
    let strided = storage.strided(kernel_values, a)?;
    let base_state = state.get(&base).ok_or(LatticeError::EmptyProjection)?;
    let v = strided.iter().zip(base_state).map(|(k, b)| k * b).collect();
    state.insert(projection.clone(), v);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::{Compress, SizeParam};

    fn storage() -> Storage {
        Storage::unilevel(SizeParam::ordinary(7), Compress::None).unwrap()
    }

    fn kernel() -> Vec<f64> {
        (0..7).map(|i| 0.1 * i as f64 - 0.2).collect()
    }

    #[test]
    fn test_product_state() {
        let weights = AnyWeights::Product(ProductWeights::uniform(0.5));
        let mut states = CoordUniformState::for_weights(&weights, &storage());
        let state = &mut states[0];
        assert_eq!(state.weighted_state().unwrap(), vec![0.5; 7]);
        state.update(&kernel(), 3).unwrap();
        let strided = storage().strided(&kernel(), 3).unwrap();
        let ws = state.weighted_state().unwrap();
        for i in 0..7 {
            assert!((ws[i] - 0.5 * (1.0 + 0.5 * strided[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn test_order_dependent_matches_product_when_uniform() {
        // Gamma_k = 1 for all k equals product weights gamma_j = 1
        let s = storage();
        let mut od = CoordUniformState::for_weights(
            &AnyWeights::OrderDependent(OrderDependentWeights::uniform(1.0)),
            &s,
        );
        let mut pw =
            CoordUniformState::for_weights(&AnyWeights::Product(ProductWeights::uniform(1.0)), &s);
        for a in [1, 3, 5] {
            od[0].update(&kernel(), a).unwrap();
            pw[0].update(&kernel(), a).unwrap();
            let x = od[0].weighted_state().unwrap();
            let y = pw[0].weighted_state().unwrap();
            for (p, q) in x.iter().zip(&y) {
                assert!((p - q).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_projection_dependent_state() {
        let s = storage();
        let mut weights = ProjectionDependentWeights::default();
        weights.set([0, 2].into_iter().collect(), 2.0);
        weights.set([2].into_iter().collect(), 1.0);
        let mut states = CoordUniformState::for_weights(
            &AnyWeights::ProjectionDependent { weights },
            &s,
        );
        let state = &mut states[0];
        state.update(&kernel(), 1).unwrap();
        state.update(&kernel(), 2).unwrap();
        // next coordinate is 2: 2 * w(x_0) + 1
        let strided = s.strided(&kernel(), 1).unwrap();
        let ws = state.weighted_state().unwrap();
        for i in 0..7 {
            assert!((ws[i] - (2.0 * strided[i] + 1.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_combined_weights_yield_one_state_each() {
        let weights = AnyWeights::Combined {
            components: vec![
                AnyWeights::Product(ProductWeights::uniform(1.0)),
                AnyWeights::Pod(PodWeights::default()),
            ],
        };
        assert_eq!(CoordUniformState::for_weights(&weights, &storage()).len(), 2);
    }
}
