// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Projection weights.
//!
//! A weighted figure of merit sums, over projections `u` of the coordinate
//! set, `gamma_u` times the merit of the projected point set. Every family
//! here can answer [`Weights::weight`] for an arbitrary projection. The CBC
//! engine additionally relies on each family's structure to keep one
//! incrementally updated state per family: see `cbc::state`.
//!
//! | family | `gamma_u` |
//! |---|---|
//! | product | `prod_{j in u} gamma_j` |
//! | order-dependent | `Gamma_|u|` |
//! | POD | `Gamma_|u| prod_{j in u} gamma_j` |
//! | projection-dependent | explicit table, 0 elsewhere |
//! | combined | sum of the components |

pub mod projection;

pub use projection::{Projection, MAX_DIMENSION};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Weight of each projection.
pub trait Weights: fmt::Debug + Send + Sync {
    fn weight(&self, projection: &Projection) -> f64;
}

/// A value for each index, with a default past the explicit ones.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexedWeights {
    #[serde(default)]
    pub default: f64,
    #[serde(default)]
    pub values: Vec<f64>,
}

impl IndexedWeights {
    pub fn uniform(default: f64) -> Self {
        Self {
            default,
            values: Vec::new(),
        }
    }

    pub fn get(&self, i: usize) -> f64 {
        self.values.get(i).copied().unwrap_or(self.default)
    }

    pub fn set(&mut self, i: usize, w: f64) {
        if self.values.len() <= i {
            self.values.resize(i + 1, self.default);
        }
        self.values[i] = w;
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductWeights {
    /// Indexed by coordinate.
    #[serde(flatten)]
    pub coordinates: IndexedWeights,
}

impl ProductWeights {
    pub fn uniform(default: f64) -> Self {
        Self {
            coordinates: IndexedWeights::uniform(default),
        }
    }

    pub fn weight_for_coordinate(&self, j: usize) -> f64 {
        self.coordinates.get(j)
    }
}

impl Weights for ProductWeights {
    fn weight(&self, projection: &Projection) -> f64 {
        projection
            .iter()
            .map(|j| self.weight_for_coordinate(j))
            .product()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderDependentWeights {
    /// Indexed by order; index 0 is the empty projection.
    #[serde(flatten)]
    pub orders: IndexedWeights,
}

impl OrderDependentWeights {
    pub fn uniform(default: f64) -> Self {
        Self {
            orders: IndexedWeights::uniform(default),
        }
    }

    pub fn weight_for_order(&self, order: usize) -> f64 {
        self.orders.get(order)
    }
}

impl Weights for OrderDependentWeights {
    fn weight(&self, projection: &Projection) -> f64 {
        self.weight_for_order(projection.len())
    }
}

/// Product and order-dependent weights multiplied together.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PodWeights {
    pub order: OrderDependentWeights,
    pub product: ProductWeights,
}

impl Weights for PodWeights {
    fn weight(&self, projection: &Projection) -> f64 {
        self.order.weight(projection) * self.product.weight(projection)
    }
}

/// An explicit weight per listed projection; all others weigh 0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ProjectionWeight>", into = "Vec<ProjectionWeight>")]
pub struct ProjectionDependentWeights {
    weights: BTreeMap<Projection, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionWeight {
    pub coordinates: Vec<usize>,
    pub weight: f64,
}

impl From<Vec<ProjectionWeight>> for ProjectionDependentWeights {
    fn from(list: Vec<ProjectionWeight>) -> Self {
        let mut out = Self::default();
        for pw in list {
            out.set(Projection::from_iter(pw.coordinates), pw.weight);
        }
        out
    }
}

impl From<ProjectionDependentWeights> for Vec<ProjectionWeight> {
    fn from(w: ProjectionDependentWeights) -> Self {
        w.weights
            .into_iter()
            .map(|(p, weight)| ProjectionWeight {
                coordinates: p.iter().collect(),
                weight,
            })
            .collect()
    }
}

impl ProjectionDependentWeights {
    pub fn set(&mut self, projection: Projection, weight: f64) {
        if !projection.is_empty() {
            self.weights.insert(projection, weight);
        }
    }

    /// Listed projections whose largest coordinate is `j`.
    pub fn weights_for_largest_index(&self, j: usize) -> impl Iterator<Item = (&Projection, f64)> {
        self.weights
            .iter()
            .filter(move |(p, _)| p.largest() == Some(j))
            .map(|(p, w)| (p, *w))
    }
}

impl Weights for ProjectionDependentWeights {
    fn weight(&self, projection: &Projection) -> f64 {
        self.weights.get(projection).copied().unwrap_or(0.0)
    }
}

/// Any weight family, as read from a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AnyWeights {
    Product(ProductWeights),
    OrderDependent(OrderDependentWeights),
    Pod(PodWeights),
    ProjectionDependent { weights: ProjectionDependentWeights },
    Combined { components: Vec<AnyWeights> },
}

impl Default for AnyWeights {
    fn default() -> Self {
        AnyWeights::Product(ProductWeights::uniform(1.0))
    }
}

impl AnyWeights {
    /// The components of a combination, or `self` alone.
    pub fn components(&self) -> Vec<&AnyWeights> {
        match self {
            AnyWeights::Combined { components } => {
                components.iter().flat_map(|c| c.components()).collect()
            }
            other => vec![other],
        }
    }
}

impl Weights for AnyWeights {
    fn weight(&self, projection: &Projection) -> f64 {
        match self {
            AnyWeights::Product(w) => w.weight(projection),
            AnyWeights::OrderDependent(w) => w.weight(projection),
            AnyWeights::Pod(w) => w.weight(projection),
            AnyWeights::ProjectionDependent { weights } => weights.weight(projection),
            AnyWeights::Combined { components } => {
                components.iter().map(|c| c.weight(projection)).sum()
            }
        }
    }
}
