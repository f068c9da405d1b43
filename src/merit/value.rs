// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::Serialize;

/// A figure-of-merit value: one real for a unilevel point set, one real per
/// level for an embedded point set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeritValue {
    Scalar(f64),
    Levels(Vec<f64>),
}

impl MeritValue {
    /// A value with every component equal to `x`, shaped like `self`.
    pub fn filled_like(&self, x: f64) -> Self {
        match self {
            MeritValue::Scalar(_) => MeritValue::Scalar(x),
            MeritValue::Levels(v) => MeritValue::Levels(vec![x; v.len()]),
        }
    }

    pub fn components(&self) -> &[f64] {
        match self {
            MeritValue::Scalar(x) => std::slice::from_ref(x),
            MeritValue::Levels(v) => v,
        }
    }

    pub fn components_mut(&mut self) -> &mut [f64] {
        match self {
            MeritValue::Scalar(x) => std::slice::from_mut(x),
            MeritValue::Levels(v) => v,
        }
    }

    /// Value of the highest level, or the scalar itself.
    pub fn last(&self) -> f64 {
        self.components().last().copied().unwrap_or(f64::INFINITY)
    }

    pub fn is_finite(&self) -> bool {
        self.components().iter().all(|x| x.is_finite())
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            MeritValue::Scalar(x) => MeritValue::Scalar(f(*x)),
            MeritValue::Levels(v) => MeritValue::Levels(v.iter().map(|x| f(*x)).collect()),
        }
    }

    /// Componentwise maximum.
    pub fn max(&self, other: &MeritValue) -> Self {
        let mut out = self.clone();
        for (a, b) in out.components_mut().iter_mut().zip(other.components()) {
            *a = a.max(*b);
        }
        out
    }
}

impl AddAssign<&MeritValue> for MeritValue {
    fn add_assign(&mut self, other: &MeritValue) {
        if let (MeritValue::Scalar(a), MeritValue::Levels(b)) = (&*self, other) {
            let a = *a;
            *self = MeritValue::Levels(b.iter().map(|x| x + a).collect());
            return;
        }
        let rhs = other.components();
        let single = rhs.len() == 1;
        for (i, a) in self.components_mut().iter_mut().enumerate() {
            *a += if single { rhs[0] } else { rhs.get(i).copied().unwrap_or(0.0) };
        }
    }
}

impl Add<&MeritValue> for MeritValue {
    type Output = MeritValue;

    fn add(mut self, other: &MeritValue) -> MeritValue {
        self += other;
        self
    }
}

impl fmt::Display for MeritValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeritValue::Scalar(x) => write!(f, "{}", x),
            MeritValue::Levels(v) => {
                let parts: Vec<String> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}
