// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Counters kept by a search task. Rejections are counted separately, one
//! counter per [`Rejection`] reason, after the plain counters.

use std::fmt;

use strum::EnumCount;
use strum_macros::EnumCount as EnumCountMacro;

use crate::engine::min::{Candidate, MinListener};
use crate::error::Rejection;

#[derive(Debug, EnumCountMacro, Copy, Clone)]
#[repr(u8)]
pub enum Counters {
    /// Candidates whose merit was computed.
    Visited,
    /// Candidates that passed every filter.
    Accepted,
    MinUpdates,
    DimensionsSelected,
}

const COUNT: usize = Counters::COUNT + Rejection::COUNT;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Statistics {
    stats: [u64; COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    pub fn increment(&mut self, counter: Counters) {
        self.stats[counter as usize] += 1;
    }

    pub fn reject(&mut self, rejection: Rejection) {
        self.stats[Counters::COUNT + rejection as usize] += 1;
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize]
    }

    pub fn rejected(&self, rejection: Rejection) -> u64 {
        self.stats[Counters::COUNT + rejection as usize]
    }

    pub fn total_rejected(&self) -> u64 {
        self.stats[Counters::COUNT..].iter().sum()
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "visited={} accepted={} min-updates={} dimensions={} rejected={} \
             (filtered={} aborted={} non-finite={})",
            self.get(Counters::Visited),
            self.get(Counters::Accepted),
            self.get(Counters::MinUpdates),
            self.get(Counters::DimensionsSelected),
            self.total_rejected(),
            self.rejected(Rejection::Filtered),
            self.rejected(Rejection::Aborted),
            self.rejected(Rejection::NonFinite),
        )
    }
}

impl<T> MinListener<T> for Statistics {
    fn on_element_visited(&mut self, _item: &T, outcome: &Result<f64, Rejection>) -> bool {
        self.increment(Counters::Visited);
        match outcome {
            Ok(_) => self.increment(Counters::Accepted),
            Err(rejection) => self.reject(*rejection),
        }
        true
    }

    fn on_min_updated(&mut self, _best: &Candidate<T>) {
        self.increment(Counters::MinUpdates);
    }
}
