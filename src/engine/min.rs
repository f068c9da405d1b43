// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search for the minimum of a merit sequence.
//!
//! [`MinElement`] walks a sequence of evaluated candidates once, passing each
//! merit through a [`FilterChain`], and keeps the first candidate with the
//! smallest accepted score. Listeners see every step and may vote to stop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{Rejection, Result};
use crate::merit::{FilterChain, MeritValue};

/// An accepted candidate with its merit and filtered score.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<T> {
    pub item: T,
    pub merit: MeritValue,
    pub score: f64,
}

/// Callbacks fired by [`MinElement::find`].
pub trait MinListener<T> {
    fn on_start(&mut self) {}

    /// Returns `false` to stop after this element.
    fn on_element_visited(
        &mut self,
        _item: &T,
        _outcome: &std::result::Result<f64, Rejection>,
    ) -> bool {
        true
    }

    fn on_min_updated(&mut self, _best: &Candidate<T>) {}

    fn on_stop(&mut self) {}
}

/// A merit rejected before filtering, or the merit itself.
pub type Evaluated = std::result::Result<MeritValue, Rejection>;

pub struct MinElement<'a, T> {
    listeners: Vec<&'a mut dyn MinListener<T>>,
}

impl<'a, T: Clone> MinElement<'a, T> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn listen(mut self, listener: &'a mut dyn MinListener<T>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// First candidate with the strictly smallest score, or `None` if every
    /// candidate was rejected. Errors from the sequence abort the search.
    pub fn find(
        &mut self,
        items: impl IntoIterator<Item = Result<(T, Evaluated)>>,
        filters: &FilterChain,
    ) -> Result<Option<Candidate<T>>> {
        for l in self.listeners.iter_mut() {
            l.on_start();
        }
        let mut best: Option<Candidate<T>> = None;
        for item in items {
            let (item, evaluated) = item?;
            let outcome = evaluated.and_then(|m| filters.apply(&m).map(|score| (m, score)));
            let score = outcome.as_ref().map(|(_, s)| *s).map_err(|r| *r);
            let mut keep_going = true;
            for l in self.listeners.iter_mut() {
                keep_going &= l.on_element_visited(&item, &score);
            }
            if let Ok((merit, score)) = outcome {
                if best.as_ref().map_or(true, |b| score < b.score) {
                    let candidate = Candidate { item, merit, score };
                    for l in self.listeners.iter_mut() {
                        l.on_min_updated(&candidate);
                    }
                    best = Some(candidate);
                }
            }
            if !keep_going {
                break;
            }
        }
        for l in self.listeners.iter_mut() {
            l.on_stop();
        }
        Ok(best)
    }
}

impl<T: Clone> Default for MinElement<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A threshold shared between a [`MinObserver`] and the progress observers
/// of a figure, stored as the bits of an `f64`.
#[derive(Debug, Clone)]
pub struct SharedThreshold(Arc<AtomicU64>);

impl SharedThreshold {
    pub fn new(x: f64) -> Self {
        Self(Arc::new(AtomicU64::new(x.to_bits())))
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, x: f64) {
        self.0.store(x.to_bits(), Ordering::Relaxed);
    }
}

/// Counts visited candidates, stops at the configured limits and publishes
/// the best score so far as a truncation threshold.
#[derive(Debug, Clone)]
pub struct MinObserver {
    accepted: usize,
    rejected: usize,
    total: usize,
    max_accepted: Option<usize>,
    max_total: Option<usize>,
    threshold: SharedThreshold,
}

impl MinObserver {
    pub fn new(max_accepted: Option<usize>, max_total: Option<usize>) -> Self {
        Self::with_threshold(max_accepted, max_total, SharedThreshold::new(f64::INFINITY))
    }

    /// An observer publishing its best score to `threshold`.
    pub fn with_threshold(
        max_accepted: Option<usize>,
        max_total: Option<usize>,
        threshold: SharedThreshold,
    ) -> Self {
        Self {
            accepted: 0,
            rejected: 0,
            total: 0,
            max_accepted,
            max_total,
            threshold,
        }
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn threshold(&self) -> &SharedThreshold {
        &self.threshold
    }
}

impl<T> MinListener<T> for MinObserver {
    fn on_start(&mut self) {
        self.accepted = 0;
        self.rejected = 0;
        self.total = 0;
        self.threshold.set(f64::INFINITY);
    }

    fn on_element_visited(
        &mut self,
        _item: &T,
        outcome: &std::result::Result<f64, Rejection>,
    ) -> bool {
        self.total += 1;
        match outcome {
            Ok(_) => self.accepted += 1,
            Err(_) => self.rejected += 1,
        }
        let accepted_done = self.max_accepted.is_some_and(|m| self.accepted >= m);
        let total_done = self.max_total.is_some_and(|m| self.total >= m);
        !(accepted_done || total_done)
    }

    fn on_min_updated(&mut self, best: &Candidate<T>) {
        self.threshold.set(best.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merit::{Combiner, LowPass};

    fn items(values: &[f64]) -> Vec<Result<(usize, Evaluated)>> {
        values
            .iter()
            .enumerate()
            .map(|(i, &x)| Ok((i, Ok(MeritValue::Scalar(x)))))
            .collect()
    }

    #[test]
    fn test_first_minimum_wins_ties() {
        let best = MinElement::new()
            .find(items(&[3.0, 1.0, 2.0, 1.0]), &FilterChain::default())
            .unwrap()
            .unwrap();
        assert_eq!(best.item, 1);
        assert_eq!(best.score, 1.0);
    }

    #[test]
    fn test_all_rejected() {
        let filters = FilterChain {
            combiner: Combiner::Max,
            filters: vec![LowPass::new(0.5)],
        };
        let mut observer = MinObserver::new(None, None);
        let best = MinElement::new()
            .listen(&mut observer)
            .find(items(&[3.0, 1.0]), &filters)
            .unwrap();
        assert!(best.is_none());
        assert_eq!(observer.rejected(), 2);
        assert_eq!(observer.accepted(), 0);
    }

    #[test]
    fn test_observer_limits_and_threshold() {
        let mut observer = MinObserver::new(Some(2), None);
        let best = MinElement::new()
            .listen(&mut observer)
            .find(items(&[3.0, 1.0, 0.5]), &FilterChain::default())
            .unwrap()
            .unwrap();
        assert_eq!(best.item, 1);
        assert_eq!(observer.total(), 2);
        assert_eq!(observer.threshold().get(), 1.0);
    }
}
