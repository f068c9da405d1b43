// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search tasks.
//!
//! A task drives a [`CbcSearch`] to a best lattice and keeps statistics:
//!
//! - [`CbcTask`]: one coordinate at a time, over all generating values,
//!   the generator group, or random samples of the generating values.
//! - [`EvalTask`]: the merit of one fixed generating vector.
//! - [`LatSeqTask`]: whole lattices from a [`LatSeq`] family, each
//!   evaluated from scratch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, trace, warn};

use crate::cbc::CbcSearch;
use crate::engine::min::{Candidate, Evaluated, MinElement, MinObserver, SharedThreshold};
use crate::engine::statistics::{Counters, Statistics};
use crate::arith::Gf2Poly;
use crate::error::{LatticeError, Rejection, Result};
use crate::genseq::{GenSeq, RandomTraversal};
use crate::merit::{FilterChain, MeritValue};
use crate::size::{LatDef, LatticeType, SizeParam};

/// Called with each lattice a task selects, and its merit.
pub type LatticeSelected = Box<dyn FnMut(&LatDef, &MeritValue) + Send>;

pub trait SearchTask {
    fn name(&self) -> String;

    fn execute(&mut self) -> Result<()>;

    fn best_lattice(&self) -> Option<&LatDef>;

    fn best_merit(&self) -> Option<&MeritValue>;

    /// Best merit reduced to a scalar by the task's combiner.
    fn best_score(&self) -> Option<f64>;

    fn statistics(&self) -> &Statistics;

    fn on_lattice_selected(&mut self, f: LatticeSelected);
}

/// Where the candidates of each coordinate after the first come from.
#[derive(Debug, Clone)]
pub enum Candidates {
    /// Every value, in order.
    All(Vec<u64>),
    /// Distinct values in random order until `samples` of them are
    /// accepted. The traversal moves to a new stream after each coordinate.
    Random {
        values: Vec<u64>,
        samples: usize,
        traversal: RandomTraversal,
    },
}

impl Candidates {
    pub fn all<S: GenSeq + ?Sized>(seq: &S) -> Self {
        Candidates::All(seq.values())
    }

    pub fn random<S: GenSeq + ?Sized>(seq: &S, samples: usize, seed: u64) -> Self {
        Candidates::Random {
            values: seq.values(),
            samples,
            traversal: RandomTraversal::new(seed),
        }
    }

    fn for_coordinate(&mut self, coordinate: usize) -> Vec<u64> {
        if coordinate == 0 {
            return vec![1];
        }
        match self {
            Candidates::All(values) => values.clone(),
            Candidates::Random {
                values, traversal, ..
            } => {
                let order = traversal.shuffled(values);
                traversal.jump();
                order
            }
        }
    }

    fn max_accepted(&self) -> Option<usize> {
        match self {
            Candidates::All(_) => None,
            Candidates::Random { samples, .. } => Some(*samples),
        }
    }
}

fn selected(
    stats: &mut Statistics,
    callbacks: &mut [LatticeSelected],
    lat: &LatDef,
    merit: &MeritValue,
) {
    stats.increment(Counters::DimensionsSelected);
    for f in callbacks.iter_mut() {
        f(lat, merit);
    }
}

/// Component-by-component construction up to a target dimension.
pub struct CbcTask {
    search: Box<dyn CbcSearch>,
    dimension: usize,
    candidates: Candidates,
    filters: FilterChain,
    truncate: bool,
    threshold: SharedThreshold,
    aborted: Arc<AtomicBool>,
    stats: Statistics,
    best: Option<Candidate<LatDef>>,
    callbacks: Vec<LatticeSelected>,
}

impl CbcTask {
    pub fn new(
        search: Box<dyn CbcSearch>,
        dimension: usize,
        candidates: Candidates,
        filters: FilterChain,
    ) -> Self {
        Self {
            search,
            dimension,
            candidates,
            filters,
            truncate: false,
            threshold: SharedThreshold::new(f64::INFINITY),
            aborted: Arc::new(AtomicBool::new(false)),
            stats: Statistics::new(),
            best: None,
            callbacks: Vec::new(),
        }
    }

    /// Abandons a candidate as soon as its partial sum exceeds the best
    /// merit so far. Only applies to projection-by-projection figures on
    /// unilevel storage, without filters.
    pub fn with_truncated_sums(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    fn install_truncation(&mut self) {
        let applies = self.truncate
            && self.filters.filters.is_empty()
            && !self.search.storage().is_multilevel();
        let Some(observers) = self.search.observers_mut() else {
            return;
        };
        observers.clear();
        if !applies {
            return;
        }
        let threshold = self.threshold.clone();
        observers.on_progress(move |partial| partial.last() <= threshold.get());
        let aborted = self.aborted.clone();
        observers.on_abort(move |_| aborted.store(true, Ordering::Relaxed));
    }

    fn select_coordinate(&mut self, coordinate: usize) -> Result<()> {
        let candidates = self.candidates.for_coordinate(coordinate);
        if candidates.is_empty() {
            warn!(coordinate, "no candidates");
            return Err(LatticeError::NoCandidate {
                dimension: coordinate,
            });
        }
        let mut observer = MinObserver::with_threshold(
            self.candidates.max_accepted(),
            None,
            self.threshold.clone(),
        );
        let aborted = self.aborted.clone();
        let merits = self.search.merit_seq(&candidates)?;
        let items = candidates.iter().zip(merits).map(|(&a, merit)| -> Result<(u64, Evaluated)> {
            let merit = merit?;
            trace!(coordinate, a, %merit, "candidate");
            let evaluated: Evaluated = if aborted.swap(false, Ordering::Relaxed) {
                Err(Rejection::Aborted)
            } else {
                Ok(merit)
            };
            Ok((a, evaluated))
        });
        let best = MinElement::new()
            .listen(&mut observer)
            .listen(&mut self.stats)
            .find(items, &self.filters)?;
        if observer.rejected() > 0 {
            let aborted = self.stats.rejected(Rejection::Aborted);
            warn!(coordinate, rejected = observer.rejected(), aborted, "candidates rejected");
        }
        let Some(best) = best else {
            warn!(coordinate, visited = observer.total(), "every candidate was rejected");
            return Err(LatticeError::NoCandidate {
                dimension: coordinate,
            });
        };
        self.search.select(best.item, best.merit.clone())?;
        let lat = self.search.base_lat().clone();
        info!(coordinate, a = best.item, merit = %best.merit, "selected");
        selected(&mut self.stats, &mut self.callbacks, &lat, &best.merit);
        self.best = Some(Candidate {
            item: lat,
            merit: best.merit,
            score: best.score,
        });
        Ok(())
    }
}

impl SearchTask for CbcTask {
    fn name(&self) -> String {
        match &self.candidates {
            Candidates::All(_) => self.search.name(),
            Candidates::Random { samples, .. } => {
                format!("random {} with {} samples", self.search.name(), samples)
            }
        }
    }

    fn execute(&mut self) -> Result<()> {
        self.search.reset();
        self.best = None;
        self.install_truncation();
        for coordinate in 0..self.dimension {
            self.select_coordinate(coordinate)?;
        }
        Ok(())
    }

    fn best_lattice(&self) -> Option<&LatDef> {
        self.best.as_ref().map(|c| &c.item)
    }

    fn best_merit(&self) -> Option<&MeritValue> {
        self.best.as_ref().map(|c| &c.merit)
    }

    fn best_score(&self) -> Option<f64> {
        self.best.as_ref().map(|c| c.score)
    }

    fn statistics(&self) -> &Statistics {
        &self.stats
    }

    fn on_lattice_selected(&mut self, f: LatticeSelected) {
        self.callbacks.push(f);
    }
}

/// Merit of one given lattice.
pub struct EvalTask {
    search: Box<dyn CbcSearch>,
    lat: LatDef,
    filters: FilterChain,
    stats: Statistics,
    best: Option<Candidate<LatDef>>,
    callbacks: Vec<LatticeSelected>,
}

impl EvalTask {
    pub fn new(search: Box<dyn CbcSearch>, lat: LatDef, filters: FilterChain) -> Self {
        Self {
            search,
            lat,
            filters,
            stats: Statistics::new(),
            best: None,
            callbacks: Vec::new(),
        }
    }
}

impl SearchTask for EvalTask {
    fn name(&self) -> String {
        format!("evaluation of {} with {}", self.lat, self.search.name())
    }

    fn execute(&mut self) -> Result<()> {
        let merit = self.search.evaluate(&self.lat)?;
        self.stats.increment(Counters::Visited);
        let score = self.filters.combiner.combine(&merit);
        info!(lattice = %self.lat, merit = %merit, "evaluated");
        selected(&mut self.stats, &mut self.callbacks, &self.lat, &merit);
        self.best = Some(Candidate {
            item: self.lat.clone(),
            merit,
            score,
        });
        Ok(())
    }

    fn best_lattice(&self) -> Option<&LatDef> {
        self.best.as_ref().map(|c| &c.item)
    }

    fn best_merit(&self) -> Option<&MeritValue> {
        self.best.as_ref().map(|c| &c.merit)
    }

    fn best_score(&self) -> Option<f64> {
        self.best.as_ref().map(|c| c.score)
    }

    fn statistics(&self) -> &Statistics {
        &self.stats
    }

    fn on_lattice_selected(&mut self, f: LatticeSelected) {
        self.callbacks.push(f);
    }
}

/// Families of whole lattices.
#[derive(Debug, Clone)]
pub enum LatSeq {
    /// `(1, a, a^2, ..)` for each value `a`.
    Korobov { values: Vec<u64> },
    /// Korobov lattices for distinct random `a` until `samples` of them are
    /// accepted. The traversal moves to a new stream after each execution.
    RandomKorobov {
        values: Vec<u64>,
        samples: usize,
        traversal: RandomTraversal,
    },
    /// Every vector with first coordinate 1 and the others from `values`.
    Exhaustive { values: Vec<u64> },
    /// Extensions of a base lattice: coordinate `j > 0` runs over
    /// `offset + lows[j]` for each offset, a multiple of the base modulus.
    /// Polynomial lattices add with xor.
    Extend {
        lattice: LatticeType,
        lows: Vec<u64>,
        offsets: Vec<u64>,
    },
}

impl LatSeq {
    pub fn random_korobov<S: GenSeq + ?Sized>(seq: &S, samples: usize, seed: u64) -> Self {
        LatSeq::RandomKorobov {
            values: seq.values(),
            samples,
            traversal: RandomTraversal::new(seed),
        }
    }

    /// Every lattice of `size_param` whose generating vector reduces to
    /// `base` modulo `grain`, the modulus of the base lattice.
    pub fn extend(size_param: &SizeParam, grain: u64, base: &[u64]) -> Result<Self> {
        let lattice = size_param.lattice_type();
        let modulus = size_param.modulus();
        let offsets: Vec<u64> = match lattice {
            LatticeType::Ordinary => {
                if grain == 0 || modulus % grain != 0 {
                    return Err(LatticeError::InvalidConfig(format!(
                        "cannot extend from {} to {} points",
                        grain, modulus
                    )));
                }
                (0..modulus / grain).map(|i| i * grain).collect()
            }
            LatticeType::Polynomial => {
                let (g, n) = (Gf2Poly(grain), Gf2Poly(modulus));
                let (Some(dg), Some(dn)) = (g.degree(), n.degree()) else {
                    return Err(LatticeError::InvalidConfig("zero polynomial modulus".into()));
                };
                if dg > dn || !n.rem(g).is_zero() {
                    return Err(LatticeError::InvalidConfig(format!(
                        "cannot extend from {} to {}",
                        g, n
                    )));
                }
                (0..1u64 << (dn - dg)).map(|i| Gf2Poly(i).mul(g).bits()).collect()
            }
        };
        let reduced = |low: u64| match lattice {
            LatticeType::Ordinary => low < grain,
            LatticeType::Polynomial => Gf2Poly(low).rem(Gf2Poly(grain)).bits() == low,
        };
        if base.first().is_some_and(|&first| first != 1) || !base.iter().all(|&a| reduced(a)) {
            return Err(LatticeError::InvalidConfig(format!(
                "{:?} is not a generating vector modulo {}",
                base, grain
            )));
        }
        Ok(LatSeq::Extend {
            lattice,
            lows: base.to_vec(),
            offsets,
        })
    }

    fn name(&self) -> &'static str {
        match self {
            LatSeq::Korobov { .. } => "Korobov",
            LatSeq::RandomKorobov { .. } => "random Korobov",
            LatSeq::Exhaustive { .. } => "exhaustive",
            LatSeq::Extend { .. } => "extension",
        }
    }

    fn max_accepted(&self) -> Option<usize> {
        match self {
            LatSeq::RandomKorobov { samples, .. } => Some(*samples),
            _ => None,
        }
    }

    fn lattices(
        &mut self,
        template: &LatDef,
        dimension: usize,
    ) -> Box<dyn Iterator<Item = LatDef> + '_> {
        let size_param = *template.size_param();
        match self {
            LatSeq::Korobov { values } => Box::new(
                values
                    .iter()
                    .map(move |&a| LatDef::korobov(size_param, a, dimension)),
            ),
            LatSeq::RandomKorobov {
                values, traversal, ..
            } => {
                let order = traversal.shuffled(values);
                traversal.jump();
                Box::new(
                    order
                        .into_iter()
                        .map(move |a| LatDef::korobov(size_param, a, dimension)),
                )
            }
            LatSeq::Exhaustive { values } => Box::new(
                Odometer::new(values.len(), dimension.saturating_sub(1)).map(move |digits| {
                    let gen = std::iter::once(1)
                        .chain(digits.iter().map(|&d| values[d]))
                        .take(dimension)
                        .collect();
                    LatDef::with_gen(size_param, gen)
                }),
            ),
            LatSeq::Extend {
                lattice,
                lows,
                offsets,
            } => {
                let lattice = *lattice;
                let (lows, offsets) = (&*lows, &*offsets);
                let len = dimension.min(lows.len()).saturating_sub(1);
                Box::new(Odometer::new(offsets.len(), len).map(move |digits| {
                    let rest = digits
                        .iter()
                        .zip(lows.iter().skip(1))
                        .map(|(&d, &low)| match lattice {
                            LatticeType::Ordinary => offsets[d] + low,
                            LatticeType::Polynomial => offsets[d] ^ low,
                        });
                    let gen = std::iter::once(1).chain(rest).take(dimension).collect();
                    LatDef::with_gen(size_param, gen)
                }))
            }
        }
    }
}

/// All digit vectors of a fixed length in a fixed radix, last digit fastest.
#[derive(Debug)]
struct Odometer {
    radix: usize,
    digits: Option<Vec<usize>>,
}

impl Odometer {
    fn new(radix: usize, len: usize) -> Self {
        let digits = (radix > 0 || len == 0).then(|| vec![0; len]);
        Self { radix, digits }
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.digits.clone()?;
        let digits = self.digits.as_mut()?;
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            *d += 1;
            if *d < self.radix {
                carry = false;
                break;
            }
            *d = 0;
        }
        if carry {
            self.digits = None;
        }
        Some(current)
    }
}

/// Best lattice of a [`LatSeq`] family.
pub struct LatSeqTask {
    search: Box<dyn CbcSearch>,
    seq: LatSeq,
    dimension: usize,
    filters: FilterChain,
    stats: Statistics,
    best: Option<Candidate<LatDef>>,
    callbacks: Vec<LatticeSelected>,
}

impl LatSeqTask {
    pub fn new(
        search: Box<dyn CbcSearch>,
        seq: LatSeq,
        dimension: usize,
        filters: FilterChain,
    ) -> Self {
        Self {
            search,
            seq,
            dimension,
            filters,
            stats: Statistics::new(),
            best: None,
            callbacks: Vec::new(),
        }
    }
}

impl SearchTask for LatSeqTask {
    fn name(&self) -> String {
        match &self.seq {
            LatSeq::RandomKorobov { samples, .. } => format!(
                "random Korobov search with {} samples and {}",
                samples,
                self.search.name()
            ),
            seq => format!("{} search with {}", seq.name(), self.search.name()),
        }
    }

    fn execute(&mut self) -> Result<()> {
        self.best = None;
        let template = self.search.base_lat().clone();
        let mut observer = MinObserver::new(self.seq.max_accepted(), None);
        let search = &mut self.search;
        let lattices = self.seq.lattices(&template, self.dimension);
        let items = lattices.map(|lat| -> Result<(LatDef, Evaluated)> {
            let merit = search.evaluate(&lat)?;
            trace!(lattice = %lat, %merit, "candidate");
            Ok((lat, Ok(merit)))
        });
        let best = MinElement::new()
            .listen(&mut observer)
            .listen(&mut self.stats)
            .find(items, &self.filters)?;
        let Some(best) = best else {
            warn!(dimension = self.dimension, "every lattice was rejected");
            return Err(LatticeError::NoCandidate {
                dimension: self.dimension,
            });
        };
        info!(lattice = %best.item, merit = %best.merit, "best lattice");
        selected(&mut self.stats, &mut self.callbacks, &best.item, &best.merit);
        self.best = Some(best);
        Ok(())
    }

    fn best_lattice(&self) -> Option<&LatDef> {
        self.best.as_ref().map(|c| &c.item)
    }

    fn best_merit(&self) -> Option<&MeritValue> {
        self.best.as_ref().map(|c| &c.merit)
    }

    fn best_score(&self) -> Option<f64> {
        self.best.as_ref().map(|c| c.score)
    }

    fn statistics(&self) -> &Statistics {
        &self.stats
    }

    fn on_lattice_selected(&mut self, f: LatticeSelected) {
        self.callbacks.push(f);
    }
}
