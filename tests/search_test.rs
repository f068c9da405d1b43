// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! End-to-end searches built from configurations.

mod common;

use lattice_search::config::{Evaluation, Method};
use lattice_search::engine::Counters;
use lattice_search::kernel::PAlpha;
use lattice_search::weights::{AnyWeights, ProductWeights};
use lattice_search::{LatticeError, LatticeType, Rejection, SearchConfig, SearchTask};

fn config(modulus: u64, dimension: usize, method: Method) -> SearchConfig {
    SearchConfig {
        modulus: Some(modulus),
        dimension,
        method,
        weights: AnyWeights::Product(ProductWeights::uniform(0.7)),
        ..SearchConfig::default()
    }
}

fn run(config: &SearchConfig) -> Box<dyn SearchTask> {
    let mut task = config.build().unwrap();
    task.execute().unwrap();
    task
}

#[test]
fn test_random_cbc_is_reproducible() {
    let mut random = config(257, 4, Method::RandomCbc);
    random.samples = 10;
    random.seed = 7;
    let first = run(&random);
    let second = run(&random);
    assert_eq!(first.best_lattice(), second.best_lattice());
    assert_eq!(first.best_score(), second.best_score());
    // the first coordinate is fixed, each later one stops at `samples` accepted
    assert_eq!(first.statistics().get(Counters::Visited), 1 + 3 * 10);
}

#[test]
fn test_random_cbc_keeps_drawing_past_rejections() {
    let korobov = run(&config(1021, 2, Method::Korobov));
    let all = korobov.statistics().get(Counters::Visited);
    let threshold = 1.05 * korobov.best_score().unwrap();

    let mut random = config(1021, 2, Method::RandomCbc);
    random.samples = 10;
    random.low_pass = Some(threshold);
    let task = run(&random);
    assert!(task.best_score().unwrap() <= threshold);
    let stats = task.statistics();
    // the first coordinate accounts for one accepted candidate
    let accepted = stats.get(Counters::Accepted) - 1;
    assert!((1..=10).contains(&accepted));
    assert!(stats.rejected(Rejection::Filtered) > 0);
    if accepted < 10 {
        // every distinct value was tried once
        assert_eq!(stats.get(Counters::Visited), 1 + all);
    }
}

#[test]
fn test_random_korobov_is_reproducible() {
    let mut random = config(257, 4, Method::RandomKorobov);
    random.samples = 10;
    random.seed = 3;
    let first = run(&random);
    let second = run(&random);
    assert_eq!(first.best_lattice(), second.best_lattice());
    assert_eq!(first.best_score(), second.best_score());
    assert_eq!(first.statistics().get(Counters::Visited), 10);

    let lat = first.best_lattice().unwrap();
    let a = lat.gen()[1];
    assert_eq!(lat.gen()[2], a * a % 257);
    let korobov = run(&config(257, 4, Method::Korobov));
    assert!(first.best_score().unwrap() >= korobov.best_score().unwrap());
}

#[test]
fn test_random_korobov_covers_every_value_once() {
    let korobov = run(&config(101, 3, Method::Korobov));
    let mut random = config(101, 3, Method::RandomKorobov);
    random.samples = 1000;
    let task = run(&random);
    assert_eq!(task.statistics().get(Counters::Visited), 50);
    assert!(common::approx_eq(
        task.best_score().unwrap(),
        korobov.best_score().unwrap(),
        1e-12
    ));
}

#[test]
fn test_extension_reduces_to_base_lattice() {
    let base = vec![1, 5, 13];
    let extend = SearchConfig {
        modulus: None,
        base: Some(2),
        max_level: Some(6),
        dimension: 3,
        method: Method::Extend,
        gen: base.clone(),
        extend_from: Some(16),
        ..SearchConfig::default()
    };
    let task = run(&extend);
    // 64 / 16 choices for each coordinate after the first
    assert_eq!(task.statistics().get(Counters::Visited), 4 * 4);
    let lat = task.best_lattice().unwrap().clone();
    let reduced: Vec<u64> = lat.gen().iter().map(|a| a % 16).collect();
    assert_eq!(reduced, base);
    assert_eq!(task.best_merit().unwrap().components().len(), 7);

    let eval = SearchConfig {
        method: Method::Eval,
        gen: lat.gen().to_vec(),
        ..extend
    };
    let check = run(&eval);
    assert!(common::approx_eq(
        check.best_score().unwrap(),
        task.best_score().unwrap(),
        1e-12
    ));
}

#[test]
fn test_exhaustive_is_no_worse_than_cbc_or_korobov() {
    let cbc = run(&config(31, 3, Method::Cbc));
    let korobov = run(&config(31, 3, Method::Korobov));
    let exhaustive = run(&config(31, 3, Method::Exhaustive));
    let best = exhaustive.best_score().unwrap();
    assert!(best <= cbc.best_score().unwrap() * (1.0 + 1e-12));
    assert!(best <= korobov.best_score().unwrap() * (1.0 + 1e-12));
    // 15 symmetric values, first coordinate fixed
    assert_eq!(exhaustive.statistics().get(Counters::Visited), 15 * 15);
    assert_eq!(korobov.statistics().get(Counters::Visited), 15);
}

#[test]
fn test_korobov_lattice_has_power_coordinates() {
    let korobov = run(&config(101, 4, Method::Korobov));
    let lat = korobov.best_lattice().unwrap();
    let a = lat.gen()[1];
    assert_eq!(lat.gen()[0], 1);
    assert_eq!(lat.gen()[2], a * a % 101);
    assert_eq!(lat.gen()[3], a * a % 101 * a % 101);
}

#[test]
fn test_eval_matches_explicit_sum() {
    let mut eval = config(31, 3, Method::Eval);
    eval.gen = vec![1, 12, 5];
    let task = run(&eval);
    let kernel = PAlpha::new(2).unwrap();
    let expected = common::explicit_merit(31, &eval.gen, &kernel, &eval.weights);
    assert!(common::approx_eq(task.best_score().unwrap(), expected, 1e-10));
}

#[test]
fn test_projection_evaluation_matches_coordinate_uniform() {
    let cu = run(&config(61, 4, Method::Cbc));
    let mut by_projection = config(61, 4, Method::Cbc);
    by_projection.evaluation = Evaluation::Projection;
    let generic = run(&by_projection);
    assert!(common::approx_eq(
        cu.best_score().unwrap(),
        generic.best_score().unwrap(),
        1e-10
    ));
}

#[test]
fn test_truncated_sums_keep_the_best_lattice() {
    let mut plain = config(101, 4, Method::Cbc);
    plain.evaluation = Evaluation::Projection;
    let mut truncated = plain.clone();
    truncated.truncate_sum = true;

    let full = run(&plain);
    let cut = run(&truncated);
    assert_eq!(full.best_lattice(), cut.best_lattice());
    assert!(common::approx_eq(
        full.best_score().unwrap(),
        cut.best_score().unwrap(),
        1e-12
    ));
    assert_eq!(full.statistics().rejected(Rejection::Aborted), 0);
    assert!(cut.statistics().rejected(Rejection::Aborted) > 0);
}

#[test]
fn test_low_pass_filter_rejects_worse_lattices() {
    let korobov = run(&config(101, 3, Method::Korobov));
    let best = korobov.best_score().unwrap();

    let mut filtered = config(101, 3, Method::Korobov);
    filtered.low_pass = Some(best);
    let task = run(&filtered);
    assert_eq!(task.best_lattice(), korobov.best_lattice());
    let rejected = task.statistics().rejected(Rejection::Filtered);
    assert!(rejected > 0);
    assert_eq!(task.statistics().get(Counters::Visited), 50);

    let mut impossible = config(101, 3, Method::Korobov);
    impossible.low_pass = Some(best / 2.0);
    let mut task = impossible.build().unwrap();
    assert_eq!(
        task.execute().err(),
        Some(LatticeError::NoCandidate { dimension: 3 })
    );
    assert_eq!(task.statistics().rejected(Rejection::Filtered), 50);
}

#[test]
fn test_fast_cbc_matches_cbc_on_prime() {
    let slow = run(&config(1021, 5, Method::Cbc));
    let fast = run(&config(1021, 5, Method::FastCbc));
    assert!(common::approx_eq(
        slow.best_score().unwrap(),
        fast.best_score().unwrap(),
        1e-9
    ));
}

#[test]
fn test_embedded_cbc_reports_every_level() {
    let embedded = SearchConfig {
        modulus: None,
        base: Some(3),
        max_level: Some(4),
        dimension: 3,
        ..SearchConfig::default()
    };
    let task = run(&embedded);
    let merit = task.best_merit().unwrap();
    assert_eq!(merit.components().len(), 5);
    assert!(merit.is_finite());
    // the default combiner is the worst level
    let worst = merit.components().iter().cloned().fold(0.0, f64::max);
    assert_eq!(task.best_score(), Some(worst));
}

#[test]
fn test_polynomial_search_runs() {
    let poly = SearchConfig {
        lattice: LatticeType::Polynomial,
        // x^5 + x^2 + 1
        modulus: Some(0b100101),
        dimension: 3,
        kernel: "P2-PLR".into(),
        ..SearchConfig::default()
    };
    let task = run(&poly);
    let lat = task.best_lattice().unwrap();
    assert_eq!(lat.gen()[0], 1);
    assert!(task.best_score().unwrap().is_finite());
}
