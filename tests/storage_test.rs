// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Layout properties of every storage kind: unpermute is onto, strides
//! compose like multiplication, and the generating values cover the units.

mod common;

use std::collections::HashSet;

use lattice_search::arith;
use lattice_search::genseq::{CyclicGroup, GenSeq, GeneratingValues, GroupOrder};
use lattice_search::{Compress, PerLevelOrder, SizeParam, Storage};
use proptest::prelude::*;

fn storages() -> Vec<Storage> {
    let mut out = Vec::new();
    for compress in [Compress::None, Compress::Symmetric] {
        for n in [1, 2, 12, 16, 19, 27] {
            out.push(Storage::unilevel(SizeParam::ordinary(n), compress).unwrap());
        }
        for (base, level) in [(2, 4), (2, 5), (3, 3), (5, 2)] {
            for order in [PerLevelOrder::Basic, PerLevelOrder::Cyclic] {
                let sp = SizeParam::embedded(base, level).unwrap();
                out.push(Storage::new(sp, compress, order).unwrap());
            }
        }
    }
    out
}

/// Vector whose slot `i` holds the logical index stored there.
fn indices(storage: &Storage) -> Vec<f64> {
    (0..storage.size())
        .map(|slot| storage.representative(slot) as f64)
        .collect()
}

#[test]
fn test_unpermute_is_onto() {
    for storage in storages() {
        let slots: HashSet<usize> = (0..storage.virtual_size() as u64)
            .map(|i| storage.unpermute(i).unwrap())
            .collect();
        assert_eq!(slots.len(), storage.size(), "{:?}", storage.size_param());
        assert!(slots.iter().all(|&s| s < storage.size()));
    }
}

#[test]
fn test_symmetric_storage_reads_back_symmetric() {
    for storage in storages().into_iter().filter(|s| s.symmetric()) {
        let n = storage.virtual_size();
        let v = storage.unpermuted(&indices(&storage)).unwrap();
        for i in 1..n {
            assert_eq!(v[i], v[n - i]);
        }
    }
}

#[test]
fn test_stride_matches_logical_product() {
    for storage in storages() {
        let n = storage.size_param().modulus();
        let v = indices(&storage);
        for a in common::units(n) {
            let strided = storage.strided(&v, a).unwrap();
            for (slot, x) in strided.iter().enumerate() {
                let product = arith::mul_mod(storage.representative(slot), a, n);
                let expected = storage.unpermute(product).unwrap();
                assert_eq!(*x, v[expected]);
            }
        }
    }
}

#[test]
fn test_generating_values_cover_units() {
    for n in [1u64, 2, 12, 16, 19, 30, 81, 210] {
        let units: HashSet<u64> = common::units(n).into_iter().collect();
        let plain: HashSet<u64> = GeneratingValues::ordinary(n, Compress::None)
            .unwrap()
            .values()
            .into_iter()
            .collect();
        assert_eq!(plain.len(), arith::totient(n) as usize);
        if n > 1 {
            assert_eq!(plain, units);
        }
        let folded = GeneratingValues::ordinary(n, Compress::Symmetric).unwrap().values();
        let unfolded: HashSet<u64> = folded.iter().flat_map(|&a| [a, n - a]).collect();
        if n > 2 {
            assert_eq!(unfolded, units);
        }
    }
}

#[test]
fn test_cyclic_group_covers_units() {
    for (base, power) in [(2u64, 6u32), (3, 4), (7, 2)] {
        let group = CyclicGroup::new(base, power, Compress::None, GroupOrder::Direct).unwrap();
        let n = group.modulus();
        let elements: HashSet<u64> = group.values().into_iter().collect();
        assert_eq!(elements.len(), arith::totient(n) as usize);
        assert!(elements.iter().all(|&a| arith::gcd(a, n) == 1));
    }
}

fn storage_strategy() -> impl Strategy<Value = Storage> {
    let sizes = prop_oneof![
        Just(SizeParam::ordinary(12)),
        Just(SizeParam::ordinary(16)),
        Just(SizeParam::embedded(2, 5).unwrap()),
        Just(SizeParam::embedded(3, 3).unwrap()),
    ];
    (sizes, any::<bool>(), any::<bool>()).prop_filter_map(
        "cyclic order needs an embedded size",
        |(sp, symmetric, cyclic)| {
            let compress = if symmetric { Compress::Symmetric } else { Compress::None };
            let order = if cyclic { PerLevelOrder::Cyclic } else { PerLevelOrder::Basic };
            Storage::new(sp, compress, order).ok()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Striding by `a` then by `b` is striding by `a * b`.
    #[test]
    fn stride_composition(storage in storage_strategy(), i in 0usize..64, j in 0usize..64) {
        let n = storage.size_param().modulus();
        let units = common::units(n);
        let a = units[i % units.len()];
        let b = units[j % units.len()];
        let v = indices(&storage);
        let twice = storage.strided(&storage.strided(&v, a).unwrap(), b).unwrap();
        let once = storage.strided(&v, arith::mul_mod(a, b, n)).unwrap();
        prop_assert_eq!(twice, once);
    }

    /// Every logical index lands in a slot holding it or its mirror.
    #[test]
    fn unpermute_finds_representative(storage in storage_strategy(), i in 0u64..1000) {
        let n = storage.virtual_size() as u64;
        let i = i % n;
        let rep = storage.representative(storage.unpermute(i).unwrap());
        if storage.symmetric() {
            prop_assert!(rep == i || rep == (n - i) % n);
        } else {
            prop_assert_eq!(rep, i);
        }
    }
}
