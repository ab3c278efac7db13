use std::collections::BTreeSet;

use crate::cache::SubsetRelation;
use crate::forest::{Config, FilterCache, LatticeHashForest};
use crate::EMPTY_SET;

fn forest() -> LatticeHashForest<u64> {
    LatticeHashForest::new()
}

fn metered() -> LatticeHashForest<u64> {
    LatticeHashForest::with_config(Config {
        metrics: true,
        ..Config::default()
    })
}

#[test]
fn empty_set_is_index_zero() {
    let mut lhf = forest();
    assert_eq!(lhf.set_count(), 1);
    assert_eq!(lhf.register_set([]), EMPTY_SET);
    assert_eq!(lhf.size_of(EMPTY_SET), 0);
    assert!(lhf.is_empty(EMPTY_SET));
    assert!(!lhf.contains(EMPTY_SET, &42));
    assert!(lhf.value(EMPTY_SET).is_empty());
}

#[test]
fn registration_is_canonical() {
    let mut lhf = forest();
    let i1 = lhf.register_set([1, 2, 3]);
    let i2 = lhf.register_set([3, 2, 1]);
    let i3 = lhf.register_set([3, 1, 2, 2, 3]);
    assert_eq!(i1, i2);
    assert_eq!(i1, i3);
    assert_eq!(lhf.value(i1).as_slice(), &[1, 2, 3]);
    assert_eq!(lhf.set_count(), 2);
}

#[test]
fn indices_are_assigned_in_registration_order() {
    let mut lhf = forest();
    let a = lhf.register_set([1]);
    let b = lhf.register_set([2]);
    let c = lhf.register_set([3]);
    assert_eq!((a, b, c), (1, 2, 3));
    assert_eq!(lhf.register_set([1]), a);
    assert_eq!(lhf.register_singleton(2), b);
}

#[test]
fn union_commutes() {
    let mut lhf = forest();
    let a = lhf.register_set([1, 2]);
    let b = lhf.register_set([2, 3]);
    let u = lhf.union(a, b);
    let v = lhf.union(b, a);
    assert_eq!(u, v);
    assert_eq!(lhf.value(u).as_slice(), &[1, 2, 3]);

    let i = lhf.intersection(a, b);
    assert_eq!(i, lhf.intersection(b, a));
    assert_eq!(lhf.value(i).as_slice(), &[2]);
}

#[test]
fn operation_values_match_set_algebra() {
    let mut lhf = forest();
    let pairs: [(&[u64], &[u64]); 4] = [
        (&[1, 2, 3], &[2, 3, 4]),
        (&[1, 2], &[3, 4]),
        (&[1, 2, 3, 4], &[2, 3]),
        (&[5], &[1, 2, 3, 4, 5, 6]),
    ];
    for (xs, ys) in pairs {
        let a = lhf.register_set(xs.iter().copied());
        let b = lhf.register_set(ys.iter().copied());
        let oa: BTreeSet<u64> = xs.iter().copied().collect();
        let ob: BTreeSet<u64> = ys.iter().copied().collect();

        let u = lhf.union(a, b);
        let expect: Vec<u64> = oa.union(&ob).copied().collect();
        assert_eq!(lhf.value(u).as_slice(), &expect[..]);

        let i = lhf.intersection(a, b);
        let expect: Vec<u64> = oa.intersection(&ob).copied().collect();
        assert_eq!(lhf.value(i).as_slice(), &expect[..]);

        let d = lhf.difference(a, b);
        let expect: Vec<u64> = oa.difference(&ob).copied().collect();
        assert_eq!(lhf.value(d).as_slice(), &expect[..]);
    }
}

#[test]
fn idempotence_and_absorption() {
    let mut lhf = forest();
    let a = lhf.register_set([1, 2, 3]);
    assert_eq!(lhf.union(a, a), a);
    assert_eq!(lhf.intersection(a, a), a);
    assert_eq!(lhf.difference(a, a), EMPTY_SET);
    assert_eq!(lhf.union(a, EMPTY_SET), a);
    assert_eq!(lhf.union(EMPTY_SET, a), a);
    assert_eq!(lhf.intersection(a, EMPTY_SET), EMPTY_SET);
    assert_eq!(lhf.difference(a, EMPTY_SET), a);
    assert_eq!(lhf.difference(EMPTY_SET, a), EMPTY_SET);
}

#[test]
fn intersection_records_containment() {
    let mut lhf = metered();
    let a = lhf.register_set([1, 2, 3]);
    let b = lhf.register_set([2]);
    assert_eq!(lhf.is_subset(a, b), SubsetRelation::Unknown);

    let i = lhf.intersection(a, b);
    assert_eq!(i, b);
    // b holds the larger index, so the ordered pair reads as a superset.
    assert_eq!(lhf.is_subset(a, b), SubsetRelation::Superset);
    assert_eq!(lhf.is_subset(b, a), SubsetRelation::Superset);

    // The recorded relation now short-circuits the union.
    let u = lhf.union(a, b);
    assert_eq!(u, a);
    assert_eq!(lhf.stats().unions.subset_hits, 1);
    assert_eq!(lhf.stats().unions.cold_misses, 0);
}

#[test]
fn union_records_containment_in_fresh_result() {
    let mut lhf = forest();
    let a = lhf.register_set([1, 2]);
    let b = lhf.register_set([2, 3]);
    let r = lhf.union(a, b);
    assert_ne!(r, a);
    assert_ne!(r, b);
    assert_eq!(lhf.is_subset(a, r), SubsetRelation::Subset);
    assert_eq!(lhf.is_subset(b, r), SubsetRelation::Subset);

    // Both intersections resolve through the subset cache without a merge.
    assert_eq!(lhf.intersection(a, r), a);
    assert_eq!(lhf.intersection(r, b), b);
}

#[test]
fn equal_operands_short_circuit_before_caches() {
    let mut lhf = metered();
    let a = lhf.register_set([1, 2]);
    assert_eq!(lhf.difference(a, a), EMPTY_SET);
    assert_eq!(lhf.intersection(a, a), a);
    assert_eq!(lhf.intersection(a, a), a);
    let stats = lhf.stats();
    assert_eq!(stats.differences.equal_hits, 1);
    assert_eq!(stats.intersections.equal_hits, 2);
    // Never reached the cache, so no hits or misses were recorded.
    assert_eq!(stats.intersections.hits, 0);
    assert_eq!(stats.intersections.cold_misses, 0);
    assert_eq!(stats.intersections.edge_misses, 0);
}

#[test]
fn insert_remove_round_trip() {
    let mut lhf = forest();
    let singleton = lhf.register_singleton(7);
    let a = lhf.register_set([1, 2, 3]);
    let b = lhf.insert_single(a, 7);
    assert_eq!(lhf.value(b).as_slice(), &[1, 2, 3, 7]);
    assert_eq!(lhf.union(a, singleton), b);
    assert_eq!(lhf.remove_single(b, 7), a);

    // Inserting a present element is the identity.
    assert_eq!(lhf.insert_single(a, 2), a);
    // So is removing an absent one.
    assert_eq!(lhf.remove_single(a, 9), a);
}

#[test]
fn single_element_ops_on_empty() {
    let mut lhf = forest();
    assert_eq!(lhf.remove_single(EMPTY_SET, 5), EMPTY_SET);
    let s = lhf.insert_single(EMPTY_SET, 5);
    assert_eq!(lhf.value(s).as_slice(), &[5]);
    assert_eq!(lhf.register_singleton(5), s);
}

#[test]
fn repeated_union_hits_the_cache() {
    let mut lhf = metered();
    let a = lhf.register_set([1, 2]);
    let b = lhf.register_set([2, 3]);
    let first = lhf.union(a, b);
    let second = lhf.union(a, b);
    assert_eq!(first, second);
    let stats = lhf.stats();
    assert_eq!(stats.unions.cold_misses + stats.unions.edge_misses, 1);
    assert_eq!(stats.unions.hits, 1);
}

#[test]
fn edge_miss_when_result_set_already_exists() {
    let mut lhf = metered();
    let r = lhf.register_set([1, 2, 3]);
    let a = lhf.register_set([1, 2]);
    let b = lhf.register_set([2, 3]);
    assert_eq!(lhf.union(a, b), r);
    let stats = lhf.stats();
    assert_eq!(stats.unions.cold_misses, 0);
    assert_eq!(stats.unions.edge_misses, 1);
}

#[test]
fn disjoint_difference_primes_the_intersection_cache() {
    let mut lhf = metered();
    let a = lhf.register_set([1, 2]);
    let b = lhf.register_set([3, 4]);
    assert_eq!(lhf.difference(a, b), a);

    assert_eq!(lhf.intersection(a, b), EMPTY_SET);
    assert_eq!(lhf.stats().intersections.hits, 1);
    assert_eq!(lhf.stats().intersections.cold_misses, 0);
    assert_eq!(lhf.stats().intersections.edge_misses, 0);
}

#[test]
fn difference_records_result_contained_in_left() {
    let mut lhf = forest();
    let a = lhf.register_set([1, 2, 3]);
    let b = lhf.register_set([3]);
    let d = lhf.difference(a, b);
    assert_eq!(lhf.value(d).as_slice(), &[1, 2]);
    assert_eq!(lhf.is_subset(d, a), SubsetRelation::Subset);
}

#[test]
fn filter_uses_caller_cache() {
    let mut lhf = metered();
    let a = lhf.register_set([1, 2, 3, 4, 5, 6]);

    let mut evens = FilterCache::default();
    let e = lhf.filter(a, |x| x % 2 == 0, &mut evens);
    assert_eq!(lhf.value(e).as_slice(), &[2, 4, 6]);
    assert_eq!(lhf.filter(a, |x| x % 2 == 0, &mut evens), e);
    assert_eq!(lhf.stats().filters.hits, 1);

    // A different predicate class owns a different memo table.
    let mut odds = FilterCache::default();
    let o = lhf.filter(a, |x| x % 2 == 1, &mut odds);
    assert_eq!(lhf.value(o).as_slice(), &[1, 3, 5]);
    assert_eq!(evens.len(), 1);
    assert_eq!(odds.len(), 1);

    // The filtered set is canonical like any other.
    assert_eq!(lhf.register_set([2, 4, 6]), e);
}

#[test]
fn filter_passes_the_empty_set_through() {
    let mut lhf = forest();
    let mut cache = FilterCache::default();
    assert_eq!(lhf.filter(EMPTY_SET, |_| true, &mut cache), EMPTY_SET);
    assert!(cache.is_empty());
}

#[test]
fn contains_on_both_sides_of_the_threshold() {
    let mut lhf = LatticeHashForest::with_config(Config {
        binary_search_threshold: 4,
        ..Config::default()
    });
    let small = lhf.register_set([1, 3, 5]);
    let large = lhf.register_set(0..20);
    for probe in [1u64, 3, 5] {
        assert!(lhf.contains(small, &probe));
        assert!(!lhf.contains(small, &(probe + 1)));
    }
    for probe in 0..20 {
        assert!(lhf.contains(large, &probe));
    }
    assert!(!lhf.contains(large, &20));
}

#[test]
#[should_panic(expected = "invalid index")]
fn out_of_range_index_fails_fast() {
    let lhf = LatticeHashForest::<u64>::with_config(Config {
        bounds_checks: true,
        ..Config::default()
    });
    lhf.value(99);
}

#[test]
fn subset_queries_on_unrelated_pairs_stay_unknown() {
    let mut lhf = forest();
    let a = lhf.register_set([1, 2]);
    let b = lhf.register_set([2, 3]);
    assert_eq!(lhf.is_subset(a, b), SubsetRelation::Unknown);
    assert_eq!(lhf.is_subset(a, a), SubsetRelation::Unknown);
}

#[test]
fn dump_lists_sets_and_caches() {
    let mut lhf = metered();
    let a = lhf.register_set([1, 2]);
    let b = lhf.register_set([2, 3]);
    lhf.union(a, b);
    let dump = lhf.dump();
    assert!(dump.contains("Unions: (Count: 1)"));
    assert!(dump.contains("PropertySets: (Count: 4)"));
    assert!(dump.contains("0 : {}"));

    let perf = lhf.dump_perf();
    assert!(perf.contains("unions"));
    assert!(perf.contains("Cold Misses: 1"));
}
