//! The forest proper: a hash-consed store of canonical sets and the
//! memoized algebra between their indices.
//!
//! Every distinct set ever registered receives a stable [`Index`], with the
//! empty set always at index 0. The results of union, intersection and
//! difference are cached per operand pair, and containment facts discovered
//! along the way are recorded in a subset cache that later calls use to
//! short-circuit whole merges.

use std::fmt;
use std::hash::{BuildHasherDefault, Hash};

use flat_set::FlatSet;
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHasher};

use crate::cache::{PairKey, SubsetRelation};
use crate::perf::PerfStats;
use crate::{Index, EMPTY_SET};

#[cfg(test)]
mod tests;

type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// Caller-owned memo table for [`LatticeHashForest::filter`].
///
/// Filter predicates have identity the forest cannot see, so each predicate
/// class gets its own map, owned and keyed by the caller.
pub type FilterCache = FxHashMap<Index, Index>;

/// Construction-time switches.
#[derive(Debug, Clone)]
pub struct Config {
    /// Validate every index argument and fail fast on out-of-range values.
    /// With checks off the store lookup itself still panics, just without
    /// the early diagnostic.
    pub bounds_checks: bool,
    /// Maintain the per-operation hit/miss counters behind
    /// [`LatticeHashForest::stats`].
    pub metrics: bool,
    /// Membership tests on sets larger than this use binary search.
    pub binary_search_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bounds_checks: cfg!(debug_assertions),
            metrics: false,
            binary_search_threshold: flat_set::set::BINARY_SEARCH_THRESHOLD,
        }
    }
}

macro_rules! perf {
    ($self:ident, $op:ident . $counter:ident) => {
        if $self.config.metrics {
            $self.stats.$op.$counter += 1;
        }
    };
}

/// A hash-consed store of sets with memoized set algebra.
///
/// Indices are assigned monotonically in first-registration order, never
/// reused, and never change meaning; two runs of the same call sequence
/// against fresh forests assign identical indices. The store only grows:
/// sets and cache entries live until the forest is dropped.
///
/// A forest is single-threaded. Every operation takes `&mut self` and runs
/// to completion; share one across threads only behind an exclusive lock.
pub struct LatticeHashForest<T> {
    sets: FxIndexSet<FlatSet<T>>,
    unions: FxHashMap<PairKey, Index>,
    intersections: FxHashMap<PairKey, Index>,
    differences: FxHashMap<PairKey, Index>,
    subsets: FxHashMap<PairKey, SubsetRelation>,
    stats: PerfStats,
    config: Config,
}

impl<T: Ord + Hash + Clone> LatticeHashForest<T> {
    /// A forest holding only the empty set, under the default config.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// A forest holding only the empty set.
    pub fn with_config(config: Config) -> Self {
        let mut sets = FxIndexSet::default();
        sets.insert(FlatSet::new());
        debug_assert_eq!(sets.get_index_of(&FlatSet::new()), Some(EMPTY_SET));
        LatticeHashForest {
            sets,
            unions: FxHashMap::default(),
            intersections: FxHashMap::default(),
            differences: FxHashMap::default(),
            subsets: FxHashMap::default(),
            stats: PerfStats::default(),
            config,
        }
    }

    /// The number of canonical sets registered so far (at least 1).
    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// The counters gathered so far. All zero unless [`Config::metrics`]
    /// is on.
    pub fn stats(&self) -> &PerfStats {
        &self.stats
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn check_index(&self, index: Index) {
        if self.config.bounds_checks && index >= self.sets.len() {
            panic!(
                "invalid index {index}: only {} sets registered",
                self.sets.len()
            );
        }
    }

    fn check_pair(&self, a: Index, b: Index) {
        self.check_index(a);
        self.check_index(b);
    }

    /// Interns a canonical set, returning its index and whether it was
    /// newly minted.
    fn intern(&mut self, set: FlatSet<T>) -> (Index, bool) {
        let (index, cold) = self.sets.insert_full(set);
        if cold {
            perf!(self, registrations.cold_misses);
        } else {
            perf!(self, registrations.hits);
        }
        (index, cold)
    }

    /// Registers the set of `elements` (deduplicated) and returns its index.
    pub fn register_set<I: IntoIterator<Item = T>>(&mut self, elements: I) -> Index {
        self.intern(elements.into_iter().collect()).0
    }

    /// Registers the one-element set `{element}` and returns its index.
    pub fn register_singleton(&mut self, element: T) -> Index {
        self.intern(FlatSet::singleton(element)).0
    }

    /// The canonical set behind `index`.
    ///
    /// The returned borrow aliases the store; it ends at the next `&mut`
    /// call into the forest.
    ///
    /// # Panics
    /// If `index` has not been registered.
    pub fn value(&self, index: Index) -> &FlatSet<T> {
        self.check_index(index);
        self.sets.get_index(index).expect("invalid index")
    }

    /// The number of elements in the set at `index`.
    pub fn size_of(&self, index: Index) -> usize {
        if index == EMPTY_SET {
            0
        } else {
            self.value(index).len()
        }
    }

    /// Whether `index` denotes the empty set.
    pub fn is_empty(&self, index: Index) -> bool {
        index == EMPTY_SET
    }

    /// Whether the set at `index` contains `element`.
    pub fn contains(&self, index: Index, element: &T) -> bool {
        if index == EMPTY_SET {
            return false;
        }
        self.value(index)
            .contains_with_threshold(element, self.config.binary_search_threshold)
    }

    /// The containment relation recorded for the pair, described from the
    /// ordered `(min, max)` view: `Subset` means the set at the smaller
    /// index is contained in the larger one.
    ///
    /// `Unknown` carries no information; relations are only discovered as
    /// a side effect of operations, never computed here. Equal indices
    /// report `Unknown`; that case is the caller's equal-operands
    /// short-circuit to handle.
    pub fn is_subset(&self, a: Index, b: Index) -> SubsetRelation {
        self.check_pair(a, b);
        if a == b {
            return SubsetRelation::Unknown;
        }
        self.relation_of(PairKey::commutative(a, b))
    }

    fn relation_of(&self, key: PairKey) -> SubsetRelation {
        self.subsets
            .get(&key)
            .copied()
            .unwrap_or(SubsetRelation::Unknown)
    }

    /// Records `value(a) ⊆ value(b)`, rewriting the pair so the smaller
    /// index keys the entry. A relation, once stored, is never overwritten:
    /// both directions at once would mean two distinct indices hold equal
    /// sets, which the store rules out.
    ///
    /// # Panics
    /// If `a == b` (when bounds checks are on): equality is always trivially
    /// true and must be short-circuited by the caller.
    fn store_subset(&mut self, a: Index, b: Index) {
        if self.config.bounds_checks && a == b {
            panic!("equal-set condition not handled by caller");
        }
        let (key, relation) = if a > b {
            (PairKey::ordered(b, a), SubsetRelation::Superset)
        } else {
            (PairKey::ordered(a, b), SubsetRelation::Subset)
        };
        self.subsets.entry(key).or_insert(relation);
    }

    /// The index of `value(a) ∪ value(b)`. Commutative and memoized.
    pub fn union(&mut self, a: Index, b: Index) -> Index {
        self.check_pair(a, b);

        if a == b {
            perf!(self, unions.equal_hits);
            return a;
        }
        if a == EMPTY_SET {
            perf!(self, unions.empty_hits);
            return b;
        }
        if b == EMPTY_SET {
            perf!(self, unions.empty_hits);
            return a;
        }

        let key = PairKey::commutative(a, b);
        let (lo, hi) = (key.left, key.right);

        match self.relation_of(key) {
            SubsetRelation::Subset => {
                perf!(self, unions.subset_hits);
                return hi;
            }
            SubsetRelation::Superset => {
                perf!(self, unions.subset_hits);
                return lo;
            }
            SubsetRelation::Unknown => {}
        }

        if let Some(&result) = self.unions.get(&key) {
            perf!(self, unions.hits);
            return result;
        }

        let merged = self.value(lo).union(self.value(hi));
        let (result, cold) = self.intern(merged);
        self.unions.insert(key, result);

        if result == lo {
            self.store_subset(hi, result);
        } else if result == hi {
            self.store_subset(lo, result);
        } else {
            self.store_subset(lo, result);
            self.store_subset(hi, result);
        }

        if cold {
            perf!(self, unions.cold_misses);
        } else {
            perf!(self, unions.edge_misses);
        }
        result
    }

    /// The index of `value(a) ∩ value(b)`. Commutative and memoized.
    pub fn intersection(&mut self, a: Index, b: Index) -> Index {
        self.check_pair(a, b);

        if a == b {
            perf!(self, intersections.equal_hits);
            return a;
        }
        if a == EMPTY_SET || b == EMPTY_SET {
            perf!(self, intersections.empty_hits);
            return EMPTY_SET;
        }

        let key = PairKey::commutative(a, b);
        let (lo, hi) = (key.left, key.right);

        match self.relation_of(key) {
            SubsetRelation::Subset => {
                perf!(self, intersections.subset_hits);
                return lo;
            }
            SubsetRelation::Superset => {
                perf!(self, intersections.subset_hits);
                return hi;
            }
            SubsetRelation::Unknown => {}
        }

        if let Some(&result) = self.intersections.get(&key) {
            perf!(self, intersections.hits);
            return result;
        }

        let merged = self.value(lo).intersection(self.value(hi));
        let (result, cold) = self.intern(merged);
        self.intersections.insert(key, result);

        // The result is contained in whichever operands it does not equal.
        if result == lo {
            self.store_subset(result, hi);
        } else if result == hi {
            self.store_subset(result, lo);
        } else {
            self.store_subset(result, lo);
            self.store_subset(result, hi);
        }

        if cold {
            perf!(self, intersections.cold_misses);
        } else {
            perf!(self, intersections.edge_misses);
        }
        result
    }

    /// The index of `value(a) \ value(b)`. Not commutative; memoized under
    /// the operand order as given.
    pub fn difference(&mut self, a: Index, b: Index) -> Index {
        self.check_pair(a, b);

        if a == b {
            perf!(self, differences.equal_hits);
            return EMPTY_SET;
        }
        if a == EMPTY_SET {
            perf!(self, differences.empty_hits);
            return EMPTY_SET;
        }
        if b == EMPTY_SET {
            perf!(self, differences.empty_hits);
            return a;
        }

        let key = PairKey::ordered(a, b);
        if let Some(&result) = self.differences.get(&key) {
            perf!(self, differences.hits);
            return result;
        }

        let merged = self.value(a).difference(self.value(b));
        let (result, cold) = self.intern(merged);
        self.differences.insert(key, result);

        if result == a {
            // a \ b = a exactly when a ∩ b = ∅; prime the intersection
            // cache with that fact.
            self.intersections
                .entry(PairKey::commutative(a, b))
                .or_insert(EMPTY_SET);
        } else {
            self.store_subset(result, a);
        }

        if cold {
            perf!(self, differences.cold_misses);
        } else {
            perf!(self, differences.edge_misses);
        }
        result
    }

    /// The index of `value(a) ∪ {element}`. A wrapper over [`Self::union`].
    pub fn insert_single(&mut self, a: Index, element: T) -> Index {
        let single = self.register_singleton(element);
        self.union(a, single)
    }

    /// The index of `value(a) \ {element}`. A wrapper over
    /// [`Self::difference`].
    pub fn remove_single(&mut self, a: Index, element: T) -> Index {
        let single = self.register_singleton(element);
        self.difference(a, single)
    }

    /// The index of the subset of `value(index)` whose elements satisfy
    /// `pred`, memoized through the caller-owned `cache`.
    ///
    /// The empty set passes through untouched, without consulting or
    /// updating the cache.
    pub fn filter(
        &mut self,
        index: Index,
        mut pred: impl FnMut(&T) -> bool,
        cache: &mut FilterCache,
    ) -> Index {
        self.check_index(index);

        if index == EMPTY_SET {
            return index;
        }

        if let Some(&result) = cache.get(&index) {
            perf!(self, filters.hits);
            return result;
        }

        let kept = self.value(index).filtered(&mut pred);
        let (result, cold) = self.intern(kept);
        cache.insert(index, result);

        if cold {
            perf!(self, filters.cold_misses);
        } else {
            perf!(self, filters.edge_misses);
        }
        result
    }

    /// All caches and sets as a diagnostic string.
    pub fn dump(&self) -> String
    where
        T: fmt::Debug,
    {
        self.to_string()
    }

    /// The counters as a diagnostic string.
    pub fn dump_perf(&self) -> String {
        format!("LHF Perf:\n{}", self.stats)
    }
}

impl<T: Ord + Hash + Clone> Default for LatticeHashForest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Hash + Clone + fmt::Debug> fmt::Display for LatticeHashForest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Cache entries are sorted by key so the dump is stable across runs.
        writeln!(f, "LatticeHashForest {{")?;
        let caches = [
            ("Unions", &self.unions),
            ("Differences", &self.differences),
            ("Intersections", &self.intersections),
        ];
        for (name, cache) in caches {
            writeln!(f, "    {name}: (Count: {})", cache.len())?;
            let mut entries: Vec<_> = cache.iter().collect();
            entries.sort_by_key(|(key, _)| (key.left, key.right));
            for (key, result) in entries {
                writeln!(f, "      {{{key} -> {result}}}")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "    Subsets: (Count: {})", self.subsets.len())?;
        let mut entries: Vec<_> = self.subsets.iter().collect();
        entries.sort_by_key(|(key, _)| (key.left, key.right));
        for (key, relation) in entries {
            let tag = match relation {
                SubsetRelation::Subset => "sub",
                SubsetRelation::Superset => "sup",
                SubsetRelation::Unknown => "unknown",
            };
            writeln!(f, "      {key} -> {tag}")?;
        }
        writeln!(f)?;

        writeln!(f, "    PropertySets: (Count: {})", self.sets.len())?;
        for (index, set) in self.sets.iter().enumerate() {
            writeln!(f, "      {index} : {set:?}")?;
        }
        write!(f, "}}")
    }
}
