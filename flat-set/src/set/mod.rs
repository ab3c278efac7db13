//! Sorted-vector sets with merge-based algebra.
use std::cmp::Ordering;
use std::fmt;
use std::slice;


/// Membership tests on sets larger than this use binary search.
pub const BINARY_SEARCH_THRESHOLD: usize = 16;

/// A set kept as a sorted, deduplicated vector.
///
/// The canonical element order makes the derived `PartialEq`, `Eq` and
/// `Hash` structural: two sets are equal exactly when they hold the same
/// elements, regardless of how they were built. Every operation that
/// produces a new set emits it already in canonical order.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FlatSet<T> {
    items: Vec<T>,
}

impl<T> FlatSet<T> {
    /// The empty set.
    pub fn new() -> Self {
        FlatSet { items: Vec::new() }
    }

    /// The one-element set `{value}`.
    pub fn singleton(value: T) -> Self {
        FlatSet { items: vec![value] }
    }

    /// The number of elements in the set.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the elements in ascending order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The elements as a sorted slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Ord> FlatSet<T> {
    /// Builds a set from arbitrary input, sorting and deduplicating.
    pub fn from_unsorted(mut items: Vec<T>) -> Self {
        items.sort_unstable();
        items.dedup();
        FlatSet { items }
    }

    /// Whether the set contains `value`, using the default search threshold.
    pub fn contains(&self, value: &T) -> bool {
        self.contains_with_threshold(value, BINARY_SEARCH_THRESHOLD)
    }

    /// Membership with an explicit switch point: sets of `threshold` or
    /// fewer elements are scanned linearly, larger ones binary-searched.
    pub fn contains_with_threshold(&self, value: &T, threshold: usize) -> bool {
        if self.items.len() <= threshold {
            self.items.iter().any(|x| x == value)
        } else {
            self.items.binary_search(value).is_ok()
        }
    }

    /// Whether every element of `self` is also an element of `other`.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        if self.items.len() > other.items.len() {
            return false;
        }
        let b = &other.items;
        let mut j = 0;
        'outer: for x in &self.items {
            while j < b.len() {
                match b[j].cmp(x) {
                    Ordering::Less => j += 1,
                    Ordering::Equal => {
                        j += 1;
                        continue 'outer;
                    }
                    Ordering::Greater => return false,
                }
            }
            return false;
        }
        true
    }
}

impl<T: Ord + Clone> FlatSet<T> {
    /// The union of the two sets as a new set.
    pub fn union(&self, other: &Self) -> Self {
        let a = &self.items;
        let b = &other.items;
        let mut out = Vec::with_capacity(a.len().max(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    out.push(a[i].clone());
                    i += 1;
                }
                Ordering::Greater => {
                    out.push(b[j].clone());
                    j += 1;
                }
                Ordering::Equal => {
                    out.push(a[i].clone());
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend(a[i..].iter().cloned());
        out.extend(b[j..].iter().cloned());
        FlatSet { items: out }
    }

    /// The intersection of the two sets as a new set.
    pub fn intersection(&self, other: &Self) -> Self {
        let a = &self.items;
        let b = &other.items;
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    out.push(a[i].clone());
                    i += 1;
                    j += 1;
                }
            }
        }
        FlatSet { items: out }
    }

    /// The elements of `self` that are not in `other`, as a new set.
    pub fn difference(&self, other: &Self) -> Self {
        let a = &self.items;
        let b = &other.items;
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    out.push(a[i].clone());
                    i += 1;
                }
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend(a[i..].iter().cloned());
        FlatSet { items: out }
    }

    /// Keeps the elements satisfying `pred`, preserving canonical order.
    pub fn filtered(&self, mut pred: impl FnMut(&T) -> bool) -> Self {
        FlatSet {
            items: self.items.iter().filter(|x| pred(x)).cloned().collect(),
        }
    }
}

impl<T> Default for FlatSet<T> {
    fn default() -> Self {
        FlatSet::new()
    }
}

impl<T: Ord> FromIterator<T> for FlatSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a FlatSet<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for FlatSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
