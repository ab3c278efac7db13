//! Sets stored as sorted, deduplicated vectors.
//!
//! The sets in this crate are built for interning workloads: a set is
//! constructed once, canonicalized, and then only ever read, hashed, and
//! compared. Keeping the elements in a sorted `Vec` makes structural
//! equality a slice comparison and structural hashing a single pass, which
//! is what a content-addressed store wants from its keys.
//!
//! # Algebra
//! Union, intersection and difference are two-cursor merges over the sorted
//! storage. Each produces a fresh set that is canonical by construction, so
//! results can be handed straight back to an interner without a re-sort.
//!
//! # Membership
//! Lookups switch between a linear scan and binary search at a small size
//! threshold; scanning a handful of contiguous elements beats the branchy
//! search on the short sets that dominate interning workloads.

pub mod set;

pub use set::FlatSet;
