//! A hash-consed engine for sets drawn from an arbitrary element domain.
//!
//! Every distinct set registered with a [`LatticeHashForest`] receives a
//! stable integer [`Index`]; structurally equal sets share one index for
//! the life of the forest. Set algebra between indices (union,
//! intersection, difference, single-element insert/remove, and predicate
//! filtering) is memoized per operand pair, and containment facts the
//! operations discover along the way feed a subset cache that short-circuits
//! later calls.
//!
//! The element type only needs `Ord + Hash + Clone`; the intended clients
//! pack graph edges into `u64` scalars and treat indices as the identity of
//! whole node or edge sets.

pub mod cache;
pub mod forest;
pub mod perf;
pub mod workload;


pub use cache::SubsetRelation;
pub use forest::{Config, FilterCache, LatticeHashForest};
pub use perf::{OpCounters, PerfStats};

/// The public handle for a canonical set.
pub type Index = usize;

/// The index of the empty set, present in every forest from construction.
pub const EMPTY_SET: Index = 0;
