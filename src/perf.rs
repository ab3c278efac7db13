//! Hit and miss accounting for the memoized operations.

use std::fmt;

/// Counters for one operation family.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpCounters {
    /// The operand pair was already in the operation cache.
    pub hits: u64,
    /// Both operands were the same index.
    pub equal_hits: u64,
    /// Resolved through a recorded subset relation.
    pub subset_hits: u64,
    /// At least one operand was the empty set.
    pub empty_hits: u64,
    /// The result set did not exist before this call.
    pub cold_misses: u64,
    /// The result set existed, but this operand pair had not been cached yet.
    pub edge_misses: u64,
}

impl OpCounters {
    /// Total number of calls accounted for across all categories.
    pub fn total(&self) -> u64 {
        self.hits
            + self.equal_hits
            + self.subset_hits
            + self.empty_hits
            + self.cold_misses
            + self.edge_misses
    }
}

impl fmt::Display for OpCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "      Hits       : {}", self.hits)?;
        writeln!(f, "      Equal Hits : {}", self.equal_hits)?;
        writeln!(f, "      Subset Hits: {}", self.subset_hits)?;
        writeln!(f, "      Empty Hits : {}", self.empty_hits)?;
        writeln!(f, "      Cold Misses: {}", self.cold_misses)?;
        writeln!(f, "      Edge Misses: {}", self.edge_misses)
    }
}

/// Counters for every operation family of a forest.
#[derive(Debug, Default, Clone)]
pub struct PerfStats {
    pub registrations: OpCounters,
    pub unions: OpCounters,
    pub intersections: OpCounters,
    pub differences: OpCounters,
    pub filters: OpCounters,
}

impl PerfStats {
    /// The families in a fixed reporting order, with their display names.
    pub fn families(&self) -> [(&'static str, &OpCounters); 5] {
        [
            ("registrations", &self.registrations),
            ("unions", &self.unions),
            ("intersections", &self.intersections),
            ("differences", &self.differences),
            ("filters", &self.filters),
        ]
    }
}

impl fmt::Display for PerfStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, counters) in self.families() {
            writeln!(f, "{name}")?;
            write!(f, "{counters}")?;
        }
        Ok(())
    }
}
