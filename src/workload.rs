//! Line-oriented workloads for driving a forest from files or generators.
//!
//! A workload is a list of steps, one per line. `set` and `single` register
//! sets of `u64` elements; the binary operations take `$i` references to
//! the index produced by an earlier step:
//!
//! ```text
//! # seed sets
//! set 1 2 3
//! set 2 3 4
//! union $0 $1
//! inter $0 $1
//! diff $2 $3
//! insert $0 9
//! remove $4 2
//! ```
//!
//! References are validated at parse time, so a parsed workload always
//! replays cleanly against a fresh forest.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::{Index, LatticeHashForest};

/// One driver step. Operand references name earlier steps, not indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Set(Vec<u64>),
    Single(u64),
    Union(usize, usize),
    Intersection(usize, usize),
    Difference(usize, usize),
    Insert(usize, u64),
    Remove(usize, u64),
}

/// A parsed step sequence; every reference points at an earlier step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workload {
    pub steps: Vec<Step>,
}

impl Workload {
    /// Replays the workload against `forest` and returns the index each
    /// step produced.
    pub fn run(&self, forest: &mut LatticeHashForest<u64>) -> Vec<Index> {
        let mut trace: Vec<Index> = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let index = match step {
                Step::Set(elems) => forest.register_set(elems.iter().copied()),
                Step::Single(e) => forest.register_singleton(*e),
                Step::Union(i, j) => forest.union(trace[*i], trace[*j]),
                Step::Intersection(i, j) => forest.intersection(trace[*i], trace[*j]),
                Step::Difference(i, j) => forest.difference(trace[*i], trace[*j]),
                Step::Insert(i, e) => forest.insert_single(trace[*i], *e),
                Step::Remove(i, e) => forest.remove_single(trace[*i], *e),
            };
            trace.push(index);
        }
        trace
    }

    /// Generates a random workload: a seeding prefix of registrations
    /// followed by a mix of operations over earlier results. Elements are
    /// drawn from `0..universe`; a small universe forces heavy overlap
    /// between the operand sets.
    pub fn random(rng: &mut impl Rng, steps: usize, universe: u64) -> Workload {
        let mut out = Vec::with_capacity(steps);
        let seeds = (steps / 4).max(1);
        for _ in 0..seeds {
            out.push(random_registration(rng, universe));
        }
        while out.len() < steps {
            let i = rng.gen_range(0..out.len());
            let j = rng.gen_range(0..out.len());
            let step = match rng.gen_range(0..100) {
                0..=14 => random_registration(rng, universe),
                15..=19 => Step::Single(rng.gen_range(0..universe)),
                20..=49 => Step::Union(i, j),
                50..=69 => Step::Intersection(i, j),
                70..=84 => Step::Difference(i, j),
                85..=94 => Step::Insert(i, rng.gen_range(0..universe)),
                _ => Step::Remove(i, rng.gen_range(0..universe)),
            };
            out.push(step);
        }
        Workload { steps: out }
    }
}

fn random_registration(rng: &mut impl Rng, universe: u64) -> Step {
    let len = rng.gen_range(0..8);
    Step::Set((0..len).map(|_| rng.gen_range(0..universe)).collect())
}

fn parse_ref(token: &str, line_no: usize, defined: usize) -> Result<usize, String> {
    let body = token
        .strip_prefix('$')
        .ok_or_else(|| format!("expected a $step reference on line {line_no}, got '{token}'"))?;
    let step: usize = body
        .parse()
        .map_err(|e| format!("invalid step reference '{token}' on line {line_no}: {e}"))?;
    if step >= defined {
        return Err(format!(
            "step reference ${step} on line {line_no} points at a later step"
        ));
    }
    Ok(step)
}

fn parse_elem(token: &str, line_no: usize) -> Result<u64, String> {
    token
        .parse()
        .map_err(|e| format!("invalid element '{token}' on line {line_no}: {e}"))
}

impl FromStr for Workload {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut steps: Vec<Step> = vec![];

        for (i, line) in s.lines().enumerate() {
            let i = i + 1;
            let line = line.trim();
            if line.starts_with('#') || line.is_empty() {
                continue;
            }

            let mut parts = line.split_whitespace();
            let op = parts.next().expect("non-empty line has a first token");
            let step = match op {
                "set" => {
                    let elems = parts
                        .by_ref()
                        .map(|t| parse_elem(t, i))
                        .collect::<Result<Vec<u64>, String>>()?;
                    Step::Set(elems)
                }
                "single" => {
                    let elem = parts
                        .next()
                        .ok_or_else(|| format!("missing element on line {i}"))?;
                    Step::Single(parse_elem(elem, i)?)
                }
                "union" | "inter" | "diff" => {
                    let a = parts
                        .next()
                        .ok_or_else(|| format!("missing operand on line {i}"))?;
                    let b = parts
                        .next()
                        .ok_or_else(|| format!("missing operand on line {i}"))?;
                    let a = parse_ref(a, i, steps.len())?;
                    let b = parse_ref(b, i, steps.len())?;
                    match op {
                        "union" => Step::Union(a, b),
                        "inter" => Step::Intersection(a, b),
                        _ => Step::Difference(a, b),
                    }
                }
                "insert" | "remove" => {
                    let target = parts
                        .next()
                        .ok_or_else(|| format!("missing operand on line {i}"))?;
                    let elem = parts
                        .next()
                        .ok_or_else(|| format!("missing element on line {i}"))?;
                    let target = parse_ref(target, i, steps.len())?;
                    let elem = parse_elem(elem, i)?;
                    if op == "insert" {
                        Step::Insert(target, elem)
                    } else {
                        Step::Remove(target, elem)
                    }
                }
                other => return Err(format!("unknown step '{other}' on line {i}")),
            };

            if let Some(extra) = parts.next() {
                return Err(format!("trailing token '{extra}' on line {i}"));
            }
            steps.push(step);
        }

        Ok(Workload { steps })
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            match step {
                Step::Set(elems) => {
                    write!(f, "set")?;
                    for e in elems {
                        write!(f, " {e}")?;
                    }
                    writeln!(f)?;
                }
                Step::Single(e) => writeln!(f, "single {e}")?,
                Step::Union(a, b) => writeln!(f, "union ${a} ${b}")?,
                Step::Intersection(a, b) => writeln!(f, "inter ${a} ${b}")?,
                Step::Difference(a, b) => writeln!(f, "diff ${a} ${b}")?,
                Step::Insert(a, e) => writeln!(f, "insert ${a} {e}")?,
                Step::Remove(a, e) => writeln!(f, "remove ${a} {e}")?,
            }
        }
        Ok(())
    }
}
