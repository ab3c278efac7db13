use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use lattice_hash_forest::workload::Workload;
use lattice_hash_forest::{Config, LatticeHashForest};

fn main() {
    env_logger::init();

    let mut args = pico_args::Arguments::from_env();

    let out_filename: PathBuf = args
        .opt_value_from_str("--out")
        .unwrap()
        .unwrap_or_else(|| "out.csv".into());
    let seed: u64 = args.opt_value_from_str("--seed").unwrap().unwrap_or(0);
    let steps: usize = args.opt_value_from_str("--steps").unwrap().unwrap_or(10_000);
    let runs: usize = args.opt_value_from_str("--runs").unwrap().unwrap_or(4);
    let universe: u64 = args
        .opt_value_from_str("--universe")
        .unwrap()
        .unwrap_or(1 << 16);

    let mut out_file = std::fs::File::create(&out_filename).unwrap();

    let mut filenames: Vec<String> = vec![];
    while let Some(filename) = args.opt_free_from_str().unwrap() {
        filenames.push(filename);
    }

    // Workloads come from the files given on the command line, or from the
    // seeded generator when none are.
    let workloads: Vec<(String, Workload)> = if filenames.is_empty() {
        (0..runs)
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                let workload = Workload::random(&mut rng, steps, universe);
                (format!("random-{i}"), workload)
            })
            .collect()
    } else {
        filenames
            .iter()
            .map(|filename| {
                let contents = std::fs::read_to_string(filename)
                    .with_context(|| format!("Failed to read {filename}"))
                    .unwrap();
                let workload = contents
                    .parse::<Workload>()
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("Failed to parse {filename}"))
                    .unwrap();
                (filename.clone(), workload)
            })
            .collect()
    };

    let go = |(name, workload): &(String, Workload)| -> Vec<String> {
        let mut lhf = LatticeHashForest::with_config(Config {
            metrics: true,
            ..Config::default()
        });
        let start_time = std::time::Instant::now();
        let trace = workload.run(&mut lhf);
        let elapsed = start_time.elapsed();
        log::info!(
            "{name:20} steps={:6} sets={:6} time={:8}us",
            trace.len(),
            lhf.set_count(),
            elapsed.as_micros()
        );

        lhf.stats()
            .families()
            .iter()
            .map(|(op, c)| {
                format!(
                    "{name}, {op:13}, {:8}, {:8}, {:8}, {:8}, {:8}, {:8}, {us:8}",
                    c.hits,
                    c.equal_hits,
                    c.subset_hits,
                    c.empty_hits,
                    c.cold_misses,
                    c.edge_misses,
                    us = elapsed.as_micros(),
                )
            })
            .collect()
    };

    writeln!(
        out_file,
        "workload, op, hits, equal, subset, empty, cold, edge, time (us)"
    )
    .unwrap();

    // check if there is parallelism
    let rows = match std::env::var("RAYON_NUM_THREADS") {
        Ok(threads) if threads == "1" => workloads.iter().flat_map(go).collect::<Vec<String>>(),
        _ => workloads.par_iter().flat_map(go).collect::<Vec<String>>(),
    };

    for row in rows {
        writeln!(out_file, "{}", row).unwrap();
    }
}
