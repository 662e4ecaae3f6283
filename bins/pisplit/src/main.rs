//! pisplit: concurrent Chudnovsky pi calculator.
//!
//! Computes pi by binary splitting on a bounded worker pool, prints the
//! digit string, and reports how far it agrees with a reference expansion
//! (a bundled 100,000-digit resource, or a file supplied via --reference).

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use pisplit_core::constants::{
    DEFAULT_CORES, DEFAULT_DEPTH, DEFAULT_PRECISION, DIGITS_PER_TERM,
};
use pisplit_engine::{Driver, WorkerPool};

/// Bundled reference expansion: `3.` followed by 100,000 digits.
const BUNDLED_REFERENCE: &str = include_str!("../resources/pi_100k.txt");

/// Queue slots per worker; forked subtrees never outgrow this backlog.
const QUEUE_SLOTS_PER_WORKER: usize = 3;

/// Concurrent Chudnovsky pi calculator.
#[derive(Debug, Parser)]
#[command(name = "pisplit")]
#[command(version, about = "Concurrent Chudnovsky pi calculator", long_about = None)]
struct Args {
    /// Decimal digits after the point to compute.
    #[arg(short, long, default_value_t = DEFAULT_PRECISION)]
    precision: usize,

    /// Series terms to evaluate; each term is worth about 14.18 digits of
    /// pi, so add roughly 10,000 depth per 141,800 digits wanted.
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    depth: u64,

    /// Worker thread count; also the initial fork budget.
    #[arg(short, long, default_value_t = DEFAULT_CORES)]
    cores: usize,

    /// Suppress the digit string; the result is still computed and verified.
    #[arg(short, long)]
    quiet: bool,

    /// Digit file to verify against instead of the bundled reference.
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    if let Err(e) = run(args) {
        error!("computation failed: {e:#}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if args.cores == 0 {
        bail!("core count must be at least 1");
    }
    info!(
        precision = args.precision,
        depth = args.depth,
        cores = args.cores,
        quiet = args.quiet,
        "pisplit v{}",
        env!("CARGO_PKG_VERSION")
    );
    let reachable = args.depth.saturating_sub(1) as f64 * DIGITS_PER_TERM;
    if args.precision as f64 > reachable {
        warn!(
            "depth {} yields only ~{reachable:.0} accurate digits; deepen the series for the full {}",
            args.depth, args.precision
        );
    }

    let reference = load_reference(args.reference.as_deref())?;

    let started = Instant::now();
    let pool = WorkerPool::new(args.cores, args.cores * QUEUE_SLOTS_PER_WORKER);
    let result = {
        let driver = Driver::new(pool.executor(), args.precision)?;
        driver.compute(args.depth, args.cores as u32)
    };
    pool.shutdown();
    let digits = result?.to_string();
    info!(elapsed = ?started.elapsed(), "computation finished");

    if !args.quiet {
        println!("{digits}");
    }
    report_against_reference(&digits, reference.trim_end());
    Ok(())
}

/// Read the reference expansion from `path`, or fall back to the bundled
/// 100,000-digit resource.
fn load_reference(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading reference file {}", path.display())),
        None => Ok(BUNDLED_REFERENCE.to_string()),
    }
}

/// Report the first position where the computed digits leave the reference,
/// or an exact match over the shared prefix.
fn report_against_reference(computed: &str, reference: &str) {
    let overlap = computed.len().min(reference.len());
    match first_mismatch(computed, reference) {
        None => info!(
            digits = overlap.saturating_sub(2),
            "exact match against the reference"
        ),
        // Positions 0 and 1 hold the leading "3."
        Some(position) if position < 2 => {
            warn!("result does not begin with 3.; no digits are trustworthy")
        }
        Some(position) => info!(
            matched = position - 2,
            "digits agree with the reference up to the first mismatch"
        ),
    }
}

/// Index of the first differing byte within the shared prefix.
fn first_mismatch(a: &str, b: &str) -> Option<usize> {
    a.bytes().zip(b.bytes()).position(|(x, y)| x != y)
}

fn init_logging(level: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bundled_reference_is_well_formed() {
        assert!(BUNDLED_REFERENCE.starts_with("3.14159265358979323846"));
        assert_eq!(BUNDLED_REFERENCE.trim_end().len(), 100_002);
    }

    #[test]
    fn mismatch_positions() {
        assert_eq!(first_mismatch("3.14159", "3.14159"), None);
        assert_eq!(first_mismatch("3.14158", "3.14159"), Some(6));
        // Differing lengths only compare over the shared prefix.
        assert_eq!(first_mismatch("3.14", "3.14159"), None);
        assert_eq!(first_mismatch("2.14", "3.14"), Some(0));
    }

    #[test]
    fn reference_loads_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "3.1415926535").unwrap();
        let loaded = load_reference(Some(file.path())).unwrap();
        assert_eq!(loaded, "3.1415926535");
    }

    #[test]
    fn missing_reference_file_is_a_configuration_error() {
        assert!(load_reference(Some(Path::new("/nonexistent/pi.txt"))).is_err());
    }
}
