//! csvdoc demo CLI
//!
//! Reads the bundled `Example` record type from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- read people.csv
//! cargo run -- read --quiet --input-delimiter ';' people.csv
//! cargo run -- convert people.csv out.csv --columns Id,userId,birthDate
//! RUST_LOG=debug cargo run -- convert --crlf --no-header people.csv out.csv
//! ```
//!
//! Records are printed to stdout; logs and the throughput summary go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success (rows that failed to convert are logged and skipped)
//! - 1: Error (file not found, header mismatch, malformed CSV, etc.)

use csvdoc::cli;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let mut output = std::io::stdout().lock();
    match cli::run(&args.command, &mut output) {
        Ok(summary) => {
            eprint!(
                "{} rows, {} skipped in {:.3}s",
                summary.rows,
                summary.skipped,
                summary.elapsed.as_secs_f64()
            );
            match summary.throughput() {
                Some(rate) => eprintln!(" ({rate:.0} rows/s)"),
                None => eprintln!(),
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
