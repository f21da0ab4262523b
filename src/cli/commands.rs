//! Demo commands over the bundled [`Example`] record
//!
//! Both commands stream the input one row at a time. Rows that fail to convert are
//! logged and skipped; anything that stops the stream ends the command with an error.

use crate::cli::args::{Command, ConvertArgs, InputArgs, ReadArgs};
use crate::cli::example::{format_month_year, parse_month_year, Example, MONTH_YEAR_COLUMN};
use crate::io::{CsvReader, CsvWriter};
use crate::types::CsvDocError;
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Counters reported once a command finishes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Rows read and handled successfully
    pub rows: u64,
    /// Rows skipped after a conversion error
    pub skipped: u64,
    pub elapsed: Duration,
}

impl Summary {
    /// Rows per second, or `None` when the run was too fast to measure
    pub fn throughput(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        (secs > 0.0).then(|| self.rows as f64 / secs)
    }
}

/// Run `command`, writing printed records to `output`
pub fn run(command: &Command, output: &mut dyn Write) -> Result<Summary, CsvDocError> {
    match command {
        Command::Read(args) => read(args, output),
        Command::Convert(args) => convert(args),
    }
}

fn open_input(args: &InputArgs) -> Result<CsvReader<Example>, CsvDocError> {
    let mut reader = CsvReader::open_with(&args.input_file, args.to_reader_options())?;
    reader.add_override(MONTH_YEAR_COLUMN, parse_month_year)?;
    Ok(reader)
}

fn read(args: &ReadArgs, output: &mut dyn Write) -> Result<Summary, CsvDocError> {
    let started = Instant::now();
    let mut reader = open_input(&args.input)?;
    let (mut rows, mut skipped) = (0, 0);

    while let Some(result) = reader.read().transpose() {
        match result {
            Ok(example) => {
                rows += 1;
                if !args.quiet {
                    writeln!(output, "{example:?}")?;
                }
            }
            Err(e) if e.is_row_error() => {
                skipped += 1;
                warn!(error = %e, "skipping row");
            }
            Err(e) => return Err(e),
        }
    }

    let summary = Summary {
        rows,
        skipped,
        elapsed: started.elapsed(),
    };
    info!(rows, skipped, "read finished");
    Ok(summary)
}

fn convert(args: &ConvertArgs) -> Result<Summary, CsvDocError> {
    let started = Instant::now();
    let mut reader = open_input(&args.input)?;
    let mut writer = CsvWriter::<Example>::create_with(&args.output_file, args.to_writer_options())?;
    if writer.header_map().position_of(MONTH_YEAR_COLUMN).is_some() {
        writer.add_override(MONTH_YEAR_COLUMN, format_month_year)?;
    }
    let (mut rows, mut skipped) = (0, 0);

    while let Some(result) = reader.read().transpose() {
        let written = result.and_then(|example| writer.write(&example));
        match written {
            Ok(()) => rows += 1,
            Err(e) if e.is_row_error() => {
                skipped += 1;
                warn!(error = %e, "skipping row");
            }
            Err(e) => return Err(e),
        }
    }
    writer.close()?.sync_all()?;

    let summary = Summary {
        rows,
        skipped,
        elapsed: started.elapsed(),
    };
    info!(rows, skipped, output = %args.output_file.display(), "convert finished");
    Ok(summary)
}
