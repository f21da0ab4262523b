// CLI module
// Demo commands and argument parsing

mod args;
mod commands;
pub mod example;

pub use args::{CliArgs, Command, ConvertArgs, InputArgs, ReadArgs};
pub use commands::{run, Summary};
pub use example::Example;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// On invalid arguments or `--help`, clap prints the message and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
