use crate::io::{LineTerminator, ReaderOptions, WriterOptions};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Read and write CSV documents through typed records
#[derive(Parser, Debug)]
#[command(name = "csvdoc")]
#[command(about = "Read and write CSV documents through typed records", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read example records and print them to stdout
    Read(ReadArgs),
    /// Read example records and write them to another CSV file
    Convert(ConvertArgs),
}

/// Options shared by every command that reads a CSV file
#[derive(Args, Debug)]
pub struct InputArgs {
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    #[arg(
        long = "input-delimiter",
        value_name = "CHAR",
        default_value = ",",
        value_parser = parse_delimiter,
        help = "Field separator of the input file"
    )]
    pub input_delimiter: u8,

    #[arg(long, help = "Trim whitespace around header and data cells")]
    pub trim: bool,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, help = "Only print the summary, not each record")]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(value_name = "OUTPUT", help = "Path to the output CSV file")]
    pub output_file: PathBuf,

    #[arg(
        long,
        value_name = "CHAR",
        default_value = ",",
        value_parser = parse_delimiter,
        help = "Field separator of the output file"
    )]
    pub delimiter: u8,

    #[arg(long, help = "Terminate output lines with CRLF instead of LF")]
    pub crlf: bool,

    #[arg(long = "no-header", help = "Do not write a header line")]
    pub no_header: bool,

    #[arg(
        long,
        value_name = "NAMES",
        value_delimiter = ',',
        help = "Output columns in order (default: every column in declaration order)"
    )]
    pub columns: Option<Vec<String>>,
}

impl InputArgs {
    pub fn to_reader_options(&self) -> ReaderOptions {
        ReaderOptions::default()
            .with_delimiter(self.input_delimiter)
            .with_trim(self.trim)
    }
}

impl ConvertArgs {
    pub fn to_writer_options(&self) -> WriterOptions {
        let terminator = if self.crlf {
            LineTerminator::Crlf
        } else {
            LineTerminator::Lf
        };
        let options = WriterOptions::default()
            .with_delimiter(self.delimiter)
            .with_line_terminator(terminator)
            .with_emit_header(!self.no_header);
        match &self.columns {
            Some(columns) => options.with_output_columns(columns.iter().map(String::as_str)),
            None => options,
        }
    }
}

/// Accept a single ASCII character, or `\t` / `tab` for a tab
fn parse_delimiter(input: &str) -> Result<u8, String> {
    match input {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match input.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!(
                "delimiter must be a single ASCII character, got '{input}'"
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn convert(args: &[&str]) -> ConvertArgs {
        match CliArgs::try_parse_from(args).unwrap().command {
            Command::Convert(convert) => convert,
            other => panic!("Expected convert, got {:?}", other),
        }
    }

    #[rstest]
    #[case::comma(",", b',')]
    #[case::semicolon(";", b';')]
    #[case::escaped_tab("\\t", b'\t')]
    #[case::named_tab("tab", b'\t')]
    fn test_parse_delimiter(#[case] input: &str, #[case] expected: u8) {
        assert_eq!(parse_delimiter(input), Ok(expected));
    }

    #[rstest]
    #[case::empty("")]
    #[case::too_long(";;")]
    #[case::non_ascii("é")]
    fn test_parse_delimiter_rejects(#[case] input: &str) {
        assert!(parse_delimiter(input).is_err());
    }

    #[rstest]
    #[case::defaults(&["csvdoc", "read", "in.csv"], b',', false, false)]
    #[case::all_options(
        &["csvdoc", "read", "--input-delimiter", ";", "--trim", "--quiet", "in.csv"],
        b';',
        true,
        true
    )]
    fn test_read_parsing(
        #[case] args: &[&str],
        #[case] delimiter: u8,
        #[case] trim: bool,
        #[case] quiet: bool,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        let Command::Read(read) = parsed.command else {
            panic!("Expected read, got {:?}", parsed.command);
        };
        assert_eq!(read.input.input_file, PathBuf::from("in.csv"));
        assert_eq!(read.input.to_reader_options(), ReaderOptions {
            delimiter,
            trim,
            flexible: false,
        });
        assert_eq!(read.quiet, quiet);
    }

    #[test]
    fn test_convert_defaults() {
        let parsed = convert(&["csvdoc", "convert", "in.csv", "out.csv"]);
        assert_eq!(parsed.output_file, PathBuf::from("out.csv"));
        assert_eq!(parsed.to_writer_options(), WriterOptions::default());
    }

    #[test]
    fn test_convert_all_options() {
        let parsed = convert(&[
            "csvdoc",
            "convert",
            "--delimiter",
            "tab",
            "--crlf",
            "--no-header",
            "--columns",
            "Id,userId",
            "in.csv",
            "out.csv",
        ]);

        let expected = WriterOptions::default()
            .with_delimiter(b'\t')
            .with_line_terminator(LineTerminator::Crlf)
            .with_emit_header(false)
            .with_output_columns(["Id", "userId"]);
        assert_eq!(parsed.to_writer_options(), expected);
    }

    #[rstest]
    #[case::missing_command(&["csvdoc"])]
    #[case::missing_input(&["csvdoc", "read"])]
    #[case::missing_output(&["csvdoc", "convert", "in.csv"])]
    #[case::bad_delimiter(&["csvdoc", "convert", "--delimiter", "ab", "in.csv", "out.csv"])]
    #[case::unknown_command(&["csvdoc", "merge", "in.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
