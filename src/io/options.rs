//! Stream configuration
//!
//! Reader and writer options map directly onto `csv::ReaderBuilder` / `csv::WriterBuilder`.
//! Quoting and escaping are whatever the `csv` tokenizer does.

use csv::{ReaderBuilder, Terminator, Trim, WriterBuilder};

/// Record terminator used by the writer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineTerminator {
    #[default]
    Lf,
    Crlf,
}

/// Options for [`CsvReader`](crate::io::CsvReader)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Field separator (default `,`)
    pub delimiter: u8,
    /// Trim surrounding whitespace from header and data cells
    pub trim: bool,
    /// Accept rows whose length differs from the header; missing cells are skipped
    pub flexible: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            delimiter: b',',
            trim: false,
            flexible: false,
        }
    }
}

impl ReaderOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn with_flexible(mut self, flexible: bool) -> Self {
        self.flexible = flexible;
        self
    }

    /// The header row is read as an ordinary record so an empty input can be told
    /// apart from a header-only one.
    pub(crate) fn builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .has_headers(false)
            .delimiter(self.delimiter)
            .flexible(self.flexible)
            .trim(if self.trim { Trim::All } else { Trim::None });
        builder
    }
}

/// Options for [`CsvWriter`](crate::io::CsvWriter)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Field separator (default `,`)
    pub delimiter: u8,
    pub line_terminator: LineTerminator,
    /// Write the header line before the first row (default `true`)
    pub emit_header: bool,
    /// Output column order; `None` writes every write column in declaration order
    pub output_columns: Option<Vec<String>>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            delimiter: b',',
            line_terminator: LineTerminator::Lf,
            emit_header: true,
            output_columns: None,
        }
    }
}

impl WriterOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_line_terminator(mut self, line_terminator: LineTerminator) -> Self {
        self.line_terminator = line_terminator;
        self
    }

    pub fn with_emit_header(mut self, emit_header: bool) -> Self {
        self.emit_header = emit_header;
        self
    }

    pub fn with_output_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub(crate) fn builder(&self) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .has_headers(false)
            .delimiter(self.delimiter)
            .terminator(match self.line_terminator {
                LineTerminator::Lf => Terminator::Any(b'\n'),
                LineTerminator::Crlf => Terminator::CRLF,
            });
        builder
    }
}
