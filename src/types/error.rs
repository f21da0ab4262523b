//! Error types for csvdoc
//!
//! Errors are grouped by when they can happen:
//!
//! - **Schema errors**: the record type's column tags are inconsistent. Fatal to stream open.
//! - **Header errors**: the schema does not fit the file header (read) or the requested
//!   output order (write). Fatal to stream open.
//! - **Conversion errors**: a single cell could not be converted. Recoverable; the row is
//!   discarded and the stream stays usable.
//! - **Malformed rows**: the tokenizer rejected one row (wrong field count, invalid
//!   UTF-8). Recoverable like conversion errors.
//! - **I/O errors**: propagated from the underlying handle. On read these close the stream.

use crate::core::schema::Direction;
use crate::types::value::{FieldKind, Value};
use std::fmt::Display;
use thiserror::Error;

/// Record type metadata could not be resolved into a column map
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two fields resolved to the same column name in one direction
    #[error("Duplicate {direction} column name '{name}' on field {index}")]
    DuplicateFieldName {
        /// The colliding column name
        name: String,
        /// Direction the collision happened in
        direction: Direction,
        /// Declaration index of the second field using the name
        index: usize,
    },
}

/// Resolved schema does not fit an actual header or requested output order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// The same column name appears twice in a header row or output order
    #[error("Duplicate header column '{name}' at position {position}")]
    DuplicateHeaderColumn { name: String, position: usize },

    /// A schema column was not found in the file header
    #[error("Required column '{name}' not found in header")]
    MissingRequiredColumn { name: String },

    /// A column name is not part of the resolved schema
    #[error("Unknown column '{name}'")]
    UnknownColumn { name: String },

    /// More output columns were requested than the record type can write
    #[error("Output requests {requested} columns but the record only writes {available}")]
    OutputOverspecified { requested: usize, available: usize },
}

/// A single cell could not be converted to or from its member type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The member kind has no default converter and no override is installed
    #[error("No converter for {kind}, install a column override")]
    NoConverterForType { kind: FieldKind },

    /// Empty input for a member that is not null-capable
    #[error("Cannot convert empty value to {kind}")]
    EmptyValueForNonNullable { kind: FieldKind },

    /// The input text is not a valid value of the member kind
    #[error("Cannot parse '{input}' as {kind}: {message}")]
    ParseFailure {
        kind: FieldKind,
        input: String,
        message: String,
    },

    /// The value does not fit the member's declared width
    #[error("Value {value} overflows {kind}")]
    ConversionOverflow { kind: FieldKind, value: String },

    /// A converter produced a value of the wrong variant for the member
    #[error("Expected a {expected} value, got {found}")]
    ValueMismatch {
        expected: FieldKind,
        found: &'static str,
    },
}

impl ConversionError {
    /// Create a ParseFailure error
    pub fn parse_failure(kind: FieldKind, input: &str, message: impl Display) -> Self {
        ConversionError::ParseFailure {
            kind,
            input: input.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a ConversionOverflow error
    pub fn overflow(kind: FieldKind, value: impl Display) -> Self {
        ConversionError::ConversionOverflow {
            kind,
            value: value.to_string(),
        }
    }

    /// Error for a value that cannot be stored in a member of `expected` kind
    ///
    /// A null handed to a required member reports as an empty value.
    pub fn mismatch(expected: FieldKind, value: &Value) -> Self {
        match value {
            Value::Null => ConversionError::EmptyValueForNonNullable { kind: expected },
            other => ConversionError::ValueMismatch {
                expected,
                found: other.variant_name(),
            },
        }
    }
}

/// Top-level error returned by readers and writers
#[derive(Debug, Error)]
pub enum CsvDocError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Header(#[from] HeaderError),

    /// A row failed to convert. The row is discarded; the stream remains usable.
    #[error("Column '{column}'{}: {source}", .line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Conversion {
        /// Column the failing cell belongs to
        column: String,
        /// Input line number (read side only)
        line: Option<u64>,
        #[source]
        source: ConversionError,
    },

    /// Error from the underlying CSV reader or writer, either a malformed row or I/O
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input ended before a header row could be read
    #[error("Input has no header row")]
    EmptyInput,

    /// The reader already reached end of input or failed and released its handle
    #[error("Stream is closed")]
    StreamClosed,
}

impl CsvDocError {
    /// Create a Conversion error
    pub fn conversion(column: &str, line: Option<u64>, source: ConversionError) -> Self {
        CsvDocError::Conversion {
            column: column.to_string(),
            line,
            source,
        }
    }

    /// Whether the error only affects the current row
    ///
    /// Conversion errors and tokenizer errors for a single malformed row are row errors;
    /// the stream can keep going after them.
    pub fn is_row_error(&self) -> bool {
        match self {
            CsvDocError::Conversion { .. } => true,
            CsvDocError::Csv(err) => !matches!(
                err.kind(),
                csv::ErrorKind::Io(_) | csv::ErrorKind::Seek
            ),
            _ => false,
        }
    }
}
