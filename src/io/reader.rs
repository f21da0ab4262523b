//! Streaming CSV reader producing typed records
//!
//! # Lifecycle
//!
//! ```text
//! open ──► Reading ──(end of input | tokenizer/I/O error)──► Closed
//!             ▲  │
//!             └──┘ reset (rewinds to the first data row)
//! ```
//!
//! Opening reads exactly one header line and binds it against the record's read
//! columns. Each [`CsvReader::read`] tokenizes one row and converts every bound cell;
//! cells in unbound positions are ignored.
//!
//! # Error Handling
//!
//! - Schema and header errors fail the open
//! - A conversion error discards the row and is returned as-is; the next call reads
//!   the next row
//! - Malformed rows (wrong field count, invalid UTF-8) are consumed by the tokenizer and
//!   reported the same way; see [`CsvDocError::is_row_error`]
//! - I/O errors release the handle; later reads fail with [`CsvDocError::StreamClosed`]
//!
//! # Iterator Interface
//!
//! ```no_run
//! use csvdoc::{CsvReader, FieldSpec, Record};
//!
//! #[derive(Debug, Default)]
//! struct Item {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Record for Item {
//!     fn fields() -> Vec<FieldSpec<Self>> {
//!         vec![
//!             FieldSpec::new("id", |i: &Item| &i.id, |i: &mut Item| &mut i.id),
//!             FieldSpec::new("name", |i: &Item| &i.name, |i: &mut Item| &mut i.name),
//!         ]
//!     }
//! }
//!
//! let reader = CsvReader::<Item>::open("items.csv").unwrap();
//! for result in reader {
//!     match result {
//!         Ok(item) => println!("{item:?}"),
//!         Err(e) => eprintln!("Skipping row: {e}"),
//!     }
//! }
//! ```

use crate::core::conversion::{ConverterRegistry, ReadConverter};
use crate::core::header::{bind_read_header, HeaderMap};
use crate::core::schema::{Direction, Record, Schema};
use crate::io::options::ReaderOptions;
use crate::types::{ConversionError, CsvDocError, HeaderError, Value};
use csv::{Position, StringRecord};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, warn};

/// Streaming reader that materializes one `T` per CSV row
pub struct CsvReader<T, R = File> {
    schema: Schema<T>,
    header: HeaderMap,
    converters: ConverterRegistry<ReadConverter>,
    /// `None` once the stream is closed
    source: Option<csv::Reader<R>>,
    /// Position of the first data row
    data_start: Position,
    row: StringRecord,
}

impl<T: Record> CsvReader<T, File> {
    /// Open `path` with default options
    ///
    /// See [`CsvReader::open_with`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CsvDocError> {
        Self::open_with(path, ReaderOptions::default())
    }

    /// Open `path` and bind its header row
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the CSV file
    /// * `options` - Delimiter, trimming and field-count handling
    ///
    /// # Returns
    ///
    /// * `Ok(CsvReader)` positioned on the first data row
    /// * `Err(CsvDocError)` if the file cannot be opened or its header does not fit `T`
    ///
    /// # Errors
    ///
    /// - I/O errors opening the file
    /// - [`CsvDocError::EmptyInput`] if the file has no lines
    /// - Schema and header errors if the record type does not fit the header
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use csvdoc::cli::Example;
    /// use csvdoc::{CsvReader, ReaderOptions};
    ///
    /// let options = ReaderOptions::default().with_delimiter(b';').with_trim(true);
    /// match CsvReader::<Example>::open_with("people.csv", options) {
    ///     Ok(reader) => println!("Bound columns: {:?}", reader.header_map()),
    ///     Err(e) => eprintln!("Failed to open file: {}", e),
    /// }
    /// ```
    pub fn open_with(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self, CsvDocError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!(path = %path.display(), "opened CSV input");
        Self::from_reader(file, options)
    }
}

impl<T: Record, R: Read> CsvReader<T, R> {
    /// Bind a reader over any byte source
    ///
    /// Consumes exactly one line, the header, before returning.
    ///
    /// # Arguments
    ///
    /// * `source` - Byte source positioned at the header row
    /// * `options` - Delimiter, trimming and field-count handling
    ///
    /// # Returns
    ///
    /// * `Ok(CsvReader)` positioned on the first data row
    /// * `Err(CsvDocError::EmptyInput)` if the source is empty
    /// * `Err(CsvDocError)` for schema, header, tokenizer or I/O errors
    pub fn from_reader(source: R, options: ReaderOptions) -> Result<Self, CsvDocError> {
        let schema = Schema::<T>::of();
        let names = schema.resolve(Direction::Read)?;

        let mut reader = options.builder().from_reader(source);
        let mut header_row = StringRecord::new();
        if !reader.read_record(&mut header_row)? {
            return Err(CsvDocError::EmptyInput);
        }
        let header = bind_read_header(&names, &header_row)?;
        let data_start = reader.position().clone();
        debug!(
            bound = header.len(),
            width = header.width(),
            columns = ?header.names().collect::<Vec<_>>(),
            "bound CSV header"
        );

        Ok(CsvReader {
            schema,
            header,
            converters: ConverterRegistry::new(names),
            source: Some(reader),
            data_start,
            row: StringRecord::new(),
        })
    }

    /// Read the next record
    ///
    /// # Returns
    ///
    /// * `Ok(Some(T))` - The next row, converted
    /// * `Ok(None)` - End of input; the handle is released
    /// * `Err(CsvDocError)` - See below
    ///
    /// # Errors
    ///
    /// - Conversion errors and malformed rows: the row is discarded and the next call
    ///   continues with the following row
    /// - I/O errors: the handle is released
    /// - [`CsvDocError::StreamClosed`] once the handle has been released
    pub fn read(&mut self) -> Result<Option<T>, CsvDocError> {
        let source = self.source.as_mut().ok_or(CsvDocError::StreamClosed)?;
        match source.read_record(&mut self.row) {
            Ok(true) => {}
            Ok(false) => {
                self.source = None;
                debug!("end of CSV input, handle released");
                return Ok(None);
            }
            Err(err) => {
                let err = CsvDocError::from(err);
                if err.is_row_error() {
                    debug!(error = %err, "malformed CSV row");
                } else {
                    self.source = None;
                    warn!(error = %err, "CSV read failed, handle released");
                }
                return Err(err);
            }
        }
        self.materialize().map(Some)
    }

    fn materialize(&self) -> Result<T, CsvDocError> {
        let line = self.row.position().map(Position::line);
        let mut record = T::default();

        for column in self.header.columns() {
            // short rows only get this far in flexible mode
            let Some(cell) = self.row.get(column.position) else {
                continue;
            };
            self.converters
                .parse(column.slot, cell)
                .and_then(|value| self.schema.set(column.field, &mut record, value))
                .map_err(|source| CsvDocError::conversion(&column.name, line, source))?;
        }

        Ok(record)
    }
}

impl<T, R> CsvReader<T, R> {
    /// Install a converter for `column`, taking precedence over the type default
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::UnknownColumn`] if `column` is not a read column of `T`.
    pub fn add_override<F>(&mut self, column: &str, converter: F) -> Result<(), HeaderError>
    where
        F: Fn(&str) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        self.converters.install_override(column, Box::new(converter))
    }

    /// Remove the override for `column`; a no-op if none is installed
    pub fn remove_override(&mut self, column: &str) -> bool {
        self.converters.remove_override(column)
    }

    /// Position↔name map bound at open
    pub fn header_map(&self) -> &HeaderMap {
        &self.header
    }

    /// Line number of the last row read, if any
    pub fn line(&self) -> Option<u64> {
        self.row.position().map(Position::line)
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    /// Release the underlying handle
    pub fn close(mut self) -> Result<(), CsvDocError> {
        if self.source.take().is_some() {
            debug!("CSV input closed");
        }
        Ok(())
    }
}

impl<T: Record, R: Read + Seek> CsvReader<T, R> {
    /// Rewind to the first row after the header
    ///
    /// # Errors
    ///
    /// [`CsvDocError::StreamClosed`] after end of input or an I/O failure, or the seek error.
    pub fn reset(&mut self) -> Result<(), CsvDocError> {
        let source = self.source.as_mut().ok_or(CsvDocError::StreamClosed)?;
        source.seek(self.data_start.clone())?;
        self.row.clear();
        Ok(())
    }
}

impl<T: Record, R: Read> Iterator for CsvReader<T, R> {
    type Item = Result<T, CsvDocError>;

    /// Yields one result per row; conversion failures do not end iteration
    fn next(&mut self) -> Option<Self::Item> {
        if self.is_closed() {
            return None;
        }
        self.read().transpose()
    }
}

impl<T, R> std::fmt::Debug for CsvReader<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvReader")
            .field("header", &self.header)
            .field("converters", &self.converters)
            .field("closed", &self.source.is_none())
            .finish_non_exhaustive()
    }
}
