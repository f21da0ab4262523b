//! Streaming CSV writer consuming typed records
//!
//! The output column order is bound once at open, either from
//! [`WriterOptions::output_columns`] or from the record's write columns in declaration
//! order. The header line is deferred to the first [`CsvWriter::write`] and is never
//! written when header emission is disabled.
//!
//! # Thread Safety
//!
//! `write` takes `&self` and may be called from several threads at once. The sink and
//! the "header written" flag sit behind one mutex, so the header is emitted exactly once
//! and never interleaves with a data row. Rows are converted before the lock is taken.
//!
//! Installing or removing overrides needs `&mut self` and therefore cannot overlap with
//! writes.

use crate::core::conversion::{ConverterRegistry, WriteConverter};
use crate::core::header::{bind_write_header, HeaderMap};
use crate::core::schema::{Direction, Record, Schema};
use crate::io::options::WriterOptions;
use crate::types::{ConversionError, CsvDocError, HeaderError, Value};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

struct Sink<W: Write> {
    writer: csv::Writer<W>,
    header_pending: bool,
}

/// Streaming writer that emits one CSV row per `T`
pub struct CsvWriter<T, W: Write = File> {
    schema: Schema<T>,
    header: HeaderMap,
    converters: ConverterRegistry<WriteConverter>,
    sink: Mutex<Sink<W>>,
}

impl<T: Record> CsvWriter<T, File> {
    /// Create or truncate `path` with default options
    ///
    /// See [`CsvWriter::create_with`].
    pub fn create(path: impl AsRef<Path>) -> Result<Self, CsvDocError> {
        Self::create_with(path, WriterOptions::default())
    }

    /// Create or truncate `path`
    ///
    /// The output columns are bound before the file is touched, so a schema or header
    /// error leaves an existing file intact.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the output CSV file
    /// * `options` - Delimiter, line terminator, header emission and output column order
    ///
    /// # Returns
    ///
    /// * `Ok(CsvWriter)` ready for [`CsvWriter::write`]; nothing is written yet
    /// * `Err(CsvDocError)` for schema or header errors, or if the file cannot be created
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use csvdoc::cli::Example;
    /// use csvdoc::{CsvWriter, WriterOptions};
    ///
    /// let options = WriterOptions::default().with_output_columns(["Id", "userId"]);
    /// let writer = CsvWriter::<Example>::create_with("out.csv", options).unwrap();
    /// writer.write(&Example::default()).unwrap();
    /// writer.close().unwrap().sync_all().unwrap();
    /// ```
    pub fn create_with(
        path: impl AsRef<Path>,
        options: WriterOptions,
    ) -> Result<Self, CsvDocError> {
        let path = path.as_ref();
        let (schema, header, converters) = Self::bind(&options)?;
        let file = File::create(path)?;
        debug!(path = %path.display(), "created CSV output");
        Ok(Self::assemble(schema, header, converters, file, &options))
    }
}

impl<T: Record, W: Write> CsvWriter<T, W> {
    /// Bind a writer over any byte sink
    ///
    /// # Arguments
    ///
    /// * `sink` - Destination for the CSV bytes
    /// * `options` - Delimiter, line terminator, header emission and output column order
    ///
    /// # Returns
    ///
    /// * `Ok(CsvWriter)` ready for [`CsvWriter::write`]
    /// * `Err(CsvDocError)` if the record type's write columns or the requested order are invalid
    pub fn from_writer(sink: W, options: WriterOptions) -> Result<Self, CsvDocError> {
        let (schema, header, converters) = Self::bind(&options)?;
        Ok(Self::assemble(schema, header, converters, sink, &options))
    }

    fn bind(
        options: &WriterOptions,
    ) -> Result<(Schema<T>, HeaderMap, ConverterRegistry<WriteConverter>), CsvDocError> {
        let schema = Schema::<T>::of();
        let names = schema.resolve(Direction::Write)?;
        let header = bind_write_header(&names, options.output_columns.as_deref())?;
        debug!(
            columns = ?header.names().collect::<Vec<_>>(),
            emit_header = options.emit_header,
            "bound CSV output columns"
        );
        Ok((schema, header, ConverterRegistry::new(names)))
    }

    fn assemble(
        schema: Schema<T>,
        header: HeaderMap,
        converters: ConverterRegistry<WriteConverter>,
        sink: W,
        options: &WriterOptions,
    ) -> Self {
        CsvWriter {
            schema,
            header,
            converters,
            sink: Mutex::new(Sink {
                writer: options.builder().from_writer(sink),
                header_pending: options.emit_header,
            }),
        }
    }

    /// Convert `record` and write it as one row
    ///
    /// When enabled, the header row goes out once, ahead of the first row written.
    ///
    /// # Arguments
    ///
    /// * `record` - Record to write in the bound column order
    ///
    /// # Errors
    ///
    /// A conversion error leaves the output untouched; the writer stays usable.
    /// Tokenizer and I/O errors are returned as-is.
    pub fn write(&self, record: &T) -> Result<(), CsvDocError> {
        let mut row = vec![String::new(); self.header.width()];
        for column in self.header.columns() {
            let value = self.schema.get(column.field, record);
            row[column.position] = self
                .converters
                .format(column.slot, &value)
                .map_err(|source| CsvDocError::conversion(&column.name, None, source))?;
        }

        let mut sink = self.lock_sink();
        if sink.header_pending {
            sink.writer.write_record(self.header.names())?;
            sink.header_pending = false;
        }
        sink.writer.write_record(&row)?;
        Ok(())
    }

    /// Flush buffered rows to the underlying sink
    pub fn flush(&self) -> Result<(), CsvDocError> {
        self.lock_sink().writer.flush()?;
        Ok(())
    }

    /// Flush, then release the sink and hand it back
    ///
    /// Releasing the returned sink is left to the caller. For a `File`, dropping it
    /// discards late write-back errors; call [`File::sync_all`] to observe them.
    ///
    /// # Returns
    ///
    /// * `Ok(W)` with every row flushed to it
    /// * `Err(CsvDocError)` if the flush or the release of the csv buffer failed
    pub fn close(self) -> Result<W, CsvDocError> {
        let mut sink = self.sink.into_inner().unwrap_or_else(PoisonError::into_inner);
        sink.writer.flush()?;
        let inner = sink
            .writer
            .into_inner()
            .map_err(|err| io::Error::new(err.error().kind(), err.error().to_string()))?;
        debug!("CSV output closed");
        Ok(inner)
    }

    fn lock_sink(&self) -> MutexGuard<'_, Sink<W>> {
        // a panicking writer thread leaves the csv buffer consistent between records
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, W: Write> CsvWriter<T, W> {
    /// Install a converter for `column`, taking precedence over the type default
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::UnknownColumn`] if `column` is not a write column of `T`.
    pub fn add_override<F>(&mut self, column: &str, converter: F) -> Result<(), HeaderError>
    where
        F: Fn(&Value) -> Result<String, ConversionError> + Send + Sync + 'static,
    {
        self.converters.install_override(column, Box::new(converter))
    }

    /// Remove the override for `column`; a no-op if none is installed
    pub fn remove_override(&mut self, column: &str) -> bool {
        self.converters.remove_override(column)
    }

    /// Position↔name map of the output columns
    pub fn header_map(&self) -> &HeaderMap {
        &self.header
    }
}

impl<T, W: Write> std::fmt::Debug for CsvWriter<T, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvWriter")
            .field("header", &self.header)
            .field("converters", &self.converters)
            .finish_non_exhaustive()
    }
}
