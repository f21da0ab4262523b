//! csvdoc
//! # Overview
//!
//! Streaming conversion between CSV documents and typed records. A record type lists its
//! members once, each with a column tag and accessors; readers and writers bind those
//! members to CSV columns by header name and convert cells with per-type defaults or
//! per-column overrides.
//!
//! # Architecture
//!
//! - [`types`] - Values, member kinds and the error taxonomy
//! - [`core`] - Binding logic:
//!   - [`core::schema`] - Column tags resolved to a name→member map per direction
//!   - [`core::header`] - Header rows bound to that map
//!   - [`core::conversion`] - Default converters and per-column overrides
//! - [`io`] - [`CsvReader`] and [`CsvWriter`] streams and their options
//! - [`cli`] - Demo commands over a bundled record type
//!
//! # Example
//!
//! ```
//! use csvdoc::{CsvReader, CsvWriter, FieldSpec, ReaderOptions, Record, WriterOptions};
//! use std::io::Cursor;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Record for User {
//!     fn fields() -> Vec<FieldSpec<Self>> {
//!         vec![
//!             FieldSpec::new("id", |u: &User| &u.id, |u: &mut User| &mut u.id),
//!             FieldSpec::new("name", |u: &User| &u.name, |u: &mut User| &mut u.name),
//!         ]
//!     }
//! }
//!
//! let input = Cursor::new("id,name,extra\n7,alice,ignored\n");
//! let mut reader = CsvReader::<User, _>::from_reader(input, ReaderOptions::default()).unwrap();
//! let user = reader.read().unwrap().unwrap();
//! assert_eq!(user, User { id: 7, name: "alice".to_string() });
//!
//! let options = WriterOptions::default().with_output_columns(["name", "id"]);
//! let writer = CsvWriter::<User, _>::from_writer(Vec::new(), options).unwrap();
//! writer.write(&user).unwrap();
//! let output = writer.close().unwrap();
//! assert_eq!(String::from_utf8(output).unwrap(), "name,id\nalice,7\n");
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod types;

pub use core::{Direction, FieldSpec, Record, Schema};
pub use io::{CsvReader, CsvWriter, LineTerminator, ReaderOptions, WriterOptions};
pub use types::{
    ConversionError, CsvDocError, FieldKind, FieldValue, HeaderError, ScalarKind, SchemaError,
    Value,
};
