//! Types module
//!
//! Contains the value model and error types shared by the schema, conversion and I/O layers:
//! - `value`: column values, declared member kinds and the `FieldValue` trait
//! - `error`: error taxonomy for schema, header, conversion and I/O failures

pub mod error;
pub mod value;

pub use error::{ConversionError, CsvDocError, HeaderError, SchemaError};
pub use value::{FieldKind, FieldValue, ScalarKind, Value};
