//! Core binding engine
//!
//! This module contains the schema and conversion components shared by readers and writers:
//! - `schema` - Record member bindings and name resolution per direction
//! - `header` - Binding a resolved schema to a header row or output order
//! - `conversion` - Default converters and per-column overrides

pub mod conversion;
pub mod header;
pub mod schema;

pub use conversion::{ConverterRegistry, DefaultConverter, ReadConverter, WriteConverter};
pub use header::{bind_read_header, bind_write_header, BoundColumn, HeaderMap};
pub use schema::{Direction, FieldDescriptor, FieldSpec, Record, ResolvedNames, Schema};
