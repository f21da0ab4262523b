//! I/O module
//!
//! Streams typed records from and to CSV.
//!
//! # Components
//!
//! - `reader` - Streaming reader with iterator interface
//! - `writer` - Streaming writer, safe for concurrent `write` calls
//! - `options` - Reader and writer configuration

pub mod options;
pub mod reader;
pub mod writer;

pub use options::{LineTerminator, ReaderOptions, WriterOptions};
pub use reader::CsvReader;
pub use writer::CsvWriter;
