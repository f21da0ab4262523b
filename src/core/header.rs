//! Header binding
//!
//! Reconciles a resolved schema with the columns of one open stream and produces a
//! [`HeaderMap`]: the position↔name mapping used for every row of that stream.
//!
//! - Read side: the header row of the file. Every schema column must be present;
//!   extra file columns are ignored.
//! - Write side: the requested output order, or every write column in declaration
//!   order when none is requested.

use crate::core::schema::ResolvedNames;
use crate::types::{FieldKind, HeaderError};
use std::collections::HashMap;

/// A schema column bound to a stream position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundColumn {
    /// Zero-based position in the header row
    pub position: usize,
    pub name: String,
    /// Slot of the column in the resolved schema
    pub slot: usize,
    /// Declaration index of the record member
    pub field: usize,
    pub kind: FieldKind,
}

/// Position↔name mapping for one open stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    /// Bound columns, ordered by position
    columns: Vec<BoundColumn>,
    /// Header position → index into `columns`
    by_position: Vec<Option<usize>>,
    /// Column name → index into `columns`
    by_name: HashMap<String, usize>,
}

impl HeaderMap {
    fn with_width(width: usize) -> Self {
        HeaderMap {
            columns: Vec::new(),
            by_position: vec![None; width],
            by_name: HashMap::new(),
        }
    }

    fn bind(&mut self, position: usize, name: &str, names: &ResolvedNames) {
        let Some(slot) = names.slot_of(name) else {
            return;
        };
        let resolved = &names.entries()[slot];
        self.by_position[position] = Some(self.columns.len());
        self.by_name.insert(name.to_string(), self.columns.len());
        self.columns.push(BoundColumn {
            position,
            name: name.to_string(),
            slot,
            field: resolved.field,
            kind: resolved.kind,
        });
    }

    /// Bound columns in position order
    pub fn columns(&self) -> &[BoundColumn] {
        &self.columns
    }

    /// Number of positions in the header row, bound or not
    pub fn width(&self) -> usize {
        self.by_position.len()
    }

    /// Number of bound columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn name_at(&self, position: usize) -> Option<&str> {
        let index = (*self.by_position.get(position)?)?;
        Some(self.columns[index].name.as_str())
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.by_name
            .get(name)
            .map(|&index| self.columns[index].position)
    }

    /// Bound column names in position order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }
}

/// Bind the resolved read columns to a file's header row
///
/// # Errors
///
/// - [`HeaderError::DuplicateHeaderColumn`] if a cell text appears twice in the header
/// - [`HeaderError::MissingRequiredColumn`] for the first schema column (in declaration
///   order) absent from the header
pub fn bind_read_header<I, S>(names: &ResolvedNames, header: I) -> Result<HeaderMap, HeaderError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let header: Vec<S> = header.into_iter().collect();
    let mut map = HeaderMap::with_width(header.len());
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(header.len());

    for (position, cell) in header.iter().enumerate() {
        let cell = cell.as_ref();
        if seen.insert(cell, position).is_some() {
            return Err(HeaderError::DuplicateHeaderColumn {
                name: cell.to_string(),
                position,
            });
        }
        map.bind(position, cell, names);
    }

    if let Some(missing) = names.names().find(|name| !map.by_name.contains_key(*name)) {
        return Err(HeaderError::MissingRequiredColumn {
            name: missing.to_string(),
        });
    }

    Ok(map)
}

/// Bind the resolved write columns to an output order
///
/// With no explicit order every write column is emitted in declaration order.
///
/// # Errors
///
/// - [`HeaderError::OutputOverspecified`] if more columns are requested than the record writes
/// - [`HeaderError::DuplicateHeaderColumn`] if a requested name repeats
/// - [`HeaderError::UnknownColumn`] if a requested name is not a write column
pub fn bind_write_header<S>(
    names: &ResolvedNames,
    order: Option<&[S]>,
) -> Result<HeaderMap, HeaderError>
where
    S: AsRef<str>,
{
    let order: Vec<&str> = match order {
        Some(order) => order.iter().map(AsRef::as_ref).collect(),
        None => names.names().collect(),
    };

    if order.len() > names.len() {
        return Err(HeaderError::OutputOverspecified {
            requested: order.len(),
            available: names.len(),
        });
    }

    let mut map = HeaderMap::with_width(order.len());
    for (position, name) in order.iter().enumerate() {
        if map.by_name.contains_key(*name) {
            return Err(HeaderError::DuplicateHeaderColumn {
                name: name.to_string(),
                position,
            });
        }
        if !names.contains(name) {
            return Err(HeaderError::UnknownColumn {
                name: name.to_string(),
            });
        }
        map.bind(position, name, names);
    }

    Ok(map)
}
