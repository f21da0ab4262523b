//! Conversion registry
//!
//! Picks the string⇄value converter for every column of an open stream.
//!
//! # Dispatch
//!
//! Per column, in order of precedence:
//! 1. a column override installed by the caller
//! 2. the default converter for the member's declared [`FieldKind`]
//! 3. otherwise [`ConversionError::NoConverterForType`], reported for the row
//!
//! Defaults are selected by matching on the closed set of [`ScalarKind`]s. Kinds outside
//! that set ([`ScalarKind::Custom`]) only convert through overrides.
//!
//! Column names are resolved to slots when the registry is built, so the per-row path
//! indexes vectors and never hashes names.
//!
//! # Default formats
//!
//! | kind            | read                                               | write                      |
//! |-----------------|----------------------------------------------------|----------------------------|
//! | integers        | base-10, range-checked against the declared width  | base-10                    |
//! | floats          | decimal or exponent notation, range-checked        | shortest round-trip form   |
//! | bool            | `true 1 on yes y` (any case) are true, rest false  | `true` / `false`           |
//! | String          | verbatim, empty allowed                            | verbatim                   |
//! | timestamp       | first matching layout of [`TIMESTAMP_LAYOUTS`]     | [`TIMESTAMP_WRITE_LAYOUT`] |
//! | Decimal         | `rust_decimal` syntax                              | `Display`                  |
//!
//! Empty input is an error for every required kind except `String`. Null-capable kinds
//! read empty input as null and write null as an empty cell.

use crate::core::schema::ResolvedNames;
use crate::types::{ConversionError, FieldKind, HeaderError, ScalarKind, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

/// Column override for reading: cell text to value
pub type ReadConverter = Box<dyn Fn(&str) -> Result<Value, ConversionError> + Send + Sync>;

/// Column override for writing: value to cell text
pub type WriteConverter = Box<dyn Fn(&Value) -> Result<String, ConversionError> + Send + Sync>;

/// Layout used to write timestamps; the fraction is only emitted when non-zero
pub const TIMESTAMP_WRITE_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A timestamp layout tried on read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampLayout {
    /// Date and time, no zone
    DateTime(&'static str),
    /// Date only, read as midnight
    Date(&'static str),
    /// RFC 3339 with offset, normalized to UTC
    Rfc3339,
}

/// Timestamp layouts in the order they are tried; the first match wins
pub const TIMESTAMP_LAYOUTS: &[TimestampLayout] = &[
    TimestampLayout::DateTime("%Y-%m-%d %H:%M:%S%.f"),
    TimestampLayout::Date("%Y-%m-%d"),
    TimestampLayout::Rfc3339,
    TimestampLayout::DateTime("%Y-%m-%dT%H:%M:%S%.f"),
    TimestampLayout::DateTime("%m/%d/%Y %H:%M:%S"),
    TimestampLayout::DateTime("%m/%d/%Y %I:%M:%S %p"),
];

impl TimestampLayout {
    fn parse(self, input: &str) -> Option<NaiveDateTime> {
        match self {
            TimestampLayout::DateTime(layout) => NaiveDateTime::parse_from_str(input, layout).ok(),
            TimestampLayout::Date(layout) => NaiveDate::parse_from_str(input, layout)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0)),
            TimestampLayout::Rfc3339 => DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|ts| ts.naive_utc()),
        }
    }
}

/// Default converter for one declared kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultConverter {
    kind: FieldKind,
}

/// Default converter for `kind`, if the kind has one
pub fn lookup(kind: FieldKind) -> Option<DefaultConverter> {
    match kind.scalar {
        ScalarKind::Custom(_) => None,
        _ => Some(DefaultConverter { kind }),
    }
}

impl DefaultConverter {
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Convert cell text to a value of the declared kind
    pub fn parse(&self, input: &str) -> Result<Value, ConversionError> {
        let kind = self.kind;
        if input.is_empty() {
            return match kind.scalar {
                _ if kind.nullable => Ok(Value::Null),
                ScalarKind::String => Ok(Value::Text(String::new())),
                _ => Err(ConversionError::EmptyValueForNonNullable { kind }),
            };
        }

        match kind.scalar {
            ScalarKind::I8
            | ScalarKind::I16
            | ScalarKind::I32
            | ScalarKind::I64
            | ScalarKind::Isize => parse_signed(kind, input),
            ScalarKind::U8
            | ScalarKind::U16
            | ScalarKind::U32
            | ScalarKind::U64
            | ScalarKind::Usize => parse_unsigned(kind, input),
            ScalarKind::F32 | ScalarKind::F64 => parse_float(kind, input),
            ScalarKind::Bool => Ok(Value::Bool(parse_bool(input))),
            ScalarKind::String => Ok(Value::Text(input.to_string())),
            ScalarKind::Timestamp => parse_timestamp(kind, input),
            ScalarKind::Decimal => Decimal::from_str(input)
                .map(Value::Decimal)
                .map_err(|err| ConversionError::parse_failure(kind, input, err)),
            ScalarKind::Custom(_) => Err(ConversionError::NoConverterForType { kind }),
        }
    }

    /// Convert a value of the declared kind to cell text
    pub fn format(&self, value: &Value) -> Result<String, ConversionError> {
        let kind = self.kind;
        let scalar = kind.scalar;
        let integer = scalar.signed_range().is_some() || scalar.unsigned_max().is_some();

        match value {
            Value::Null if kind.nullable => Ok(String::new()),
            Value::Int(v) if integer => Ok(v.to_string()),
            Value::Uint(v) if integer => Ok(v.to_string()),
            Value::Float(v) if scalar == ScalarKind::F32 => Ok((*v as f32).to_string()),
            Value::Float(v) if scalar == ScalarKind::F64 => Ok(v.to_string()),
            Value::Bool(v) if scalar == ScalarKind::Bool => Ok(v.to_string()),
            Value::Text(v) if scalar == ScalarKind::String => Ok(v.clone()),
            Value::Timestamp(v) if scalar == ScalarKind::Timestamp => {
                Ok(v.format(TIMESTAMP_WRITE_LAYOUT).to_string())
            }
            Value::Decimal(v) if scalar == ScalarKind::Decimal => Ok(v.to_string()),
            other => Err(ConversionError::mismatch(kind, other)),
        }
    }
}

fn parse_signed(kind: FieldKind, input: &str) -> Result<Value, ConversionError> {
    let value = input.parse::<i64>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ConversionError::overflow(kind, input)
        }
        _ => ConversionError::parse_failure(kind, input, err),
    })?;
    match kind.scalar.signed_range() {
        Some((min, max)) if value < min || value > max => {
            Err(ConversionError::overflow(kind, value))
        }
        _ => Ok(Value::Int(value)),
    }
}

fn parse_unsigned(kind: FieldKind, input: &str) -> Result<Value, ConversionError> {
    let value = input.parse::<u64>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => ConversionError::overflow(kind, input),
        _ => ConversionError::parse_failure(kind, input, err),
    })?;
    match kind.scalar.unsigned_max() {
        Some(max) if value > max => Err(ConversionError::overflow(kind, value)),
        _ => Ok(Value::Uint(value)),
    }
}

fn parse_float(kind: FieldKind, input: &str) -> Result<Value, ConversionError> {
    let value = input
        .parse::<f64>()
        .map_err(|err| ConversionError::parse_failure(kind, input, err))?;
    // "inf" parses to infinity legitimately; anything else out of range saturates
    if value.is_infinite() && !input.to_ascii_lowercase().contains("inf") {
        return Err(ConversionError::overflow(kind, input));
    }
    if kind.scalar == ScalarKind::F32 && value.is_finite() && value.abs() > f64::from(f32::MAX) {
        return Err(ConversionError::overflow(kind, input));
    }
    Ok(Value::Float(value))
}

fn parse_bool(input: &str) -> bool {
    matches!(
        input.to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes" | "y"
    )
}

fn parse_timestamp(kind: FieldKind, input: &str) -> Result<Value, ConversionError> {
    TIMESTAMP_LAYOUTS
        .iter()
        .find_map(|layout| layout.parse(input))
        .map(Value::Timestamp)
        .ok_or_else(|| ConversionError::parse_failure(kind, input, "no matching timestamp layout"))
}

/// Converter chosen for a column
pub enum Resolved<'a, C> {
    Override(&'a C),
    Default(DefaultConverter),
}

/// Per-stream converter table: a default per column plus optional column overrides
///
/// Slots follow the resolved schema of the stream's direction.
pub struct ConverterRegistry<C> {
    columns: ResolvedNames,
    defaults: Vec<Option<DefaultConverter>>,
    overrides: Vec<Option<C>>,
}

impl<C> ConverterRegistry<C> {
    pub fn new(columns: ResolvedNames) -> Self {
        let defaults = columns
            .entries()
            .iter()
            .map(|column| lookup(column.kind))
            .collect();
        let overrides = columns.entries().iter().map(|_| None).collect();
        ConverterRegistry {
            columns,
            defaults,
            overrides,
        }
    }

    /// Install `converter` for `column`, replacing any previous override
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::UnknownColumn`] if `column` is not part of the resolved
    /// schema. The table is left unchanged.
    pub fn install_override(&mut self, column: &str, converter: C) -> Result<(), HeaderError> {
        let slot = self
            .columns
            .slot_of(column)
            .ok_or_else(|| HeaderError::UnknownColumn {
                name: column.to_string(),
            })?;
        self.overrides[slot] = Some(converter);
        Ok(())
    }

    /// Remove the override for `column`; returns whether one was installed
    pub fn remove_override(&mut self, column: &str) -> bool {
        self.columns
            .slot_of(column)
            .and_then(|slot| self.overrides[slot].take())
            .is_some()
    }

    pub fn has_override(&self, column: &str) -> bool {
        self.columns
            .slot_of(column)
            .is_some_and(|slot| self.overrides[slot].is_some())
    }

    /// Converter for the column in `slot`: override first, then the kind default
    pub fn resolve(&self, slot: usize) -> Result<Resolved<'_, C>, ConversionError> {
        if let Some(converter) = &self.overrides[slot] {
            return Ok(Resolved::Override(converter));
        }
        self.defaults[slot]
            .map(Resolved::Default)
            .ok_or(ConversionError::NoConverterForType {
                kind: self.columns.entries()[slot].kind,
            })
    }

    pub fn columns(&self) -> &ResolvedNames {
        &self.columns
    }
}

impl ConverterRegistry<ReadConverter> {
    /// Convert the cell text of the column in `slot`
    pub fn parse(&self, slot: usize, input: &str) -> Result<Value, ConversionError> {
        match self.resolve(slot)? {
            Resolved::Override(converter) => converter(input),
            Resolved::Default(converter) => converter.parse(input),
        }
    }
}

impl ConverterRegistry<WriteConverter> {
    /// Convert the value of the column in `slot` to cell text
    pub fn format(&self, slot: usize, value: &Value) -> Result<String, ConversionError> {
        match self.resolve(slot)? {
            Resolved::Override(converter) => converter(value),
            Resolved::Default(converter) => converter.format(value),
        }
    }
}

impl<C> fmt::Debug for ConverterRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overridden: Vec<&str> = self
            .columns
            .names()
            .zip(&self.overrides)
            .filter(|(_, converter)| converter.is_some())
            .map(|(name, _)| name)
            .collect();
        f.debug_struct("ConverterRegistry")
            .field("columns", &self.columns.names().collect::<Vec<_>>())
            .field("overrides", &overridden)
            .finish()
    }
}
