//! Column value model
//!
//! Every record member that can be bound to a column has a declared [`FieldKind`]:
//! a closed set of scalar kinds, optionally wrapped as null-capable. Converters never
//! touch record members directly; they produce or consume a [`Value`], and the
//! member's [`FieldValue`] implementation moves that value into or out of the record.
//!
//! # Null-capable members
//!
//! `Option<T>` is the null-capable wrapper for every supported scalar. An empty cell
//! reads as `None` and `None` writes an empty cell.

use crate::types::error::ConversionError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fmt;

/// Scalar kinds with a known default conversion, plus an escape hatch for user types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Bool,
    String,
    /// Zone-less timestamp (`chrono::NaiveDateTime`), UTC-normalized on read
    Timestamp,
    /// Fixed-point decimal (`rust_decimal::Decimal`)
    Decimal,
    /// A user-defined member type. No default converter exists for it; a column
    /// override must be installed before rows can be converted.
    Custom(&'static str),
}

impl ScalarKind {
    /// Rust-facing name of the kind, used in error messages
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::Isize => "isize",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::Usize => "usize",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "String",
            ScalarKind::Timestamp => "NaiveDateTime",
            ScalarKind::Decimal => "Decimal",
            ScalarKind::Custom(name) => name,
        }
    }

    /// Inclusive range of a signed integer kind, widened to `i64`
    pub(crate) fn signed_range(self) -> Option<(i64, i64)> {
        match self {
            ScalarKind::I8 => Some((i8::MIN.into(), i8::MAX.into())),
            ScalarKind::I16 => Some((i16::MIN.into(), i16::MAX.into())),
            ScalarKind::I32 => Some((i32::MIN.into(), i32::MAX.into())),
            ScalarKind::I64 => Some((i64::MIN, i64::MAX)),
            ScalarKind::Isize => Some((isize::MIN as i64, isize::MAX as i64)),
            _ => None,
        }
    }

    /// Upper bound of an unsigned integer kind, widened to `u64`
    pub(crate) fn unsigned_max(self) -> Option<u64> {
        match self {
            ScalarKind::U8 => Some(u8::MAX.into()),
            ScalarKind::U16 => Some(u16::MAX.into()),
            ScalarKind::U32 => Some(u32::MAX.into()),
            ScalarKind::U64 => Some(u64::MAX),
            ScalarKind::Usize => Some(usize::MAX as u64),
            _ => None,
        }
    }
}

/// Declared kind of a record member: a scalar kind and whether it is null-capable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKind {
    pub scalar: ScalarKind,
    pub nullable: bool,
}

impl FieldKind {
    pub const fn required(scalar: ScalarKind) -> Self {
        FieldKind {
            scalar,
            nullable: false,
        }
    }

    pub const fn nullable(scalar: ScalarKind) -> Self {
        FieldKind {
            scalar,
            nullable: true,
        }
    }

    /// The null-capable wrapper of this kind
    pub const fn into_nullable(self) -> Self {
        FieldKind::nullable(self.scalar)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "Option<{}>", self.scalar.name())
        } else {
            f.write_str(self.scalar.name())
        }
    }
}

/// A converted column value
///
/// Integers are carried at full 64-bit width; narrowing to the member's declared
/// width happens in [`FieldValue::from_value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Text(String),
    Timestamp(NaiveDateTime),
    Decimal(Decimal),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short variant name for diagnostics
    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "signed integer",
            Value::Uint(_) => "unsigned integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Decimal(_) => "decimal",
        }
    }
}

/// A Rust type that can be bound to a CSV column
///
/// Implemented for every supported scalar and for `Option<T>` of each. User types
/// implement it with a [`ScalarKind::Custom`] kind and pair it with a column override.
pub trait FieldValue: Sized {
    /// Declared kind, used to select the default converter
    const KIND: FieldKind;

    /// Read the member out as a [`Value`]
    fn to_value(&self) -> Value;

    /// Narrow a converted [`Value`] into the member type
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

macro_rules! signed_field_value {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl FieldValue for $ty {
            const KIND: FieldKind = FieldKind::required(ScalarKind::$kind);

            fn to_value(&self) -> Value {
                Value::Int(*self as i64)
            }

            fn from_value(value: Value) -> Result<Self, ConversionError> {
                match value {
                    Value::Int(v) => {
                        <$ty>::try_from(v).map_err(|_| ConversionError::overflow(Self::KIND, v))
                    }
                    Value::Uint(v) => {
                        <$ty>::try_from(v).map_err(|_| ConversionError::overflow(Self::KIND, v))
                    }
                    other => Err(ConversionError::mismatch(Self::KIND, &other)),
                }
            }
        }
    )*};
}

macro_rules! unsigned_field_value {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl FieldValue for $ty {
            const KIND: FieldKind = FieldKind::required(ScalarKind::$kind);

            fn to_value(&self) -> Value {
                Value::Uint(*self as u64)
            }

            fn from_value(value: Value) -> Result<Self, ConversionError> {
                match value {
                    Value::Uint(v) => {
                        <$ty>::try_from(v).map_err(|_| ConversionError::overflow(Self::KIND, v))
                    }
                    Value::Int(v) => {
                        <$ty>::try_from(v).map_err(|_| ConversionError::overflow(Self::KIND, v))
                    }
                    other => Err(ConversionError::mismatch(Self::KIND, &other)),
                }
            }
        }
    )*};
}

signed_field_value!(i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize);
unsigned_field_value!(u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize);

impl FieldValue for f64 {
    const KIND: FieldKind = FieldKind::required(ScalarKind::F64);

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            Value::Uint(v) => Ok(v as f64),
            other => Err(ConversionError::mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldValue for f32 {
    const KIND: FieldKind = FieldKind::required(ScalarKind::F32);

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        let wide = match value {
            Value::Float(v) => v,
            Value::Int(v) => v as f64,
            Value::Uint(v) => v as f64,
            other => return Err(ConversionError::mismatch(Self::KIND, &other)),
        };
        if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
            return Err(ConversionError::overflow(Self::KIND, wide));
        }
        Ok(wide as f32)
    }
}

impl FieldValue for bool {
    const KIND: FieldKind = FieldKind::required(ScalarKind::Bool);

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(ConversionError::mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldValue for String {
    const KIND: FieldKind = FieldKind::required(ScalarKind::String);

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(ConversionError::mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldValue for NaiveDateTime {
    const KIND: FieldKind = FieldKind::required(ScalarKind::Timestamp);

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Timestamp(v) => Ok(v),
            other => Err(ConversionError::mismatch(Self::KIND, &other)),
        }
    }
}

impl FieldValue for Decimal {
    const KIND: FieldKind = FieldKind::required(ScalarKind::Decimal);

    fn to_value(&self) -> Value {
        Value::Decimal(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::Int(v) => Ok(Decimal::from(v)),
            Value::Uint(v) => Ok(Decimal::from(v)),
            other => Err(ConversionError::mismatch(Self::KIND, &other)),
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const KIND: FieldKind = T::KIND.into_nullable();

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
