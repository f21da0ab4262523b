//! Sample record type used by the demo commands
//!
//! Covers the common member kinds: timestamps (required and null-capable), strings,
//! signed and unsigned integers, floats and booleans.

use crate::core::schema::{FieldSpec, Record};
use crate::types::{ConversionError, FieldKind, ScalarKind, Value};
use chrono::{NaiveDate, NaiveDateTime};

/// Column holding a `month/year` value that the default timestamp layouts do not cover
pub const MONTH_YEAR_COLUMN: &str = "MonYear";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Example {
    pub birth_date: NaiveDateTime,
    pub month_year: Option<NaiveDateTime>,
    pub system_id: String,
    pub user_id: String,
    pub gender: String,
    pub maximum: String,
    pub gov_id: Option<i64>,
    pub id: i64,
    pub year: u32,
    pub minimum: f64,
    pub do_process: bool,
    pub validated: Option<bool>,
}

impl Record for Example {
    fn fields() -> Vec<FieldSpec<Self>> {
        vec![
            FieldSpec::new(
                "birthDate",
                |e: &Example| &e.birth_date,
                |e: &mut Example| &mut e.birth_date,
            ),
            FieldSpec::new(
                MONTH_YEAR_COLUMN,
                |e: &Example| &e.month_year,
                |e: &mut Example| &mut e.month_year,
            ),
            FieldSpec::new(
                "systemId",
                |e: &Example| &e.system_id,
                |e: &mut Example| &mut e.system_id,
            ),
            FieldSpec::new("userId", |e: &Example| &e.user_id, |e: &mut Example| {
                &mut e.user_id
            }),
            FieldSpec::new("gender", |e: &Example| &e.gender, |e: &mut Example| {
                &mut e.gender
            }),
            FieldSpec::new("Maximum", |e: &Example| &e.maximum, |e: &mut Example| {
                &mut e.maximum
            }),
            FieldSpec::new("govId", |e: &Example| &e.gov_id, |e: &mut Example| {
                &mut e.gov_id
            }),
            FieldSpec::new("Id", |e: &Example| &e.id, |e: &mut Example| &mut e.id),
            FieldSpec::new("year", |e: &Example| &e.year, |e: &mut Example| &mut e.year),
            FieldSpec::new("Minimum", |e: &Example| &e.minimum, |e: &mut Example| {
                &mut e.minimum
            }),
            FieldSpec::new(
                "DoProcess",
                |e: &Example| &e.do_process,
                |e: &mut Example| &mut e.do_process,
            ),
            FieldSpec::new(
                "Validated",
                |e: &Example| &e.validated,
                |e: &mut Example| &mut e.validated,
            ),
        ]
    }
}

/// Read a `month/year` cell (`3/2021`) as the first day of that month
///
/// Empty cells read as null.
pub fn parse_month_year(input: &str) -> Result<Value, ConversionError> {
    if input.is_empty() {
        return Ok(Value::Null);
    }
    let kind = FieldKind::nullable(ScalarKind::Timestamp);
    NaiveDate::parse_from_str(&format!("1/{input}"), "%d/%m/%Y")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Value::Timestamp)
        .ok_or_else(|| ConversionError::parse_failure(kind, input, "expected month/year"))
}

/// Write a timestamp back in the `month/year` form read by [`parse_month_year`]
pub fn format_month_year(value: &Value) -> Result<String, ConversionError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Timestamp(ts) => Ok(ts.format("%-m/%Y").to_string()),
        other => Err(ConversionError::mismatch(
            FieldKind::nullable(ScalarKind::Timestamp),
            other,
        )),
    }
}
