//! Turn JSON payloads into row-sets.
//!
//! Two payload shapes show up across the three APIs:
//! - census: an array of arrays whose first element is the header row
//! - BLS/BEA: an array of flat key/value objects

use serde_json::Value;
use thiserror::Error;

use super::{Cell, Table};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("expected a JSON array, got {0}")]
    NotAnArray(&'static str),

    #[error("row {index} is not a JSON array")]
    RowNotAnArray { index: usize },

    #[error("row {index} has {found} fields but the header has {expected}")]
    RaggedRow {
        index: usize,
        found: usize,
        expected: usize,
    },

    #[error("record {index} is not a JSON object")]
    NotAnObject { index: usize },
}

/// Build a row-set from a header-first array of arrays.
///
/// A payload with fewer than two rows has no data and yields an empty table
/// (keeping the header columns when one is present).
pub fn from_header_rows(payload: &Value) -> Result<Table, BuildError> {
    let rows = payload
        .as_array()
        .ok_or_else(|| BuildError::NotAnArray(json_kind(payload)))?;

    let Some((header, data)) = rows.split_first() else {
        return Ok(Table::default());
    };

    let header = header
        .as_array()
        .ok_or(BuildError::RowNotAnArray { index: 0 })?;
    let mut table = Table::new(header.iter().map(header_name).collect());

    for (offset, row) in data.iter().enumerate() {
        let index = offset + 1;
        let values = row.as_array().ok_or(BuildError::RowNotAnArray { index })?;
        if values.len() != header.len() {
            return Err(BuildError::RaggedRow {
                index,
                found: values.len(),
                expected: header.len(),
            });
        }
        table.push_row(values.iter().map(cell_from_json).collect());
    }

    Ok(table)
}

/// Build a row-set from an array of objects.
///
/// Columns are the union of keys in first-seen order; a record without a key
/// gets `Missing` in that column.
pub fn from_objects(records: &[Value]) -> Result<Table, BuildError> {
    let mut columns: Vec<String> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let object = record.as_object().ok_or(BuildError::NotAnObject { index })?;
        for key in object.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new(columns);
    for record in records {
        // Checked above.
        let Some(object) = record.as_object() else {
            continue;
        };
        let row = table
            .columns
            .iter()
            .map(|col| object.get(col).map(cell_from_json).unwrap_or(Cell::Missing))
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

/// Map one JSON value onto a cell. Nested values are kept as compact JSON text.
pub fn cell_from_json(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Missing,
        Value::String(s) => Cell::Text(s.clone()),
        Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Missing),
        Value::Bool(b) => Cell::Text(b.to_string()),
        Value::Array(_) | Value::Object(_) => Cell::Text(value.to_string()),
    }
}

fn header_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
