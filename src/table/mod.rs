//! In-memory tables: row-sets built from API payloads and the aggregated
//! tables handed to the CSV writer.
//!
//! A `Table` is a list of column names plus rows of `Cell`s. Every row holds
//! exactly one cell per column; absent values are `Cell::Missing`, never a
//! magic number.

pub mod aggregate;
pub mod build;

pub use aggregate::*;
pub use build::*;

/// Name of the column carrying the fetch year on census row-sets.
pub const YEAR_COLUMN: &str = "year";

/// One field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the cell; text that does not parse becomes `Missing`.
    pub fn coerce_numeric(self) -> Cell {
        match self {
            Cell::Number(v) if v.is_finite() => Cell::Number(v),
            Cell::Text(s) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Cell::Number(v),
                _ => Cell::Missing,
            },
            _ => Cell::Missing,
        }
    }

    /// Rendering used for CSV output. `Missing` is an empty field.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => v.to_string(),
            Cell::Missing => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row, padding with `Missing` or truncating to the column count.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Missing);
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Index of `name`, appending it as an all-`Missing` column when absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Cell::Missing);
        }
        self.columns.len() - 1
    }

    /// Set every row's `year` cell, adding the column if needed.
    pub fn tag_year(&mut self, year: u16) {
        let idx = self.ensure_column(YEAR_COLUMN);
        for row in &mut self.rows {
            row[idx] = Cell::Number(f64::from(year));
        }
    }
}

#[cfg(test)]
impl Table {
    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }
}
