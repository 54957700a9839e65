//! Combine row-sets into one output table.
//!
//! `aggregate` runs the steps of an `AggregatePlan` in a fixed order:
//! concat, rename, numeric coercion, sentinel replacement, unemployment rate,
//! population filter, place-name split, final column selection. Each step is also
//! exposed on its own.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{Cell, Table, YEAR_COLUMN};

/// Trailing place designators appended by the census to place names.
static PLACE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?: (?:city \(balance\)|city|town|village))+$").expect("valid suffix regex")
});

/// Place-name column produced by the census rename, and its split halves.
const PLACE_COLUMN: &str = "City";
const PLACE_NAME_COLUMN: &str = "City_Name";
const PLACE_STATE_COLUMN: &str = "State";
const PLACE_DELIMITER: &str = ", ";

const POPULATION_COLUMN: &str = "Total_Population";
const LABOR_FORCE_COLUMN: &str = "Total_Labor_Force";
const UNEMPLOYED_COLUMN: &str = "Unemployed_Population";
const UNEMPLOYMENT_RATE_COLUMN: &str = "Unemployment_Rate";

#[derive(Debug, Clone, Default)]
pub struct AggregatePlan {
    pub renames: Vec<(&'static str, &'static str)>,
    pub numeric_columns: Vec<&'static str>,
    pub sentinel: Option<f64>,
    /// Add `Unemployment_Rate` as a percentage of the labor force.
    pub unemployment_rate: bool,
    /// `(year, threshold)`: keep places whose population reached `threshold`
    /// in `year`.
    pub population_filter: Option<(u16, f64)>,
    /// Split "City, State" place names and strip place designators.
    pub split_place_names: bool,
    /// Final column sequence; an empty list keeps every column.
    pub column_order: Vec<&'static str>,
}

/// Run every step of `plan` over the row-sets.
pub fn aggregate(row_sets: Vec<Table>, plan: &AggregatePlan) -> Table {
    let mut table = concat(row_sets);
    rename_columns(&mut table, &plan.renames);
    coerce_numeric(&mut table, &plan.numeric_columns);

    if let Some(sentinel) = plan.sentinel {
        replace_sentinel(&mut table, sentinel);
    }
    if plan.unemployment_rate {
        derive_unemployment_rate(&mut table);
    }
    if let Some((year, threshold)) = plan.population_filter {
        table = filter_by_population(table, year, threshold);
    }
    if plan.split_place_names {
        split_place_names(&mut table);
    }
    if !plan.column_order.is_empty() {
        table = select_columns(table, &plan.column_order);
    }
    table
}

/// Stack row-sets. Columns are the union in first-seen order; a row-set that
/// lacks a column contributes `Missing` cells for it.
pub fn concat(row_sets: Vec<Table>) -> Table {
    let mut columns: Vec<String> = Vec::new();
    for set in &row_sets {
        for col in &set.columns {
            if !columns.contains(col) {
                columns.push(col.clone());
            }
        }
    }

    let mut out = Table::new(columns);
    for set in row_sets {
        let positions: Vec<Option<usize>> = out
            .columns
            .iter()
            .map(|col| set.column_index(col))
            .collect();
        for row in set.rows {
            let mapped = positions
                .iter()
                .map(|pos| pos.map(|i| row[i].clone()).unwrap_or(Cell::Missing))
                .collect();
            out.rows.push(mapped);
        }
    }
    out
}

pub fn rename_columns(table: &mut Table, renames: &[(&str, &str)]) {
    for col in &mut table.columns {
        if let Some((_, label)) = renames.iter().find(|(code, _)| *code == col.as_str()) {
            *col = (*label).to_string();
        }
    }
}

/// Coerce the named columns to numbers. Unparsable values, and columns the
/// table does not have, end up `Missing`.
pub fn coerce_numeric(table: &mut Table, columns: &[&str]) {
    for name in columns {
        let idx = table.ensure_column(name);
        for row in &mut table.rows {
            let cell = std::mem::replace(&mut row[idx], Cell::Missing);
            row[idx] = cell.coerce_numeric();
        }
    }
}

/// Replace every numeric cell equal to `sentinel` with `Missing`.
pub fn replace_sentinel(table: &mut Table, sentinel: f64) {
    for cell in table.rows.iter_mut().flatten() {
        if cell.as_number() == Some(sentinel) {
            *cell = Cell::Missing;
        }
    }
}

/// `Unemployment_Rate = 100 * Unemployed_Population / Total_Labor_Force`,
/// `Missing` when either operand is missing or the labor force is zero.
pub fn derive_unemployment_rate(table: &mut Table) {
    let unemployed = table.ensure_column(UNEMPLOYED_COLUMN);
    let labor = table.ensure_column(LABOR_FORCE_COLUMN);
    let out = table.ensure_column(UNEMPLOYMENT_RATE_COLUMN);
    for row in &mut table.rows {
        row[out] = match (row[unemployed].as_number(), row[labor].as_number()) {
            (Some(n), Some(d)) if d != 0.0 => Cell::Number(100.0 * n / d),
            _ => Cell::Missing,
        };
    }
}

/// Keep every row of a place that has some `year` row with population at or
/// above `threshold`. Rows of other years are kept for qualifying places.
pub fn filter_by_population(table: Table, year: u16, threshold: f64) -> Table {
    let (Some(key), Some(year_idx), Some(pop)) = (
        table.column_index(PLACE_COLUMN),
        table.column_index(YEAR_COLUMN),
        table.column_index(POPULATION_COLUMN),
    ) else {
        return Table::new(table.columns);
    };

    let reference_year = f64::from(year);
    let qualifying: HashSet<String> = table
        .rows
        .iter()
        .filter(|row| row[year_idx].as_number() == Some(reference_year))
        .filter(|row| row[pop].as_number().is_some_and(|v| v >= threshold))
        .filter_map(|row| row[key].as_text().map(str::to_string))
        .collect();

    let Table { columns, rows } = table;
    let rows = rows
        .into_iter()
        .filter(|row| row[key].as_text().is_some_and(|k| qualifying.contains(k)))
        .collect();
    Table { columns, rows }
}

/// Split `City` on the first ", " into `City_Name` (designators stripped) and
/// `State`. A name without the delimiter keeps the whole value with a
/// missing state.
pub fn split_place_names(table: &mut Table) {
    let source = table.ensure_column(PLACE_COLUMN);
    let name_idx = table.ensure_column(PLACE_NAME_COLUMN);
    let state_idx = table.ensure_column(PLACE_STATE_COLUMN);

    for row in &mut table.rows {
        let (name, state) = match row[source].as_text() {
            Some(text) => match text.split_once(PLACE_DELIMITER) {
                Some((name, state)) => (Cell::text(strip_place_suffix(name)), Cell::text(state)),
                None => (Cell::text(strip_place_suffix(text)), Cell::Missing),
            },
            None => (Cell::Missing, Cell::Missing),
        };
        row[name_idx] = name;
        row[state_idx] = state;
    }
}

/// Drop trailing " city (balance)", " city", " town" and " village"
/// designators. Applying it twice changes nothing.
pub fn strip_place_suffix(name: &str) -> String {
    PLACE_SUFFIX.replace(name, "").into_owned()
}

/// Project onto `order`. Columns not listed are dropped; listed columns the
/// table lacks come out as `Missing`.
pub fn select_columns(table: Table, order: &[&str]) -> Table {
    let positions: Vec<Option<usize>> = order.iter().map(|c| table.column_index(c)).collect();
    let rows = table
        .rows
        .into_iter()
        .map(|row| {
            positions
                .iter()
                .map(|pos| pos.map(|i| row[i].clone()).unwrap_or(Cell::Missing))
                .collect()
        })
        .collect();
    Table {
        columns: order.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}
