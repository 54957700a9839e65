//! Write tables to CSV.
//!
//! Header row is the table's column list; `Missing` cells are empty fields.
//! Existing files are overwritten.

use std::path::Path;

use crate::error::AppError;
use crate::table::{Cell, Table};

/// Write a table to a CSV file.
pub fn write_table_csv(path: &Path, table: &Table) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::output(format!("Failed to create output CSV '{}': {e}", path.display()))
    })?;

    writer
        .write_record(table.columns())
        .map_err(|e| AppError::output(format!("Failed to write output CSV header: {e}")))?;

    for row in table.rows() {
        writer
            .write_record(row.iter().map(Cell::to_field))
            .map_err(|e| AppError::output(format!("Failed to write output CSV row: {e}")))?;
    }

    writer.flush().map_err(|e| {
        AppError::output(format!("Failed to flush output CSV '{}': {e}", path.display()))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let mut table = Table::new(vec!["year".into(), "City_Name".into(), "Total_Population".into()]);
        table.push_row(vec![Cell::Number(2020.0), Cell::text("Akron"), Cell::Number(190273.0)]);
        table.push_row(vec![Cell::Number(2021.0), Cell::text("Salem, Town of"), Cell::Missing]);
        table
    }

    #[test]
    fn writes_header_rows_and_empty_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_table_csv(&path, &sample_table()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "year,City_Name,Total_Population\n2020,Akron,190273\n2021,\"Salem, Town of\",\n"
        );
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale contents that are much longer than the new file\n").unwrap();

        write_table_csv(&path, &Table::new(vec!["only".into()])).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "only\n");
    }

    #[test]
    fn unwritable_path_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.csv");

        let err = write_table_csv(&path, &sample_table()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_OUTPUT);
    }
}
