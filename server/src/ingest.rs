//! CSV Ingestion
//!
//! Loads the raw CSV into a `RawTable` for the engine. Column typing is
//! decided per column, once: numeric when every non-empty cell parses as a
//! number, text otherwise. Empty cells become missing values. No schema
//! logic lives here; dropping sensitive columns is the engine's job.

use std::fmt;
use std::path::Path;

use veil_engine::logic::dataset::{AttrValue, RawTable};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum IngestError {
    NotFound(String),
    EmptyDataset(String),
    Csv(String),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::NotFound(path) => write!(f, "Data file not found: {}", path),
            IngestError::EmptyDataset(path) => write!(f, "Dataset is empty: {}", path),
            IngestError::Csv(msg) => write!(f, "CSV error: {}", msg),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::Csv(err.to_string())
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Load and type a CSV file
pub fn load_table(path: &Path) -> Result<RawTable, IngestError> {
    if !path.exists() {
        return Err(IngestError::NotFound(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        raw_rows.push(record.iter().map(str::to_string).collect());
    }

    if raw_rows.is_empty() {
        return Err(IngestError::EmptyDataset(path.display().to_string()));
    }

    let numeric = numeric_columns(&headers, &raw_rows);
    let rows = raw_rows
        .into_iter()
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(col, _)| cell_value(row.get(col), numeric[col]))
                .collect()
        })
        .collect();

    tracing::info!(
        "loaded {} columns from {}",
        headers.len(),
        path.display()
    );
    Ok(RawTable { headers, rows })
}

/// A column is numeric when every non-empty cell parses as f64
fn numeric_columns(headers: &[String], rows: &[Vec<String>]) -> Vec<bool> {
    (0..headers.len())
        .map(|col| {
            let mut any_value = false;
            for row in rows {
                match row.get(col).map(String::as_str) {
                    None | Some("") => continue,
                    Some(cell) => {
                        if cell.parse::<f64>().is_err() {
                            return false;
                        }
                        any_value = true;
                    }
                }
            }
            any_value
        })
        .collect()
}

fn cell_value(cell: Option<&String>, numeric: bool) -> AttrValue {
    match cell.map(String::as_str) {
        None | Some("") => AttrValue::Missing,
        Some(text) => {
            if numeric {
                match text.parse::<f64>() {
                    Ok(n) => AttrValue::Number(n),
                    Err(_) => AttrValue::Missing,
                }
            } else {
                AttrValue::Text(text.to_string())
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
