//! Dataset Module - Anonymized In-Memory Records
//!
//! Dataset construction is the single choke point that makes the rest of
//! the system safe to query freely: sensitive columns are dropped here,
//! derived attributes are computed here, and only declared attributes are
//! retained. A Dataset is immutable once built; a reload produces a fresh
//! instance.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::logic::schema::{AttributeKind, SchemaPolicy};

pub mod record;

#[cfg(test)]
mod tests;

pub use record::Record;

// ============================================================================
// VALUES AND RAW INPUT
// ============================================================================

/// A single scalar cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Text(String),
    Missing,
}

impl AttrValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AttrValue::Missing)
    }

    /// Filter matching: case-insensitive for text, numeric equality for
    /// numbers. Missing never matches.
    pub fn matches(&self, query: &str) -> bool {
        match self {
            AttrValue::Text(t) => t.eq_ignore_ascii_case(query),
            AttrValue::Number(n) => query.parse::<f64>().map_or(false, |q| (q - *n).abs() == 0.0),
            AttrValue::Missing => false,
        }
    }
}

/// Raw tabular input, already parsed by an external ingestion collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<AttrValue>>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// DATASET
// ============================================================================

/// Immutable, anonymized record collection
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    /// Retained attributes declared numeric
    numeric_attrs: Vec<String>,
    /// Retained attributes declared categorical
    categorical_attrs: Vec<String>,
}

impl Dataset {
    /// Build a Dataset from raw rows under the given policy.
    ///
    /// Per row: drop every sensitive attribute, compute every derived
    /// attribute, retain only feature/queryable/derived attributes.
    /// Fails with `SchemaViolation` when a required raw column is absent.
    pub fn build(table: &RawTable, policy: &SchemaPolicy) -> Result<Dataset, EngineError> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        for (i, header) in table.headers.iter().enumerate() {
            index.insert(header.as_str(), i);
        }

        for required in policy.required_raw_attributes() {
            if !index.contains_key(required.as_str()) {
                return Err(EngineError::SchemaViolation(format!(
                    "required attribute '{}' is absent from the input",
                    required
                )));
            }
        }

        let retained = policy.retained_attributes();
        let mut records = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let mut values = HashMap::with_capacity(retained.len());

            for attr in &retained {
                // Derived outputs may shadow a raw column of the same name;
                // they are filled in below.
                if let Some(&col) = index.get(attr.as_str()) {
                    let value = row.get(col).cloned().unwrap_or(AttrValue::Missing);
                    values.insert(attr.clone(), value);
                }
            }

            for d in &policy.derived {
                let source = index
                    .get(d.source.as_str())
                    .and_then(|&col| row.get(col))
                    .cloned()
                    .unwrap_or(AttrValue::Missing);
                values.insert(d.name.clone(), d.rule.apply(&source));
            }

            records.push(Record::new(values));
        }

        let mut numeric_attrs = Vec::new();
        let mut categorical_attrs = Vec::new();
        for attr in retained {
            match policy.kind_of(&attr) {
                Some(AttributeKind::Numeric) => numeric_attrs.push(attr),
                Some(AttributeKind::Categorical) => categorical_attrs.push(attr),
                None => {
                    return Err(EngineError::InvalidConfig(format!(
                        "no kind declared for attribute '{}'",
                        attr
                    )))
                }
            }
        }

        Ok(Dataset {
            records,
            numeric_attrs,
            categorical_attrs,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn numeric_attrs(&self) -> &[String] {
        &self.numeric_attrs
    }

    pub fn categorical_attrs(&self) -> &[String] {
        &self.categorical_attrs
    }

    pub fn is_numeric(&self, attr: &str) -> bool {
        self.numeric_attrs.iter().any(|a| a == attr)
    }
}
