//! Features Module - Feature Matrix Encoding
//!
//! Turns records into the numeric matrix the clustering strategy consumes.
//! Categorical features are one-hot encoded with category order fixed at
//! fit time (first encounter), numeric features are z-score standardized
//! with fit-time means and deviations. The encoder is kept inside the
//! trained model so out-of-band vectors are encoded identically for assign.

use std::collections::HashSet;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::logic::dataset::{Dataset, Record};


/// One-hot category label used for missing categorical values
const MISSING_CATEGORY: &str = "UNKNOWN";

// ============================================================================
// ENCODED COLUMNS
// ============================================================================

/// One logical feature attribute expanded into matrix columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum EncodedColumn {
    /// Single column holding the raw numeric value (missing -> 0.0)
    Numeric { attr: String },
    /// One column per category, in first-encounter order at fit time
    OneHot { attr: String, categories: Vec<String> },
}

impl EncodedColumn {
    fn width(&self) -> usize {
        match self {
            EncodedColumn::Numeric { .. } => 1,
            EncodedColumn::OneHot { categories, .. } => categories.len(),
        }
    }
}

// ============================================================================
// FEATURE ENCODER
// ============================================================================

/// Reproducible record -> vector encoding, frozen at fit time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEncoder {
    columns: Vec<EncodedColumn>,
    /// Per matrix column, for standardization
    means: Vec<f64>,
    stds: Vec<f64>,
    width: usize,
}

impl FeatureEncoder {
    /// Learn the encoding from the dataset's feature attributes and return
    /// the encoder together with the standardized feature matrix.
    pub fn fit(
        dataset: &Dataset,
        feature_attrs: &[String],
    ) -> Result<(FeatureEncoder, Array2<f64>), EngineError> {
        let mut columns = Vec::with_capacity(feature_attrs.len());
        for attr in feature_attrs {
            if dataset.is_numeric(attr) {
                columns.push(EncodedColumn::Numeric { attr: attr.clone() });
            } else {
                columns.push(EncodedColumn::OneHot {
                    attr: attr.clone(),
                    categories: collect_categories(dataset, attr),
                });
            }
        }

        let width: usize = columns.iter().map(EncodedColumn::width).sum();
        if width == 0 {
            return Err(EngineError::InvalidConfig(
                "no usable feature columns".to_string(),
            ));
        }

        let n = dataset.len();
        let mut matrix = Array2::<f64>::zeros((n, width));
        for (i, record) in dataset.records().iter().enumerate() {
            fill_raw(&columns, record, &mut matrix.row_mut(i));
        }

        // Column-wise standardization (population std, zero-variance
        // columns left unscaled)
        let mut means = vec![0.0; width];
        let mut stds = vec![1.0; width];
        if n > 0 {
            for j in 0..width {
                let mut sum = 0.0;
                for i in 0..n {
                    sum += matrix[[i, j]];
                }
                let mean = sum / n as f64;
                let mut var = 0.0;
                for i in 0..n {
                    var += (matrix[[i, j]] - mean).powi(2);
                }
                let std = (var / n as f64).sqrt();
                means[j] = mean;
                stds[j] = if std > 0.0 { std } else { 1.0 };
            }
            for j in 0..width {
                for i in 0..n {
                    matrix[[i, j]] = (matrix[[i, j]] - means[j]) / stds[j];
                }
            }
        }

        let encoder = FeatureEncoder {
            columns,
            means,
            stds,
            width,
        };
        Ok((encoder, matrix))
    }

    /// Encode a single record with the fit-time encoding
    pub fn encode(&self, record: &Record) -> Array1<f64> {
        let mut row = Array1::<f64>::zeros(self.width);
        fill_raw(&self.columns, record, &mut row.view_mut());
        for j in 0..self.width {
            row[j] = (row[j] - self.means[j]) / self.stds[j];
        }
        row
    }

    /// Number of matrix columns
    pub fn width(&self) -> usize {
        self.width
    }
}

/// Distinct category values of a categorical attribute in first-encounter
/// order; missing values map to a dedicated category.
fn collect_categories(dataset: &Dataset, attr: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut categories = Vec::new();
    for record in dataset.records() {
        let label = category_label(record, attr);
        if seen.insert(label.clone()) {
            categories.push(label);
        }
    }
    categories
}

fn category_label(record: &Record, attr: &str) -> String {
    let value = record.get(attr);
    if value.is_missing() {
        return MISSING_CATEGORY.to_string();
    }
    match value.as_text() {
        Some(t) => t.to_string(),
        // Numeric value under a categorical attribute: use its display form
        None => value.as_number().map(|n| n.to_string()).unwrap_or_default(),
    }
}

/// Write the un-standardized encoding of one record into a row
fn fill_raw(
    columns: &[EncodedColumn],
    record: &Record,
    row: &mut ndarray::ArrayViewMut1<'_, f64>,
) {
    let mut offset = 0;
    for column in columns {
        match column {
            EncodedColumn::Numeric { attr } => {
                row[offset] = record.get(attr).as_number().unwrap_or(0.0);
                offset += 1;
            }
            EncodedColumn::OneHot { attr, categories } => {
                let label = category_label(record, attr);
                for (c, category) in categories.iter().enumerate() {
                    row[offset + c] = if *category == label { 1.0 } else { 0.0 };
                }
                offset += categories.len();
            }
        }
    }
}
