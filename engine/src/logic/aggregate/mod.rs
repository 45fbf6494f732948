//! Aggregation Reporter Module
//!
//! Per-cluster summaries filtered through the privacy bounds. Clusters
//! below the k-anonymity bound are invisible in listings and access-denied
//! on detail lookups; summaries carry numeric means and categorical modes
//! computed over member records only, never row-level data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::logic::cluster::ClusterModel;
use crate::logic::dataset::Dataset;
use crate::logic::privacy::PrivacyBounds;

// ============================================================================
// SUMMARIES
// ============================================================================

/// Listing entry: id and size only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterOverview {
    pub cluster_id: usize,
    pub size: usize,
}

/// Aggregate description of one cluster. Derived on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_id: usize,
    pub size: usize,
    /// Mean per numeric attribute; None when every member value is missing
    pub numeric_means: BTreeMap<String, Option<f64>>,
    /// Most frequent value per categorical attribute, ties broken by
    /// first-encountered value order within the cluster
    pub categorical_modes: BTreeMap<String, Option<String>>,
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// List every cluster whose size meets the k-anonymity bound. Smaller
/// clusters are omitted entirely, not marked.
pub fn list_clusters(model: &ClusterModel, bounds: &PrivacyBounds) -> Vec<ClusterOverview> {
    model
        .sizes()
        .iter()
        .enumerate()
        .filter(|(_, &size)| size >= bounds.k_anonymity)
        .map(|(cluster_id, &size)| ClusterOverview { cluster_id, size })
        .collect()
}

/// Describe one cluster.
///
/// Out-of-range ids fail with `ClusterNotFound`; valid but below-bound
/// clusters fail with `PrivacyBlocked`. The HTTP surface conflates the two
/// into one denial signal; the engine keeps them distinct.
pub fn describe_cluster(
    dataset: &Dataset,
    model: &ClusterModel,
    bounds: &PrivacyBounds,
    cluster_id: usize,
) -> Result<ClusterSummary, EngineError> {
    let size = model
        .size_of(cluster_id)
        .ok_or(EngineError::ClusterNotFound(cluster_id))?;
    if size < bounds.k_anonymity {
        return Err(EngineError::PrivacyBlocked);
    }
    Ok(summarize(dataset, model, cluster_id, size))
}

fn summarize(
    dataset: &Dataset,
    model: &ClusterModel,
    cluster_id: usize,
    size: usize,
) -> ClusterSummary {
    let members: Vec<usize> = model.members(cluster_id).collect();

    let mut numeric_means = BTreeMap::new();
    for attr in dataset.numeric_attrs() {
        let values: Vec<f64> = members
            .iter()
            .filter_map(|&i| dataset.records()[i].get(attr).as_number())
            .collect();
        let mean = if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        };
        numeric_means.insert(attr.clone(), mean);
    }

    let mut categorical_modes = BTreeMap::new();
    for attr in dataset.categorical_attrs() {
        categorical_modes.insert(attr.clone(), mode_of(dataset, &members, attr));
    }

    ClusterSummary {
        cluster_id,
        size,
        numeric_means,
        categorical_modes,
    }
}

/// Most frequent non-missing value; ties keep the value seen first in
/// member record order.
fn mode_of(dataset: &Dataset, members: &[usize], attr: &str) -> Option<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for &i in members {
        let value = dataset.records()[i].get(attr);
        if value.is_missing() {
            continue;
        }
        let label = match value.as_text() {
            Some(t) => t.to_string(),
            None => match value.as_number() {
                Some(n) => n.to_string(),
                None => continue,
            },
        };
        let entry = counts.entry(label.clone()).or_insert(0);
        if *entry == 0 {
            order.push(label);
        }
        *entry += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for label in &order {
        let count = counts[label];
        // Strictly greater keeps the earliest value on ties
        if best.map_or(true, |(_, b)| count > b) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.to_string())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::cluster::KMeans;
    use crate::logic::dataset::{AttrValue, RawTable};
    use crate::logic::schema::{AttributeKind, SchemaPolicy};

    fn policy() -> SchemaPolicy {
        SchemaPolicy {
            sensitive: Default::default(),
            features: vec!["age".to_string()],
            queryable: ["city".to_string()].into(),
            kinds: [
                ("age".to_string(), AttributeKind::Numeric),
                ("city".to_string(), AttributeKind::Categorical),
            ]
            .into(),
            derived: vec![],
        }
    }

    /// Two tight age groups: 12 young records and 3 old ones, so a 2-way
    /// split yields one disclosable and one hidden cluster under k=10.
    fn fitted() -> (Dataset, ClusterModel) {
        let mut rows = Vec::new();
        for i in 0..12 {
            rows.push(vec![
                AttrValue::Number(20.0 + (i % 3) as f64),
                AttrValue::Text(if i % 3 == 0 { "Curitiba" } else { "Porto Alegre" }.to_string()),
            ]);
        }
        for i in 0..3 {
            rows.push(vec![
                AttrValue::Number(80.0 + i as f64),
                AttrValue::Text("Recife".to_string()),
            ]);
        }
        let table = RawTable {
            headers: vec!["age".to_string(), "city".to_string()],
            rows,
        };
        let dataset = Dataset::build(&table, &policy()).unwrap();
        let model = ClusterModel::fit(
            &dataset,
            &["age".to_string()],
            Some(2),
            None,
            &KMeans::default(),
        )
        .unwrap();
        (dataset, model)
    }

    fn bounds() -> PrivacyBounds {
        PrivacyBounds {
            k_anonymity: 10,
            max_results: 4000,
        }
    }

    #[test]
    fn test_listing_hides_small_clusters() {
        let (_, model) = fitted();
        let listed = list_clusters(&model, &bounds());
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].size, 12);
    }

    #[test]
    fn test_all_sizes_sum_to_record_count() {
        let (dataset, model) = fitted();
        assert_eq!(model.sizes().iter().sum::<usize>(), dataset.len());
    }

    #[test]
    fn test_describe_unknown_cluster() {
        let (dataset, model) = fitted();
        let err = describe_cluster(&dataset, &model, &bounds(), 99).unwrap_err();
        assert_eq!(err, EngineError::ClusterNotFound(99));
    }

    #[test]
    fn test_describe_small_cluster_is_privacy_blocked() {
        let (dataset, model) = fitted();
        let small = (0..model.k())
            .find(|&c| model.size_of(c).unwrap() < 10)
            .unwrap();
        let err = describe_cluster(&dataset, &model, &bounds(), small).unwrap_err();
        assert_eq!(err, EngineError::PrivacyBlocked);
    }

    #[test]
    fn test_summary_keys_match_declared_attributes() {
        let (dataset, model) = fitted();
        let big = (0..model.k())
            .find(|&c| model.size_of(c).unwrap() >= 10)
            .unwrap();
        let summary = describe_cluster(&dataset, &model, &bounds(), big).unwrap();

        let numeric_keys: Vec<&String> = summary.numeric_means.keys().collect();
        assert_eq!(numeric_keys, vec!["age"]);
        let categorical_keys: Vec<&String> = summary.categorical_modes.keys().collect();
        assert_eq!(categorical_keys, vec!["city"]);
        assert_eq!(summary.size, 12);
        assert_eq!(
            summary.categorical_modes["city"],
            Some("Porto Alegre".to_string())
        );
        let mean = summary.numeric_means["age"].unwrap();
        assert!(mean > 20.0 && mean < 22.0);
    }

    #[test]
    fn test_mode_tie_keeps_first_encountered() {
        let p = SchemaPolicy {
            queryable: ["city".to_string()].into(),
            ..policy()
        };
        let table = RawTable {
            headers: vec!["age".to_string(), "city".to_string()],
            rows: vec![
                vec![AttrValue::Number(1.0), AttrValue::Text("b-city".to_string())],
                vec![AttrValue::Number(1.0), AttrValue::Text("a-city".to_string())],
            ],
        };
        let dataset = Dataset::build(&table, &p).unwrap();
        // Both values occur once; first-encountered wins over lexical order
        assert_eq!(
            mode_of(&dataset, &[0, 1], "city"),
            Some("b-city".to_string())
        );
    }
}
