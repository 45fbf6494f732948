//! Query Engine Module
//!
//! Named-attribute point queries and multi-attribute cross queries.
//! Attribute names are checked against the queryable set BEFORE any scan;
//! raw counts pass through the privacy guard before leaving.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::logic::dataset::Dataset;
use crate::logic::privacy::{enforce, PrivacyBounds};
use crate::logic::schema::SchemaPolicy;

// ============================================================================
// RESPONSES
// ============================================================================

/// Single-attribute query result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeCount {
    pub attribute: String,
    pub value: String,
    pub count: usize,
    pub anonymized: bool,
    pub message: String,
}

/// Cross-query result (logical AND over all filters)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterCount {
    pub filters: BTreeMap<String, String>,
    pub count: usize,
    pub anonymized: bool,
    pub message: String,
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Reject any attribute outside the queryable set
pub fn check_queryable<'a>(
    policy: &SchemaPolicy,
    attrs: impl IntoIterator<Item = &'a str>,
) -> Result<(), EngineError> {
    for attr in attrs {
        if !policy.is_queryable(attr) {
            return Err(EngineError::UnknownAttribute(attr.to_string()));
        }
    }
    Ok(())
}

/// Count records matching ALL filters. An empty filter set matches the
/// whole dataset; bounding that disclosure is the guard's job, rejecting
/// it outright is the caller's.
pub fn count_matching(dataset: &Dataset, filters: &BTreeMap<String, String>) -> usize {
    dataset
        .records()
        .iter()
        .filter(|record| filters.iter().all(|(attr, value)| record.get(attr).matches(value)))
        .count()
}

/// Count records where `attribute == value`, privacy-gated
pub fn count_by_attribute(
    dataset: &Dataset,
    policy: &SchemaPolicy,
    bounds: &PrivacyBounds,
    attribute: &str,
    value: &str,
) -> Result<AttributeCount, EngineError> {
    check_queryable(policy, [attribute])?;

    let mut filters = BTreeMap::new();
    filters.insert(attribute.to_string(), value.to_string());
    let count = count_matching(dataset, &filters);

    let guarded = enforce(
        count,
        bounds,
        format!("{} records match {} = {}.", count, attribute, value),
    );
    Ok(AttributeCount {
        attribute: attribute.to_string(),
        value: value.to_string(),
        count: guarded.count,
        anonymized: guarded.anonymized,
        message: guarded.message,
    })
}

/// Count records matching all attribute/value pairs, privacy-gated
pub fn count_by_filters(
    dataset: &Dataset,
    policy: &SchemaPolicy,
    bounds: &PrivacyBounds,
    filters: &BTreeMap<String, String>,
) -> Result<FilterCount, EngineError> {
    check_queryable(policy, filters.keys().map(String::as_str))?;

    let count = count_matching(dataset, filters);
    let guarded = enforce(
        count,
        bounds,
        format!("{} records match all {} filters.", count, filters.len()),
    );
    Ok(FilterCount {
        filters: filters.clone(),
        count: guarded.count,
        anonymized: guarded.anonymized,
        message: guarded.message,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::dataset::{AttrValue, RawTable};
    use crate::logic::schema::AttributeKind;

    fn policy() -> SchemaPolicy {
        SchemaPolicy {
            sensitive: Default::default(),
            features: vec!["age".to_string()],
            queryable: ["name".to_string(), "city".to_string()].into(),
            kinds: [
                ("age".to_string(), AttributeKind::Numeric),
                ("name".to_string(), AttributeKind::Categorical),
                ("city".to_string(), AttributeKind::Categorical),
            ]
            .into(),
            derived: vec![],
        }
    }

    fn dataset() -> Dataset {
        let rows = [
            ("Juan", "Porto Alegre", 30.0),
            ("Juan", "Curitiba", 31.0),
            ("Juan", "Porto Alegre", 32.0),
            ("Alan", "Porto Alegre", 33.0),
        ]
        .iter()
        .map(|(name, city, age)| {
            vec![
                AttrValue::Text(name.to_string()),
                AttrValue::Text(city.to_string()),
                AttrValue::Number(*age),
            ]
        })
        .collect();
        let table = RawTable {
            headers: vec!["name".to_string(), "city".to_string(), "age".to_string()],
            rows,
        };
        Dataset::build(&table, &policy()).unwrap()
    }

    fn open_bounds() -> PrivacyBounds {
        PrivacyBounds {
            k_anonymity: 1,
            max_results: 4000,
        }
    }

    #[test]
    fn test_count_by_attribute_case_insensitive() {
        let result =
            count_by_attribute(&dataset(), &policy(), &open_bounds(), "name", "juan").unwrap();
        assert_eq!(result.count, 3);
        assert!(result.anonymized);
    }

    #[test]
    fn test_unknown_attribute_rejected_before_scan() {
        let err = count_by_attribute(&dataset(), &policy(), &open_bounds(), "age", "30")
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownAttribute("age".to_string()));
    }

    #[test]
    fn test_cross_query_is_logical_and() {
        let mut filters = BTreeMap::new();
        filters.insert("name".to_string(), "Juan".to_string());
        filters.insert("city".to_string(), "Porto Alegre".to_string());
        let result = count_by_filters(&dataset(), &policy(), &open_bounds(), &filters).unwrap();
        assert_eq!(result.count, 2);
    }

    #[test]
    fn test_cross_query_rejects_unknown_attribute() {
        let mut filters = BTreeMap::new();
        filters.insert("name".to_string(), "Juan".to_string());
        filters.insert("age".to_string(), "30".to_string());
        let err = count_by_filters(&dataset(), &policy(), &open_bounds(), &filters).unwrap_err();
        assert_eq!(err, EngineError::UnknownAttribute("age".to_string()));
    }

    #[test]
    fn test_empty_filter_set_matches_everything() {
        let filters = BTreeMap::new();
        assert_eq!(count_matching(&dataset(), &filters), 4);
    }

    #[test]
    fn test_small_count_suppressed() {
        let bounds = PrivacyBounds {
            k_anonymity: 10,
            max_results: 4000,
        };
        let result = count_by_attribute(&dataset(), &policy(), &bounds, "name", "Alan").unwrap();
        assert_eq!(result.count, 0);
        assert!(result.anonymized);
        assert!(result.message.contains("suppressed"));
    }
}
