use super::{AttrValue, Dataset, RawTable};
use crate::error::EngineError;
use crate::logic::schema::{AttributeKind, DerivationRule, DerivedAttribute, SchemaPolicy};

fn policy() -> SchemaPolicy {
    SchemaPolicy {
        sensitive: ["national_id".to_string(), "address".to_string()].into(),
        features: vec!["age".to_string(), "income".to_string()],
        queryable: ["name".to_string(), "city".to_string()].into(),
        kinds: [
            ("age".to_string(), AttributeKind::Numeric),
            ("income".to_string(), AttributeKind::Numeric),
            ("name".to_string(), AttributeKind::Categorical),
            ("city".to_string(), AttributeKind::Categorical),
        ]
        .into(),
        derived: vec![DerivedAttribute {
            name: "city".to_string(),
            source: "address".to_string(),
            rule: DerivationRule::SegmentFromEnd {
                separator: ',',
                index: 0,
            },
        }],
    }
}

fn table() -> RawTable {
    RawTable {
        headers: vec![
            "national_id".to_string(),
            "name".to_string(),
            "age".to_string(),
            "income".to_string(),
            "address".to_string(),
        ],
        rows: vec![
            vec![
                AttrValue::Text("123-45".to_string()),
                AttrValue::Text("Juan".to_string()),
                AttrValue::Number(34.0),
                AttrValue::Number(52000.0),
                AttrValue::Text("12 Main St, Porto Alegre".to_string()),
            ],
            vec![
                AttrValue::Text("678-90".to_string()),
                AttrValue::Text("Alan".to_string()),
                AttrValue::Number(41.0),
                AttrValue::Missing,
                AttrValue::Text("7 Oak Ave, Curitiba".to_string()),
            ],
        ],
    }
}

#[test]
fn test_sensitive_attributes_never_stored() {
    let dataset = Dataset::build(&table(), &policy()).unwrap();
    for record in dataset.records() {
        assert!(!record.has("national_id"));
        assert!(!record.has("address"));
    }
}

#[test]
fn test_derived_attribute_computed() {
    let dataset = Dataset::build(&table(), &policy()).unwrap();
    assert_eq!(
        dataset.records()[0].get("city"),
        &AttrValue::Text("Porto Alegre".to_string())
    );
    assert_eq!(
        dataset.records()[1].get("city"),
        &AttrValue::Text("Curitiba".to_string())
    );
}

#[test]
fn test_only_declared_attributes_retained() {
    let dataset = Dataset::build(&table(), &policy()).unwrap();
    let record = &dataset.records()[0];
    let mut attrs: Vec<&str> = record.attributes().collect();
    attrs.sort_unstable();
    assert_eq!(attrs, vec!["age", "city", "income", "name"]);
}

#[test]
fn test_missing_required_column_is_schema_violation() {
    let mut t = table();
    t.headers.retain(|h| h != "income");
    for row in &mut t.rows {
        row.remove(3);
    }
    let err = Dataset::build(&t, &policy()).unwrap_err();
    assert!(matches!(err, EngineError::SchemaViolation(_)));
}

#[test]
fn test_attribute_kind_partition() {
    let dataset = Dataset::build(&table(), &policy()).unwrap();
    assert_eq!(dataset.numeric_attrs(), &["age".to_string(), "income".to_string()]);
    let mut categorical = dataset.categorical_attrs().to_vec();
    categorical.sort_unstable();
    assert_eq!(categorical, vec!["city".to_string(), "name".to_string()]);
}

#[test]
fn test_value_matching() {
    assert!(AttrValue::Text("Juan".to_string()).matches("juan"));
    assert!(!AttrValue::Text("Juan".to_string()).matches("juana"));
    assert!(AttrValue::Number(34.0).matches("34"));
    assert!(!AttrValue::Number(34.0).matches("35"));
    assert!(!AttrValue::Missing.matches(""));
}

#[test]
fn test_empty_table_builds_empty_dataset() {
    let t = RawTable {
        headers: table().headers,
        rows: vec![],
    };
    let dataset = Dataset::build(&t, &policy()).unwrap();
    assert!(dataset.is_empty());
}
