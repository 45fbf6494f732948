//! Schema Policy Module
//!
//! Declares which attributes are sensitive (never stored, never features),
//! which are clustering features, which are queryable filters, and how
//! derived attributes are computed. Pure configuration: fixed at startup,
//! immutable thereafter, validated once.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::logic::dataset::AttrValue;

// ============================================================================
// ATTRIBUTE KINDS
// ============================================================================

/// Declared kind of an attribute. Never inferred downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Numeric,
    Categorical,
}

// ============================================================================
// DERIVATION RULES
// ============================================================================

/// Rule for computing a derived attribute from a raw source attribute.
///
/// The typical use is deriving a coarse attribute (city) from a sensitive
/// one (full address) before the source is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationRule {
    /// Take the index-th separator-delimited segment, counted from the start
    SegmentFromStart { separator: char, index: usize },
    /// Take the index-th separator-delimited segment, counted from the end
    SegmentFromEnd { separator: char, index: usize },
}

impl DerivationRule {
    /// Apply the rule to a raw value. Non-text or missing input derives
    /// a missing value.
    pub fn apply(&self, value: &AttrValue) -> AttrValue {
        let text = match value.as_text() {
            Some(t) => t,
            None => return AttrValue::Missing,
        };
        let segment = match self {
            DerivationRule::SegmentFromStart { separator, index } => {
                text.split(*separator).nth(*index)
            }
            DerivationRule::SegmentFromEnd { separator, index } => {
                text.rsplit(*separator).nth(*index)
            }
        };
        match segment.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => AttrValue::Text(s.to_string()),
            None => AttrValue::Missing,
        }
    }
}

/// A derived attribute: name, raw source attribute, and derivation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedAttribute {
    pub name: String,
    pub source: String,
    pub rule: DerivationRule,
}

// ============================================================================
// SCHEMA POLICY
// ============================================================================

/// Attribute classification policy (loadable from a JSON config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaPolicy {
    /// Attributes permanently excluded from storage, clustering and output
    pub sensitive: HashSet<String>,
    /// Ordered clustering features
    pub features: Vec<String>,
    /// Attributes accepted as query filters
    pub queryable: HashSet<String>,
    /// Declared kind for every feature/queryable/derived attribute
    pub kinds: HashMap<String, AttributeKind>,
    /// Derived attributes appended at dataset construction
    #[serde(default)]
    pub derived: Vec<DerivedAttribute>,
}

impl SchemaPolicy {
    pub fn is_sensitive(&self, attr: &str) -> bool {
        self.sensitive.contains(attr)
    }

    pub fn is_feature(&self, attr: &str) -> bool {
        self.features.iter().any(|f| f == attr)
    }

    pub fn is_queryable(&self, attr: &str) -> bool {
        self.queryable.contains(attr)
    }

    pub fn kind_of(&self, attr: &str) -> Option<AttributeKind> {
        self.kinds.get(attr).copied()
    }

    /// All attributes a record retains after construction:
    /// features, queryables and derived outputs. Sensitive attributes are
    /// excluded by the disjointness invariants.
    pub fn retained_attributes(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut retained = Vec::new();
        let derived_names = self.derived.iter().map(|d| d.name.as_str());
        for attr in self
            .features
            .iter()
            .map(String::as_str)
            .chain(self.queryable.iter().map(String::as_str))
            .chain(derived_names)
        {
            if seen.insert(attr.to_string()) {
                retained.push(attr.to_string());
            }
        }
        retained
    }

    /// Raw attributes that MUST be present in the input table:
    /// every feature, queryable and derivation source that is not itself
    /// produced by a derivation.
    pub fn required_raw_attributes(&self) -> Vec<String> {
        let derived_names: HashSet<&str> = self.derived.iter().map(|d| d.name.as_str()).collect();
        let mut seen = HashSet::new();
        let mut required = Vec::new();
        for attr in self
            .features
            .iter()
            .map(String::as_str)
            .chain(self.queryable.iter().map(String::as_str))
            .chain(self.derived.iter().map(|d| d.source.as_str()))
        {
            if !derived_names.contains(attr) && seen.insert(attr.to_string()) {
                required.push(attr.to_string());
            }
        }
        required
    }

    /// Validate the policy once at configuration time.
    ///
    /// Invariants: sensitive is disjoint from features and queryables,
    /// derived outputs are not sensitive, at least one feature exists, and
    /// every retained attribute has a declared kind.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.features.is_empty() {
            return Err(EngineError::InvalidConfig(
                "at least one feature attribute is required".to_string(),
            ));
        }
        for attr in &self.features {
            if self.sensitive.contains(attr) {
                return Err(EngineError::InvalidConfig(format!(
                    "attribute '{}' is both sensitive and a feature",
                    attr
                )));
            }
        }
        for attr in &self.queryable {
            if self.sensitive.contains(attr) {
                return Err(EngineError::InvalidConfig(format!(
                    "attribute '{}' is both sensitive and queryable",
                    attr
                )));
            }
        }
        for d in &self.derived {
            if self.sensitive.contains(&d.name) {
                return Err(EngineError::InvalidConfig(format!(
                    "derived attribute '{}' is declared sensitive",
                    d.name
                )));
            }
        }
        for attr in self.retained_attributes() {
            if !self.kinds.contains_key(&attr) {
                return Err(EngineError::InvalidConfig(format!(
                    "no kind declared for attribute '{}'",
                    attr
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
