//! Anonymized record: attribute -> value, non-sensitive attributes only.
//! No identifier is retained beyond the ordinal index inside the Dataset.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::AttrValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    values: HashMap<String, AttrValue>,
}

impl Record {
    pub fn new(values: HashMap<String, AttrValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, attr: &str) -> &AttrValue {
        self.values.get(attr).unwrap_or(&AttrValue::Missing)
    }

    pub fn has(&self, attr: &str) -> bool {
        self.values.contains_key(attr)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
