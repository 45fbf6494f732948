//! Facade response payloads

use serde::{Deserialize, Serialize};

/// Result of a successful fit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitResponse {
    pub num_records: usize,
    pub num_clusters: usize,
    pub k_anonymity: usize,
    pub max_results: usize,
}

/// Name-stats result, the single-attribute query case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameStats {
    pub name: String,
    pub count: usize,
    pub anonymized: bool,
    pub message: String,
}
