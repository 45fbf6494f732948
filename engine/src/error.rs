//! Engine Error Taxonomy
//!
//! Fatal errors abort only the triggering operation; the shared model slot
//! is never left partially updated. Privacy suppression and blocking are
//! NOT errors - they are normal responses (see `logic::privacy`).

use std::fmt;

/// All failure modes surfaced by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed schema policy, detected once at configuration time
    InvalidConfig(String),
    /// A declared feature/queryable/derivation-source attribute is absent
    /// from the raw input
    SchemaViolation(String),
    /// Cannot form the requested number of non-empty clusters
    InsufficientData { records: usize, clusters: usize },
    /// Queried attribute is not in the queryable set
    UnknownAttribute(String),
    /// Cluster id outside 0..K
    ClusterNotFound(usize),
    /// Cluster exists but its size is below the k-anonymity bound
    PrivacyBlocked,
    /// Read operation before any successful fit
    NotFitted,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            EngineError::SchemaViolation(msg) => write!(f, "Schema violation: {}", msg),
            EngineError::InsufficientData { records, clusters } => write!(
                f,
                "Insufficient data: cannot form {} non-empty clusters from {} records",
                clusters, records
            ),
            EngineError::UnknownAttribute(attr) => {
                write!(f, "Attribute '{}' is not queryable", attr)
            }
            EngineError::ClusterNotFound(id) => write!(f, "Cluster {} not found", id),
            EngineError::PrivacyBlocked => {
                write!(f, "Cluster too small for disclosure (k-anonymity)")
            }
            EngineError::NotFitted => {
                write!(f, "Model not fitted yet; run a fit operation first")
            }
        }
    }
}

impl std::error::Error for EngineError {}
