//! Engine Facade
//!
//! The read/write boundary invoked by an external request-handling
//! collaborator. Owns the schema policy, the privacy bounds, the clustering
//! strategy and the single model slot; every operation here matches one
//! external endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::constants;
use crate::error::EngineError;
use crate::logic::aggregate::{self, ClusterOverview, ClusterSummary};
use crate::logic::cluster::{ClusterModel, ClusteringStrategy, KMeans};
use crate::logic::dataset::{Dataset, RawTable};
use crate::logic::privacy::PrivacyBounds;
use crate::logic::query;
use crate::logic::schema::SchemaPolicy;
use crate::logic::slot::{ModelSlot, ModelSnapshot};

pub mod responses;

pub use responses::{FitResponse, NameStats};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Engine configuration, fixed at process startup
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub policy: SchemaPolicy,
    pub bounds: PrivacyBounds,
    /// Attribute served by the name-stats operation
    pub name_attribute: String,
    /// Cluster count used when a fit request does not specify one
    pub default_clusters: Option<usize>,
}

impl EngineConfig {
    /// Config with environment overrides for everything but the policy
    pub fn from_env(policy: SchemaPolicy) -> Self {
        Self {
            policy,
            bounds: PrivacyBounds::from_env(),
            name_attribute: constants::get_name_attribute(),
            default_clusters: constants::get_default_clusters(),
        }
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct Engine {
    config: EngineConfig,
    strategy: Box<dyn ClusteringStrategy>,
    slot: ModelSlot,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine with the bundled k-means strategy.
    /// Fails once, at startup, when the policy is malformed.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_strategy(config, Box::new(KMeans::default()))
    }

    /// Build an engine with a custom clustering backend
    pub fn with_strategy(
        config: EngineConfig,
        strategy: Box<dyn ClusteringStrategy>,
    ) -> Result<Self, EngineError> {
        config.policy.validate()?;
        if !config.policy.is_queryable(&config.name_attribute) {
            return Err(EngineError::InvalidConfig(format!(
                "name attribute '{}' is not queryable",
                config.name_attribute
            )));
        }
        Ok(Self {
            config,
            strategy,
            slot: ModelSlot::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.slot.is_fitted()
    }

    /// Build a fresh Dataset + ClusterModel pair and atomically install it.
    /// On failure the previous model, if any, stays active.
    pub fn fit(
        &self,
        table: &RawTable,
        n_clusters: Option<usize>,
    ) -> Result<FitResponse, EngineError> {
        let dataset = Dataset::build(table, &self.config.policy)?;
        let model = ClusterModel::fit(
            &dataset,
            &self.config.policy.features,
            n_clusters,
            self.config.default_clusters,
            self.strategy.as_ref(),
        )?;

        let response = FitResponse {
            num_records: dataset.len(),
            num_clusters: model.k(),
            k_anonymity: self.config.bounds.k_anonymity,
            max_results: self.config.bounds.max_results,
        };
        self.slot.install(ModelSnapshot::new(dataset, model));
        Ok(response)
    }

    /// Single-attribute count over the configured name attribute
    pub fn stats_by_name(&self, name: &str) -> Result<NameStats, EngineError> {
        let snapshot = self.snapshot()?;
        let result = query::count_by_attribute(
            &snapshot.dataset,
            &self.config.policy,
            &self.config.bounds,
            &self.config.name_attribute,
            name,
        )?;
        Ok(NameStats {
            name: result.value,
            count: result.count,
            anonymized: result.anonymized,
            message: result.message,
        })
    }

    /// Multi-attribute cross query, logical AND over all filters
    pub fn stats_multi(
        &self,
        filters: &BTreeMap<String, String>,
    ) -> Result<query::FilterCount, EngineError> {
        let snapshot = self.snapshot()?;
        query::count_by_filters(
            &snapshot.dataset,
            &self.config.policy,
            &self.config.bounds,
            filters,
        )
    }

    /// Disclosable clusters with their sizes
    pub fn list_clusters(&self) -> Result<Vec<ClusterOverview>, EngineError> {
        let snapshot = self.snapshot()?;
        Ok(aggregate::list_clusters(&snapshot.model, &self.config.bounds))
    }

    /// Aggregate description of one cluster
    pub fn describe_cluster(&self, cluster_id: usize) -> Result<ClusterSummary, EngineError> {
        let snapshot = self.snapshot()?;
        aggregate::describe_cluster(
            &snapshot.dataset,
            &snapshot.model,
            &self.config.bounds,
            cluster_id,
        )
    }

    fn snapshot(&self) -> Result<Arc<ModelSnapshot>, EngineError> {
        self.slot.snapshot().ok_or(EngineError::NotFitted)
    }
}
