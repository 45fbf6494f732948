//! Cluster report handlers
//!
//! Below-threshold clusters are invisible in the listing and return the
//! same denial as unknown ids on detail lookups (no existence oracle).

use axum::{
    extract::{Path, State},
    Json,
};
use veil_engine::logic::aggregate::{ClusterOverview, ClusterSummary};

use crate::error::AppResult;
use crate::AppState;

/// List disclosable clusters with their sizes
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<ClusterOverview>>> {
    Ok(Json(state.engine.list_clusters()?))
}

/// Aggregate detail for one cluster
pub async fn detail(
    State(state): State<AppState>,
    Path(cluster_id): Path<usize>,
) -> AppResult<Json<ClusterSummary>> {
    Ok(Json(state.engine.describe_cluster(cluster_id)?))
}
