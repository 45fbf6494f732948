//! Fit handler - reload the CSV and retrain the cluster model

use axum::{extract::State, Json};
use serde::Deserialize;
use veil_engine::api::FitResponse;

use crate::error::{AppError, AppResult};
use crate::{ingest, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct FitRequest {
    pub n_clusters: Option<usize>,
}

/// Rebuild the dataset and model from the configured CSV. The body is
/// optional; without it the configured or heuristic cluster count is used.
/// Runs on the blocking pool since fit time grows with the dataset.
pub async fn fit(
    State(state): State<AppState>,
    body: Option<Json<FitRequest>>,
) -> AppResult<Json<FitResponse>> {
    let n_clusters = body.and_then(|Json(request)| request.n_clusters);
    let engine = state.engine.clone();
    let data_path = state.config.data_path.clone();

    let response = tokio::task::spawn_blocking(move || -> Result<FitResponse, AppError> {
        let table =
            ingest::load_table(&data_path).map_err(|e| AppError::FitRejected(e.to_string()))?;
        Ok(engine.fit(&table, n_clusters)?)
    })
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))??;

    tracing::info!(
        num_records = response.num_records,
        num_clusters = response.num_clusters,
        "model refitted"
    );
    Ok(Json(response))
}
