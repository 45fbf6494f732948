//! Statistics handlers - privacy-gated counting queries

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use veil_engine::api::NameStats;
use veil_engine::logic::query::FilterCount;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Aggregated count for one name, e.g. GET /stats/name/Juan
pub async fn by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<NameStats>> {
    Ok(Json(state.engine.stats_by_name(&name)?))
}

/// Cross query over the query string, e.g. GET /stats?city=Curitiba&name=Juan
///
/// Every filter attribute must be queryable. An empty query string is
/// rejected here: "count everything" is deliberately not reachable over
/// HTTP even though the engine itself bounds that disclosure.
pub async fn multi(
    State(state): State<AppState>,
    Query(filters): Query<BTreeMap<String, String>>,
) -> AppResult<Json<FilterCount>> {
    if filters.is_empty() {
        return Err(AppError::BadRequest(
            "at least one filter attribute is required".to_string(),
        ));
    }
    Ok(Json(state.engine.stats_multi(&filters)?))
}
