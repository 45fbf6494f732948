//! Veil Server - Anonymized Statistics API
//!
//! Thin HTTP surface over the Veil engine. All privacy decisions live in
//! `veil-engine`; this binary only parses requests, loads the CSV, and
//! maps engine errors onto HTTP statuses.

mod config;
mod error;
mod handlers;
mod ingest;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use veil_engine::logic::schema::SchemaPolicy;
use veil_engine::{Engine, EngineConfig};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "veil_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Veil server starting...");
    tracing::info!("Schema: {}", config.schema_path.display());
    tracing::info!("Data: {}", config.data_path.display());

    // Malformed configuration is fatal, reported once at startup
    let policy = match load_policy(&config.schema_path) {
        Ok(policy) => policy,
        Err(e) => {
            tracing::error!("Failed to load schema policy: {}", e);
            std::process::exit(1);
        }
    };
    let engine = match Engine::new(EngineConfig::from_env(policy)) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            tracing::error!("Invalid engine configuration: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        engine: engine.clone(),
        config: config.clone(),
    };

    // Train automatically at startup; a failure here is a warning, the
    // first POST /fit can still succeed once the data is in place.
    if config.auto_fit_enabled() {
        match ingest::load_table(&config.data_path).map_err(|e| e.to_string()).and_then(|table| {
            engine.fit(&table, None).map_err(|e| e.to_string())
        }) {
            Ok(response) => tracing::info!(
                "startup fit: {} records, {} clusters",
                response.num_records,
                response.num_clusters
            ),
            Err(e) => tracing::warn!("startup fit skipped: {}", e),
        }
    } else {
        tracing::info!("CI detected, skipping startup fit");
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server port");
    axum::serve(listener, app).await.expect("Server crashed");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Permissive CORS is a development convenience only
    let cors = if state.config.is_production() {
        CorsLayer::new()
    } else {
        CorsLayer::new().allow_origin(Any).allow_methods(Any)
    };

    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/fit", post(handlers::model::fit))
        .route("/stats/name/:name", get(handlers::stats::by_name))
        .route("/stats", get(handlers::stats::multi))
        .route("/clusters", get(handlers::clusters::list))
        .route("/clusters/:cluster_id", get(handlers::clusters::detail))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn load_policy(path: &Path) -> Result<SchemaPolicy, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    let policy: SchemaPolicy =
        serde_json::from_str(&raw).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(policy)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use veil_engine::logic::schema::AttributeKind;

    fn test_state() -> AppState {
        let policy = SchemaPolicy {
            sensitive: Default::default(),
            features: vec!["age".to_string()],
            queryable: ["name".to_string()].into(),
            kinds: [
                ("age".to_string(), AttributeKind::Numeric),
                ("name".to_string(), AttributeKind::Categorical),
            ]
            .into(),
            derived: vec![],
        };
        let engine_config = EngineConfig {
            policy,
            bounds: Default::default(),
            name_attribute: "name".to_string(),
            default_clusters: None,
        };
        AppState {
            engine: Arc::new(Engine::new(engine_config).unwrap()),
            config: config::Config::from_env(),
        }
    }

    async fn send(path: &str) -> StatusCode {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_health_always_up() {
        assert_eq!(send("/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_queries_unavailable_before_fit() {
        assert_eq!(send("/stats/name/Juan").await, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(send("/clusters").await, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(send("/clusters/0").await, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_empty_filter_set_rejected() {
        assert_eq!(send("/stats").await, StatusCode::BAD_REQUEST);
    }
}
