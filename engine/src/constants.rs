//! Central Configuration Constants
//!
//! Single source of truth for engine defaults.
//! To change a default privacy bound, only edit this file.

/// Minimum number of individuals behind any disclosed aggregate
pub const DEFAULT_K_ANONYMITY: usize = 10;

/// Maximum disclosed result-set size before a result is blocked
pub const DEFAULT_MAX_RESULTS: usize = 4000;

/// Attribute used by the single-attribute name-stats operation
pub const DEFAULT_NAME_ATTRIBUTE: &str = "name";

/// Fixed RNG seed so k-means runs are reproducible
pub const KMEANS_SEED: u64 = 42;

/// Independent k-means restarts per fit (best inertia wins)
pub const KMEANS_RESTARTS: usize = 10;

/// Lloyd-iteration cap per k-means restart
pub const KMEANS_MAX_ITERATIONS: usize = 100;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get k-anonymity bound from environment or use default
pub fn get_k_anonymity() -> usize {
    std::env::var("K_ANONYMITY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_K_ANONYMITY)
}

/// Get max-result bound from environment or use default
pub fn get_max_results() -> usize {
    std::env::var("MAX_RESULTS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_RESULTS)
}

/// Get the name attribute from environment or use default
pub fn get_name_attribute() -> String {
    std::env::var("NAME_ATTRIBUTE").unwrap_or_else(|_| DEFAULT_NAME_ATTRIBUTE.to_string())
}

/// Get the default cluster count from environment, if set
pub fn get_default_clusters() -> Option<usize> {
    std::env::var("DEFAULT_CLUSTERS")
        .ok()
        .and_then(|s| s.parse().ok())
}
