//! Cluster Module - Pluggable Partitioning
//!
//! The engine depends on two capabilities only: partition a matrix into K
//! groups, and assign a new vector to the nearest group. K-means is the
//! bundled strategy; anything implementing `ClusteringStrategy` can be
//! swapped in without touching the engine.

use ndarray::{Array2, ArrayView1};

pub mod kmeans;
pub mod model;


pub use kmeans::KMeans;
pub use model::{choose_cluster_count, ClusterModel};

/// Result of partitioning a feature matrix
#[derive(Debug, Clone)]
pub struct Partition {
    /// k x width centroid matrix
    pub centroids: Array2<f64>,
    /// Per-row cluster label, len == matrix rows
    pub labels: Vec<usize>,
}

/// Capability contract for clustering backends
pub trait ClusteringStrategy: Send + Sync {
    /// Partition `matrix` rows into `k` groups. Caller guarantees
    /// `1 <= k <= matrix.nrows()`; the engine validates that every
    /// returned cluster is non-empty.
    fn partition(&self, matrix: &Array2<f64>, k: usize) -> Partition;

    /// Nearest-centroid label for an out-of-band vector encoded the same
    /// way as the fit-time matrix.
    fn assign(&self, centroids: &Array2<f64>, vector: ArrayView1<'_, f64>) -> usize;
}

/// Squared euclidean distance between two vectors
pub(crate) fn sq_dist(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}
