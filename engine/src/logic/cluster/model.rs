//! Trained Cluster Model
//!
//! Holds the fit-time encoder, centroids and the full cluster assignment.
//! Built off to the side by `fit`; the caller installs the result into the
//! model slot atomically.

use ndarray::Array2;

use crate::error::EngineError;
use crate::logic::dataset::{Dataset, Record};
use crate::logic::features::FeatureEncoder;

use super::{ClusteringStrategy, Partition};

#[derive(Debug)]
pub struct ClusterModel {
    /// Number of clusters, all non-empty
    k: usize,
    centroids: Array2<f64>,
    /// Record ordinal -> cluster id, len == dataset len
    assignments: Vec<usize>,
    /// Member count per cluster
    sizes: Vec<usize>,
    encoder: FeatureEncoder,
}

impl ClusterModel {
    /// Fit a fresh model over the dataset.
    ///
    /// The matrix is built from `feature_attrs` only. `requested` comes
    /// from the caller, `default_k` from configuration; with neither set a
    /// size heuristic picks the cluster count. Fails with
    /// `InsufficientData` when the dataset cannot fill `k` non-empty
    /// clusters.
    pub fn fit(
        dataset: &Dataset,
        feature_attrs: &[String],
        requested: Option<usize>,
        default_k: Option<usize>,
        strategy: &dyn ClusteringStrategy,
    ) -> Result<ClusterModel, EngineError> {
        if let Some(0) = requested {
            return Err(EngineError::InvalidConfig(
                "cluster count must be at least 1".to_string(),
            ));
        }

        let n = dataset.len();
        let k = choose_cluster_count(n, requested.or(default_k));
        if n < k || n == 0 {
            return Err(EngineError::InsufficientData {
                records: n,
                clusters: k,
            });
        }

        let (encoder, matrix) = FeatureEncoder::fit(dataset, feature_attrs)?;

        let Partition { centroids, labels } = strategy.partition(&matrix, k);
        debug_assert_eq!(labels.len(), n);

        let mut sizes = vec![0usize; k];
        for &label in &labels {
            sizes[label] += 1;
        }
        if sizes.iter().any(|&size| size == 0) {
            log::warn!("fit produced an empty cluster (n={}, k={})", n, k);
            return Err(EngineError::InsufficientData {
                records: n,
                clusters: k,
            });
        }

        log::info!("fitted {} clusters over {} records", k, n);
        Ok(ClusterModel {
            k,
            centroids,
            assignments: labels,
            sizes,
            encoder,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    pub fn size_of(&self, cluster_id: usize) -> Option<usize> {
        self.sizes.get(cluster_id).copied()
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Ordinal indices of a cluster's member records
    pub fn members(&self, cluster_id: usize) -> impl Iterator<Item = usize> + '_ {
        self.assignments
            .iter()
            .enumerate()
            .filter(move |(_, &label)| label == cluster_id)
            .map(|(i, _)| i)
    }

    /// Assign an out-of-band record to its nearest cluster using the
    /// fit-time encoding. Part of the capability contract; not exposed by
    /// the current read operations.
    pub fn assign(&self, record: &Record, strategy: &dyn ClusteringStrategy) -> usize {
        let vector = self.encoder.encode(record);
        strategy.assign(&self.centroids, vector.view())
    }
}

/// Pick a cluster count when the caller does not supply one.
///
/// Heuristic: tiny datasets get n/2 clusters, small ones n/10, anything
/// larger sqrt(n); two clusters minimum.
pub fn choose_cluster_count(n: usize, requested: Option<usize>) -> usize {
    if let Some(k) = requested {
        return k.max(1);
    }
    if n <= 20 {
        return (n / 2).max(2);
    }
    if n <= 200 {
        return (n / 10).max(2);
    }
    ((n as f64).sqrt() as usize).max(2)
}
