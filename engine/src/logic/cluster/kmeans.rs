//! K-Means Strategy
//!
//! Lloyd iterations over k-means++ seeding, several independent restarts,
//! best inertia wins. Seeded RNG keeps every fit reproducible for a given
//! dataset and k.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::{KMEANS_MAX_ITERATIONS, KMEANS_RESTARTS, KMEANS_SEED};

use super::{sq_dist, ClusteringStrategy, Partition};

#[derive(Debug, Clone)]
pub struct KMeans {
    pub max_iterations: usize,
    pub restarts: usize,
    pub seed: u64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            max_iterations: KMEANS_MAX_ITERATIONS,
            restarts: KMEANS_RESTARTS,
            seed: KMEANS_SEED,
        }
    }
}

impl ClusteringStrategy for KMeans {
    fn partition(&self, matrix: &Array2<f64>, k: usize) -> Partition {
        let mut best: Option<(f64, Partition)> = None;
        for run in 0..self.restarts.max(1) {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(run as u64));
            let partition = self.run_once(matrix, k, &mut rng);
            let inertia = inertia(matrix, &partition);
            match &best {
                Some((best_inertia, _)) if *best_inertia <= inertia => {}
                _ => best = Some((inertia, partition)),
            }
        }
        // restarts >= 1, so best is always set
        best.map(|(_, p)| p).unwrap_or_else(|| Partition {
            centroids: Array2::zeros((0, matrix.ncols())),
            labels: vec![],
        })
    }

    fn assign(&self, centroids: &Array2<f64>, vector: ArrayView1<'_, f64>) -> usize {
        nearest(centroids, vector)
    }
}

impl KMeans {
    fn run_once(&self, matrix: &Array2<f64>, k: usize, rng: &mut StdRng) -> Partition {
        let n = matrix.nrows();
        let mut centroids = init_plus_plus(matrix, k, rng);
        let mut labels = vec![0usize; n];

        for _ in 0..self.max_iterations {
            // Assignment step
            let mut changed = false;
            for i in 0..n {
                let label = nearest(&centroids, matrix.row(i));
                if label != labels[i] {
                    labels[i] = label;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            // Update step: member means; an empty cluster keeps its old
            // centroid (the engine rejects empty clusters after the fit)
            let width = matrix.ncols();
            let mut sums = Array2::<f64>::zeros((k, width));
            let mut counts = vec![0usize; k];
            for i in 0..n {
                counts[labels[i]] += 1;
                for j in 0..width {
                    sums[[labels[i], j]] += matrix[[i, j]];
                }
            }
            for c in 0..k {
                if counts[c] > 0 {
                    for j in 0..width {
                        centroids[[c, j]] = sums[[c, j]] / counts[c] as f64;
                    }
                }
            }
        }

        Partition { centroids, labels }
    }
}

/// k-means++ seeding: first centroid uniform, the rest proportional to the
/// squared distance from the nearest chosen centroid.
fn init_plus_plus(matrix: &Array2<f64>, k: usize, rng: &mut StdRng) -> Array2<f64> {
    let n = matrix.nrows();
    let width = matrix.ncols();
    let mut centroids = Array2::<f64>::zeros((k, width));

    let first = rng.gen_range(0..n);
    centroids.row_mut(0).assign(&matrix.row(first));

    let mut min_dists: Vec<f64> = (0..n)
        .map(|i| sq_dist(matrix.row(i), centroids.row(0)))
        .collect();

    for c in 1..k {
        let total: f64 = min_dists.iter().sum();
        let pick = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = n - 1;
            for (i, d) in min_dists.iter().enumerate() {
                target -= d;
                if target <= 0.0 {
                    chosen = i;
                    break;
                }
            }
            chosen
        } else {
            // All remaining points coincide with chosen centroids
            rng.gen_range(0..n)
        };
        centroids.row_mut(c).assign(&matrix.row(pick));
        for i in 0..n {
            let d = sq_dist(matrix.row(i), centroids.row(c));
            if d < min_dists[i] {
                min_dists[i] = d;
            }
        }
    }

    centroids
}

fn nearest(centroids: &Array2<f64>, vector: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for c in 0..centroids.nrows() {
        let d = sq_dist(centroids.row(c), vector);
        if d < best_dist {
            best_dist = d;
            best = c;
        }
    }
    best
}

/// Sum of squared distances from each row to its assigned centroid
fn inertia(matrix: &Array2<f64>, partition: &Partition) -> f64 {
    partition
        .labels
        .iter()
        .enumerate()
        .map(|(i, &label)| sq_dist(matrix.row(i), partition.centroids.row(label)))
        .sum()
}
