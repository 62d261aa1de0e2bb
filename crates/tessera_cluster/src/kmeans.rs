//! k-means++ over task resource vectors.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tessera_model::Task;

use crate::clustering::Clustering;
use crate::error::ClusterError;

/// A resource vector `(clb, dsp, bram)`.
pub type Point = [f64; 3];

/// Knobs of one clustering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansOptions {
    /// Number of clusters.
    pub k: usize,
    /// Stop once no centroid moves further than this.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: usize,
    /// Seed of the centroid sampler.
    pub seed: u64,
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self {
            k: 5,
            tolerance: 0.1,
            max_iterations: 100,
            seed: 0,
        }
    }
}

/// Straight-line distance between two resource vectors.
pub fn euclidean_distance(a: &Point, b: &Point) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Picks `k` initial centroids among `points`.
///
/// The first is uniform; each next one is drawn with probability
/// proportional to a point's distance from its nearest chosen centroid.
pub fn seed_centroids(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);
    if points.is_empty() || k == 0 {
        return centroids;
    }
    centroids.push(points[rng.gen_range(0..points.len())]);

    while centroids.len() < k {
        let distances: Vec<f64> = points
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| euclidean_distance(p, c))
                    .fold(f64::MAX, f64::min)
            })
            .collect();
        let total: f64 = distances.iter().sum();
        let target = rng.gen::<f64>() * total;
        let mut cumulative = 0.0;
        let mut chosen = points.len() - 1;
        for (i, d) in distances.iter().enumerate() {
            cumulative += d;
            if cumulative >= target {
                chosen = i;
                break;
            }
        }
        centroids.push(points[chosen]);
    }
    centroids
}

/// Index of the nearest centroid for every point; ties go to the lower index.
pub fn assign(points: &[Point], centroids: &[Point]) -> Vec<usize> {
    points
        .iter()
        .map(|p| {
            let mut best = 0;
            let mut best_dist = f64::MAX;
            for (i, c) in centroids.iter().enumerate() {
                let d = euclidean_distance(p, c);
                if d < best_dist {
                    best_dist = d;
                    best = i;
                }
            }
            best
        })
        .collect()
}

/// Component-wise mean of every cluster's members. Empty clusters collapse
/// to the zero vector.
pub fn update(points: &[Point], assignments: &[usize], k: usize) -> Vec<Point> {
    let mut sums = vec![[0.0; 3]; k];
    let mut counts = vec![0usize; k];
    for (p, &c) in points.iter().zip(assignments) {
        for (s, v) in sums[c].iter_mut().zip(p) {
            *s += v;
        }
        counts[c] += 1;
    }
    sums.into_iter()
        .zip(counts)
        .map(|(s, n)| {
            if n == 0 {
                [0.0; 3]
            } else {
                s.map(|v| v / n as f64)
            }
        })
        .collect()
}

/// Largest distance any centroid moved between `old` and `new`.
pub fn max_movement(old: &[Point], new: &[Point]) -> f64 {
    old.iter()
        .zip(new)
        .map(|(a, b)| euclidean_distance(a, b))
        .fold(0.0, f64::max)
}

/// Returns `true` when no centroid moved further than `tolerance`.
pub fn is_converged(old: &[Point], new: &[Point], tolerance: f64) -> bool {
    max_movement(old, new) <= tolerance
}

/// Groups `tasks` by resource similarity.
///
/// # Errors
///
/// Fails on an empty task list, `k == 0` or `k` above the task count.
pub fn cluster(tasks: &[Task], options: &KMeansOptions) -> Result<Clustering, ClusterError> {
    let k = options.k;
    if tasks.is_empty() {
        return Err(ClusterError::Empty);
    }
    if k == 0 {
        return Err(ClusterError::ZeroClusters);
    }
    if k > tasks.len() {
        return Err(ClusterError::TooManyClusters { k, n: tasks.len() });
    }

    let points: Vec<Point> = tasks.iter().map(Task::resources).collect();
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut centroids = seed_centroids(&points, k, &mut rng);
    let mut assignments;
    let mut movements = Vec::new();
    loop {
        assignments = assign(&points, &centroids);
        let next = update(&points, &assignments, k);
        let moved = max_movement(&centroids, &next);
        centroids = next;
        movements.push(moved);
        tracing::trace!(iteration = movements.len(), moved, "k-means step");
        if moved <= options.tolerance || movements.len() >= options.max_iterations {
            break;
        }
    }

    let converged = movements.last().is_some_and(|&m| m <= options.tolerance);
    tracing::debug!(k, iterations = movements.len(), converged, "k-means finished");
    Ok(Clustering::new(
        tasks.iter().map(|t| t.id).collect(),
        points,
        assignments,
        centroids,
        movements,
        converged,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance() {
        assert_eq!(euclidean_distance(&[0.0, 3.0, 0.0], &[4.0, 0.0, 0.0]), 5.0);
        assert_eq!(euclidean_distance(&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]), 0.0);
    }

    #[test]
    fn seeding_picks_distinct_far_points() {
        let points = [[0.0; 3], [0.0; 3], [100.0, 0.0, 0.0]];
        let mut rng = StdRng::seed_from_u64(3);
        let c = seed_centroids(&points, 2, &mut rng);
        assert_eq!(c.len(), 2);
        assert_ne!(c[0], c[1]);
    }

    #[test]
    fn assignment_ties_go_first() {
        let points = [[5.0, 0.0, 0.0]];
        let centroids = [[0.0; 3], [10.0, 0.0, 0.0]];
        assert_eq!(assign(&points, &centroids), vec![0]);
    }

    #[test]
    fn update_means_and_empty_clusters() {
        let points = [[2.0, 4.0, 6.0], [4.0, 8.0, 10.0]];
        let c = update(&points, &[0, 0], 2);
        assert_eq!(c[0], [3.0, 6.0, 8.0]);
        assert_eq!(c[1], [0.0; 3]);
    }

    #[test]
    fn convergence_uses_largest_move() {
        let old = [[0.0; 3], [10.0, 0.0, 0.0]];
        let new = [[0.05, 0.0, 0.0], [10.0, 0.5, 0.0]];
        assert!((max_movement(&old, &new) - 0.5).abs() < 1e-12);
        assert!(!is_converged(&old, &new, 0.1));
        assert!(is_converged(&old, &new, 0.5));
    }

    #[test]
    fn default_options() {
        let o = KMeansOptions::default();
        assert_eq!((o.k, o.max_iterations), (5, 100));
        assert_eq!(o.tolerance, 0.1);
    }
}
