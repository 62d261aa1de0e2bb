//! The outcome of a clustering run and per-cluster queries over it.

use serde::Serialize;

use crate::kmeans::Point;

/// Result of a k-means run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clustering {
    ids: Vec<u32>,
    #[serde(skip)]
    points: Vec<Point>,
    assignments: Vec<usize>,
    centroids: Vec<Point>,
    movements: Vec<f64>,
    converged: bool,
}

impl Clustering {
    pub(crate) fn new(
        ids: Vec<u32>,
        points: Vec<Point>,
        assignments: Vec<usize>,
        centroids: Vec<Point>,
        movements: Vec<f64>,
        converged: bool,
    ) -> Self {
        Self {
            ids,
            points,
            assignments,
            centroids,
            movements,
            converged,
        }
    }

    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Cluster index of every input task, in input order.
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Final centroids.
    pub fn centroids(&self) -> &[Point] {
        &self.centroids
    }

    /// Largest centroid movement of every iteration.
    pub fn movements(&self) -> &[f64] {
        &self.movements
    }

    /// Iterations performed.
    pub fn iterations(&self) -> usize {
        self.movements.len()
    }

    /// Whether the run stopped on tolerance rather than on the cap.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Cluster of the task with id `id`.
    pub fn cluster_of(&self, id: u32) -> Option<usize> {
        self.ids
            .iter()
            .position(|&t| t == id)
            .map(|i| self.assignments[i])
    }

    /// Task ids per cluster.
    pub fn members(&self) -> Vec<Vec<u32>> {
        let mut out = vec![Vec::new(); self.k()];
        for (&id, &c) in self.ids.iter().zip(&self.assignments) {
            out[c].push(id);
        }
        out
    }

    /// Component-wise maximum `(clb, dsp, bram)` over each cluster's members,
    /// i.e. what one region must provide to host any task of the cluster.
    /// Empty clusters report zeros.
    pub fn max_resources(&self) -> Vec<Point> {
        let mut out: Vec<Point> = vec![[0.0; 3]; self.k()];
        for (p, &c) in self.points.iter().zip(&self.assignments) {
            for (m, v) in out[c].iter_mut().zip(p) {
                *m = m.max(*v);
            }
        }
        out
    }
}
