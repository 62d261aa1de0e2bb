//! k-means++ clustering of tasks by resource demand.
//!
//! Tasks are points `(clb, dsp, bram)`; similar tasks end up in the same
//! cluster so that they can share one reconfigurable region.
//!
//! # Usage
//!
//! ```
//! use tessera_cluster::{cluster, KMeansOptions};
//! use tessera_model::Task;
//!
//! let tasks: Vec<Task> = (0..6).map(|i| Task::new(i, 100 * (i % 2 + 1), 0, 0, 10)).collect();
//! let options = KMeansOptions { k: 2, ..KMeansOptions::default() };
//! let clustering = cluster(&tasks, &options).unwrap();
//! assert_eq!(clustering.assignments().len(), 6);
//! ```

#![warn(missing_docs)]

pub mod clustering;
pub mod error;
pub mod kmeans;

pub use clustering::Clustering;
pub use error::ClusterError;
pub use kmeans::{
    assign, cluster, euclidean_distance, is_converged, max_movement, seed_centroids, update,
    KMeansOptions, Point,
};
