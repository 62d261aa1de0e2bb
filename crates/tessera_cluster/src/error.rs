//! Clustering precondition errors.

/// Inputs `cluster` refuses to work with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClusterError {
    /// No tasks were given.
    #[error("cannot cluster an empty task collection")]
    Empty,

    /// `k` was zero.
    #[error("cluster count must be at least 1")]
    ZeroClusters,

    /// `k` exceeded the number of tasks.
    #[error("cannot form {k} clusters from {n} tasks")]
    TooManyClusters {
        /// Requested clusters.
        k: usize,
        /// Available tasks.
        n: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = ClusterError::TooManyClusters { k: 6, n: 4 };
        assert_eq!(err.to_string(), "cannot form 6 clusters from 4 tasks");
        assert_eq!(
            ClusterError::ZeroClusters.to_string(),
            "cluster count must be at least 1"
        );
    }
}
