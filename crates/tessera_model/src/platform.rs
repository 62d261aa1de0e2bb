//! FPGA resource platform.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Resource capacities and reconfiguration rates of the target device.
///
/// Immutable after construction. Vectors are indexed by resource type; for a
/// full floorplan that is the canonical `clb, bram, dsp` order of
/// [`ResourceKind`](tessera_common::ResourceKind), while partition-only runs
/// may use any number of abstract resource types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    capacity: Vec<f64>,
    reconfig_time_per_unit: Vec<f64>,
}

impl Platform {
    /// Creates a platform from per-resource capacities and reconfiguration
    /// time per resource unit.
    ///
    /// # Errors
    ///
    /// Fails if the vectors are empty, differ in length, or hold negative or
    /// non-finite values.
    pub fn new(capacity: Vec<f64>, reconfig_time_per_unit: Vec<f64>) -> Result<Self, ModelError> {
        if capacity.is_empty() {
            return Err(ModelError::NoResources);
        }
        if reconfig_time_per_unit.len() != capacity.len() {
            return Err(ModelError::LengthMismatch {
                what: "reconfiguration time vector",
                expected: capacity.len(),
                got: reconfig_time_per_unit.len(),
            });
        }
        for (i, v) in capacity.iter().chain(&reconfig_time_per_unit).enumerate() {
            if !v.is_finite() || *v < 0.0 {
                return Err(ModelError::InvalidValue {
                    what: format!("platform entry {i}"),
                    value: *v,
                });
            }
        }
        Ok(Self {
            capacity,
            reconfig_time_per_unit,
        })
    }

    /// Number of resource types `R`.
    pub fn num_resources(&self) -> usize {
        self.capacity.len()
    }

    /// Capacity of every resource type.
    pub fn capacity(&self) -> &[f64] {
        &self.capacity
    }

    /// Reconfiguration time per unit of every resource type.
    pub fn reconfig_time_per_unit(&self) -> &[f64] {
        &self.reconfig_time_per_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_resource_platform() {
        let p = Platform::new(vec![6650.0, 140.0, 220.0], vec![1e-3, 1e-3, 2e-3]).unwrap();
        assert_eq!(p.num_resources(), 3);
        assert_eq!(p.capacity()[1], 140.0);
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            Platform::new(vec![], vec![]),
            Err(ModelError::NoResources)
        ));
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let err = Platform::new(vec![50.0], vec![0.1, 0.1]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::LengthMismatch { expected: 1, got: 2, .. }
        ));
    }

    #[test]
    fn rejects_negative_capacity() {
        assert!(Platform::new(vec![-1.0], vec![0.0]).is_err());
        assert!(Platform::new(vec![1.0], vec![f64::NAN]).is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let p = Platform::new(vec![50.0], vec![0.5]).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        let back: Platform = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
