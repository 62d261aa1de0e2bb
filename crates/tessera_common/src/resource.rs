//! Fabric resource types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A resource type of the reconfigurable fabric.
///
/// The declaration order is the canonical vector order used by platforms,
/// demand vectors and board tables: logic first, then memory, then DSP.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Configurable logic blocks.
    Clb,
    /// Block RAM tiles.
    Bram,
    /// DSP slices.
    Dsp,
}

impl ResourceKind {
    /// All resource kinds in canonical order.
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Clb, ResourceKind::Bram, ResourceKind::Dsp];

    /// Returns the position of this kind in a canonical resource vector.
    pub fn index(self) -> usize {
        match self {
            ResourceKind::Clb => 0,
            ResourceKind::Bram => 1,
            ResourceKind::Dsp => 2,
        }
    }

    /// Returns the short lowercase name used in constraint and report labels.
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Clb => "clb",
            ResourceKind::Bram => "bram",
            ResourceKind::Dsp => "dsp",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order() {
        for (i, kind) in ResourceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(ResourceKind::Clb.to_string(), "clb");
        assert_eq!(ResourceKind::Bram.to_string(), "bram");
        assert_eq!(ResourceKind::Dsp.to_string(), "dsp");
    }

    #[test]
    fn serde_lowercase() {
        let json = serde_json::to_string(&ResourceKind::Bram).unwrap();
        assert_eq!(json, "\"bram\"");
        let back: ResourceKind = serde_json::from_str("\"dsp\"").unwrap();
        assert_eq!(back, ResourceKind::Dsp);
    }
}
