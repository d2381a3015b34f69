use serde::Serialize;

use crate::resolver::FeatureOutcome;
use crate::terrain::TerrainQueryError;

/// An exterior ring with fewer than three vertices. Skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegenerateRing {
    pub feature: String,
    pub ring: usize,
    pub points: usize,
}

impl std::fmt::Display for DegenerateRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "feature {} ring {} has {} point(s), need at least 3",
            self.feature, self.ring, self.points
        )
    }
}

/// Placement of one feature stopped early. Overlays emitted for earlier
/// rings of the same feature stay with the renderer.
#[derive(Debug)]
pub struct FeaturePlacementError {
    pub feature: String,
    pub ring: usize,
    /// Rings handled before the failure.
    pub partial: FeatureOutcome,
    pub source: TerrainQueryError,
}

impl std::fmt::Display for FeaturePlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "placing feature {} failed at ring {}: {}",
            self.feature, self.ring, self.source
        )
    }
}

impl std::error::Error for FeaturePlacementError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
