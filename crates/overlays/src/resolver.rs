use formats::{GeoPoint, PolygonFeature};
use foundation::math::Geodetic;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::collection::OverlayRenderer;
use crate::error::{DegenerateRing, FeaturePlacementError};
use crate::overlay::{Overlay, centroid};
use crate::style::OverlayStyle;
use crate::terrain::{TerrainHeightService, TerrainQueryError, TerrainQueryResult};

/// Rings shorter than this cannot bound an area.
pub const MIN_RING_POINTS: usize = 3;

/// What happened to the rings of one feature.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FeatureOutcome {
    pub fixed: usize,
    pub ground_clamped: usize,
    pub skipped_rings: Vec<DegenerateRing>,
}

impl FeatureOutcome {
    pub fn placed(&self) -> usize {
        self.fixed + self.ground_clamped
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureFailure {
    pub feature: String,
    pub ring: usize,
    pub message: String,
}

/// Totals for one pass over a feature collection.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PlacementReport {
    pub features: usize,
    pub fixed: usize,
    pub ground_clamped: usize,
    pub skipped_rings: Vec<DegenerateRing>,
    pub failures: Vec<FeatureFailure>,
}

impl PlacementReport {
    pub fn placed(&self) -> usize {
        self.fixed + self.ground_clamped
    }

    fn absorb(&mut self, outcome: FeatureOutcome) {
        self.fixed += outcome.fixed;
        self.ground_clamped += outcome.ground_clamped;
        self.skipped_rings.extend(outcome.skipped_rings);
    }
}

/// Resolves terrain heights for polygon features and hands the resulting
/// overlays to a renderer.
///
/// The placer owns its terrain service; the renderer is borrowed per call so
/// the caller keeps ownership of the visible collection.
#[derive(Debug, Clone)]
pub struct OverlayPlacer<T> {
    terrain: T,
    style: OverlayStyle,
}

impl<T: TerrainHeightService> OverlayPlacer<T> {
    pub fn new(terrain: T) -> Self {
        Self {
            terrain,
            style: OverlayStyle::default(),
        }
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn terrain(&self) -> &T {
        &self.terrain
    }

    /// Samples the terrain under the ring centroid. `Ok(Unresolved)` covers
    /// both "no intersection" and a non-finite elevation.
    pub async fn resolve_height(
        &self,
        centroid: GeoPoint,
    ) -> Result<TerrainQueryResult, TerrainQueryError> {
        let at = Geodetic::from_degrees(centroid.lon_deg, centroid.lat_deg, 0.0);
        let surface = self.terrain.sample(at).await?;
        Ok(TerrainQueryResult::from_surface(surface))
    }

    /// Places one overlay per exterior ring of `feature`, in ring order.
    ///
    /// Degenerate rings are skipped. A rejected terrain query stops this
    /// feature; overlays already submitted for earlier rings are kept.
    pub async fn resolve_and_place<R>(
        &self,
        feature: &PolygonFeature,
        index: usize,
        renderer: &mut R,
    ) -> Result<FeatureOutcome, FeaturePlacementError>
    where
        R: OverlayRenderer + ?Sized,
    {
        let label = feature.label(index);
        let mut outcome = FeatureOutcome::default();

        for (ring_index, ring) in feature.exterior_rings().enumerate() {
            let center = match centroid(ring) {
                Some(center) if ring.len() >= MIN_RING_POINTS => center,
                _ => {
                    warn!(
                        feature = %label,
                        ring = ring_index,
                        points = ring.len(),
                        "skipping degenerate ring"
                    );
                    outcome.skipped_rings.push(DegenerateRing {
                        feature: label.clone(),
                        ring: ring_index,
                        points: ring.len(),
                    });
                    continue;
                }
            };

            let resolved = match self.resolve_height(center).await {
                Ok(resolved) => resolved,
                Err(source) => {
                    return Err(FeaturePlacementError {
                        feature: label,
                        ring: ring_index,
                        partial: outcome,
                        source,
                    });
                }
            };

            let overlay = match resolved {
                TerrainQueryResult::Resolved(height_m) => {
                    debug!(
                        feature = %label,
                        ring = ring_index,
                        height_m,
                        "terrain height resolved"
                    );
                    outcome.fixed += 1;
                    Overlay::fixed(label.clone(), ring, height_m, self.style)
                }
                TerrainQueryResult::Unresolved => {
                    warn!(
                        feature = %label,
                        ring = ring_index,
                        lon = center.lon_deg,
                        lat = center.lat_deg,
                        "no terrain height under centroid, clamping overlay to ground"
                    );
                    outcome.ground_clamped += 1;
                    Overlay::clamped_to_ground(label.clone(), ring, self.style)
                }
            };

            renderer.add(overlay);
        }

        Ok(outcome)
    }

    /// Places every feature in input order. A failing feature is logged and
    /// recorded in the report; the remaining features are still processed.
    pub async fn resolve_all_and_place<R>(
        &self,
        features: &[PolygonFeature],
        renderer: &mut R,
    ) -> PlacementReport
    where
        R: OverlayRenderer + ?Sized,
    {
        let mut report = PlacementReport {
            features: features.len(),
            ..PlacementReport::default()
        };

        for (index, feature) in features.iter().enumerate() {
            match self.resolve_and_place(feature, index, renderer).await {
                Ok(outcome) => report.absorb(outcome),
                Err(err) => {
                    error!(
                        feature = %err.feature,
                        ring = err.ring,
                        error = %err.source,
                        "feature placement failed"
                    );
                    report.failures.push(FeatureFailure {
                        feature: err.feature.clone(),
                        ring: err.ring,
                        message: err.to_string(),
                    });
                    report.absorb(err.partial);
                }
            }
        }

        info!(
            features = report.features,
            fixed = report.fixed,
            ground_clamped = report.ground_clamped,
            skipped_rings = report.skipped_rings.len(),
            failures = report.failures.len(),
            "overlay placement finished"
        );
        report
    }
}
