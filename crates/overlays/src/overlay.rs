use formats::GeoPoint;
use foundation::math::{Ecef, Geodetic};
use serde::Serialize;

use crate::style::OverlayStyle;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HeightMode {
    /// Every vertex sits at this height above the ellipsoid.
    Fixed { height_m: f64 },
    /// Vertices follow the terrain at render time.
    ClampToGround,
}

/// A filled polygon handed to the renderer. Built once per exterior ring and
/// never touched again by the placer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub feature: String,
    pub vertices: Vec<GeoPoint>,
    pub height_mode: HeightMode,
    #[serde(flatten)]
    pub style: OverlayStyle,
}

impl Overlay {
    /// Lifts every ring vertex to `height_m`.
    pub fn fixed(
        feature: impl Into<String>,
        ring: &[GeoPoint],
        height_m: f64,
        style: OverlayStyle,
    ) -> Self {
        Self {
            feature: feature.into(),
            vertices: ring.iter().map(|p| p.with_alt(height_m)).collect(),
            height_mode: HeightMode::Fixed { height_m },
            style,
        }
    }

    /// Keeps the ring exactly as given.
    pub fn clamped_to_ground(
        feature: impl Into<String>,
        ring: &[GeoPoint],
        style: OverlayStyle,
    ) -> Self {
        Self {
            feature: feature.into(),
            vertices: ring.to_vec(),
            height_mode: HeightMode::ClampToGround,
            style,
        }
    }

    pub fn ground_clamped(&self) -> bool {
        matches!(self.height_mode, HeightMode::ClampToGround)
    }

    pub fn height_m(&self) -> Option<f64> {
        match self.height_mode {
            HeightMode::Fixed { height_m } => Some(height_m),
            HeightMode::ClampToGround => None,
        }
    }

    /// Vertex positions in ECEF. Ground-clamped vertices are placed on the
    /// ellipsoid; the renderer drapes them.
    pub fn positions_ecef(&self) -> Vec<Ecef> {
        let height = self.height_m().unwrap_or(0.0);
        self.vertices
            .iter()
            .map(|p| Geodetic::from_degrees(p.lon_deg, p.lat_deg, height).to_ecef())
            .collect()
    }
}

/// Unweighted mean of the ring's longitudes and latitudes. Every listed
/// vertex counts, including a repeated closing vertex.
pub fn centroid(ring: &[GeoPoint]) -> Option<GeoPoint> {
    if ring.is_empty() {
        return None;
    }
    let (sum_lon, sum_lat) = ring
        .iter()
        .fold((0.0, 0.0), |(lon, lat), p| (lon + p.lon_deg, lat + p.lat_deg));
    let n = ring.len() as f64;
    Some(GeoPoint::new(sum_lon / n, sum_lat / n))
}
