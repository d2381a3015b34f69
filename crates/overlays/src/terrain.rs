use std::future::Future;

use foundation::math::Geodetic;

/// Why a terrain query was rejected. A query that simply finds no surface is
/// not an error; it resolves to `Ok(None)`.
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainQueryError {
    Transport(String),
    Status(u16),
    Malformed(String),
}

impl std::fmt::Display for TerrainQueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerrainQueryError::Transport(msg) => write!(f, "terrain service unreachable: {msg}"),
            TerrainQueryError::Status(code) => write!(f, "terrain service returned status {code}"),
            TerrainQueryError::Malformed(msg) => write!(f, "malformed terrain reply: {msg}"),
        }
    }
}

impl std::error::Error for TerrainQueryError {}

/// Projects a geodetic point onto the rendered terrain surface.
///
/// Callers pass the point at nominal height 0 and get back the surface
/// position, or `None` when nothing was intersected. Services that intersect
/// in ECEF convert with `Ecef::to_geodetic`; services that already know the
/// elevation return it as `alt_m` unchanged.
pub trait TerrainHeightService {
    fn sample(
        &self,
        at: Geodetic,
    ) -> impl Future<Output = Result<Option<Geodetic>, TerrainQueryError>>;
}

impl<T: TerrainHeightService + ?Sized> TerrainHeightService for &T {
    fn sample(
        &self,
        at: Geodetic,
    ) -> impl Future<Output = Result<Option<Geodetic>, TerrainQueryError>> {
        (**self).sample(at)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TerrainQueryResult {
    Resolved(f64),
    Unresolved,
}

impl TerrainQueryResult {
    pub fn from_surface(surface: Option<Geodetic>) -> Self {
        match surface.map(|p| p.alt_m) {
            Some(h) if h.is_finite() => TerrainQueryResult::Resolved(h),
            _ => TerrainQueryResult::Unresolved,
        }
    }

    pub fn height_m(self) -> Option<f64> {
        match self {
            TerrainQueryResult::Resolved(h) => Some(h),
            TerrainQueryResult::Unresolved => None,
        }
    }
}

/// Terrain with the same height everywhere. Used offline and when no
/// height service is configured.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlatTerrain {
    pub height_m: f64,
}

impl FlatTerrain {
    pub fn new(height_m: f64) -> Self {
        Self { height_m }
    }
}

impl TerrainHeightService for FlatTerrain {
    async fn sample(&self, at: Geodetic) -> Result<Option<Geodetic>, TerrainQueryError> {
        Ok(Some(at.with_alt(self.height_m)))
    }
}
