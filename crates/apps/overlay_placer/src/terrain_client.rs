use foundation::math::Geodetic;
use overlays::{FlatTerrain, TerrainHeightService, TerrainQueryError};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Body of `GET {base}/height?lon=..&lat=..`.
#[derive(Debug, Deserialize)]
pub struct HeightReply {
    pub height: Option<f64>,
}

impl HeightReply {
    /// `null` means the service found no surface under the point.
    pub fn surface(&self, at: Geodetic) -> Option<Geodetic> {
        self.height.map(|h| at.with_alt(h))
    }
}

#[derive(Debug, Clone)]
pub struct HttpTerrainService {
    http: Client,
    base_url: String,
}

impl HttpTerrainService {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn height_url(&self) -> String {
        format!("{}/height", self.base_url.trim_end_matches('/'))
    }
}

impl TerrainHeightService for HttpTerrainService {
    async fn sample(&self, at: Geodetic) -> Result<Option<Geodetic>, TerrainQueryError> {
        let resp = self
            .http
            .get(self.height_url())
            .query(&[("lon", at.lon_deg()), ("lat", at.lat_deg())])
            .send()
            .await
            .map_err(|e| TerrainQueryError::Transport(e.to_string()))?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => {
                return Err(TerrainQueryError::Status(status.as_u16()));
            }
            _ => {}
        }

        let reply: HeightReply = resp
            .json()
            .await
            .map_err(|e| TerrainQueryError::Malformed(e.to_string()))?;
        Ok(reply.surface(at))
    }
}

/// Terrain source picked on the command line.
#[derive(Debug, Clone)]
pub enum TerrainSource {
    Http(HttpTerrainService),
    Flat(FlatTerrain),
}

impl TerrainHeightService for TerrainSource {
    async fn sample(&self, at: Geodetic) -> Result<Option<Geodetic>, TerrainQueryError> {
        match self {
            TerrainSource::Http(service) => service.sample(at).await,
            TerrainSource::Flat(flat) => flat.sample(at).await,
        }
    }
}
