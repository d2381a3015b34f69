use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// A GeoJSON position. The optional third coordinate is kept so that
/// ground-clamped overlays can hand back the input untouched.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_m: Option<f64>,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon_deg,
            lat_deg,
            alt_m: None,
        }
    }

    pub fn with_alt(self, alt_m: f64) -> Self {
        Self {
            alt_m: Some(alt_m),
            ..self
        }
    }
}

pub type Ring = Vec<GeoPoint>;

/// Rings of one polygon part: exterior first, holes after.
pub type PolygonRings = Vec<Ring>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PolygonKind {
    Polygon,
    MultiPolygon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFeature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub kind: PolygonKind,
    pub parts: Vec<PolygonRings>,
}

impl PolygonFeature {
    pub fn new(kind: PolygonKind, parts: Vec<PolygonRings>) -> Self {
        Self {
            id: None,
            properties: Map::new(),
            kind,
            parts,
        }
    }

    pub fn polygon(exterior: Ring) -> Self {
        Self::new(PolygonKind::Polygon, vec![vec![exterior]])
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Exterior ring of every part, in document order. Empty parts yield nothing.
    pub fn exterior_rings(&self) -> impl Iterator<Item = &Ring> {
        self.parts.iter().filter_map(|part| part.first())
    }

    /// Label for diagnostics: the feature id when present, else `#<index>`.
    pub fn label(&self, index: usize) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("#{index}"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<PolygonFeature>,
}

#[derive(Debug)]
pub enum FeatureSourceError {
    Json(serde_json::Error),
    NotGeoJson,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for FeatureSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureSourceError::Json(e) => write!(f, "JSON parse error: {e}"),
            FeatureSourceError::NotGeoJson => {
                write!(f, "expected GeoJSON FeatureCollection or Feature")
            }
            FeatureSourceError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for FeatureSourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeatureSourceError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl FeatureCollection {
    pub fn from_geojson_str(payload: &str) -> Result<Self, FeatureSourceError> {
        let value: Value = serde_json::from_str(payload).map_err(FeatureSourceError::Json)?;
        Self::from_geojson_value(&value)
    }

    /// Accepts a `FeatureCollection` or a lone `Feature`. Only polygonal
    /// features are kept; anything without usable polygon geometry is skipped.
    pub fn from_geojson_value(value: &Value) -> Result<Self, FeatureSourceError> {
        let obj = value.as_object().ok_or(FeatureSourceError::NotGeoJson)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(FeatureSourceError::NotGeoJson)?;

        let feature_values: Vec<&Value> = match ty {
            "FeatureCollection" => obj
                .get("features")
                .and_then(|v| v.as_array())
                .ok_or(FeatureSourceError::NotGeoJson)?
                .iter()
                .collect(),
            "Feature" => vec![value],
            _ => return Err(FeatureSourceError::NotGeoJson),
        };

        let mut features = Vec::with_capacity(feature_values.len());
        for (index, feat_val) in feature_values.into_iter().enumerate() {
            if let Some(feature) = parse_feature(index, feat_val)? {
                features.push(feature);
            }
        }

        Ok(Self { features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn parse_feature(
    index: usize,
    value: &Value,
) -> Result<Option<PolygonFeature>, FeatureSourceError> {
    let invalid = |reason: &str| FeatureSourceError::InvalidFeature {
        index,
        reason: reason.to_string(),
    };

    let obj = value
        .as_object()
        .ok_or_else(|| invalid("feature must be an object"))?;
    let feat_type = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid("feature missing type"))?;
    if feat_type != "Feature" {
        return Err(invalid(&format!("unexpected feature type: {feat_type}")));
    }

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let geometry = match obj.get("geometry") {
        Some(Value::Object(g)) => g,
        Some(Value::Null) | None => {
            debug!(index, "skipping feature without geometry");
            return Ok(None);
        }
        Some(_) => return Err(invalid("geometry must be an object")),
    };

    let geom_type = geometry
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid("geometry missing type"))?;
    let kind = match geom_type {
        "Polygon" => PolygonKind::Polygon,
        "MultiPolygon" => PolygonKind::MultiPolygon,
        other => {
            debug!(index, geometry = other, "skipping non-polygon feature");
            return Ok(None);
        }
    };

    let coords = match geometry.get("coordinates") {
        Some(Value::Null) | None => {
            debug!(index, "skipping feature with empty geometry");
            return Ok(None);
        }
        Some(c) => c,
    };

    let parts: Vec<PolygonRings> = match kind {
        PolygonKind::Polygon => parse_polygon(coords).map(|part| vec![part]),
        PolygonKind::MultiPolygon => parse_multi_polygon(coords),
    }
    .map_err(|reason| FeatureSourceError::InvalidFeature { index, reason })?
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect();

    if parts.is_empty() {
        debug!(index, "skipping feature with empty geometry");
        return Ok(None);
    }

    let properties = obj
        .get("properties")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();

    Ok(Some(PolygonFeature {
        id,
        properties,
        kind,
        parts,
    }))
}

fn parse_position(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    let point = GeoPoint::new(lon, lat);
    Ok(match arr.get(2).and_then(|v| v.as_f64()) {
        Some(alt) => point.with_alt(alt),
        None => point,
    })
}

fn parse_ring(coords: &Value) -> Result<Ring, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array of positions".to_string())?;
    arr.iter().map(parse_position).collect()
}

fn parse_polygon(coords: &Value) -> Result<PolygonRings, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    rings.iter().map(parse_ring).collect()
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<PolygonRings>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    polys.iter().map(parse_polygon).collect()
}

#[cfg(test)]
mod tests {
    use super::{FeatureCollection, FeatureSourceError, GeoPoint, PolygonKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_only_polygonal_features_from_demo_parcels() {
        let payload = include_str!("../assets/parcels.geojson");
        let collection = FeatureCollection::from_geojson_str(payload).expect("parse parcels");

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.features[0].id.as_deref(), Some("parcel-1"));
        assert_eq!(collection.features[0].kind, PolygonKind::Polygon);
        assert_eq!(collection.features[1].id.as_deref(), Some("2"));
        assert_eq!(collection.features[1].kind, PolygonKind::MultiPolygon);
    }

    #[test]
    fn multi_polygon_yields_one_exterior_ring_per_part() {
        let payload = include_str!("../assets/parcels.geojson");
        let collection = FeatureCollection::from_geojson_str(payload).expect("parse parcels");
        let lago = &collection.features[1];

        // The hole in the first part is carried but is not an exterior ring.
        assert_eq!(lago.parts[0].len(), 2);
        let exteriors: Vec<_> = lago.exterior_rings().collect();
        assert_eq!(exteriors.len(), 2);
        assert_eq!(exteriors[1][0], GeoPoint::new(-47.8600, -15.8300));
    }

    #[test]
    fn skips_missing_and_empty_geometry() {
        let payload = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": {} },
                { "type": "Feature", "geometry": null },
                { "type": "Feature", "geometry": { "type": "Polygon", "coordinates": [] } },
                { "type": "Feature", "geometry": { "type": "MultiPolygon", "coordinates": [[]] } }
            ]
        }"#;
        let collection = FeatureCollection::from_geojson_str(payload).expect("parse");
        assert!(collection.is_empty());
    }

    #[test]
    fn accepts_a_single_feature_and_keeps_altitude() {
        let payload = r#"{
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[10, 0, 3.5], [10, 10], [20, 10]]]
            }
        }"#;
        let collection = FeatureCollection::from_geojson_str(payload).expect("parse");
        let ring = collection.features[0].exterior_rings().next().expect("ring");
        assert_eq!(
            ring,
            &vec![
                GeoPoint::new(10.0, 0.0).with_alt(3.5),
                GeoPoint::new(10.0, 10.0),
                GeoPoint::new(20.0, 10.0),
            ]
        );
    }

    #[test]
    fn rejects_malformed_positions() {
        let payload = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "Polygon", "coordinates": [[["a", 0]]] } }
            ]
        }"#;
        let err = FeatureCollection::from_geojson_str(payload).unwrap_err();
        assert!(matches!(err, FeatureSourceError::InvalidFeature { index: 0, .. }));
    }

    #[test]
    fn rejects_non_geojson_roots() {
        assert!(matches!(
            FeatureCollection::from_geojson_str(r#"{"type": "Topology"}"#),
            Err(FeatureSourceError::NotGeoJson)
        ));
        assert!(matches!(
            FeatureCollection::from_geojson_str("not json"),
            Err(FeatureSourceError::Json(_))
        ));
    }
}
