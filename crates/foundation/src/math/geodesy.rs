use super::{Ecef, Vec3};

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);
/// WGS84 second eccentricity squared.
pub const WGS84_EP2: f64 = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);

/// Geodetic coordinates in radians and meters above the ellipsoid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geodetic {
    pub lat_rad: f64,
    pub lon_rad: f64,
    pub alt_m: f64,
}

impl Geodetic {
    pub fn new(lat_rad: f64, lon_rad: f64, alt_m: f64) -> Self {
        Self {
            lat_rad,
            lon_rad,
            alt_m,
        }
    }

    /// GeoJSON axis order: longitude first.
    pub fn from_degrees(lon_deg: f64, lat_deg: f64, alt_m: f64) -> Self {
        Self::new(lat_deg.to_radians(), lon_deg.to_radians(), alt_m)
    }

    pub fn lon_deg(&self) -> f64 {
        self.lon_rad.to_degrees()
    }

    pub fn lat_deg(&self) -> f64 {
        self.lat_rad.to_degrees()
    }

    pub fn with_alt(self, alt_m: f64) -> Self {
        Self { alt_m, ..self }
    }

    pub fn to_ecef(self) -> Ecef {
        geodetic_to_ecef(self)
    }
}

impl Ecef {
    pub fn to_geodetic(self) -> Geodetic {
        ecef_to_geodetic(self)
    }
}

pub fn geodetic_to_ecef(geo: Geodetic) -> Ecef {
    let (sin_lat, cos_lat) = geo.lat_rad.sin_cos();
    let (sin_lon, cos_lon) = geo.lon_rad.sin_cos();

    // Prime vertical radius of curvature.
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    let r = (n + geo.alt_m) * cos_lat;

    Ecef::new(
        r * cos_lon,
        r * sin_lon,
        (n * (1.0 - WGS84_E2) + geo.alt_m) * sin_lat,
    )
}

/// Closed-form inverse (Bowring). Sub-millimeter for terrestrial heights.
pub fn ecef_to_geodetic(ecef: Ecef) -> Geodetic {
    let p = ecef.x.hypot(ecef.y);
    let lon = ecef.y.atan2(ecef.x);

    let (sin_t, cos_t) = (ecef.z * WGS84_A).atan2(p * WGS84_B).sin_cos();
    let lat = (ecef.z + WGS84_EP2 * WGS84_B * sin_t.powi(3))
        .atan2(p - WGS84_E2 * WGS84_A * cos_t.powi(3));

    let sin_lat = lat.sin();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    // Near the poles p / cos(lat) degenerates; use the z form there.
    let alt = if lat.cos().abs() > 1e-10 {
        p / lat.cos() - n
    } else {
        ecef.z.abs() - WGS84_B
    };

    Geodetic::new(lat, lon, alt)
}

/// Outward ellipsoid normal at an ECEF position.
pub fn ellipsoid_normal(p: Vec3) -> Vec3 {
    let a2 = WGS84_A * WGS84_A;
    let b2 = WGS84_B * WGS84_B;
    Vec3::new(p.x / a2, p.y / a2, p.z / b2).normalize()
}
