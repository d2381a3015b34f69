use std::fs;
use std::path::{Path, PathBuf};

use crate::polygon_features::{FeatureCollection, FeatureSourceError};

#[derive(Debug)]
pub enum FeatureLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: FeatureSourceError,
    },
}

impl std::fmt::Display for FeatureLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureLoadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            FeatureLoadError::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for FeatureLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeatureLoadError::Io { source, .. } => Some(source),
            FeatureLoadError::Parse { source, .. } => Some(source),
        }
    }
}

/// Reads a one-shot GeoJSON document from disk.
pub fn load_feature_collection(
    path: impl AsRef<Path>,
) -> Result<FeatureCollection, FeatureLoadError> {
    let path = path.as_ref();
    let payload = fs::read_to_string(path).map_err(|e| FeatureLoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    FeatureCollection::from_geojson_str(&payload).map_err(|e| FeatureLoadError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}
