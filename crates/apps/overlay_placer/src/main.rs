mod terrain_client;

use std::env;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use formats::load_feature_collection;
use overlays::{
    FlatTerrain, Overlay, OverlayCollection, OverlayPlacer, OverlayStyle, PlacementReport,
};
use reqwest::Client;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::terrain_client::{HttpTerrainService, TerrainSource};

const DEFAULT_TERRAIN_URL: &str = "http://127.0.0.1:9100/terrain";

#[derive(Parser, Debug)]
#[command(author, version, about = "Place GeoJSON polygons as terrain-aware overlays")]
struct Args {
    /// GeoJSON FeatureCollection (or single Feature) to place
    #[arg(long)]
    geojson: PathBuf,

    /// Terrain height service base URL (default: $TERRAIN_URL, then a local server)
    #[arg(long, conflicts_with = "flat_height")]
    terrain_url: Option<String>,

    /// Skip the height service and treat terrain as flat at this height (meters)
    #[arg(long)]
    flat_height: Option<f64>,

    /// JSON file overriding the overlay fill/outline style
    #[arg(long)]
    style: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct PlacementOutput<'a> {
    overlays: &'a [Overlay],
    report: &'a PlacementReport,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let style = match &args.style {
        Some(path) => OverlayStyle::from_json_str(&fs::read_to_string(path)?)?,
        None => OverlayStyle::default(),
    };
    let terrain = select_terrain(&args, env::var("TERRAIN_URL").ok());
    let collection = load_feature_collection(&args.geojson)?;
    info!(
        path = %args.geojson.display(),
        features = collection.len(),
        "loaded polygon features"
    );

    let placer = OverlayPlacer::new(terrain).with_style(style);
    let mut overlays = OverlayCollection::new();
    let report = placer
        .resolve_all_and_place(&collection.features, &mut overlays)
        .await;

    let output = PlacementOutput {
        overlays: overlays.overlays(),
        report: &report,
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");

    Ok(())
}

fn select_terrain(args: &Args, env_url: Option<String>) -> TerrainSource {
    if let Some(height_m) = args.flat_height {
        return TerrainSource::Flat(FlatTerrain::new(height_m));
    }
    let base_url = args
        .terrain_url
        .clone()
        .or(env_url)
        .unwrap_or_else(|| DEFAULT_TERRAIN_URL.to_string());
    TerrainSource::Http(HttpTerrainService::new(Client::new(), base_url))
}
