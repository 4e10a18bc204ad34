use anyhow::{bail, Context};
use std::sync::Arc;
use zonemap::{JsonSheet, MarkerExtractor, MarkerType, PipelineOptions, PipelineProfile};

const USAGE: &str = "usage: zonemap-app <sheet.json> <map-id> [markers.csv] [config.json]";

/// Extracts the markers of one map and prints them as JSON
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 4 {
        bail!(USAGE);
    }

    let map_id: u32 = args[1]
        .parse()
        .with_context(|| format!("map id must be a number, got {:?}", args[1]))?;

    let options = match args.get(3) {
        Some(path) => PipelineOptions::from_json_file(path)
            .with_context(|| format!("failed to load options from {path}"))?,
        None => PipelineProfile::Balanced.resolve(),
    };

    let sheet = JsonSheet::from_path(&args[0])
        .with_context(|| format!("failed to load marker sheet {}", args[0]))?;

    if !sheet.map_ids().any(|id| id == map_id) {
        log::warn!("map {} is not in {}", map_id, args[0]);
    }

    let mut extractor = MarkerExtractor::new(&options).with_sheet(Arc::new(sheet));
    if let Some(path) = args.get(2) {
        extractor = extractor.with_flat_file_path(path);
    }

    let markers = extractor.extract_markers(map_id);
    log::info!(
        "map {}: {} markers from the {:?} tier",
        map_id,
        markers.len(),
        markers.tier
    );

    let counts = markers.count_by_type();
    for marker_type in MarkerType::ALL {
        if let Some(count) = counts.get(&marker_type) {
            log::info!("  {}: {}", marker_type.label(), count);
        }
    }

    println!("{}", markers.to_json()?);
    Ok(())
}
