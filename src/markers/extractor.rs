//! Per-map marker extraction with a strict fallthrough chain:
//!
//! 1. the structured marker range of the map ([`MarkerSheet`]),
//! 2. the flat delimited marker file ([`FlatMarkerFile`]),
//! 3. a synthetic sample set so the overlay always has something to show.
//!
//! Extraction never fails visibly. Tier failures are logged and fall through
//! to the next tier; unreadable rows are skipped one at a time.

use crate::{
    core::{
        calibration::MapCalibration,
        config::{ExtractionConfig, PipelineOptions, Verbosity},
        geo::Point,
        transform::CoordinateTransformer,
    },
    data::{flat_file::FlatMarkerFile, sheet::MarkerSheet},
    markers::{
        classifier::MarkerClassifier,
        marker::{MapMarker, MarkerSet, MarkerTier},
        sample::sample_markers,
    },
    Result,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
enum FlatFileSource {
    Loaded(FlatMarkerFile),
    /// Read on demand; a missing file just means the tier yields nothing
    Path(PathBuf),
}

/// Produces the [`MarkerSet`] of a map from whichever tier has data
#[derive(Clone)]
pub struct MarkerExtractor {
    sheet: Option<Arc<dyn MarkerSheet>>,
    flat_file: Option<FlatFileSource>,
    config: ExtractionConfig,
    classifier: MarkerClassifier,
    verbosity: Verbosity,
}

impl MarkerExtractor {
    pub fn new(options: &PipelineOptions) -> Self {
        Self {
            sheet: None,
            flat_file: None,
            config: options.extraction.clone(),
            classifier: MarkerClassifier::new(options.verbosity),
            verbosity: options.verbosity,
        }
    }

    pub fn with_sheet(mut self, sheet: Arc<dyn MarkerSheet>) -> Self {
        self.sheet = Some(sheet);
        self
    }

    pub fn with_flat_file(mut self, file: FlatMarkerFile) -> Self {
        self.flat_file = Some(FlatFileSource::Loaded(file));
        self
    }

    pub fn with_flat_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.flat_file = Some(FlatFileSource::Path(path.into()));
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn classifier(&self) -> &MarkerClassifier {
        &self.classifier
    }

    /// Calibration of a map, or the defaults when the sheet cannot tell
    pub fn calibration(&self, map_id: u32) -> MapCalibration {
        let info = self
            .sheet
            .as_ref()
            .and_then(|sheet| sheet.map_info(map_id).ok().flatten());
        MapCalibration::or_default(info.as_ref().map(|info| &info.calibration))
    }

    pub fn extract_markers(&self, map_id: u32) -> MarkerSet {
        let calibration = self.calibration(map_id);

        match self.extract_primary(map_id, &calibration) {
            Ok(markers) if !markers.is_empty() => {
                return self.finish(map_id, MarkerTier::Primary, markers);
            }
            Ok(_) => log::debug!("map {}: no markers in the structured source", map_id),
            Err(e) => log::warn!("map {}: structured marker extraction failed: {}", map_id, e),
        }

        match self.extract_secondary(map_id, &calibration) {
            Ok(markers) if !markers.is_empty() => {
                return self.finish(map_id, MarkerTier::Secondary, markers);
            }
            Ok(_) => log::debug!("map {}: no markers in the flat marker file", map_id),
            Err(e) => log::warn!("map {}: flat marker file unavailable: {}", map_id, e),
        }

        if self.config.synthesize_samples {
            self.finish(map_id, MarkerTier::Sample, sample_markers(map_id, &calibration))
        } else {
            self.finish(map_id, MarkerTier::Empty, Vec::new())
        }
    }

    fn finish(&self, map_id: u32, tier: MarkerTier, markers: Vec<MapMarker>) -> MarkerSet {
        if !self.verbosity.is_quiet() {
            log::info!("map {}: {} markers from {:?} tier", map_id, markers.len(), tier);
        }
        MarkerSet::new(map_id, tier, markers)
    }

    /// Reads the map's marker range, bounded by `max_markers` accepted
    /// markers and the wall-clock budget, whichever is hit first
    fn extract_primary(&self, map_id: u32, calibration: &MapCalibration) -> Result<Vec<MapMarker>> {
        let started = Instant::now();
        let budget = self.config.time_budget();

        let Some(sheet) = self.sheet.as_ref() else {
            return Ok(Vec::new());
        };
        let Some(info) = sheet.map_info(map_id)? else {
            log::debug!("map {}: not present in the map sheet", map_id);
            return Ok(Vec::new());
        };
        if info.marker_range == 0 {
            return Ok(Vec::new());
        }

        let mut markers = Vec::new();
        let mut skipped = 0usize;

        for row in sheet.marker_rows(info.marker_range)? {
            if markers.len() >= self.config.max_markers {
                log::debug!("map {}: marker limit {} reached", map_id, self.config.max_markers);
                break;
            }
            if started.elapsed() >= budget {
                log::warn!(
                    "map {}: extraction exceeded {} ms, keeping {} markers",
                    map_id,
                    self.config.max_processing_time_ms,
                    markers.len()
                );
                break;
            }

            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    skipped += 1;
                    if self.verbosity.is_verbose() {
                        log::debug!("map {}: skipping marker row: {}", map_id, e);
                    }
                    continue;
                }
            };

            // 0 on either axis means the row has no position
            if row.x == 0.0 || row.y == 0.0 {
                skipped += 1;
                continue;
            }

            let icon_id = match (row.icon, row.place_name.as_deref()) {
                (0, Some(name)) => self.classifier.icon_for_place_name(name),
                (icon, _) => icon,
            };

            let game = texture_pixel_to_game(row.x, row.y, calibration);
            let mut marker = MapMarker::new(row.sub_row, map_id, game.x, game.y, icon_id)
                .with_place_name(non_zero(row.place_name_id), row.place_name);
            marker.resolve_type(&self.classifier);

            if self.verbosity.is_verbose() {
                log::debug!(
                    "map {}: marker {} at ({:.2}, {:.2}) icon {} -> {:?}",
                    map_id,
                    marker.id,
                    marker.x,
                    marker.y,
                    marker.icon_id,
                    marker.marker_type()
                );
            }
            markers.push(marker);
        }

        if skipped > 0 {
            log::debug!("map {}: skipped {} marker rows", map_id, skipped);
        }
        Ok(markers)
    }

    fn extract_secondary(&self, map_id: u32, calibration: &MapCalibration) -> Result<Vec<MapMarker>> {
        let loaded;
        let file = match &self.flat_file {
            None => return Ok(Vec::new()),
            Some(FlatFileSource::Loaded(file)) => file,
            Some(FlatFileSource::Path(path)) => {
                loaded = FlatMarkerFile::open(path, self.config.flat_file_header_lines)?;
                &loaded
            }
        };

        let mut markers = Vec::new();
        for row in file.rows_for_map(map_id) {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    if self.verbosity.is_verbose() {
                        log::debug!("map {}: skipping flat marker row: {}", map_id, e);
                    }
                    continue;
                }
            };

            let game = texture_pixel_to_game(row.x, row.y, calibration);
            let mut marker = MapMarker::new(row.sub_index, map_id, game.x, game.y, row.icon_id)
                .with_place_name(non_zero(row.place_name_id), None);
            marker.resolve_type(&self.classifier);
            markers.push(marker);
        }
        Ok(markers)
    }
}

impl std::fmt::Debug for MarkerExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerExtractor")
            .field("has_sheet", &self.sheet.is_some())
            .field("flat_file", &self.flat_file)
            .field("config", &self.config)
            .field("verbosity", &self.verbosity)
            .finish()
    }
}

/// Raw reference-texture pixels to game coordinates
fn texture_pixel_to_game(x: f64, y: f64, calibration: &MapCalibration) -> Point {
    let normalized = CoordinateTransformer::texture_pixel_to_normalized(x, y);
    CoordinateTransformer::normalized_to_game(normalized.x, normalized.y, calibration)
}

fn non_zero(id: u32) -> Option<u32> {
    (id != 0).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::sheet::{JsonSheet, MapInfo, MarkerRow, RawMarkerRow},
        markers::marker::MarkerType,
        MapError,
    };
    use serde_json::json;

    const COLUMNS: [&str; 5] = ["X", "Y", "Icon", "PlaceNameSubtext", "PlaceNameId"];

    fn map(id: u32, marker_range: u32) -> MapInfo {
        MapInfo {
            id,
            marker_range,
            calibration: MapCalibration::default(),
            territory_id: None,
            name: None,
        }
    }

    fn sheet(rows: Vec<RawMarkerRow>) -> Arc<dyn MarkerSheet> {
        Arc::new(JsonSheet::new(vec![map(12, 3)], &COLUMNS, rows).unwrap())
    }

    fn row(sub_row: u32, values: serde_json::Value) -> RawMarkerRow {
        RawMarkerRow {
            range: 3,
            sub_row,
            values: values.as_array().cloned().unwrap_or_default(),
        }
    }

    struct BrokenSheet;

    impl MarkerSheet for BrokenSheet {
        fn map_info(&self, _map_id: u32) -> Result<Option<MapInfo>> {
            Err(MapError::Schema("sheet missing".into()))
        }

        fn marker_rows<'a>(
            &'a self,
            _marker_range: u32,
        ) -> Result<Box<dyn Iterator<Item = Result<MarkerRow>> + 'a>> {
            Err(MapError::Schema("sheet missing".into()))
        }
    }

    #[test]
    fn test_primary_tier() {
        let extractor = MarkerExtractor::new(&PipelineOptions::default()).with_sheet(sheet(vec![
            row(0, json!([1024, 1024, 60453, "Aetheryte Plaza", 41])),
            row(1, json!([512, 1536, "ui/icon/060000/060314.tex", null, 0])),
            row(2, json!([0, 0, 60412, null, 0])),
            row(3, json!(["oops", 5, 60412, null, 0])),
            row(4, json!([300, 300, null, "Old Gridania Market", 7])),
            row(5, json!([600, 600, null, null, 0])),
        ]));

        let set = extractor.extract_markers(12);
        assert_eq!(set.tier, MarkerTier::Primary);
        assert_eq!(set.len(), 4);

        let hub = set.get(0).unwrap();
        assert!((hub.x - 21.5).abs() < 1e-9);
        assert_eq!(hub.marker_type(), MarkerType::Aetheryte);
        assert_eq!(hub.place_name_id, Some(41));

        assert_eq!(set.get(1).unwrap().marker_type(), MarkerType::Quest);
        assert!(set.get(2).is_none());
        assert!(set.get(3).is_none());

        // settlement name wins over the market keyword
        let named = set.get(4).unwrap();
        assert_eq!(named.marker_type(), MarkerType::Landmark);
        assert_ne!(named.icon_id, 0);

        let symbol = set.get(5).unwrap();
        assert!(symbol.is_text_only());
        assert_eq!(symbol.marker_type(), MarkerType::Symbol);
    }

    #[test]
    fn test_primary_stops_at_marker_limit() {
        let rows = (0..150)
            .map(|i| row(i, json!([100 + i, 200 + i, 60314, null, 0])))
            .collect();
        let set = MarkerExtractor::new(&PipelineOptions::default())
            .with_sheet(sheet(rows))
            .extract_markers(12);

        assert_eq!(set.tier, MarkerTier::Primary);
        assert_eq!(set.len(), 100);
    }

    #[test]
    fn test_exhausted_time_budget_falls_through() {
        let mut options = PipelineOptions::default();
        options.extraction.max_processing_time_ms = 0;

        let set = MarkerExtractor::new(&options)
            .with_sheet(sheet(vec![row(0, json!([1024, 1024, 60453, null, 0]))]))
            .extract_markers(12);

        assert_eq!(set.tier, MarkerTier::Sample);
    }

    /// Yields `rows` markers, sleeping before each one
    struct SlowSheet {
        rows: u32,
        delay: std::time::Duration,
    }

    impl MarkerSheet for SlowSheet {
        fn map_info(&self, map_id: u32) -> Result<Option<MapInfo>> {
            Ok(Some(map(map_id, 3)))
        }

        fn marker_rows<'a>(
            &'a self,
            _marker_range: u32,
        ) -> Result<Box<dyn Iterator<Item = Result<MarkerRow>> + 'a>> {
            let delay = self.delay;
            Ok(Box::new((0..self.rows).map(move |i| {
                std::thread::sleep(delay);
                Ok(MarkerRow {
                    sub_row: i,
                    x: 100.0 + i as f64,
                    y: 100.0,
                    icon: 60314,
                    place_name_id: 0,
                    place_name: None,
                })
            })))
        }
    }

    #[test]
    fn test_time_budget_keeps_markers_gathered_so_far() {
        let mut options = PipelineOptions::default();
        options.extraction.max_processing_time_ms = 150;
        let extractor = MarkerExtractor::new(&options).with_sheet(Arc::new(SlowSheet {
            rows: 40,
            delay: std::time::Duration::from_millis(20),
        }));

        let set = extractor.extract_markers(12);

        assert_eq!(set.tier, MarkerTier::Primary);
        assert!(!set.is_empty());
        assert!(set.len() < 40, "budget should stop extraction early, got {}", set.len());
        assert!(set.iter().enumerate().all(|(i, m)| m.id == i as u32));
    }

    #[test]
    fn test_secondary_tier_renormalizes() {
        let file = FlatMarkerFile::new(
            "key,0,1,2,3\n#,X,Y,Icon,PlaceName\n12.0,1024,2048,60453,41\n13.0,1,1,60314,0\n12.1,bad,1,1,1\n",
            2,
        );
        let set = MarkerExtractor::new(&PipelineOptions::default())
            .with_sheet(sheet(Vec::new()))
            .with_flat_file(file)
            .extract_markers(12);

        assert_eq!(set.tier, MarkerTier::Secondary);
        assert_eq!(set.len(), 1);
        let marker = &set.markers()[0];
        assert!((marker.x - 21.5).abs() < 1e-9);
        assert!((marker.y - 42.0).abs() < 1e-9);
        assert_eq!(marker.marker_type(), MarkerType::Aetheryte);
    }

    #[test]
    fn test_fallback_to_sample_set() {
        let set = MarkerExtractor::new(&PipelineOptions::default())
            .with_sheet(Arc::new(BrokenSheet))
            .with_flat_file_path("/nonexistent/markers.csv")
            .extract_markers(12);

        assert_eq!(set.tier, MarkerTier::Sample);
        assert_eq!(set.len(), 9);
        let ids: Vec<u32> = set.iter().map(|m| m.id).collect();
        assert_eq!(ids, (1..=9).collect::<Vec<_>>());
        assert_eq!(
            set.iter().filter(|m| m.marker_type() == MarkerType::Aetheryte).count(),
            1
        );
    }

    #[test]
    fn test_sample_synthesis_can_be_disabled() {
        let mut options = PipelineOptions::default();
        options.extraction.synthesize_samples = false;

        let set = MarkerExtractor::new(&options).extract_markers(12);
        assert_eq!(set.tier, MarkerTier::Empty);
        assert!(set.is_empty());
    }
}
