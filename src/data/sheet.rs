//! Primary structured marker source.
//!
//! A map row names a `MapMarkerRange`; every marker sub-row carrying that
//! range is a candidate marker. Columns are bound by name once, when the
//! sheet is constructed, and every row is then decoded through the same
//! typed [`ColumnBinding`].

use crate::{
    core::calibration::MapCalibration,
    data::RowError,
    markers::icon,
    prelude::HashMap,
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Map row: marker range plus calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    pub id: u32,
    pub marker_range: u32,
    #[serde(flatten)]
    pub calibration: MapCalibration,
    #[serde(default)]
    pub territory_id: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One decoded marker sub-row
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRow {
    pub sub_row: u32,
    /// Raw pixel position on the reference texture
    pub x: f64,
    pub y: f64,
    /// 0 when the row carries no usable icon
    pub icon: u32,
    pub place_name_id: u32,
    pub place_name: Option<String>,
}

/// Access to the structured marker data.
///
/// Implementations report missing sheets or unreadable rows as errors; the
/// extractor decides how to degrade.
pub trait MarkerSheet: Send + Sync {
    fn map_info(&self, map_id: u32) -> Result<Option<MapInfo>>;

    fn marker_rows<'a>(
        &'a self,
        marker_range: u32,
    ) -> Result<Box<dyn Iterator<Item = Result<MarkerRow>> + 'a>>;
}

/// Column positions resolved from header names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnBinding {
    x: usize,
    y: usize,
    icon: Option<usize>,
    place_name_id: Option<usize>,
    place_name: Option<usize>,
}

impl ColumnBinding {
    /// Binds `X`, `Y` (required), `Icon`, `PlaceNameId` and
    /// `PlaceNameSubtext` / `PlaceName` (the subtext wins when both exist)
    pub fn resolve<S: AsRef<str>>(columns: &[S]) -> Result<Self> {
        let find = |name: &str| columns.iter().position(|c| c.as_ref() == name);

        let x = find("X").ok_or_else(|| MapError::Schema("marker sheet has no X column".into()))?;
        let y = find("Y").ok_or_else(|| MapError::Schema("marker sheet has no Y column".into()))?;

        Ok(Self {
            x,
            y,
            icon: find("Icon"),
            place_name_id: find("PlaceNameId"),
            place_name: find("PlaceNameSubtext").or_else(|| find("PlaceName")),
        })
    }

    /// Decodes one row of raw values
    pub fn decode(&self, sub_row: u32, values: &[Value]) -> std::result::Result<MarkerRow, RowError> {
        let row = || sub_row.to_string();
        let number = |index: usize, column: &'static str| -> std::result::Result<f64, RowError> {
            match values.get(index) {
                None | Some(Value::Null) => Err(RowError::MissingColumn { row: row(), column }),
                Some(Value::Number(n)) => n.as_f64().ok_or_else(|| RowError::NotANumber {
                    row: row(),
                    column,
                    value: n.to_string(),
                }),
                Some(Value::String(s)) => s.trim().parse().map_err(|_| RowError::NotANumber {
                    row: row(),
                    column,
                    value: s.clone(),
                }),
                Some(other) => Err(RowError::NotANumber {
                    row: row(),
                    column,
                    value: other.to_string(),
                }),
            }
        };

        let x = number(self.x, "X")?;
        let y = number(self.y, "Y")?;

        let icon = self
            .icon
            .and_then(|index| values.get(index))
            .map(icon_from_value)
            .unwrap_or(0);

        let place_name_id = self
            .place_name_id
            .and_then(|index| values.get(index))
            .and_then(Value::as_u64)
            .and_then(|id| u32::try_from(id).ok())
            .unwrap_or(0);

        let place_name = self
            .place_name
            .and_then(|index| values.get(index))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Ok(MarkerRow {
            sub_row,
            x,
            y,
            icon,
            place_name_id,
            place_name,
        })
    }
}

/// Icon cells hold either a numeric id or an image reference ending in
/// `/NNNNNN.tex`
fn icon_from_value(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n.as_u64().and_then(|id| u32::try_from(id).ok()).unwrap_or(0),
        Value::String(s) => s
            .trim()
            .parse()
            .ok()
            .or_else(|| icon::parse_icon_reference(s))
            .unwrap_or(0),
        _ => 0,
    }
}

/// A marker sub-row as exported: range id, sub-row index and raw cell values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMarkerRow {
    pub range: u32,
    pub sub_row: u32,
    pub values: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SheetExport {
    maps: Vec<MapInfo>,
    map_markers: MarkerTableExport,
}

#[derive(Debug, Deserialize)]
struct MarkerTableExport {
    columns: Vec<String>,
    rows: Vec<RawMarkerRow>,
}

/// [`MarkerSheet`] backed by a JSON export of the Map and MapMarker sheets
#[derive(Debug, Clone)]
pub struct JsonSheet {
    maps: HashMap<u32, MapInfo>,
    binding: ColumnBinding,
    ranges: HashMap<u32, Vec<RawMarkerRow>>,
}

impl JsonSheet {
    pub fn new<S: AsRef<str>>(maps: Vec<MapInfo>, columns: &[S], rows: Vec<RawMarkerRow>) -> Result<Self> {
        let binding = ColumnBinding::resolve(columns)?;

        let mut ranges: HashMap<u32, Vec<RawMarkerRow>> = HashMap::default();
        for row in rows {
            ranges.entry(row.range).or_default().push(row);
        }

        Ok(Self {
            maps: maps.into_iter().map(|map| (map.id, map)).collect(),
            binding,
            ranges,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let export: SheetExport = serde_json::from_str(json)?;
        Self::new(export.maps, &export.map_markers.columns, export.map_markers.rows)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let sheet = Self::from_json(&text)?;
        log::info!(
            "loaded marker sheet {} ({} maps, {} marker ranges)",
            path.display(),
            sheet.maps.len(),
            sheet.ranges.len()
        );
        Ok(sheet)
    }

    pub fn map_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.maps.keys().copied()
    }
}

impl MarkerSheet for JsonSheet {
    fn map_info(&self, map_id: u32) -> Result<Option<MapInfo>> {
        Ok(self.maps.get(&map_id).cloned())
    }

    fn marker_rows<'a>(
        &'a self,
        marker_range: u32,
    ) -> Result<Box<dyn Iterator<Item = Result<MarkerRow>> + 'a>> {
        let rows = self.ranges.get(&marker_range).map(Vec::as_slice).unwrap_or(&[]);
        Ok(Box::new(rows.iter().map(move |row| {
            self.binding
                .decode(row.sub_row, &row.values)
                .map_err(MapError::from)
        })))
    }
}
