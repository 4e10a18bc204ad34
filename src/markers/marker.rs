use crate::{
    core::geo::Point,
    markers::{classifier::MarkerClassifier, icon},
    prelude::HashMap,
    Result,
};
use serde::{Deserialize, Serialize};

/// Semantic classification of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerType {
    Generic,
    /// Fast-travel point
    Aetheryte,
    Quest,
    Npc,
    Shop,
    Landmark,
    Entrance,
    Symbol,
    Custom,
    Fate,
    QuestBattle,
}

impl MarkerType {
    pub const ALL: [MarkerType; 11] = [
        MarkerType::Generic,
        MarkerType::Aetheryte,
        MarkerType::Quest,
        MarkerType::Npc,
        MarkerType::Shop,
        MarkerType::Landmark,
        MarkerType::Entrance,
        MarkerType::Symbol,
        MarkerType::Custom,
        MarkerType::Fate,
        MarkerType::QuestBattle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Generic => "Generic",
            Self::Aetheryte => "Aetheryte",
            Self::Quest => "Quest",
            Self::Npc => "NPC",
            Self::Shop => "Shop",
            Self::Landmark => "Landmark",
            Self::Entrance => "Entrance",
            Self::Symbol => "Symbol",
            Self::Custom => "Custom",
            Self::Fate => "FATE",
            Self::QuestBattle => "Quest Battle",
        }
    }
}

impl Default for MarkerType {
    fn default() -> Self {
        Self::Generic
    }
}

/// A point of interest on one map, positioned in game coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: u32,
    pub map_id: u32,
    pub place_name_id: Option<u32>,
    pub place_name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub icon_id: u32,
    pub visible: bool,
    /// `None` until assigned or derived
    #[serde(rename = "type")]
    marker_type: Option<MarkerType>,
}

impl MapMarker {
    pub fn new(id: u32, map_id: u32, x: f64, y: f64, icon_id: u32) -> Self {
        Self {
            id,
            map_id,
            place_name_id: None,
            place_name: None,
            x,
            y,
            z: 0.0,
            icon_id,
            visible: true,
            marker_type: None,
        }
    }

    pub fn with_place_name(mut self, place_name_id: Option<u32>, place_name: Option<String>) -> Self {
        self.place_name_id = place_name_id;
        self.place_name = place_name;
        self
    }

    /// Assigns the type explicitly, bypassing derivation
    pub fn with_type(mut self, marker_type: MarkerType) -> Self {
        self.marker_type = Some(marker_type);
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn icon_path(&self) -> String {
        icon::icon_path(self.icon_id)
    }

    /// Markers without an icon are drawn as text or a plain symbol
    pub fn is_text_only(&self) -> bool {
        self.icon_id == 0
    }

    /// Whether the type is still open to derivation
    pub fn is_type_undetermined(&self) -> bool {
        matches!(self.marker_type, None | Some(MarkerType::Generic))
    }

    /// Current type; an underived marker reports `Generic`
    pub fn marker_type(&self) -> MarkerType {
        self.marker_type.unwrap_or_default()
    }

    /// Derives the type from icon and place name once. Only the two
    /// undetermined states (unset and `Generic`) are re-derived; any other
    /// type is kept as is.
    pub fn resolve_type(&mut self, classifier: &MarkerClassifier) -> MarkerType {
        if self.is_type_undetermined() {
            let derived = classifier.derive_type(self.icon_id, self.place_name.as_deref());
            self.marker_type = Some(derived);
        }
        self.marker_type()
    }
}

/// Which extraction tier produced a marker set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerTier {
    /// Structured per-map marker range
    Primary,
    /// Flat delimited marker file
    Secondary,
    /// Synthetic placeholder markers
    Sample,
    /// Nothing found and sample synthesis disabled
    Empty,
}

/// Ordered markers belonging to one map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSet {
    pub map_id: u32,
    pub tier: MarkerTier,
    markers: Vec<MapMarker>,
}

impl MarkerSet {
    pub fn new(map_id: u32, tier: MarkerTier, markers: Vec<MapMarker>) -> Self {
        Self {
            map_id,
            tier,
            markers,
        }
    }

    pub fn empty(map_id: u32) -> Self {
        Self::new(map_id, MarkerTier::Empty, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> &[MapMarker] {
        &self.markers
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapMarker> {
        self.markers.iter()
    }

    pub fn visible(&self) -> impl Iterator<Item = &MapMarker> {
        self.markers.iter().filter(|m| m.visible)
    }

    pub fn get(&self, id: u32) -> Option<&MapMarker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Toggles one marker; returns false when no marker has that id
    pub fn set_marker_visible(&mut self, id: u32, visible: bool) -> bool {
        match self.markers.iter_mut().find(|m| m.id == id) {
            Some(marker) => {
                marker.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Toggles every marker of one type; returns how many were touched
    pub fn set_type_visible(&mut self, marker_type: MarkerType, visible: bool) -> usize {
        let mut touched = 0;
        for marker in self.markers.iter_mut().filter(|m| m.marker_type() == marker_type) {
            marker.visible = visible;
            touched += 1;
        }
        touched
    }

    pub fn count_by_type(&self) -> HashMap<MarkerType, usize> {
        let mut counts = HashMap::default();
        for marker in &self.markers {
            *counts.entry(marker.marker_type()).or_insert(0) += 1;
        }
        counts
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'a> IntoIterator for &'a MarkerSet {
    type Item = &'a MapMarker;
    type IntoIter = std::slice::Iter<'a, MapMarker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}
