//! Maps icon identifiers (and, for icon-less markers, place names) onto a
//! [`MarkerType`].
//!
//! Lookup order is fixed: an exact table of known icons, then an ordered list
//! of half-open id ranges (first match wins), then [`MarkerType::Generic`].

use crate::core::config::Verbosity;
use crate::markers::marker::MarkerType;
use crate::prelude::HashMap;
use once_cell::sync::Lazy;
use std::ops::Range;

/// Icon returned by place-name lookup when no keyword matches; the marker
/// still needs a proper icon lookup elsewhere.
pub const UNRESOLVED_ICON_ID: u32 = 60_000;

pub const AETHERYTE_ICON_ID: u32 = 60_453;
pub const LANDMARK_ICON_ID: u32 = 60_442;
pub const SETTLEMENT_ICON_ID: u32 = 60_448;
pub const SHOP_ICON_ID: u32 = 60_412;
pub const QUEST_ICON_ID: u32 = 60_314;
pub const NPC_ICON_ID: u32 = 60_561;
pub const ENTRANCE_ICON_ID: u32 = 60_456;
pub const FATE_ICON_ID: u32 = 60_501;
pub const QUEST_BATTLE_ICON_ID: u32 = 61_731;

const KNOWN_ICONS: &[(u32, MarkerType)] = &[
    (60_430, MarkerType::Aetheryte),
    (60_441, MarkerType::Aetheryte),
    (AETHERYTE_ICON_ID, MarkerType::Aetheryte),
    (QUEST_ICON_ID, MarkerType::Quest),
    (60_490, MarkerType::Quest),
    (SHOP_ICON_ID, MarkerType::Shop),
    (60_425, MarkerType::Shop),
    (60_434, MarkerType::Shop),
    (LANDMARK_ICON_ID, MarkerType::Landmark),
    (SETTLEMENT_ICON_ID, MarkerType::Landmark),
    (ENTRANCE_ICON_ID, MarkerType::Entrance),
    (60_457, MarkerType::Entrance),
    (NPC_ICON_ID, MarkerType::Npc),
    (60_570, MarkerType::Npc),
    (FATE_ICON_ID, MarkerType::Fate),
    (60_502, MarkerType::Fate),
    (QUEST_BATTLE_ICON_ID, MarkerType::QuestBattle),
];

/// Evaluated top to bottom; earlier entries shadow later overlapping ones.
const ICON_RANGES: &[(Range<u32>, MarkerType)] = &[
    (60_440..60_460, MarkerType::Aetheryte),
    (60_300..60_400, MarkerType::Quest),
    (60_500..60_510, MarkerType::Fate),
    (61_700..61_800, MarkerType::QuestBattle),
    (60_560..60_600, MarkerType::Npc),
    (60_400..60_440, MarkerType::Shop),
    (60_500..60_600, MarkerType::Landmark),
    (60_460..60_470, MarkerType::Entrance),
];

const AETHERYTE_KEYWORDS: &[&str] = &["aetheryte", "aethernet"];

const LANDMARK_KEYWORDS: &[&str] = &[
    "tower",
    "keep",
    "ruins",
    "temple",
    "bridge",
    "castle",
    "fort",
    "gate",
    "sanctum",
    "cathedral",
    "lighthouse",
    "palace",
    "citadel",
    "shrine",
];

const SETTLEMENT_NAMES: &[&str] = &[
    "limsa lominsa",
    "gridania",
    "ul'dah",
    "ishgard",
    "idyllshire",
    "rhalgr's reach",
    "kugane",
    "doman enclave",
    "crystarium",
    "eulmore",
    "old sharlayan",
    "radz-at-han",
    "tuliyollal",
    "solution nine",
    "revenant's toll",
];

const SHOP_KEYWORDS: &[&str] = &[
    "market", "shop", "merchant", "vendor", "bazaar", "exchange", "trader", "emporium",
];

static ICON_TABLE: Lazy<HashMap<u32, MarkerType>> = Lazy::new(|| {
    log::debug!("building icon table with {} entries", KNOWN_ICONS.len());
    KNOWN_ICONS.iter().copied().collect()
});

/// Pure marker classification over a table built once per process
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerClassifier {
    verbosity: Verbosity,
}

impl MarkerClassifier {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn classify_by_icon(&self, icon_id: u32) -> MarkerType {
        if let Some(marker_type) = ICON_TABLE.get(&icon_id) {
            return *marker_type;
        }

        let marker_type = ICON_RANGES
            .iter()
            .find(|(range, _)| range.contains(&icon_id))
            .map(|(_, marker_type)| *marker_type)
            .unwrap_or(MarkerType::Generic);

        if self.verbosity.is_verbose() {
            log::debug!("icon {} classified by range as {:?}", icon_id, marker_type);
        }
        marker_type
    }

    /// Icon for a marker that only carries a place name. Keyword groups are
    /// tested in priority order; [`UNRESOLVED_ICON_ID`] when nothing matches.
    pub fn icon_for_place_name(&self, place_name: &str) -> u32 {
        let name = place_name.to_lowercase();
        let contains_any = |keywords: &[&str]| keywords.iter().any(|k| name.contains(k));

        let icon_id = if contains_any(AETHERYTE_KEYWORDS) {
            AETHERYTE_ICON_ID
        } else if contains_any(LANDMARK_KEYWORDS) {
            LANDMARK_ICON_ID
        } else if contains_any(SETTLEMENT_NAMES) {
            SETTLEMENT_ICON_ID
        } else if contains_any(SHOP_KEYWORDS) {
            SHOP_ICON_ID
        } else {
            UNRESOLVED_ICON_ID
        };

        if self.verbosity.is_verbose() {
            log::debug!("place name {:?} resolved to icon {}", place_name, icon_id);
        }
        icon_id
    }

    pub fn classify_by_place_name(&self, place_name: &str) -> MarkerType {
        self.classify_by_icon(self.icon_for_place_name(place_name))
    }

    /// Type for a marker from its icon, falling back to its place name when
    /// it has no icon; markers with neither are text/symbol markers.
    pub fn derive_type(&self, icon_id: u32, place_name: Option<&str>) -> MarkerType {
        if icon_id != 0 {
            return self.classify_by_icon(icon_id);
        }

        match place_name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => self.classify_by_place_name(name),
            None => MarkerType::Symbol,
        }
    }
}
