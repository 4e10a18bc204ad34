//! Deterministic placeholder markers for maps without any marker data.

use crate::{
    core::{calibration::MapCalibration, transform::CoordinateTransformer},
    markers::{
        classifier::{
            ENTRANCE_ICON_ID, FATE_ICON_ID, LANDMARK_ICON_ID, NPC_ICON_ID, QUEST_BATTLE_ICON_ID,
            QUEST_ICON_ID, SHOP_ICON_ID, UNRESOLVED_ICON_ID, AETHERYTE_ICON_ID,
        },
        marker::{MapMarker, MarkerType},
    },
};

/// Distance of the surrounding markers from the hub, as a texture fraction
pub const SAMPLE_SPACING: f64 = 0.2;

/// Hub first, then clockwise from north: direction, type, icon, label
const SAMPLE_LAYOUT: [((f64, f64), MarkerType, u32, &str); 9] = [
    ((0.0, 0.0), MarkerType::Aetheryte, AETHERYTE_ICON_ID, "Sample Aetheryte"),
    ((0.0, -1.0), MarkerType::Quest, QUEST_ICON_ID, "Sample Quest"),
    ((1.0, -1.0), MarkerType::Shop, SHOP_ICON_ID, "Sample Shop"),
    ((1.0, 0.0), MarkerType::Landmark, LANDMARK_ICON_ID, "Sample Landmark"),
    ((1.0, 1.0), MarkerType::Npc, NPC_ICON_ID, "Sample NPC"),
    ((0.0, 1.0), MarkerType::Entrance, ENTRANCE_ICON_ID, "Sample Entrance"),
    ((-1.0, 1.0), MarkerType::Fate, FATE_ICON_ID, "Sample FATE"),
    ((-1.0, 0.0), MarkerType::QuestBattle, QUEST_BATTLE_ICON_ID, "Sample Quest Battle"),
    ((-1.0, -1.0), MarkerType::Generic, UNRESOLVED_ICON_ID, "Sample Marker"),
];

/// Nine markers: an aetheryte hub at the map centre and one marker in each
/// cardinal and diagonal direction around it. Ids are always `1..=9`.
pub fn sample_markers(map_id: u32, calibration: &MapCalibration) -> Vec<MapMarker> {
    SAMPLE_LAYOUT
        .iter()
        .zip(1u32..)
        .map(|(((dx, dy), marker_type, icon_id, label), id)| {
            let nx = 0.5 + dx * SAMPLE_SPACING;
            let ny = 0.5 + dy * SAMPLE_SPACING;
            let game = CoordinateTransformer::normalized_to_game(nx, ny, calibration);

            MapMarker::new(id, map_id, game.x, game.y, *icon_id)
                .with_place_name(None, Some((*label).to_string()))
                .with_type(*marker_type)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_layout() {
        let markers = sample_markers(5, &MapCalibration::default());
        assert_eq!(markers.len(), 9);

        let ids: Vec<u32> = markers.iter().map(|m| m.id).collect();
        assert_eq!(ids, (1..=9).collect::<Vec<_>>());

        let hub = &markers[0];
        assert_eq!(hub.marker_type(), MarkerType::Aetheryte);
        assert!((hub.x - 21.5).abs() < 1e-9 && (hub.y - 21.5).abs() < 1e-9);

        // every other marker is one step away on each axis it moves along
        let step = 41.0 * SAMPLE_SPACING;
        for marker in &markers[1..] {
            let dx = (marker.x - hub.x).abs();
            let dy = (marker.y - hub.y).abs();
            assert!(dx < 1e-9 || (dx - step).abs() < 1e-9);
            assert!(dy < 1e-9 || (dy - step).abs() < 1e-9);
            assert!(dx > 0.0 || dy > 0.0);
            assert_eq!(marker.map_id, 5);
        }
    }

    #[test]
    fn test_sample_respects_calibration() {
        let markers = sample_markers(5, &MapCalibration::with_size_factor(200.0));
        // c = 2 halves the game span around the hub
        assert!((markers[0].x - (20.5 / 2.0 + 1.0)).abs() < 1e-9);
    }
}
