use crate::markers::marker::{MarkerSet, MarkerType};
use crate::prelude::HashMap;
use std::sync::Arc;

/// Process-lifetime memo of extracted marker sets keyed by map id.
///
/// Entries are never evicted or replaced: the underlying data is read-only
/// for a run. The cache is owned by a single coordinator; results computed
/// on other threads must be handed back and stored through [`Self::insert`].
#[derive(Debug, Default)]
pub struct MarkerCache {
    entries: HashMap<u32, Arc<MarkerSet>>,
}

impl MarkerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached set for `map_id`, running `extract` only when the
    /// map has never been seen
    pub fn get_or_extract<F>(&mut self, map_id: u32, extract: F) -> Arc<MarkerSet>
    where
        F: FnOnce(u32) -> MarkerSet,
    {
        self.entries
            .entry(map_id)
            .or_insert_with(|| {
                log::debug!("marker cache miss for map {}", map_id);
                Arc::new(extract(map_id))
            })
            .clone()
    }

    /// Stores a set computed elsewhere. Returns false, leaving the existing
    /// entry untouched, when the map is already cached.
    pub fn insert(&mut self, map_id: u32, set: MarkerSet) -> bool {
        if self.entries.contains_key(&map_id) {
            log::debug!("map {} already cached, dropping duplicate result", map_id);
            return false;
        }
        self.entries.insert(map_id, Arc::new(set));
        true
    }

    pub fn get(&self, map_id: u32) -> Option<Arc<MarkerSet>> {
        self.entries.get(&map_id).cloned()
    }

    pub fn contains(&self, map_id: u32) -> bool {
        self.entries.contains_key(&map_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Toggles one marker of a cached map. Sets already handed out keep
    /// their snapshot.
    pub fn set_marker_visible(&mut self, map_id: u32, marker_id: u32, visible: bool) -> bool {
        self.entries
            .get_mut(&map_id)
            .map(|set| Arc::make_mut(set).set_marker_visible(marker_id, visible))
            .unwrap_or(false)
    }

    /// Toggles all markers of one type on a cached map
    pub fn set_type_visible(&mut self, map_id: u32, marker_type: MarkerType, visible: bool) -> usize {
        self.entries
            .get_mut(&map_id)
            .map(|set| Arc::make_mut(set).set_type_visible(marker_type, visible))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::marker::{MapMarker, MarkerTier};
    use std::cell::Cell;

    fn set(map_id: u32) -> MarkerSet {
        MarkerSet::new(
            map_id,
            MarkerTier::Primary,
            vec![
                MapMarker::new(1, map_id, 10.0, 10.0, 60453).with_type(MarkerType::Aetheryte),
                MapMarker::new(2, map_id, 12.0, 10.0, 60314).with_type(MarkerType::Quest),
            ],
        )
    }

    #[test]
    fn test_extracts_at_most_once() {
        let mut cache = MarkerCache::new();
        let calls = Cell::new(0);
        let extract = |map_id| {
            calls.set(calls.get() + 1);
            set(map_id)
        };

        let first = cache.get_or_extract(7, extract);
        let second = cache.get_or_extract(7, extract);

        assert_eq!(calls.get(), 1);
        assert_eq!(*first, *second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_never_overwrites() {
        let mut cache = MarkerCache::new();
        assert!(cache.insert(7, set(7)));
        assert!(!cache.insert(7, MarkerSet::empty(7)));
        assert_eq!(cache.get(7).unwrap().len(), 2);

        let from_cache = cache.get_or_extract(7, |_| panic!("should not extract"));
        assert_eq!(from_cache.len(), 2);
    }

    #[test]
    fn test_visibility_is_copy_on_write() {
        let mut cache = MarkerCache::new();
        let snapshot = cache.get_or_extract(7, set);

        assert!(cache.set_marker_visible(7, 2, false));
        assert!(!cache.set_marker_visible(8, 2, false));
        assert_eq!(cache.get(7).unwrap().visible().count(), 1);
        assert_eq!(snapshot.visible().count(), 2);

        assert_eq!(cache.set_type_visible(7, MarkerType::Aetheryte, false), 1);
        assert_eq!(cache.get(7).unwrap().visible().count(), 0);
    }
}
