//! Off-thread marker extraction.
//!
//! Extraction may run on worker threads, but its results are only sent back
//! over a channel. The owner thread drains them into its [`MarkerCache`];
//! nothing here touches the cache or any marker list directly.

use crate::{
    markers::{cache::MarkerCache, extractor::MarkerExtractor, marker::MarkerSet},
    prelude::HashSet,
};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// A finished extraction on its way back to the owner thread
#[derive(Debug)]
pub struct ExtractionResult {
    pub map_id: u32,
    pub markers: MarkerSet,
    pub elapsed: Duration,
}

pub struct ExtractionWorker {
    extractor: MarkerExtractor,
    result_tx: Sender<ExtractionResult>,
    result_rx: Receiver<ExtractionResult>,
    /// Map ids requested but not yet drained, to prevent duplicates
    pending: HashSet<u32>,
    /// Extract synchronously on the calling thread
    inline: bool,
}

impl ExtractionWorker {
    pub fn new(extractor: MarkerExtractor) -> Self {
        let (result_tx, result_rx) = unbounded();
        Self {
            extractor,
            result_tx,
            result_rx,
            pending: HashSet::default(),
            inline: false,
        }
    }

    /// Worker that runs every extraction immediately on the caller's thread
    pub fn for_testing(extractor: MarkerExtractor) -> Self {
        Self {
            inline: true,
            ..Self::new(extractor)
        }
    }

    pub fn is_pending(&self, map_id: u32) -> bool {
        self.pending.contains(&map_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Starts extracting `map_id`. Returns false if that map is already in
    /// flight.
    pub fn request(&mut self, map_id: u32) -> bool {
        if !self.pending.insert(map_id) {
            log::debug!("skipping duplicate extraction request for map {}", map_id);
            return false;
        }

        if self.inline {
            Self::run(&self.extractor, map_id, &self.result_tx);
            return true;
        }

        let extractor = self.extractor.clone();
        let tx = self.result_tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("marker-extract-{}", map_id))
            .spawn(move || Self::run(&extractor, map_id, &tx));

        if let Err(e) = spawned {
            log::warn!("failed to spawn extraction thread for map {}: {}, extracting inline", map_id, e);
            Self::run(&self.extractor, map_id, &self.result_tx);
        }
        true
    }

    fn run(extractor: &MarkerExtractor, map_id: u32, tx: &Sender<ExtractionResult>) {
        let started = Instant::now();
        let markers = extractor.extract_markers(map_id);
        let result = ExtractionResult {
            map_id,
            markers,
            elapsed: started.elapsed(),
        };
        if tx.send(result).is_err() {
            log::debug!("extraction result for map {} discarded - receiver gone", map_id);
        }
    }

    /// Moves every finished result into `cache`; returns the map ids stored
    pub fn drain_into(&mut self, cache: &mut MarkerCache) -> Vec<u32> {
        let results: Vec<ExtractionResult> = self.result_rx.try_iter().collect();
        results
            .into_iter()
            .filter_map(|result| self.store(result, cache))
            .collect()
    }

    /// Blocks until `map_id` has been delivered into `cache` or `timeout`
    /// passes. Other maps arriving meanwhile are stored too. On timeout the
    /// map is no longer considered in flight, so it can be requested again.
    pub fn wait_for(&mut self, map_id: u32, timeout: Duration, cache: &mut MarkerCache) -> bool {
        let deadline = Instant::now() + timeout;

        while !cache.contains(map_id) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.result_rx.recv_timeout(remaining) {
                Ok(result) => {
                    self.store(result, cache);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    log::warn!("timed out waiting for markers of map {}", map_id);
                    self.pending.remove(&map_id);
                    return false;
                }
            }
        }
        true
    }

    fn store(&mut self, result: ExtractionResult, cache: &mut MarkerCache) -> Option<u32> {
        self.pending.remove(&result.map_id);
        log::debug!(
            "map {}: {} markers delivered after {:?}",
            result.map_id,
            result.markers.len(),
            result.elapsed
        );
        cache.insert(result.map_id, result.markers).then_some(result.map_id)
    }
}
