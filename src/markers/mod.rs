pub mod cache;
pub mod classifier;
pub mod extractor;
pub mod icon;
pub mod marker;
pub mod sample;

// Re-export the essential types
pub use cache::MarkerCache;
pub use classifier::MarkerClassifier;
pub use extractor::MarkerExtractor;
pub use marker::{MapMarker, MarkerSet, MarkerTier, MarkerType};
