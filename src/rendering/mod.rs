pub mod pipeline;
pub mod scheduler;

// Re-export main types
pub use pipeline::{MarkerFrame, MarkerRenderer, PlacedMarker, RenderPipeline};
pub use scheduler::{DisplayOutcome, DisplayRequest, RenderScheduler};
