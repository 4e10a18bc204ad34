pub mod tasks;

pub use tasks::{ExtractionResult, ExtractionWorker};
