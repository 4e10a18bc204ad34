pub mod hover;

pub use hover::{HoverTracker, HoverTransition};
