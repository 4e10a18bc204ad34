pub mod index;

pub use index::{marker_at, MarkerIndex};
