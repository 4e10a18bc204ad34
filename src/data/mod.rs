pub mod flat_file;
pub mod sheet;

pub use flat_file::{FlatMarkerFile, FlatRow};
pub use sheet::{ColumnBinding, JsonSheet, MapInfo, MarkerRow, MarkerSheet, RawMarkerRow};

/// Failure to decode a single source row
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("row {row}: column {column} missing")]
    MissingColumn { row: String, column: &'static str },
    #[error("row {row}: column {column} is not a number: {value}")]
    NotANumber {
        row: String,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: malformed sub-index {id:?}")]
    MalformedId { row: String, id: String },
}
