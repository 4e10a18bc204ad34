//! Secondary marker source: a comma-delimited export keyed by
//! `"<mapId>.<subIndex>"`, positions in reference-texture pixels.
//!
//! ```text
//! key,0,1,2,3
//! #,X,Y,Icon,PlaceName
//! 12.0,1024,1024,60453,41
//! 12.1,512,700,60314,0
//! ```

use crate::data::RowError;
use std::path::Path;

/// One data row of the flat file
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub map_id: u32,
    pub sub_index: u32,
    /// Raw pixel position on the reference texture
    pub x: f64,
    pub y: f64,
    pub icon_id: u32,
    pub place_name_id: u32,
}

/// The loaded flat marker file
#[derive(Debug, Clone, PartialEq)]
pub struct FlatMarkerFile {
    contents: String,
    header_lines: usize,
}

impl FlatMarkerFile {
    pub fn new(contents: impl Into<String>, header_lines: usize) -> Self {
        Self {
            contents: contents.into(),
            header_lines,
        }
    }

    pub fn open(path: impl AsRef<Path>, header_lines: usize) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::new(contents, header_lines))
    }

    /// Rows belonging to `map_id`. Rows of other maps are skipped silently;
    /// rows of this map that fail to parse are reported as errors.
    pub fn rows_for_map(&self, map_id: u32) -> impl Iterator<Item = Result<FlatRow, RowError>> + '_ {
        let prefix = map_id.to_string();

        self.contents
            .lines()
            .skip(self.header_lines)
            .filter(|line| !line.trim().is_empty())
            .filter_map(move |line| {
                let fields: Vec<&str> = line.split(',').map(unquote).collect();
                let (row_map, sub_index) = fields[0].split_once('.')?;
                if row_map != prefix {
                    return None;
                }
                Some(parse_row(map_id, sub_index, &fields))
            })
    }
}

fn unquote(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

fn parse_row(map_id: u32, sub_index: &str, fields: &[&str]) -> Result<FlatRow, RowError> {
    let row = fields[0];
    let sub_index = sub_index.parse().map_err(|_| RowError::MalformedId {
        row: row.to_string(),
        id: sub_index.to_string(),
    })?;

    Ok(FlatRow {
        map_id,
        sub_index,
        x: required_number(fields, 1, "X")?,
        y: required_number(fields, 2, "Y")?,
        icon_id: optional_id(fields, 3, "Icon")?,
        place_name_id: optional_id(fields, 4, "PlaceName")?,
    })
}

fn required_number(fields: &[&str], index: usize, column: &'static str) -> Result<f64, RowError> {
    let value = fields
        .get(index)
        .copied()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| RowError::MissingColumn {
            row: fields[0].to_string(),
            column,
        })?;

    value.parse().map_err(|_| RowError::NotANumber {
        row: fields[0].to_string(),
        column,
        value: value.to_string(),
    })
}

/// Empty or absent id cells read as 0
fn optional_id(fields: &[&str], index: usize, column: &'static str) -> Result<u32, RowError> {
    match fields.get(index).copied().filter(|value| !value.is_empty()) {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| RowError::NotANumber {
            row: fields[0].to_string(),
            column,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "key,0,1,2,3\n\
                          #,X,Y,Icon,PlaceName\n\
                          12.0,1024,1024,60453,41\n\
                          12.1,512,700,60314,0\n\
                          120.0,1,1,60412,0\n\
                          13.0,5,5,60412,0\n\
                          \n\
                          12.2,abc,1,0,0\n\
                          \"12.3\",\"10\",\"20\",,\n";

    #[test]
    fn test_rows_for_map_filters_by_prefix() {
        let file = FlatMarkerFile::new(SAMPLE, 2);
        let rows: Vec<_> = file.rows_for_map(12).collect();

        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[0],
            Ok(FlatRow {
                map_id: 12,
                sub_index: 0,
                x: 1024.0,
                y: 1024.0,
                icon_id: 60453,
                place_name_id: 41,
            })
        );
        assert!(matches!(rows[2], Err(RowError::NotANumber { column: "X", .. })));

        let quoted = rows[3].as_ref().unwrap();
        assert_eq!(quoted.sub_index, 3);
        assert_eq!(quoted.icon_id, 0);
        assert_eq!(quoted.place_name_id, 0);
    }

    #[test]
    fn test_prefix_must_match_exactly() {
        let file = FlatMarkerFile::new(SAMPLE, 2);
        let rows: Vec<_> = file.rows_for_map(120).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].as_ref().unwrap().icon_id, 60412);
        assert_eq!(file.rows_for_map(1).count(), 0);
    }

    #[test]
    fn test_header_lines_are_skipped() {
        let file = FlatMarkerFile::new("12.0,1,1,1,1\n12.1,2,2,2,2\n12.2,3,3,3,3\n", 2);
        let rows: Vec<_> = file.rows_for_map(12).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].as_ref().unwrap().sub_index, 2);
    }

    #[test]
    fn test_malformed_sub_index_is_reported() {
        let file = FlatMarkerFile::new("key\n#\n12.x1,10,20,0,0\n12.4,10,20,0,0\n", 2);
        let rows: Vec<_> = file.rows_for_map(12).collect();

        assert_eq!(
            rows[0],
            Err(RowError::MalformedId {
                row: "12.x1".to_string(),
                id: "x1".to_string(),
            })
        );
        assert_eq!(rows[1].as_ref().unwrap().sub_index, 4);
    }
}
