//! Icon identifiers and the texture paths the rendering layer loads them from.

/// Path used for markers that carry no icon at all
pub const FALLBACK_ICON_PATH: &str = "ui/icon/000000/000000.tex";

/// `ui/icon/{folder}/{file}.tex` where `folder` is the id rounded down to the
/// nearest thousand. Both parts are zero-padded to six digits.
pub fn icon_path(icon_id: u32) -> String {
    if icon_id == 0 {
        return FALLBACK_ICON_PATH.to_string();
    }
    format!("ui/icon/{:06}/{:06}.tex", icon_folder(icon_id), icon_id)
}

/// High-resolution variant of [`icon_path`]
pub fn icon_path_hr(icon_id: u32) -> String {
    if icon_id == 0 {
        return FALLBACK_ICON_PATH.to_string();
    }
    format!("ui/icon/{:06}/{:06}_hr1.tex", icon_folder(icon_id), icon_id)
}

fn icon_folder(icon_id: u32) -> u32 {
    (icon_id / 1000) * 1000
}

/// Extracts the icon id from an embedded image reference such as
/// `ui/icon/060000/060453.tex` (or its `_hr1` variant). The file stem must be
/// exactly six digits.
pub fn parse_icon_reference(reference: &str) -> Option<u32> {
    let stem = reference.trim().strip_suffix(".tex")?;
    let stem = stem.strip_suffix("_hr1").unwrap_or(stem);
    let file = stem.rsplit('/').next()?;

    if file.len() != 6 || !file.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    file.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_path_formatting() {
        assert_eq!(icon_path(60453), "ui/icon/060000/060453.tex");
        assert_eq!(icon_path(61731), "ui/icon/061000/061731.tex");
        assert_eq!(icon_path(999), "ui/icon/000000/000999.tex");
        assert_eq!(icon_path_hr(60453), "ui/icon/060000/060453_hr1.tex");
    }

    #[test]
    fn test_zero_icon_uses_fallback() {
        assert_eq!(icon_path(0), FALLBACK_ICON_PATH);
        assert_eq!(icon_path_hr(0), FALLBACK_ICON_PATH);
    }

    #[test]
    fn test_parse_icon_reference() {
        assert_eq!(parse_icon_reference("ui/icon/060000/060453.tex"), Some(60453));
        assert_eq!(parse_icon_reference("ui/icon/060000/060453_hr1.tex"), Some(60453));
        assert_eq!(parse_icon_reference("060314.tex"), Some(60314));
        assert_eq!(parse_icon_reference("ui/icon/060000/60453.tex"), None);
        assert_eq!(parse_icon_reference("ui/icon/060000/060453.png"), None);
        assert_eq!(parse_icon_reference("ui/icon/060000/06a453.tex"), None);
    }
}
