//! MIME type detection module
//!
//! Content-Type for served files, derived from the file extension.

use std::path::Path;

const DEFAULT_TYPE: &str = "application/octet-stream";

/// Extension → Content-Type, compared case-insensitively
const CONTENT_TYPES: &[(&str, &str)] = &[
    // Captures
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    // Control page assets
    ("html", "text/html; charset=utf-8"),
    ("htm", "text/html; charset=utf-8"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("txt", "text/plain; charset=utf-8"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// Content-Type for `path`
///
/// # Examples
/// ```
/// use std::path::Path;
/// use camcapture_server::http::mime::content_type_for;
/// assert_eq!(content_type_for(Path::new("front20240101120000.PNG")), "image/png");
/// assert_eq!(content_type_for(Path::new("README")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_TYPE;
    };
    CONTENT_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map_or(DEFAULT_TYPE, |(_, content_type)| content_type)
}
