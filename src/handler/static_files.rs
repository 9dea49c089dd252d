//! Static file serving module
//!
//! Maps a request path onto a file below the static root. `/` maps to the
//! index document. Targets that resolve outside the root are refused.

use std::path::{Path, PathBuf};

use crate::http::{self, HttpResponse};
use crate::logger::Logger;

/// Document served for the root path
pub const INDEX_DOCUMENT: &str = "index.html";

/// Resolve `path` below `root`
///
/// Returns `None` when the target does not exist or escapes the root.
pub fn resolve(path: &str, root: &Path, logger: &Logger) -> Option<PathBuf> {
    let relative = path.trim_start_matches('/');
    let file_path = if relative.is_empty() {
        root.join(INDEX_DOCUMENT)
    } else {
        root.join(relative)
    };

    let root_canonical = match root.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger.warning(&format!(
                "Static root not found or inaccessible '{}': {e}",
                root.display()
            ));
            return None;
        }
    };

    // File not found is the common case, no need to log it
    let file_canonical = file_path.canonicalize().ok()?;
    if !file_canonical.starts_with(&root_canonical) {
        logger.warning(&format!(
            "Path traversal attempt blocked: {path} -> {}",
            file_canonical.display()
        ));
        return None;
    }

    Some(file_canonical)
}

/// Serve `path` from `root`, or report that nothing was produced
pub async fn serve(path: &str, root: &Path, logger: &Logger) -> Option<HttpResponse> {
    let file = resolve(path, root, logger)?;
    let response = http::send_file(&file).await?;
    logger.debug(&format!("Static file served: {}", file.display()));
    Some(response)
}
