// Folder-backed capture store
// Captures are stored as `<prefix><YYYYMMDDhhmmss>.png` in a single directory

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, TryLockError};

use chrono::Local;

use super::device::FrameSource;
use super::{CaptureCapability, ImageCapability, ListCapability, ListQuery};
use crate::dates::{fit_date_string, format_timestamp, DATE_WIDTH};
use crate::logger::Logger;

const CAPTURE_EXTENSION: &str = ".png";

/// Capture store rooted at one directory
pub struct FolderStore {
    folder: PathBuf,
    device: Arc<dyn FrameSource>,
    // Held for the duration of one capture
    capture_lock: Mutex<()>,
    logger: Arc<Logger>,
}

impl FolderStore {
    pub fn new(folder: impl Into<PathBuf>, device: Arc<dyn FrameSource>, logger: Arc<Logger>) -> Self {
        Self {
            folder: folder.into(),
            device,
            capture_lock: Mutex::new(()),
            logger,
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Capturing needs an active device and an existing folder
    pub fn can_capture(&self) -> bool {
        self.device.is_active() && self.folder.is_dir()
    }

    fn capture_path(&self, prefix: &str) -> PathBuf {
        let timestamp = format_timestamp(&Local::now());
        self.folder.join(format!("{prefix}{timestamp}{CAPTURE_EXTENSION}"))
    }
}

/// Names that stay inside the capture folder
fn is_plain_name(name: &str) -> bool {
    !name.contains(['/', '\\']) && name != "." && name != ".."
}

fn is_capture_file(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(CAPTURE_EXTENSION)
}

impl CaptureCapability for FolderStore {
    fn capture(&self, prefix: Option<&str>) -> Option<PathBuf> {
        let _guard = match self.capture_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                self.logger.debug("Capture already in progress");
                return None;
            }
        };

        if !self.can_capture() {
            self.logger.debug("Capture requested but device inactive or folder missing");
            return None;
        }

        let prefix = prefix.unwrap_or_default();
        if !prefix.is_empty() && !is_plain_name(prefix) {
            self.logger.warning(&format!("Capture prefix rejected: '{prefix}'"));
            return None;
        }

        let path = self.capture_path(prefix);
        if let Err(e) = self.device.save_frame(&path) {
            self.logger.error(&format!("Failed to save capture '{}': {e}", path.display()));
            return None;
        }

        self.logger.info(&format!("Captured {}", path.display()));
        Some(path)
    }
}

/// Query with dates fitted to the timestamp width and empty values dropped
struct CaptureFilter {
    prefix: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

impl CaptureFilter {
    fn new(query: &ListQuery) -> Self {
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            prefix: non_empty(&query.prefix),
            from: non_empty(&query.from).map(|d| fit_date_string(&d)),
            to: non_empty(&query.to).map(|d| fit_date_string(&d)),
        }
    }

    const fn is_empty(&self) -> bool {
        self.prefix.is_none() && self.from.is_none() && self.to.is_none()
    }

    /// `name` is `<prefix><timestamp>.png`
    fn matches(&self, name: &str) -> bool {
        let stem = &name[..name.len() - CAPTURE_EXTENSION.len()];
        let Some(split) = stem.len().checked_sub(DATE_WIDTH) else {
            return false;
        };
        if !stem.is_char_boundary(split) {
            return false;
        }
        let (prefix, date) = stem.split_at(split);

        if self.prefix.as_deref().is_some_and(|p| p != prefix) {
            return false;
        }
        if self.from.as_deref().is_some_and(|from| date < from) {
            return false;
        }
        if self.to.as_deref().is_some_and(|to| date > to) {
            return false;
        }
        true
    }
}

impl ListCapability for FolderStore {
    fn list(&self, query: &ListQuery) -> Vec<String> {
        let entries = match fs::read_dir(&self.folder) {
            Ok(entries) => entries,
            Err(e) => {
                self.logger.error(&format!(
                    "Capture directory invalid '{}': {e}",
                    self.folder.display()
                ));
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_capture_file(name))
            .collect();
        names.sort();

        let filter = CaptureFilter::new(query);
        if !filter.is_empty() {
            names.retain(|name| filter.matches(name));
        }
        names
    }
}

impl ImageCapability for FolderStore {
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || !is_plain_name(name) {
            return None;
        }
        let path = self.folder.join(name);
        path.is_file().then_some(path)
    }
}
