//! Capture store module
//!
//! The REST layer only talks to captured artifacts through three narrow
//! capabilities. `FolderStore` implements all of them over one directory;
//! tests and embedders can supply closures instead.

mod device;
mod folder;

use std::path::PathBuf;

pub use device::{FrameSource, NoDevice, SnapshotDevice};
pub use folder::FolderStore;

/// Filter for listing stored captures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Name prefix the capture was stored under
    pub prefix: Option<String>,
    /// Earliest timestamp, possibly abbreviated (`20240101`)
    pub from: Option<String>,
    /// Latest timestamp, possibly abbreviated
    pub to: Option<String>,
}

/// Trigger a capture, returning the stored file or `None` when capturing is
/// not possible right now
pub trait CaptureCapability: Send + Sync {
    fn capture(&self, prefix: Option<&str>) -> Option<PathBuf>;
}

/// List stored capture file names matching a query
pub trait ListCapability: Send + Sync {
    fn list(&self, query: &ListQuery) -> Vec<String>;
}

/// Resolve a capture name to an existing file
pub trait ImageCapability: Send + Sync {
    fn lookup(&self, name: &str) -> Option<PathBuf>;
}

impl<F> CaptureCapability for F
where
    F: Fn(Option<&str>) -> Option<PathBuf> + Send + Sync,
{
    fn capture(&self, prefix: Option<&str>) -> Option<PathBuf> {
        self(prefix)
    }
}

impl<F> ListCapability for F
where
    F: Fn(&ListQuery) -> Vec<String> + Send + Sync,
{
    fn list(&self, query: &ListQuery) -> Vec<String> {
        self(query)
    }
}

impl<F> ImageCapability for F
where
    F: Fn(&str) -> Option<PathBuf> + Send + Sync,
{
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        self(name)
    }
}
