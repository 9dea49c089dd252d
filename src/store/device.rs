// Frame source module
// Interface to the capture device plus the stand-ins the server ships with

use std::io;
use std::path::{Path, PathBuf};

/// The capture device as seen by the store
pub trait FrameSource: Send + Sync {
    /// Whether the device is currently delivering frames
    fn is_active(&self) -> bool;

    /// Persist the current frame at `target`
    fn save_frame(&self, target: &Path) -> io::Result<()>;
}

/// No device attached; captures are never possible
pub struct NoDevice;

impl FrameSource for NoDevice {
    fn is_active(&self) -> bool {
        false
    }

    fn save_frame(&self, _target: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::NotConnected, "no capture device"))
    }
}

/// Device that hands out a fixed still image as every frame
pub struct SnapshotDevice {
    source: PathBuf,
}

impl SnapshotDevice {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl FrameSource for SnapshotDevice {
    fn is_active(&self) -> bool {
        self.source.is_file()
    }

    fn save_frame(&self, target: &Path) -> io::Result<()> {
        std::fs::copy(&self.source, target).map(|_| ())
    }
}
