use std::path::PathBuf;

use crate::device::OpenMode;

/// Errors that can occur while exchanging bytes with a device node.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Failed to open the device path.
    #[error("failed to open {path} for {mode}: {source}")]
    Open {
        path: PathBuf,
        mode: OpenMode,
        source: std::io::Error,
    },

    /// A write to the device failed.
    #[error("failed to write to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A read from the device failed.
    #[error("failed to read from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The device accepted zero bytes before the pattern was fully written.
    #[error("device {path} stopped accepting data after {written} bytes")]
    WriteZero { path: PathBuf, written: usize },

    /// A hex pattern could not be parsed.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// Any other I/O error.
    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeviceError {
    /// The underlying I/O error, if this error carries one.
    pub fn io_source(&self) -> Option<&std::io::Error> {
        match self {
            DeviceError::Open { source, .. }
            | DeviceError::Write { source, .. }
            | DeviceError::Read { source, .. }
            | DeviceError::Io(source) => Some(source),
            DeviceError::WriteZero { .. } | DeviceError::InvalidPattern(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;
