use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KbstatsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("no such device: {}", .0.display())]
    NotFound(PathBuf),
    #[error("device query failed: {0}")]
    Query(io::Error),
    #[error("code {code} is out of bounds (max {max})")]
    OutOfRange { code: u32, max: u16 },
    #[error("no event devices found")]
    NoDevicesFound,
    #[error("invalid device selection: {0}")]
    InvalidSelection(String),
    #[error("expected a multiple of {expected} bytes, got {got}")]
    ProtocolViolation { expected: usize, got: usize },
    #[error("unrecognised code: {0}")]
    UnknownCode(String),
    #[error("unrecognised event type: {0}")]
    UnknownQueryMode(String),
    #[error("invalid timestamp: {0}s {1}us")]
    InvalidTimestamp(i64, i64),
}

impl KbstatsError {
    /// Map a failed `open(2)` on `path` to the matching error.
    pub(crate) fn from_open(err: io::Error, path: PathBuf) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => KbstatsError::PermissionDenied(path),
            io::ErrorKind::NotFound => KbstatsError::NotFound(path),
            _ => KbstatsError::Io(err),
        }
    }

    /// A suggestion to show next to the error, if any.
    ///
    /// Permission failures suggest retrying as root unless the process already is.
    pub fn hint(&self) -> Option<String> {
        match self {
            KbstatsError::PermissionDenied(path) if !is_root() => Some(format!(
                "You do not have access to {}. Try running as root instead.",
                path.display()
            )),
            _ => None,
        }
    }
}

/// Whether the process runs with an effective uid of 0.
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}
