//! Error taxonomy for attach, scan and REPL operations

use super::value::ScalarKind;
use thiserror::Error;

/// Main error type for scanner operations
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Could not find a window titled '{0}' (is it running?)")]
    ProcessNotFound(String),

    #[error("Could not open process {pid}: {reason}")]
    OpenFailed { pid: u32, reason: String },

    #[error("Could not locate the base address of module '{0}'")]
    BaseAddressNotFound(String),

    #[error("Failed to read {len} bytes at 0x{address:x}")]
    ReadFailed { address: u64, len: usize },

    #[error("{0}")]
    ParseFailed(String),

    #[error("Where chain holds {chain} values but '{requested}' was requested")]
    ChainTypeMismatch {
        chain: ScalarKind,
        requested: ScalarKind,
    },

    #[error("No where chain is active; run a 'where' scan first")]
    EmptyChain,

    #[error("Windows API: {0}")]
    WindowsApi(String),

    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApiError(#[from] windows::core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scanner operations
pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    /// Wraps the calling thread's last OS error code.
    #[cfg(windows)]
    pub fn last_os_error() -> Self {
        MemoryError::WindowsApiError(windows::core::Error::from_win32())
    }

    pub fn open_failed(pid: u32, reason: impl Into<String>) -> Self {
        MemoryError::OpenFailed {
            pid,
            reason: reason.into(),
        }
    }

    pub fn read_failed(address: u64, len: usize) -> Self {
        MemoryError::ReadFailed { address, len }
    }
}
