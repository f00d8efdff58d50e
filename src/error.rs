//! Errors of the driver layer: persistence, configuration and the VM process.

use std::path::PathBuf;

use monkey_compiler::ProgramError;
use thiserror::Error;

/// Errors raised outside the compiler proper.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Reading or writing a file failed.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// The compiled program could not be encoded.
    #[error(transparent)]
    Program(#[from] ProgramError),

    /// The VM executable could not be started.
    #[error("failed to launch {vm}: {source}")]
    VmLaunch {
        vm: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The VM ran but exited unsuccessfully.
    #[error("{}", describe_vm_failure(.status, .stderr))]
    VmFailed { status: String, stderr: String },
}

fn describe_vm_failure(status: &str, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {stderr}")
    }
}

impl DriverError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DriverError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
