//! Error types for snake-serve

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the static file server
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid HTTP method
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Invalid path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Requested path is a directory without an index file
    #[error("Is a directory: {}", .0.display())]
    IsDirectory(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Hyper error
    #[error("HTTP error: {0}")]
    Hyper(#[from] hyper::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The file does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }

    /// errno-style name reported in 500 responses
    pub fn code(&self) -> &'static str {
        match self {
            Error::IsDirectory(_) => "EISDIR",
            Error::Io(e) => io_error_code(e),
            Error::InvalidPath(_) | Error::InvalidMethod(_) => "EINVAL",
            Error::Hyper(_) | Error::Config(_) => "EIO",
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(err.to_string())
    }
}

fn io_error_code(err: &io::Error) -> &'static str {
    match err.kind() {
        io::ErrorKind::NotFound => "ENOENT",
        io::ErrorKind::PermissionDenied => "EACCES",
        io::ErrorKind::InvalidInput => "EINVAL",
        io::ErrorKind::InvalidData => "EINVAL",
        io::ErrorKind::OutOfMemory => "ENOMEM",
        io::ErrorKind::Interrupted => "EINTR",
        io::ErrorKind::WouldBlock => "EAGAIN",
        io::ErrorKind::TimedOut => "ETIMEDOUT",
        _ => os_error_code(err.raw_os_error()),
    }
}

// Kinds without a stable ErrorKind yet, by raw errno
#[cfg(target_os = "linux")]
fn os_error_code(raw: Option<i32>) -> &'static str {
    match raw {
        Some(20) => "ENOTDIR",
        Some(21) => "EISDIR",
        Some(24) => "EMFILE",
        Some(36) => "ENAMETOOLONG",
        Some(40) => "ELOOP",
        _ => "EIO",
    }
}

#[cfg(not(target_os = "linux"))]
fn os_error_code(raw: Option<i32>) -> &'static str {
    match raw {
        Some(20) => "ENOTDIR",
        Some(21) => "EISDIR",
        Some(24) => "EMFILE",
        _ => "EIO",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = Error::from(io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert_eq!(err.code(), "ENOENT");
    }

    #[test]
    fn test_codes() {
        let denied = Error::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!denied.is_not_found());
        assert_eq!(denied.code(), "EACCES");
        assert_eq!(Error::IsDirectory(PathBuf::from("css")).code(), "EISDIR");
        #[cfg(unix)]
        assert_eq!(Error::from(io::Error::from_raw_os_error(20)).code(), "ENOTDIR");
    }
}
