use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TailError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl TailError {
    /// Classify an error returned while opening `path`.
    pub fn open(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => TailError::FileNotFound { path },
            io::ErrorKind::PermissionDenied => TailError::PermissionDenied { path },
            _ => TailError::Open { path, source: err },
        }
    }
}

pub type Result<T> = std::result::Result<T, TailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_classification() {
        let path = Path::new("/var/log/app.log");

        let err = TailError::open(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, TailError::FileNotFound { .. }));
        assert_eq!(err.to_string(), "File not found: /var/log/app.log");

        let err = TailError::open(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, TailError::PermissionDenied { .. }));

        let err = TailError::open(path, io::Error::new(io::ErrorKind::Other, "is a directory"));
        assert!(matches!(err, TailError::Open { .. }));
        assert!(err.to_string().starts_with("Failed to open /var/log/app.log"));
    }
}
