//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Sequential, lexically ordered directory walking using walkdir
//! - Content hashing with BLAKE3, SHA-256 or MD5
//! - Same-object (hardlink) detection
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal feeding the hashing pipeline
//! - [`hasher`]: Pluggable file digest functions
//! - [`hardlink`]: Device/inode identity checks
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::scanner::{Algorithm, Digester};
//! use std::path::Path;
//!
//! let digester = Algorithm::Blake3.digester();
//! let digest = digester.digest(Path::new("Cargo.toml")).unwrap();
//! println!("{}", digest.to_hex());
//! ```

pub mod hardlink;
pub mod hasher;
pub mod walker;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

// Re-export main types
pub use hasher::{Algorithm, Digester, FileDigester};
pub use walker::{TreeWalker, WalkOutcome, WalkReport};

/// Content digest of a file.
///
/// The length depends on the algorithm that produced it. Two digests compare
/// equal only if they have the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest(Vec<u8>);

impl Digest {
    /// Wrap raw digest bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Canonical lowercase hexadecimal encoding, used as the group key.
    #[must_use]
    pub fn to_hex(&self) -> String {
        use std::fmt::Write;

        let mut out = String::with_capacity(self.0.len() * 2);
        for byte in &self.0 {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl From<&[u8]> for Digest {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file or directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl ScanError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                source: Arc::new(error),
            },
        }
    }

    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied(path) | Self::NotFound(path) | Self::NotADirectory(path) => {
                path
            }
            Self::Io { path, .. } => path,
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl HashError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                source: Arc::new(error),
            },
        }
    }

    /// Path of the file that failed to hash.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}
