//! Pluggable file digest functions.
//!
//! # Overview
//!
//! The pipeline only sees the [`Digester`] trait. [`Algorithm`] is the
//! user-facing selector (CLI flag or config value) and [`FileDigester`] the
//! concrete implementation it produces. Every call builds fresh hashing
//! state, so one digester can be shared by all workers.
//!
//! # Algorithms
//!
//! - **BLAKE3** (default): fastest, memory-mapped for large files
//! - **SHA-256**: standard cryptographic digest, streamed through a buffer
//! - **MD5**: legacy compatibility, streamed through a buffer

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Digest, HashError};

/// Read buffer size for streamed digests.
const BUFFER_SIZE: usize = 64 * 1024;

/// Computes a content digest for a file.
///
/// Implementations must be safe to call concurrently for independent paths
/// and must not carry hashing state from one call to the next.
pub trait Digester: Send + Sync {
    /// Digest the full content of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    fn digest(&self, path: &Path) -> Result<Digest, HashError>;
}

impl<F> Digester for F
where
    F: Fn(&Path) -> Result<Digest, HashError> + Send + Sync,
{
    fn digest(&self, path: &Path) -> Result<Digest, HashError> {
        self(path)
    }
}

/// Hash algorithm selector.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// BLAKE3 (fast, default)
    #[default]
    Blake3,
    /// SHA-256
    Sha256,
    /// MD5
    Md5,
}

impl Algorithm {
    /// Build the digester for this algorithm.
    #[must_use]
    pub fn digester(self) -> FileDigester {
        FileDigester { algorithm: self }
    }

    /// Length in bytes of the digests this algorithm produces.
    #[must_use]
    pub fn digest_len(self) -> usize {
        match self {
            Self::Blake3 | Self::Sha256 => 32,
            Self::Md5 => 16,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blake3 => write!(f, "blake3"),
            Self::Sha256 => write!(f, "sha256"),
            Self::Md5 => write!(f, "md5"),
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" => Ok(Self::Blake3),
            "sha256" => Ok(Self::Sha256),
            "md5" => Ok(Self::Md5),
            other => Err(format!(
                "Invalid hashing algorithm '{other}'. Use 'blake3', 'sha256', or 'md5'."
            )),
        }
    }
}

/// Digester backed by one of the built-in algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileDigester {
    algorithm: Algorithm,
}

impl FileDigester {
    /// The algorithm this digester uses.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn blake3(path: &Path) -> io::Result<Digest> {
        let mut hasher = blake3::Hasher::new();
        hasher.update_mmap(path)?;
        Ok(Digest::from(hasher.finalize().as_bytes().as_slice()))
    }

    /// Stream the file through any RustCrypto hasher.
    fn streamed<H>(path: &Path) -> io::Result<Digest>
    where
        H: sha2::digest::Digest + io::Write,
    {
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, File::open(path)?);
        let mut hasher = H::new();
        io::copy(&mut reader, &mut hasher)?;
        Ok(Digest::from(hasher.finalize().as_slice()))
    }
}

impl Default for FileDigester {
    fn default() -> Self {
        Algorithm::default().digester()
    }
}

impl Digester for FileDigester {
    fn digest(&self, path: &Path) -> Result<Digest, HashError> {
        let result = match self.algorithm {
            Algorithm::Blake3 => Self::blake3(path),
            Algorithm::Sha256 => Self::streamed::<sha2::Sha256>(path),
            Algorithm::Md5 => Self::streamed::<md5::Md5>(path),
        };
        result.map_err(|e| HashError::from_io(path.to_path_buf(), e))
    }
}
