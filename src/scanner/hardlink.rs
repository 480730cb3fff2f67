//! Same-object detection for hard-link consolidation.
//!
//! # Overview
//!
//! Hardlinks are multiple directory entries pointing to the same inode on disk.
//! Before replacing a duplicate with a link, the consolidator asks whether the
//! two paths already denote the same storage object; if so there is nothing
//! to do.
//!
//! # Platform Support
//!
//! - **Unix**: Compares (device_id, inode) pairs from file metadata
//! - **Other**: Identity is unknown, so paths are never reported as the same
//!   object
//!
//! # Example
//!
//! ```no_run
//! use linkdupe::scanner::hardlink::is_same_object;
//! use std::path::Path;
//!
//! if is_same_object(Path::new("a.txt"), Path::new("b.txt")).unwrap() {
//!     println!("already linked");
//! }
//! ```

use std::fs::Metadata;
use std::io;
use std::path::Path;

/// Check whether two paths refer to the same underlying file.
///
/// Symlinks are followed, matching what a subsequent hard link would point at.
///
/// # Errors
///
/// Returns the I/O error from `stat` on either path.
pub fn is_same_object(first: &Path, second: &Path) -> io::Result<bool> {
    let first_meta = std::fs::metadata(first)?;
    let second_meta = std::fs::metadata(second)?;

    Ok(
        match (
            InodeKey::from_metadata(&first_meta),
            InodeKey::from_metadata(&second_meta),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    )
}

/// Check if same-object detection is supported on this platform.
#[must_use]
pub const fn is_supported() -> bool {
    cfg!(unix)
}

/// Platform-specific inode key.
///
/// On Unix, this is (device_id, inode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct InodeKey {
    #[cfg(unix)]
    dev: u64,
    #[cfg(unix)]
    ino: u64,
    #[cfg(not(unix))]
    _phantom: (),
}

impl InodeKey {
    #[cfg(unix)]
    fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    // Windows metadata doesn't expose the file index without opening a handle
    // through platform APIs, so identity stays unknown there.
    #[cfg(not(unix))]
    fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}
