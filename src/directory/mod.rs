//! Raw file access for one store directory.
//!
//! Every record lives in its own file named by its key. The [`Directory`]
//! trait is the byte-level surface the record store builds on;
//! [`DirectoryDelegate`] is the filesystem implementation.

mod delegate;

pub use delegate::DirectoryDelegate;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Byte-level access to the files of a single directory.
///
/// Implementations must satisfy:
/// - `remove` is idempotent: deleting an absent key succeeds.
/// - `write_all` creates or truncates the file and writes every byte.
/// - `rename` replaces the destination if it exists and is atomic on the
///   same filesystem.
/// - `entries` returns names of non-directory entries only.
pub trait Directory: Send + Sync {
    /// The resolved working directory.
    fn path(&self) -> &Path;

    /// Whether the directory existed before this instance opened it.
    fn preexisting(&self) -> bool;

    /// Full path of the file for `key`.
    fn file_path(&self, key: &str) -> PathBuf {
        self.path().join(key)
    }

    fn exists(&self, key: &str) -> bool;

    fn remove(&self, key: &str) -> Result<()>;

    fn read_all(&self, key: &str) -> Result<Vec<u8>>;

    fn write_all(&self, key: &str, bytes: &[u8]) -> Result<()>;

    fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Names of every non-directory entry, in filesystem iteration order.
    fn entries(&self) -> Result<Vec<String>>;
}
