//! Core types for the record store.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Suffix of the transient file holding a record's previous contents during a put.
pub const BACKUP_SUFFIX: &str = ".bk";

/// Name of the backup file for `key`.
pub fn backup_key(key: &str) -> String {
    format!("{key}{BACKUP_SUFFIX}")
}

/// Whether a directory entry name is a backup file rather than a live record.
pub fn is_backup_key(name: &str) -> bool {
    name.ends_with(BACKUP_SUFFIX)
}

/// Check that `name` is a single file inside the store directory.
///
/// Anything that would resolve outside the directory (or to the directory
/// itself) is rejected. Backup file names pass.
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        return Err(StoreError::InvalidKey(name.to_string()));
    }
    Ok(())
}

/// Check that `key` can hold a record.
///
/// On top of [`validate_name`], the backup suffix is reserved: a record
/// stored as `x.bk` would be clobbered by the next replace of `x`.
pub fn validate_key(key: &str) -> Result<()> {
    validate_name(key)?;
    if is_backup_key(key) {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// How the schema segments are combined with the root directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaResolution {
    /// Every segment is resolved against the root on its own, so only the
    /// last segment decides the working directory.
    #[default]
    LastSegment,

    /// Segments nest: `root/s0/s1/.../sn`.
    Chained,
}

impl SchemaResolution {
    /// Resolve the working directory for `schema` under `root`.
    pub fn resolve<S: AsRef<str>>(self, root: &Path, schema: &[S]) -> PathBuf {
        match self {
            SchemaResolution::LastSegment => schema
                .iter()
                .fold(root.to_path_buf(), |_, segment| root.join(segment.as_ref())),
            SchemaResolution::Chained => schema
                .iter()
                .fold(root.to_path_buf(), |dir, segment| dir.join(segment.as_ref())),
        }
    }
}
