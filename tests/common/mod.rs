//! Shared fixtures for integration tests.

#![allow(dead_code)]

use dirstore::{Directory, DirectoryDelegate, Result, StoreError, BACKUP_SUFFIX};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bar {
    pub i: i32,
    pub key: String,
}

pub fn bar(i: i32, key: &str) -> Bar {
    Bar {
        i,
        key: key.to_string(),
    }
}

pub fn bar_key(bar: &Bar) -> String {
    bar.key.clone()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn injected(operation: &'static str, path: &Path) -> StoreError {
    StoreError::io(operation, path, io::Error::other("injected failure"))
}

/// Filesystem directory with switchable failures.
///
/// A failing write leaves a partial file behind, like a write that died
/// halfway through.
pub struct FaultyDirectory {
    inner: DirectoryDelegate,
    /// Fail every write.
    pub fail_writes: AtomicBool,
    /// Fail writes to this key only.
    pub fail_key: Mutex<Option<String>>,
    /// Fail renames of a record to its backup.
    pub fail_backups: AtomicBool,
    /// Fail renames of a backup back to its record.
    pub fail_restores: AtomicBool,
    /// Fail removal of backup files.
    pub fail_cleanup: AtomicBool,
    /// Number of write attempts seen.
    pub writes: AtomicUsize,
}

impl FaultyDirectory {
    pub fn new(root: &Path, schema: &str) -> Self {
        Self {
            inner: DirectoryDelegate::new(root, &[schema]).unwrap(),
            fail_writes: AtomicBool::new(false),
            fail_key: Mutex::new(None),
            fail_backups: AtomicBool::new(false),
            fail_restores: AtomicBool::new(false),
            fail_cleanup: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn fail_writes_to(&self, key: &str) {
        *self.fail_key.lock() = Some(key.to_string());
    }

    fn write_fails(&self, key: &str) -> bool {
        self.fail_writes.load(Ordering::SeqCst) || self.fail_key.lock().as_deref() == Some(key)
    }
}

impl Directory for FaultyDirectory {
    fn path(&self) -> &Path {
        self.inner.path()
    }

    fn preexisting(&self) -> bool {
        self.inner.preexisting()
    }

    fn exists(&self, key: &str) -> bool {
        self.inner.exists(key)
    }

    fn remove(&self, key: &str) -> Result<()> {
        if key.ends_with(BACKUP_SUFFIX) && self.fail_cleanup.load(Ordering::SeqCst) {
            return Err(injected("removing backup", &self.inner.file_path(key)));
        }
        self.inner.remove(key)
    }

    fn read_all(&self, key: &str) -> Result<Vec<u8>> {
        self.inner.read_all(key)
    }

    fn write_all(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.write_fails(key) {
            self.inner.write_all(key, b"partial")?;
            return Err(injected("writing record", &self.inner.file_path(key)));
        }
        self.inner.write_all(key, bytes)
    }

    fn rename(&self, from: &str, to: &str) -> Result<()> {
        if to.ends_with(BACKUP_SUFFIX) && self.fail_backups.load(Ordering::SeqCst) {
            return Err(injected("backing up record", &self.inner.file_path(from)));
        }
        if from.ends_with(BACKUP_SUFFIX) && self.fail_restores.load(Ordering::SeqCst) {
            return Err(injected("restoring backup", &self.inner.file_path(from)));
        }
        self.inner.rename(from, to)
    }

    fn entries(&self) -> Result<Vec<String>> {
        self.inner.entries()
    }
}
