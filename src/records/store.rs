//! Keyed record store with atomic replace.

use super::backup::{BackupGuard, BackupState};
use crate::codec::{Codec, JsonCodec};
use crate::config::StoreConfig;
use crate::directory::{Directory, DirectoryDelegate};
use crate::error::{Result, StoreError};
use crate::types::{is_backup_key, validate_key, validate_name};
use parking_lot::Mutex;
use std::marker::PhantomData;
use tracing::{error, warn};

/// Persists records of type `T`, one file per key.
///
/// Every public method holds the instance lock for its whole duration, so
/// operations on one store never interleave. The lock is not reentrant:
/// public methods do their work through `*_locked` helpers that assume the
/// lock is already held.
///
/// Nothing coordinates separate instances opened on the same directory.
pub struct RecordStore<T, C = JsonCodec<T>, D = DirectoryDelegate> {
    /// Directory the record files live in.
    directory: D,

    /// Codec bound to this store.
    codec: C,

    /// Serializes public operations.
    lock: Mutex<()>,

    _marker: PhantomData<fn() -> T>,
}

impl<T, C: Codec<T>> RecordStore<T, C, DirectoryDelegate> {
    /// Open the store directory described by `config`, creating it if missing.
    pub fn open(config: &StoreConfig, codec: C) -> Result<Self> {
        Ok(Self::new(config.open_directory()?, codec))
    }
}

impl<T, C: Codec<T>, D: Directory> RecordStore<T, C, D> {
    pub fn new(directory: D, codec: C) -> Self {
        Self {
            directory,
            codec,
            lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Whether the store directory existed before it was opened.
    pub fn preexisting(&self) -> bool {
        let _lock = self.lock.lock();
        self.directory.preexisting()
    }

    /// Whether a record file exists at `key`.
    ///
    /// Keys that [`get`](Self::get) would reject with
    /// [`StoreError::InvalidKey`] are reported as absent.
    pub fn exists(&self, key: &str) -> bool {
        let _lock = self.lock.lock();
        validate_key(key).is_ok() && self.directory.exists(key)
    }

    /// Delete the record at `key`. Absent keys are not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        let _lock = self.lock.lock();
        validate_key(key)?;
        self.directory.remove(key)
    }

    /// Create or replace the record at `key`.
    ///
    /// An existing record is moved to `key.bk` before the new bytes are
    /// written and deleted afterwards. If the write fails the backup is moved
    /// back and [`StoreError::RolledBack`] is returned; if that also fails the
    /// error is [`StoreError::Unrecoverable`] and the key needs manual repair.
    pub fn put(&self, key: &str, record: &T) -> Result<()> {
        let _lock = self.lock.lock();
        self.put_locked(key, record, &self.codec)
    }

    /// Like [`put`](Self::put) but encodes with `codec`, so records of other
    /// types can share the directory.
    pub fn put_with<S>(&self, key: &str, record: &S, codec: &impl Codec<S>) -> Result<()> {
        let _lock = self.lock.lock();
        self.put_locked(key, record, codec)
    }

    /// Read the record at `key`, or `None` if there is no such file.
    pub fn get(&self, key: &str) -> Result<Option<T>> {
        let _lock = self.lock.lock();
        self.get_locked(key, &self.codec)
    }

    /// Read the record at `key` decoding with `codec` instead of the bound one.
    pub fn get_with<S>(&self, key: &str, codec: &impl Codec<S>) -> Result<Option<S>> {
        let _lock = self.lock.lock();
        self.get_locked(key, codec)
    }

    /// Keys of every record file, backups excluded, in directory order.
    pub fn keys(&self) -> Result<Vec<String>> {
        let _lock = self.lock.lock();
        Ok(self
            .directory
            .entries()?
            .into_iter()
            .filter(|name| !is_backup_key(name))
            .collect())
    }

    /// Decode every record file in directory order.
    ///
    /// Backup files are skipped unless `include_backup_files` is set. Files
    /// that disappear between listing and reading are skipped; any decode
    /// failure aborts the load.
    pub fn load_all(&self, include_backup_files: bool) -> Result<Vec<T>> {
        let _lock = self.lock.lock();

        let mut records = Vec::new();
        for name in self.directory.entries()? {
            if !include_backup_files && is_backup_key(&name) {
                warn!(name = %name, "skipping leftover backup file");
                continue;
            }
            if validate_name(&name).is_err() {
                warn!(name = %name, "skipping entry that is not a valid file name");
                continue;
            }
            if let Some(record) = self.read_locked(&name, &self.codec)? {
                records.push(record);
            }
        }

        Ok(records)
    }

    fn put_locked<S>(&self, key: &str, record: &S, codec: &impl Codec<S>) -> Result<()> {
        validate_key(key)?;
        let bytes = codec.encode(record)?;

        let mut backup = BackupGuard::acquire(&self.directory, key)?;
        let write_error = match self.directory.write_all(key, &bytes) {
            Ok(()) => {
                backup.commit();
                return Ok(());
            }
            Err(e) => e,
        };

        if backup.state() == BackupState::NoBackup {
            // Nothing to restore; drop whatever part of the new file was written.
            if let Err(e) = self.directory.remove(key) {
                warn!(key, error = %e, "failed to remove partially written record");
            }
            return Err(write_error);
        }

        match backup.rollback() {
            Ok(()) => Err(StoreError::RolledBack {
                key: key.to_string(),
                source: Box::new(write_error),
            }),
            Err(rollback_error) => {
                error!(
                    key,
                    write_error = %write_error,
                    rollback_error = %rollback_error,
                    "put failed and backup could not be restored"
                );
                Err(StoreError::Unrecoverable {
                    key: key.to_string(),
                    write_error: Box::new(write_error),
                    source: Box::new(rollback_error),
                })
            }
        }
    }

    fn get_locked<S>(&self, key: &str, codec: &impl Codec<S>) -> Result<Option<S>> {
        validate_key(key)?;
        self.read_locked(key, codec)
    }

    /// Decode the file `name`, which may be a backup.
    fn read_locked<S>(&self, name: &str, codec: &impl Codec<S>) -> Result<Option<S>> {
        if !self.directory.exists(name) {
            return Ok(None);
        }
        let bytes = self.directory.read_all(name)?;
        codec.decode(&bytes).map(Some)
    }
}
