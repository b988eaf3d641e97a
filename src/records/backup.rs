//! Backup-and-rollback protocol for replacing a record file.
//!
//! Replacing `key` first moves the current file aside to `key.bk`. The
//! [`BackupGuard`] owns that backup until the put finishes:
//!
//! ```text
//! NoBackup ──────────────────────────────► (nothing to clean up)
//! BackupPending ──commit──► Committed ──drop──► backup deleted (best effort)
//! BackupPending ──rollback──► NoBackup        (backup renamed back to key)
//! BackupPending ──drop──► backup renamed back to key (best effort)
//! ```
//!
//! Dropping a guard still pending means the write never reported back (it
//! panicked), so the previous record is restored.

use crate::directory::Directory;
use crate::error::Result;
use crate::types::backup_key;
use tracing::{debug, warn};

/// Where a put is in the backup protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackupState {
    /// No previous file existed, or the backup has been dealt with.
    NoBackup,
    /// The previous file sits at `key.bk` while the new contents are written.
    BackupPending,
    /// The new contents are in place; the backup is garbage.
    Committed,
}

/// Scoped owner of a `key.bk` file.
pub(crate) struct BackupGuard<'a, D: Directory + ?Sized> {
    directory: &'a D,
    key: &'a str,
    backup: String,
    state: BackupState,
}

impl<'a, D: Directory + ?Sized> BackupGuard<'a, D> {
    /// Move an existing record aside. Errors leave the directory untouched.
    pub(crate) fn acquire(directory: &'a D, key: &'a str) -> Result<Self> {
        let backup = backup_key(key);
        let state = if directory.exists(key) {
            directory.rename(key, &backup)?;
            debug!(key, "backed up record");
            BackupState::BackupPending
        } else {
            BackupState::NoBackup
        };

        Ok(Self {
            directory,
            key,
            backup,
            state,
        })
    }

    pub(crate) fn state(&self) -> BackupState {
        self.state
    }

    /// The new contents were written; the backup can go.
    pub(crate) fn commit(&mut self) {
        if self.state == BackupState::BackupPending {
            self.state = BackupState::Committed;
        }
    }

    /// Put the backup back at `key`.
    pub(crate) fn rollback(&mut self) -> Result<()> {
        if self.state != BackupState::BackupPending {
            return Ok(());
        }
        // Whatever happens the guard no longer owns a restorable backup.
        self.state = BackupState::NoBackup;
        self.directory.rename(&self.backup, self.key)?;
        debug!(key = self.key, "rolled back record from backup");
        Ok(())
    }
}

impl<D: Directory + ?Sized> Drop for BackupGuard<'_, D> {
    fn drop(&mut self) {
        match self.state {
            BackupState::NoBackup => {}
            BackupState::Committed => {
                if let Err(e) = self.directory.remove(&self.backup) {
                    warn!(key = self.key, error = %e, "failed to remove backup file");
                }
            }
            BackupState::BackupPending => {
                if let Err(e) = self.rollback() {
                    warn!(key = self.key, error = %e, "failed to restore backup file");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::DirectoryDelegate;
    use tempfile::TempDir;

    fn delegate(dir: &TempDir) -> DirectoryDelegate {
        DirectoryDelegate::new(dir.path(), &["records"]).unwrap()
    }

    #[test]
    fn test_no_backup_for_new_key() {
        let dir = TempDir::new().unwrap();
        let directory = delegate(&dir);

        let guard = BackupGuard::acquire(&directory, "fresh").unwrap();
        assert_eq!(guard.state(), BackupState::NoBackup);
        drop(guard);

        assert!(directory.entries().unwrap().is_empty());
    }

    #[test]
    fn test_commit_removes_backup() {
        let dir = TempDir::new().unwrap();
        let directory = delegate(&dir);
        directory.write_all("k", b"old").unwrap();

        let mut guard = BackupGuard::acquire(&directory, "k").unwrap();
        assert_eq!(guard.state(), BackupState::BackupPending);
        assert!(!directory.exists("k"));
        assert!(directory.exists("k.bk"));

        directory.write_all("k", b"new").unwrap();
        guard.commit();
        assert_eq!(guard.state(), BackupState::Committed);
        drop(guard);

        assert!(!directory.exists("k.bk"));
        assert_eq!(directory.read_all("k").unwrap(), b"new");
    }

    #[test]
    fn test_rollback_restores_previous() {
        let dir = TempDir::new().unwrap();
        let directory = delegate(&dir);
        directory.write_all("k", b"old").unwrap();

        let mut guard = BackupGuard::acquire(&directory, "k").unwrap();
        directory.write_all("k", b"partial").unwrap();
        guard.rollback().unwrap();
        assert_eq!(guard.state(), BackupState::NoBackup);
        drop(guard);

        assert!(!directory.exists("k.bk"));
        assert_eq!(directory.read_all("k").unwrap(), b"old");
    }

    #[test]
    fn test_drop_while_pending_restores() {
        let dir = TempDir::new().unwrap();
        let directory = delegate(&dir);
        directory.write_all("k", b"old").unwrap();

        let guard = BackupGuard::acquire(&directory, "k").unwrap();
        drop(guard);

        assert!(!directory.exists("k.bk"));
        assert_eq!(directory.read_all("k").unwrap(), b"old");
    }
}
