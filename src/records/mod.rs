//! Keyed record persistence.
//!
//! Each record is one file named by its key. Replacing a record goes through
//! a `key.bk` backup so a failed write never loses the previous contents.

mod backup;
mod store;

pub use backup::BackupState;
pub use store::RecordStore;
