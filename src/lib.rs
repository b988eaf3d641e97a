//! # dirstore
//!
//! A directory-backed record store: every record is one file, named by its
//! key, holding exactly the bytes its codec produced.
//!
//! ## Core Concepts
//!
//! - **Directory**: a working directory resolved from a root and a schema
//! - **RecordStore**: keyed put/get/remove where a failed replace rolls back
//!   to the previous record through a transient `key.bk` backup
//! - **ListCache**: a lazily loaded in-memory list of every record, kept in
//!   step with its own add/remove/replace and reporting each batch to a
//!   change listener
//!
//! ## Example
//!
//! ```ignore
//! use dirstore::{JsonCodec, ListCache, RecordStore, StoreConfig};
//!
//! let config = StoreConfig::new("./data", &["contacts"]);
//!
//! // Single records
//! let store: RecordStore<Contact> = RecordStore::open(&config, JsonCodec::new())?;
//! store.put("alice", &alice)?;
//! let alice = store.get("alice")?;
//!
//! // A list of records keyed by a namer
//! let contacts = ListCache::open(&config, JsonCodec::new(), |c: &Contact| c.handle.clone())?;
//! contacts.add([bob, carol])?;
//! let all = contacts.list()?;
//! ```

pub mod codec;
pub mod config;
pub mod directory;
pub mod error;
pub mod list;
pub mod records;
pub mod types;

// Re-exports
pub use codec::{Codec, JsonCodec, MessagePackCodec};
pub use config::StoreConfig;
pub use directory::{Directory, DirectoryDelegate};
pub use error::{Result, StoreError};
pub use list::{
    ChangeEvent, ChangeKind, ChangeListener, ChannelListener, ListCache, Namer, NoopListener,
};
pub use records::{BackupState, RecordStore};
pub use types::*;
