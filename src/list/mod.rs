//! List view over a record store.
//!
//! A [`ListCache`] keeps every record of a directory in memory, keyed by a
//! caller-supplied namer, and reports each batch mutation to a
//! [`ChangeListener`].
//!
//! # Example
//!
//! ```ignore
//! let (listener, events) = ChannelListener::unbounded();
//! let people = ListCache::open(&config, JsonCodec::new(), |p: &Person| p.id.clone())?
//!     .with_listener(listener);
//!
//! people.add([alice, bob])?;
//! assert!(matches!(events.recv()?, ChangeEvent::Added(_)));
//! ```

mod cache;
mod events;

pub use cache::{ListCache, Namer};
pub use events::{ChangeEvent, ChangeKind, ChangeListener, ChannelListener, NoopListener};
