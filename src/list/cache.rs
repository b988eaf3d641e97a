//! In-memory list view over a record store.

use super::events::{ChangeEvent, ChangeKind, ChangeListener, NoopListener};
use crate::codec::{Codec, JsonCodec};
use crate::config::StoreConfig;
use crate::directory::{Directory, DirectoryDelegate};
use crate::error::Result;
use crate::records::RecordStore;
use parking_lot::Mutex;
use tracing::debug;

/// Derives a record's key. Must be deterministic.
pub type Namer<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// Ordered view of every record in a store directory.
///
/// The list is read from disk on the first [`list`](Self::list) call and
/// afterwards only changes through this cache's own `add`, `remove` and
/// `replace`. Files changed behind its back are not picked up.
///
/// Mutations made before the first `list` are persisted but leave the list
/// unloaded; the load then reads them from disk.
///
/// Each mutation persists first and updates the list second, as two
/// separate steps. A concurrent `list` can observe the gap between them.
pub struct ListCache<T, C = JsonCodec<T>, D = DirectoryDelegate> {
    store: RecordStore<T, C, D>,

    namer: Namer<T>,

    listener: Box<dyn ChangeListener<T>>,

    /// `None` until the first `list`.
    cache: Mutex<Option<Vec<T>>>,

    /// Load leftover backup files as records.
    include_backup_files: bool,
}

impl<T, C> ListCache<T, C, DirectoryDelegate>
where
    T: Clone + PartialEq,
    C: Codec<T>,
{
    /// Open the store described by `config` and wrap it in a list cache.
    pub fn open<F>(config: &StoreConfig, codec: C, namer: F) -> Result<Self>
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let store = RecordStore::open(config, codec)?;
        Ok(Self::new(store, namer).with_backup_files(config.include_backup_files))
    }
}

impl<T, C, D> ListCache<T, C, D>
where
    T: Clone + PartialEq,
    C: Codec<T>,
    D: Directory,
{
    pub fn new<F>(store: RecordStore<T, C, D>, namer: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            store,
            namer: Box::new(namer),
            listener: Box::new(NoopListener),
            cache: Mutex::new(None),
            include_backup_files: false,
        }
    }

    /// Replace the change listener. The default ignores every event.
    pub fn with_listener(mut self, listener: impl ChangeListener<T> + 'static) -> Self {
        self.set_listener(listener);
        self
    }

    pub fn set_listener(&mut self, listener: impl ChangeListener<T> + 'static) {
        self.listener = Box::new(listener);
    }

    pub fn with_backup_files(mut self, include: bool) -> Self {
        self.include_backup_files = include;
        self
    }

    /// The underlying record store.
    pub fn store(&self) -> &RecordStore<T, C, D> {
        &self.store
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.lock().is_some()
    }

    pub fn preexisting(&self) -> bool {
        self.store.preexisting()
    }

    /// Whether a record file exists at `key`. Invalid keys are reported as
    /// absent rather than as an error.
    pub fn exists(&self, key: &str) -> bool {
        self.store.exists(key)
    }

    pub fn get(&self, key: &str) -> Result<Option<T>> {
        self.store.get(key)
    }

    /// The key `record` is stored under.
    pub fn name(&self, record: &T) -> String {
        (self.namer)(record)
    }

    /// Every record, loading from disk on the first call.
    ///
    /// Records are in directory iteration order followed by this cache's own
    /// appends. A decode failure aborts the load and leaves the list unloaded.
    pub fn list(&self) -> Result<Vec<T>> {
        let mut cache = self.cache.lock();
        if let Some(records) = cache.as_ref() {
            return Ok(records.clone());
        }

        let records = self.store.load_all(self.include_backup_files)?;
        debug!(count = records.len(), "loaded list cache");
        *cache = Some(records.clone());
        Ok(records)
    }

    /// Persist each record under its derived key and append it to the list.
    ///
    /// Stops at the first failing put; earlier records stay persisted and
    /// listed and no event is sent.
    pub fn add(&self, records: impl IntoIterator<Item = T>) -> Result<()> {
        let records: Vec<T> = records.into_iter().collect();
        for record in &records {
            let key = self.name(record);
            self.store.put(&key, record)?;
            if let Some(cached) = self.cache.lock().as_mut() {
                cached.push(record.clone());
            }
        }

        self.notify(ChangeKind::Added, records);
        Ok(())
    }

    /// Delete each record's file and drop the first equal list entry.
    pub fn remove(&self, records: impl IntoIterator<Item = T>) -> Result<()> {
        let records: Vec<T> = records.into_iter().collect();
        for record in &records {
            let key = self.name(record);
            self.store.remove(&key)?;
            if let Some(cached) = self.cache.lock().as_mut() {
                remove_first(cached, record);
            }
        }

        self.notify(ChangeKind::Deleted, records);
        Ok(())
    }

    /// Store `record` over whatever its key currently holds.
    ///
    /// The previous record, if any, leaves the list and `record` is appended.
    /// Reported as [`ChangeKind::Updated`] even when nothing was replaced.
    pub fn replace(&self, record: T) -> Result<()> {
        let key = self.name(&record);
        let old = self.store.get(&key)?;
        self.store.put(&key, &record)?;

        if let Some(cached) = self.cache.lock().as_mut() {
            if let Some(old) = &old {
                remove_first(cached, old);
            }
            cached.push(record.clone());
        }

        self.notify(ChangeKind::Updated, vec![record]);
        Ok(())
    }

    fn notify(&self, kind: ChangeKind, records: Vec<T>) {
        self.listener.notify(&ChangeEvent::new(kind, records));
    }
}

fn remove_first<T: PartialEq>(records: &mut Vec<T>, target: &T) {
    if let Some(index) = records.iter().position(|r| r == target) {
        records.remove(index);
    }
}
