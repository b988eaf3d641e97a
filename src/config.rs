//! Store configuration.

use crate::directory::DirectoryDelegate;
use crate::error::Result;
use crate::types::SchemaResolution;
use std::path::PathBuf;

/// Where a store lives and how its directory is laid out.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Root directory the schema is resolved against.
    pub root: PathBuf,

    /// Path segments naming the store directory under `root`.
    pub schema: Vec<String>,

    /// How `schema` is combined with `root`.
    /// Default: [`SchemaResolution::LastSegment`]
    pub schema_resolution: SchemaResolution,

    /// Load leftover `*.bk` files as records when building a list cache.
    /// Default: false
    pub include_backup_files: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./store"),
            schema: Vec::new(),
            schema_resolution: SchemaResolution::default(),
            include_backup_files: false,
        }
    }
}

impl StoreConfig {
    /// Config for `schema` under `root` with default options.
    pub fn new<S: AsRef<str>>(root: impl Into<PathBuf>, schema: &[S]) -> Self {
        Self {
            root: root.into(),
            schema: schema.iter().map(|s| s.as_ref().to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_schema_resolution(mut self, resolution: SchemaResolution) -> Self {
        self.schema_resolution = resolution;
        self
    }

    pub fn with_backup_files(mut self, include: bool) -> Self {
        self.include_backup_files = include;
        self
    }

    /// Open (creating if needed) the directory this config points at.
    pub fn open_directory(&self) -> Result<DirectoryDelegate> {
        DirectoryDelegate::with_resolution(&self.root, self.schema.as_slice(), self.schema_resolution)
    }
}
