//! Filesystem-backed directory.

use super::Directory;
use crate::error::{Result, StoreError};
use crate::types::{validate_name, SchemaResolution};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Owns one on-disk directory resolved from a root and a schema.
#[derive(Debug)]
pub struct DirectoryDelegate {
    /// Root the schema was resolved against.
    root: PathBuf,

    /// Path segments used to resolve the working directory.
    schema: Vec<String>,

    /// The working directory.
    dir: PathBuf,

    /// Whether `dir` existed before construction. Captured once.
    preexisting: bool,
}

impl DirectoryDelegate {
    /// Open the directory for `schema` under `root`, creating it if needed.
    ///
    /// Each segment is resolved against `root` on its own, so for a
    /// multi-segment schema only the last segment is used. See
    /// [`SchemaResolution`] and [`DirectoryDelegate::with_resolution`].
    pub fn new<S: AsRef<str>>(root: impl AsRef<Path>, schema: &[S]) -> Result<Self> {
        Self::with_resolution(root, schema, SchemaResolution::LastSegment)
    }

    /// Open the directory using an explicit schema resolution strategy.
    pub fn with_resolution<S: AsRef<str>>(
        root: impl AsRef<Path>,
        schema: &[S],
        resolution: SchemaResolution,
    ) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let schema: Vec<String> = schema.iter().map(|s| s.as_ref().to_string()).collect();
        let dir = resolution.resolve(&root, schema.as_slice());

        let preexisting = dir.exists();
        if !preexisting {
            fs::create_dir_all(&dir)
                .map_err(|e| StoreError::io("creating store directory", &dir, e))?;
            debug!(dir = %dir.display(), "created store directory");
        }

        Ok(Self {
            root,
            schema,
            dir,
            preexisting,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_name(key)?;
        Ok(self.dir.join(key))
    }
}

impl Directory for DirectoryDelegate {
    fn path(&self) -> &Path {
        &self.dir
    }

    fn preexisting(&self) -> bool {
        self.preexisting
    }

    fn exists(&self, key: &str) -> bool {
        match self.key_path(key) {
            Ok(path) => path.is_file(),
            Err(_) => false,
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io("removing record", path, e)),
        }
    }

    fn read_all(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.key_path(key)?;
        fs::read(&path).map_err(|e| StoreError::io("reading record", path, e))
    }

    fn write_all(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.key_path(key)?;
        fs::write(&path, bytes).map_err(|e| StoreError::io("writing record", path, e))
    }

    fn rename(&self, from: &str, to: &str) -> Result<()> {
        let from = self.key_path(from)?;
        let to = self.key_path(to)?;
        fs::rename(&from, &to).map_err(|e| StoreError::io("renaming record", from, e))
    }

    fn entries(&self) -> Result<Vec<String>> {
        let read_dir = fs::read_dir(&self.dir)
            .map_err(|e| StoreError::io("listing store directory", &self.dir, e))?;

        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| StoreError::io("listing store directory", &self.dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => warn!(?name, "skipping entry with non UTF-8 name"),
            }
        }

        Ok(names)
    }
}
