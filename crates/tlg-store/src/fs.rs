use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::{validate_name, Collection, DocumentStore};

/// File-system document store: one file per document.
///
/// Collections map to directories under `root` named by [`StoreConfig`].
/// Only files carrying the configured extension are listed; anything else in
/// the directory is ignored.
pub struct FsDocumentStore {
    root: PathBuf,
    config: StoreConfig,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>, config: StoreConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn dir(&self, collection: Collection) -> PathBuf {
        self.root.join(self.config.dir(collection))
    }

    fn path(&self, collection: Collection, name: &str) -> StoreResult<PathBuf> {
        validate_name(name)?;
        Ok(self.dir(collection).join(name))
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.config.extension)
    }
}

impl DocumentStore for FsDocumentStore {
    fn list(&self, collection: Collection) -> StoreResult<Vec<String>> {
        let dir = self.dir(collection);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file() || !self.has_extension(&path) {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    warn!(file = ?raw, dir = %dir.display(), "skipping non UTF-8 file name");
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, collection: Collection, name: &str) -> StoreResult<Option<String>> {
        let path = self.path(collection, name)?;
        match fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StoreError::InvalidUtf8 {
                    collection,
                    name: name.to_string(),
                }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, collection: Collection, name: &str, contents: &str) -> StoreResult<()> {
        let path = self.path(collection, name)?;
        let dir = self.dir(collection);
        fs::create_dir_all(&dir)?;

        let mut staged = NamedTempFile::new_in(&dir)?;
        staged.write_all(contents.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&path).map_err(|e| StoreError::Persist {
            path: path.display().to_string(),
            source: e.error,
        })?;

        debug!(path = %path.display(), bytes = contents.len(), "document written");
        Ok(())
    }

    fn delete(&self, collection: Collection, name: &str) -> StoreResult<bool> {
        let path = self.path(collection, name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "document deleted");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
