//! Filesystem backend: one directory per owner, two files per fragment.
//!
//! # Layout
//! ```text
//! <root>/
//!   <hex(owner_id)>/
//!     <id>.json      metadata record (serde_json)
//!     <id>.bin       raw payload bytes
//! ```
//!
//! Owner ids are opaque caller-supplied strings, so the directory name is
//! their hex encoding — an owner id can never traverse out of the root or
//! collide with path syntax.  Fragment ids are generated UUIDs and are used
//! verbatim.
//!
//! Metadata writes go through a temp file + rename so a reader never
//! observes a torn record.  Data writes are plain writes: the entity layer
//! already documents the metadata/data inconsistency window, and a torn
//! `.bin` is indistinguishable from a crash inside that window.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::fragment::Fragment;
use crate::store::{FragmentStore, StoreError};

const META_EXT: &str = "json";
const DATA_EXT: &str = "bin";

/// Directory-backed [`FragmentStore`].
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Open a store rooted at `root`.  The directory is created lazily on
    /// first write, so opening a store never touches the filesystem.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_owned() }
    }

    fn owner_dir(&self, owner_id: &str) -> PathBuf {
        self.root.join(hex::encode(owner_id))
    }

    fn meta_path(&self, owner_id: &str, id: &str) -> PathBuf {
        self.owner_dir(owner_id).join(format!("{id}.{META_EXT}"))
    }

    fn data_path(&self, owner_id: &str, id: &str) -> PathBuf {
        self.owner_dir(owner_id).join(format!("{id}.{DATA_EXT}"))
    }

    fn read_file(path: &Path) -> Result<Vec<u8>, StoreError> {
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove `path` if it exists; reports whether it did.
    fn remove_file(path: &Path) -> Result<bool, StoreError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl FragmentStore for DiskStore {
    fn write_metadata(&self, meta: &Fragment) -> Result<(), StoreError> {
        let dir = self.owner_dir(&meta.owner_id);
        fs::create_dir_all(&dir)?;

        let finished = self.meta_path(&meta.owner_id, &meta.id);
        let staging = finished.with_extension(format!("{META_EXT}.tmp"));
        fs::write(&staging, serde_json::to_vec(meta)?)?;
        fs::rename(&staging, &finished)?;
        Ok(())
    }

    fn read_metadata(&self, owner_id: &str, id: &str) -> Result<Fragment, StoreError> {
        let bytes = Self::read_file(&self.meta_path(owner_id, id))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn list_ids(&self, owner_id: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.owner_dir(owner_id);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            // Owner has never written anything: empty, not an error.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(META_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_owned());
            }
        }
        Ok(ids)
    }

    fn list_metadata(&self, owner_id: &str) -> Result<Vec<Fragment>, StoreError> {
        let mut records = Vec::new();
        for id in self.list_ids(owner_id)? {
            records.push(self.read_metadata(owner_id, &id)?);
        }
        Ok(records)
    }

    fn write_data(&self, owner_id: &str, id: &str, data: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(self.owner_dir(owner_id))?;
        fs::write(self.data_path(owner_id, id), data)?;
        Ok(())
    }

    fn read_data(&self, owner_id: &str, id: &str) -> Result<Vec<u8>, StoreError> {
        Self::read_file(&self.data_path(owner_id, id))
    }

    fn delete(&self, owner_id: &str, id: &str) -> Result<(), StoreError> {
        let had_meta = Self::remove_file(&self.meta_path(owner_id, id))?;
        let had_data = Self::remove_file(&self.data_path(owner_id, id))?;
        if had_meta || had_data {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }
}
