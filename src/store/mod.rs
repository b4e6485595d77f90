//! FragmentStore — the persistence seam between the entity layer and a
//! concrete backend.
//!
//! A backend keeps two independent namespaces addressed by the same
//! `(owner_id, id)` key: metadata records (small, structured) and raw data
//! (opaque bytes).  The store never inspects payload contents and never
//! reaches across owners — the owner id is part of every key, and no
//! operation accepts one owner's id with another owner's key.
//!
//! # Consistency contract
//! Every backend MUST provide read-your-writes per key: a read issued after a
//! successful write on the same `(owner_id, id)` observes that write.  The
//! two namespaces are written by separate calls, not a transaction; the
//! entity layer documents the resulting inconsistency window.
//!
//! # Implementations
//! - [`memory::MemoryStore`] — process-local map, the development backend.
//! - [`disk::DiskStore`]     — directory-per-owner filesystem layout.

use thiserror::Error;

use crate::fragment::Fragment;

pub mod disk;
pub mod memory;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The `(owner_id, id)` key has no record in the namespace read.
    /// For `delete`, raised only when BOTH namespaces were already empty.
    #[error("no record for this owner/id pair")]
    NotFound,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("metadata encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Capability set every backend implements.
///
/// Enumeration order is backend-defined; callers that need a stable order
/// must sort.  `delete` removes whatever halves exist and is idempotent per
/// half, failing with [`StoreError::NotFound`] only when there was nothing
/// at all to remove.
pub trait FragmentStore: Send + Sync {
    /// Write (or overwrite) the metadata record keyed by the record's own
    /// `(owner_id, id)`.
    fn write_metadata(&self, meta: &Fragment) -> Result<(), StoreError>;

    /// Read one metadata record.
    fn read_metadata(&self, owner_id: &str, id: &str) -> Result<Fragment, StoreError>;

    /// Enumerate the bare fragment ids belonging to `owner_id`.
    fn list_ids(&self, owner_id: &str) -> Result<Vec<String>, StoreError>;

    /// Enumerate the full metadata records belonging to `owner_id`.
    fn list_metadata(&self, owner_id: &str) -> Result<Vec<Fragment>, StoreError>;

    /// Write (or overwrite) the raw data for a key.
    fn write_data(&self, owner_id: &str, id: &str, data: &[u8]) -> Result<(), StoreError>;

    /// Read the raw data for a key.
    fn read_data(&self, owner_id: &str, id: &str) -> Result<Vec<u8>, StoreError>;

    /// Remove both the metadata record and the raw data for a key.
    fn delete(&self, owner_id: &str, id: &str) -> Result<(), StoreError>;
}
