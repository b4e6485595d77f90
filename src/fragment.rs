//! The fragment entity: a validated metadata record plus its lifecycle
//! behavior against a [`FragmentStore`].
//!
//! A fragment is identified by `(owner_id, id)`.  The metadata record and the
//! raw payload live in separate store namespaces under that key; `set_data`
//! writes metadata first and bytes second, so a backend failure between the
//! two calls leaves a record whose `size` has no matching payload.  That
//! window is accepted here and must be reconciled (or tolerated) by the
//! caller — see the service layer.
//!
//! The `type` field is immutable after construction and validated against the
//! registry's exact literal set; nothing downstream ever needs to re-check it,
//! though derived accessors still degrade gracefully if a store hands back a
//! record written by a build with a wider registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::registry::{self, BaseType};
use crate::store::{FragmentStore, StoreError};

#[derive(Error, Debug)]
pub enum FragmentError {
    /// Malformed construction input.  Never retried.
    #[error("invalid fragment: {reason}")]
    Validation { reason: String },
    /// No metadata or data under this `(owner, id)` key.  Never retried.
    #[error("no fragment with id {id} for this owner")]
    NotFound { id: String },
    /// The backend failed; the operation may be retried by caller policy.
    #[error("storage backend failure: {0}")]
    Storage(#[source] StoreError),
}

impl FragmentError {
    fn validation(reason: impl Into<String>) -> Self {
        FragmentError::Validation { reason: reason.into() }
    }

    /// Split a store failure into the not-found / backend-failure halves of
    /// the taxonomy.
    fn from_store(err: StoreError, id: &str) -> Self {
        match err {
            StoreError::NotFound => FragmentError::NotFound { id: id.to_owned() },
            other => FragmentError::Storage(other),
        }
    }
}

/// Metadata record for one stored payload.
///
/// Field names follow the record layout backends persist (`ownerId`, `type`),
/// so a record written by one backend deserializes from any other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub id: String,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// The exact Content-Type supplied at creation, parameters included.
    /// Immutable for the life of the fragment.
    #[serde(rename = "type")]
    pub content_type: String,
    /// Byte count of the stored payload.  Unsigned, so a negative size is
    /// unrepresentable rather than merely rejected.
    pub size: u64,
}

impl Fragment {
    /// Construct a new, empty fragment for `owner_id` with the given
    /// Content-Type.  Generates the id and stamps both timestamps; nothing is
    /// persisted until [`save`](Self::save) or [`set_data`](Self::set_data).
    pub fn new(owner_id: &str, content_type: &str) -> Result<Self, FragmentError> {
        if owner_id.is_empty() {
            return Err(FragmentError::validation("owner id must not be empty"));
        }
        if !registry::is_supported(content_type) {
            return Err(FragmentError::validation(format!(
                "unsupported content type: {content_type}"
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_owned(),
            created: now,
            updated: now,
            content_type: content_type.to_owned(),
            size: 0,
        })
    }

    // ── Persistence ──────────────────────────────────────────────────────────

    /// Refresh `updated` and write the metadata record.
    pub fn save(&mut self, store: &dyn FragmentStore) -> Result<(), FragmentError> {
        self.updated = Utc::now();
        store
            .write_metadata(self)
            .map_err(|e| FragmentError::from_store(e, &self.id))
    }

    /// Replace the payload: records the new `size`, saves metadata, then
    /// writes the bytes.  Metadata lands first — see the module docs for the
    /// failure window between the two writes.
    pub fn set_data(&mut self, store: &dyn FragmentStore, data: &[u8]) -> Result<(), FragmentError> {
        self.size = data.len() as u64;
        self.save(store)?;
        store
            .write_data(&self.owner_id, &self.id, data)
            .map_err(|e| FragmentError::from_store(e, &self.id))
    }

    /// Read back the stored payload.
    pub fn data(&self, store: &dyn FragmentStore) -> Result<Vec<u8>, FragmentError> {
        store
            .read_data(&self.owner_id, &self.id)
            .map_err(|e| FragmentError::from_store(e, &self.id))
    }

    /// Look up one fragment by owner and id.
    pub fn by_id(
        store: &dyn FragmentStore,
        owner_id: &str,
        id: &str,
    ) -> Result<Self, FragmentError> {
        store
            .read_metadata(owner_id, id)
            .map_err(|e| FragmentError::from_store(e, id))
    }

    /// Enumerate an owner's fragment ids.  An owner with no fragments is an
    /// empty listing, so the only failure here is the backend itself.
    pub fn ids_by_user(
        store: &dyn FragmentStore,
        owner_id: &str,
    ) -> Result<Vec<String>, FragmentError> {
        store.list_ids(owner_id).map_err(FragmentError::Storage)
    }

    /// Enumerate an owner's full metadata records.
    pub fn by_user(
        store: &dyn FragmentStore,
        owner_id: &str,
    ) -> Result<Vec<Self>, FragmentError> {
        store.list_metadata(owner_id).map_err(FragmentError::Storage)
    }

    /// Remove metadata and payload for `(owner_id, id)` in one call.
    pub fn delete(
        store: &dyn FragmentStore,
        owner_id: &str,
        id: &str,
    ) -> Result<(), FragmentError> {
        store
            .delete(owner_id, id)
            .map_err(|e| FragmentError::from_store(e, id))
    }

    // ── Derived accessors ────────────────────────────────────────────────────

    /// The stored type with parameters stripped:
    /// `"text/html; charset=utf-8"` → `"text/html"`.
    ///
    /// Falls back to the stored string verbatim if it no longer parses —
    /// construction validated it, but records can arrive from any backend.
    pub fn mime_type(&self) -> String {
        match self.content_type.parse::<mime::Mime>() {
            Ok(parsed) => parsed.essence_str().to_owned(),
            Err(_) => self.content_type.clone(),
        }
    }

    /// Registry vocabulary entry for the stored type, if it has one.
    pub fn base_type(&self) -> Option<BaseType> {
        registry::base_type(&self.content_type)
    }

    /// True if the fragment holds a `text/*` payload.
    pub fn is_text(&self) -> bool {
        self.base_type().is_some_and(BaseType::is_text)
    }

    /// The MIME types this fragment can be served as, in frozen listing
    /// order.  `None` if the stored type fell outside the registry.
    pub fn formats(&self) -> Option<&'static [BaseType]> {
        self.base_type().map(BaseType::conversion_targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[test]
    fn new_generates_id_and_timestamps() {
        let fragment = Fragment::new("user123", "text/plain").unwrap();
        assert!(!fragment.id.is_empty());
        assert_eq!(fragment.owner_id, "user123");
        assert_eq!(fragment.content_type, "text/plain");
        assert_eq!(fragment.size, 0);
        assert_eq!(fragment.created, fragment.updated);
    }

    #[test]
    fn each_fragment_gets_a_distinct_id() {
        let a = Fragment::new("user123", "text/plain").unwrap();
        let b = Fragment::new("user123", "text/plain").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn empty_owner_is_rejected() {
        assert!(matches!(
            Fragment::new("", "text/plain"),
            Err(FragmentError::Validation { .. })
        ));
    }

    #[test]
    fn unregistered_type_is_rejected() {
        for bad in ["application/xml", "image/png", "text/plain;charset=utf-8", ""] {
            assert!(
                matches!(
                    Fragment::new("user123", bad),
                    Err(FragmentError::Validation { .. })
                ),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn parameterized_literal_is_accepted() {
        let fragment = Fragment::new("user123", "text/plain; charset=utf-8").unwrap();
        assert_eq!(fragment.mime_type(), "text/plain");
        assert!(fragment.is_text());
    }

    #[test]
    fn set_data_records_size_and_persists_both_halves() {
        let store = MemoryStore::new();
        let mut fragment = Fragment::new("user123", "text/plain").unwrap();

        fragment.set_data(&store, b"hello world").unwrap();
        assert_eq!(fragment.size, 11);

        let reread = Fragment::by_id(&store, "user123", &fragment.id).unwrap();
        assert_eq!(reread.size, 11);
        assert_eq!(fragment.data(&store).unwrap(), b"hello world");
    }

    #[test]
    fn save_refreshes_updated_only() {
        let store = MemoryStore::new();
        let mut fragment = Fragment::new("user123", "text/plain").unwrap();
        let created = fragment.created;
        let first_updated = fragment.updated;

        std::thread::sleep(std::time::Duration::from_millis(2));
        fragment.save(&store).unwrap();

        assert_eq!(fragment.created, created);
        assert!(fragment.updated > first_updated);
    }

    #[test]
    fn data_on_unwritten_fragment_is_not_found() {
        let store = MemoryStore::new();
        let fragment = Fragment::new("user123", "text/plain").unwrap();
        assert!(matches!(
            fragment.data(&store),
            Err(FragmentError::NotFound { .. })
        ));
    }

    #[test]
    fn by_id_is_owner_scoped() {
        let store = MemoryStore::new();
        let mut fragment = Fragment::new("alice", "text/plain").unwrap();
        fragment.set_data(&store, b"private").unwrap();

        assert!(Fragment::by_id(&store, "alice", &fragment.id).is_ok());
        assert!(matches!(
            Fragment::by_id(&store, "bob", &fragment.id),
            Err(FragmentError::NotFound { .. })
        ));
    }

    #[test]
    fn formats_follow_the_conversion_graph() {
        let markdown = Fragment::new("user123", "text/markdown").unwrap();
        assert_eq!(
            markdown.formats().unwrap(),
            &[BaseType::TextMarkdown, BaseType::TextHtml, BaseType::TextPlain]
        );

        let json = Fragment::new("user123", "application/json").unwrap();
        assert!(!json.is_text());
        assert_eq!(
            json.formats().unwrap(),
            &[BaseType::ApplicationJson, BaseType::TextPlain]
        );
    }

    #[test]
    fn record_deserializes_from_persisted_layout() {
        // The wire layout backends persist: camelCase owner key, "type" key.
        let json = r#"{
            "id": "abc-123",
            "ownerId": "user123",
            "created": "2024-01-01T12:00:00Z",
            "updated": "2024-01-02T12:00:00Z",
            "type": "text/markdown",
            "size": 42
        }"#;
        let fragment: Fragment = serde_json::from_str(json).unwrap();
        assert_eq!(fragment.owner_id, "user123");
        assert_eq!(fragment.content_type, "text/markdown");
        assert_eq!(fragment.size, 42);

        // And back out with the same keys.
        let out = serde_json::to_value(&fragment).unwrap();
        assert!(out.get("ownerId").is_some());
        assert!(out.get("type").is_some());
    }
}
