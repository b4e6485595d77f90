//! High-level [`FragmentService`] API — the surface an HTTP layer (or the
//! CLI) builds on.
//!
//! The service owns its storage backend and threads it through the entity
//! layer; there is no ambient store.  It performs no logging and defines no
//! wire format — status codes, headers and envelopes are the caller's
//! concern, aided by the classification helpers on [`ApiError`].

use serde::Serialize;
use thiserror::Error;

use crate::convert::{self, ConvertError};
use crate::fragment::{Fragment, FragmentError};
use crate::registry::BaseType;
use crate::store::FragmentStore;

/// Service-level error: the union of the entity and conversion taxonomies.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Fragment(#[from] FragmentError),
    #[error(transparent)]
    Conversion(#[from] ConvertError),
}

impl ApiError {
    /// Missing fragment / missing data — a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Fragment(FragmentError::NotFound { .. }))
    }

    /// Unsatisfiable request (bad input, illegal or unavailable conversion).
    /// Distinct from not-found and from backend/payload failures.
    pub fn is_client_error(&self) -> bool {
        match self {
            ApiError::Fragment(FragmentError::Validation { .. }) => true,
            ApiError::Conversion(e) => e.is_unsupported(),
            _ => false,
        }
    }
}

/// An owner's fragment listing: bare ids, or full records when expanded.
///
/// Serializes as a plain JSON array either way, matching the record layout
/// backends persist.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Listing {
    Ids(Vec<String>),
    Full(Vec<Fragment>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Listing::Ids(ids) => ids.len(),
            Listing::Full(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fragment operations over one injected [`FragmentStore`] backend.
pub struct FragmentService {
    store: Box<dyn FragmentStore>,
}

impl FragmentService {
    pub fn new(store: Box<dyn FragmentStore>) -> Self {
        Self { store }
    }

    /// Create a fragment and persist metadata + payload in one call.
    pub fn create_fragment(
        &self,
        owner_id: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<Fragment, ApiError> {
        let mut fragment = Fragment::new(owner_id, content_type)?;
        fragment.set_data(self.store.as_ref(), data)?;
        Ok(fragment)
    }

    /// Look up one fragment's metadata.
    pub fn get_fragment(&self, owner_id: &str, id: &str) -> Result<Fragment, ApiError> {
        Ok(Fragment::by_id(self.store.as_ref(), owner_id, id)?)
    }

    /// Enumerate an owner's fragments; `expand` selects records over ids.
    /// Order is backend-defined.
    pub fn list_fragments(&self, owner_id: &str, expand: bool) -> Result<Listing, ApiError> {
        let listing = if expand {
            Listing::Full(Fragment::by_user(self.store.as_ref(), owner_id)?)
        } else {
            Listing::Ids(Fragment::ids_by_user(self.store.as_ref(), owner_id)?)
        };
        Ok(listing)
    }

    /// Remove a fragment's metadata and payload.
    pub fn delete_fragment(&self, owner_id: &str, id: &str) -> Result<(), ApiError> {
        Ok(Fragment::delete(self.store.as_ref(), owner_id, id)?)
    }

    /// Read a fragment's payload verbatim.
    pub fn read_fragment_bytes(&self, owner_id: &str, id: &str) -> Result<Vec<u8>, ApiError> {
        let fragment = Fragment::by_id(self.store.as_ref(), owner_id, id)?;
        Ok(fragment.data(self.store.as_ref())?)
    }

    /// Read a fragment's payload converted to the type named by `extension`.
    /// Returns the converted bytes and the resolved target MIME type, for the
    /// caller's Content-Type header.
    pub fn read_fragment_converted(
        &self,
        owner_id: &str,
        id: &str,
        extension: &str,
    ) -> Result<(Vec<u8>, &'static str), ApiError> {
        let fragment = Fragment::by_id(self.store.as_ref(), owner_id, id)?;

        let target = BaseType::from_extension(extension)
            .ok_or_else(|| ConvertError::UnknownExtension(extension.to_owned()))?;
        let source = fragment
            .base_type()
            .ok_or_else(|| ConvertError::UnknownSourceType(fragment.mime_type()))?;

        let data = fragment.data(self.store.as_ref())?;
        let converted = convert::convert(&data, source, extension)?;
        Ok((converted, target.mime()))
    }
}
