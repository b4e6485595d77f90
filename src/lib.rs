pub mod registry;
pub mod store;
pub mod fragment;
pub mod convert;
pub mod service;

pub use registry::{BaseType, SUPPORTED_TYPES};
pub use store::{FragmentStore, StoreError};
pub use store::disk::DiskStore;
pub use store::memory::MemoryStore;
pub use fragment::{Fragment, FragmentError};
pub use convert::{ConvertError, WRAP_COLUMNS};
pub use service::{ApiError, FragmentService, Listing};
