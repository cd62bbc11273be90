//! Infrastructure layer: owner-partitioned storage, write serialization, the
//! catalog application service and the user directory.

pub mod owner_store;
pub mod scope_lock;
pub mod service;
pub mod users;


pub use owner_store::{InMemoryOwnerStore, OwnerStore};
pub use scope_lock::{ScopeKey, ScopeLocks};
pub use users::UserDirectory;
pub use service::{
    AttributeDetail, AttributeInput, AttributePatch, CatalogService, CategoryInput, CategoryPatch,
    LineDetail, ProductChanges, ProductDetail, ProductFilter, ProductInput,
};
