//! Generic document repository with soft delete
//!
//! # Layers
//!
//! - [`Repository`]: the operation set the service layer uses (`all`, `find`,
//!   `add`, `add_range`, `update`, `delete`, `undelete`, `hard_delete`)
//! - [`DocumentRepository`]: the one implementation, generic over the document
//!   type and the collection it talks to
//! - [`DocumentCollection`]: the storage seam, with an in-memory backend
//!   ([`MemoryCollection`]) and a MongoDB backend (`MongoCollection`, feature
//!   `mongodb`)
//! - [`BlockingRepository`]: synchronous variants of every operation
//!
//! # Example
//!
//! ```rust,ignore
//! use recipes_core::models::Recipe;
//! use recipes_core::repository::{DocumentRepository, MemoryCollection, Repository};
//!
//! let repo = DocumentRepository::new(MemoryCollection::<Recipe>::new("recipes"));
//!
//! let added = repo.add(Recipe::new("Ice cream", "Churned")).await?;
//! let id = added.data().map(|recipe| recipe.id.clone()).unwrap();
//!
//! let found = repo.find(&id, false).await?;
//! assert_eq!(found.data().map(|r| r.title.as_str()), Some("Ice cream"));
//! ```

mod blocking;
mod collection;
mod document_repository;
mod error;
mod filter;
mod memory;
#[cfg(feature = "mongodb")]
mod mongo_collection;
mod traits;

pub use blocking::BlockingRepository;
pub use collection::{DeleteResult, DocumentCollection, ReplaceResult, UpdateResult};
pub use document_repository::DocumentRepository;
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use filter::{
    escape_like, FieldUpdate, Filter, FilterCondition, FilterOperator, FilterValue, FindOptions,
    OrderDirection, Pagination, UpdateDefinition, LIKE_ESCAPE,
};
pub use memory::MemoryCollection;
#[cfg(feature = "mongodb")]
pub use mongo_collection::MongoCollection;
pub use traits::{Query, Repository, RepositoryOutcome, RepositoryResult};
