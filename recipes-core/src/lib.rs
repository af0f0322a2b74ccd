//! # recipes-core
//!
//! Shared plumbing for the Identity and Recipes services: typed outcomes for
//! expected failures and a generic document repository with soft delete.
//!
//! ## Features
//!
//! - **Outcomes**: [`Outcome`](outcome::Outcome) and [`DataOutcome`](outcome::DataOutcome)
//!   carry expected failures as values, composable with `depend_on`, `bind` and `resolve`
//! - **Repository**: `all`, `find`, `add`, `add_range`, `update`, `delete`, `undelete`
//!   and `hard_delete` over any auditable document, with blocking variants
//! - **Storage**: in-memory collections for tests and local runs, MongoDB behind
//!   the `mongodb` feature
//! - **Service boundary**: RFC 9457 problem details rendered as axum responses
//! - **Configuration**: layered TOML and `RECIPES_` environment variables via figment
//!
//! ## Example
//!
//! ```rust,no_run
//! use recipes_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load_for_service("recipes")?;
//!     init_tracing(&config)?;
//!
//!     let repository = DocumentRepository::new(MemoryCollection::<Recipe>::new(
//!         config.collections.recipes.as_str(),
//!     ));
//!     let service = RecipeService::new(repository);
//!
//!     let created = service.create(RecipeDraft::titled("Ice cream")).await;
//!     assert!(created.succeeded());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod guard;
pub mod ids;
pub mod models;
#[cfg(feature = "mongodb")]
pub mod mongo;
pub mod observability;
pub mod outcome;
pub mod repository;
pub mod services;

pub mod prelude {
    pub use crate::config::{CollectionsConfig, Config, MongoConfig};
    pub use crate::document::{fields, AuditFields, Auditable, Document, DocumentKey, SoftDeletable};
    pub use crate::error::{Error, Result, StorageError, StorageErrorKind, StorageOperation};
    pub use crate::guard::Guard;
    pub use crate::ids::{RecipeId, RoleId, TypedId, UserId};
    pub use crate::models::{Recipe, RecipeDraft, Role, User, UserDraft};
    pub use crate::observability::init_tracing;
    pub use crate::outcome::{DataOutcome, Fallible, FromFailure, Outcome};
    pub use crate::repository::{
        BlockingRepository, DocumentCollection, DocumentRepository, Filter, FilterCondition,
        MemoryCollection, OrderDirection, Pagination, Repository, RepositoryError,
        RepositoryErrorKind, RepositoryOperation, RepositoryOutcome, RepositoryResult,
    };
    pub use crate::services::{IdentityService, ProblemDetails, RecipeListQuery, RecipePage, RecipeService};

    #[cfg(feature = "mongodb")]
    pub use crate::mongo::{connect, RecipeRepository, RoleRepository, UserRepository};
    #[cfg(feature = "mongodb")]
    pub use crate::repository::MongoCollection;
}
