//! Repository trait and the lazy query handle
//!
//! [`Repository`] is the storage-access surface the service layer sees. Every
//! operation returns two layers:
//!
//! - the outer [`RepositoryResult`] is the storage-fault channel
//!   (`Err(StorageError)`), propagated with `?`
//! - the inner [`RepositoryOutcome`] / [`Outcome`] carries the expected failures:
//!   a blank argument or a document that does not exist
//!
//! Methods use RPITIT (return-position `impl Trait` in traits), so no
//! `async_trait` boxing is involved.
//!
//! # Example
//!
//! ```rust,ignore
//! use recipes_core::repository::Repository;
//!
//! let added = repo.add(recipe).await?;
//! let Some(recipe) = added.into_data() else { return Ok(()) };
//!
//! let deleted = repo.delete(&recipe.id).await?;
//! assert!(deleted.succeeded());
//! assert!(repo.find(&recipe.id, false).await?.failed());
//! assert!(repo.find(&recipe.id, true).await?.succeeded());
//! ```

use std::future::Future;
use std::marker::PhantomData;

use super::collection::{DeleteResult, DocumentCollection, ReplaceResult, UpdateResult};
use super::error::RepositoryError;
use super::filter::{Filter, FilterCondition, FindOptions, OrderDirection, Pagination};
use crate::document::{fields, Document};
use crate::error::StorageError;
use crate::outcome::{DataOutcome, Outcome};

/// Outer result of every repository call; `Err` is a storage fault
pub type RepositoryResult<T> = std::result::Result<T, StorageError>;

/// Inner outcome of a data-producing repository call
pub type RepositoryOutcome<T> = DataOutcome<T, RepositoryError>;

/// Generic CRUD over one collection of `D`, with soft delete
///
/// Soft-deleted documents are invisible to [`all`](Repository::all) and
/// [`find`](Repository::find) unless `with_deleted` is set.
pub trait Repository<D: Document>: Send + Sync {
    /// Collection the repository reads and writes
    type Collection: DocumentCollection<D>;

    /// A lazy query over the collection; nothing is read until it is fetched
    ///
    /// The query starts out filtered to live documents unless `with_deleted`
    /// is set.
    fn all(&self, with_deleted: bool) -> Query<'_, D, Self::Collection>;

    /// The document with `id`
    ///
    /// Fails with `MissingArgument` for a blank id and `NotFound` when nothing
    /// (visible) matches.
    fn find(
        &self,
        id: &D::Key,
        with_deleted: bool,
    ) -> impl Future<Output = RepositoryResult<RepositoryOutcome<D>>> + Send;

    /// Stamp `createdOn` and insert; succeeds with the stored document
    fn add(&self, document: D) -> impl Future<Output = RepositoryResult<RepositoryOutcome<D>>> + Send;

    /// Stamp `createdOn` on each document and insert them in one batch
    ///
    /// Fails with `MissingArgument` for an empty batch or any document with a
    /// blank id, before anything is written.
    fn add_range(
        &self,
        documents: Vec<D>,
    ) -> impl Future<Output = RepositoryResult<Outcome<RepositoryError>>> + Send;

    /// Stamp `modifiedOn` and replace the whole document stored under `id`
    ///
    /// When `id` is not `document.id()` nothing is written and the outcome is a
    /// success with an empty [`ReplaceResult`].
    fn update(
        &self,
        id: &D::Key,
        document: D,
    ) -> impl Future<Output = RepositoryResult<RepositoryOutcome<ReplaceResult>>> + Send;

    /// Soft delete: set `isDeleted` and `deletedOn` with a partial update
    fn delete(
        &self,
        id: &D::Key,
    ) -> impl Future<Output = RepositoryResult<RepositoryOutcome<UpdateResult>>> + Send;

    /// Clear `isDeleted` and `deletedOn`; succeeds with the restored document
    fn undelete(&self, id: &D::Key)
        -> impl Future<Output = RepositoryResult<RepositoryOutcome<D>>> + Send;

    /// Permanently remove the document
    fn hard_delete(
        &self,
        id: &D::Key,
    ) -> impl Future<Output = RepositoryResult<RepositoryOutcome<DeleteResult>>> + Send;
}

/// A modifiable, not yet materialized query over a collection
///
/// Returned by [`Repository::all`]. Callers narrow it with extra conditions,
/// ordering and a page window, then [`fetch`](Query::fetch) or
/// [`count`](Query::count) it.
///
/// # Example
///
/// ```rust,ignore
/// use recipes_core::repository::{FilterCondition, OrderDirection, Pagination};
///
/// let page = repo
///     .all(false)
///     .filter(FilterCondition::like("title", "%cream%"))
///     .order_by("createdOn", OrderDirection::Descending)
///     .paginate(Pagination::page(1, 10))
///     .fetch()
///     .await?;
/// ```
#[must_use = "a query does nothing until it is fetched or counted"]
pub struct Query<'a, D, C> {
    collection: &'a C,
    options: FindOptions,
    _document: PhantomData<fn() -> D>,
}

impl<'a, D: Document, C: DocumentCollection<D>> Query<'a, D, C> {
    /// A query over `collection` restricted to live documents unless
    /// `with_deleted` is set
    pub fn new(collection: &'a C, with_deleted: bool) -> Self {
        let filter = if with_deleted {
            Filter::new()
        } else {
            Filter::from(FilterCondition::eq(fields::IS_DELETED, false))
        };
        Self {
            collection,
            options: FindOptions::new(filter),
            _document: PhantomData,
        }
    }

    /// Add a condition
    pub fn filter(mut self, condition: FilterCondition) -> Self {
        self.options.filter = self.options.filter.and(condition);
        self
    }

    /// Add a sort key; earlier keys take precedence
    pub fn order_by(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.options = self.options.sort_by(field, direction);
        self
    }

    /// Restrict the results to a window
    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.options = self.options.paginate(pagination);
        self
    }

    /// The options this query will send to the collection
    pub fn options(&self) -> &FindOptions {
        &self.options
    }

    /// Materialize the matching documents
    pub async fn fetch(&self) -> RepositoryResult<Vec<D>> {
        self.collection.find(&self.options).await
    }

    /// Count every matching document, ignoring the page window
    pub async fn count(&self) -> RepositoryResult<u64> {
        self.collection.count(&self.options.filter).await
    }
}

impl<D, C> std::fmt::Debug for Query<'_, D, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
