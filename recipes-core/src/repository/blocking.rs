//! Synchronous facade over a [`Repository`]
//!
//! Owns a current-thread tokio runtime and drives each async operation to
//! completion on it. For callers without a runtime of their own (CLI tools,
//! migrations, plain `#[test]`s). Calling it from inside an async context panics,
//! as any nested `block_on` does.

use std::marker::PhantomData;
use tokio::runtime::{Builder, Runtime};

use super::collection::{DeleteResult, ReplaceResult, UpdateResult};
use super::error::RepositoryError;
use super::traits::{Query, Repository, RepositoryOutcome, RepositoryResult};
use crate::document::Document;
use crate::error::Result;
use crate::outcome::Outcome;

/// Blocking counterpart of every [`Repository`] operation
///
/// # Example
///
/// ```rust,ignore
/// use recipes_core::repository::{BlockingRepository, DocumentRepository, MemoryCollection};
///
/// let repo = BlockingRepository::new(DocumentRepository::new(MemoryCollection::new("recipes")))?;
/// let added = repo.add(recipe)?;
/// let live = repo.all(false)?;
/// ```
pub struct BlockingRepository<D, R> {
    inner: R,
    runtime: Runtime,
    _document: PhantomData<fn() -> D>,
}

impl<D: Document, R: Repository<D>> BlockingRepository<D, R> {
    /// Wrap `inner`, building the runtime that will drive it
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the runtime cannot be created.
    pub fn new(inner: R) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            inner,
            runtime,
            _document: PhantomData,
        })
    }

    /// The wrapped async repository
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Every document visible under `with_deleted`, materialized
    pub fn all(&self, with_deleted: bool) -> RepositoryResult<Vec<D>> {
        self.fetch_with(with_deleted, |query| query)
    }

    /// Narrow the lazy query with `refine`, then materialize it
    pub fn fetch_with<'a>(
        &'a self,
        with_deleted: bool,
        refine: impl FnOnce(Query<'a, D, R::Collection>) -> Query<'a, D, R::Collection>,
    ) -> RepositoryResult<Vec<D>> {
        let query = refine(self.inner.all(with_deleted));
        self.runtime.block_on(query.fetch())
    }

    /// See [`Repository::find`]
    pub fn find(&self, id: &D::Key, with_deleted: bool) -> RepositoryResult<RepositoryOutcome<D>> {
        self.runtime.block_on(self.inner.find(id, with_deleted))
    }

    /// See [`Repository::add`]
    pub fn add(&self, document: D) -> RepositoryResult<RepositoryOutcome<D>> {
        self.runtime.block_on(self.inner.add(document))
    }

    /// See [`Repository::add_range`]
    pub fn add_range(&self, documents: Vec<D>) -> RepositoryResult<Outcome<RepositoryError>> {
        self.runtime.block_on(self.inner.add_range(documents))
    }

    /// See [`Repository::update`]
    pub fn update(&self, id: &D::Key, document: D) -> RepositoryResult<RepositoryOutcome<ReplaceResult>> {
        self.runtime.block_on(self.inner.update(id, document))
    }

    /// See [`Repository::delete`]
    pub fn delete(&self, id: &D::Key) -> RepositoryResult<RepositoryOutcome<UpdateResult>> {
        self.runtime.block_on(self.inner.delete(id))
    }

    /// See [`Repository::undelete`]
    pub fn undelete(&self, id: &D::Key) -> RepositoryResult<RepositoryOutcome<D>> {
        self.runtime.block_on(self.inner.undelete(id))
    }

    /// See [`Repository::hard_delete`]
    pub fn hard_delete(&self, id: &D::Key) -> RepositoryResult<RepositoryOutcome<DeleteResult>> {
        self.runtime.block_on(self.inner.hard_delete(id))
    }
}
