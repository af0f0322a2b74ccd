//! The generic repository over any [`DocumentCollection`]
//!
//! Every operation runs the same three steps: guard the arguments, perform one
//! collection call, wrap the result in an outcome. A guard failure returns before
//! the collection is touched. Storage faults are not caught here; they leave
//! through the outer `Err`.

use chrono::Utc;
use std::marker::PhantomData;
use tracing::{debug, warn};

use super::collection::{DeleteResult, DocumentCollection, ReplaceResult, UpdateResult};
use super::error::{RepositoryError, RepositoryOperation};
use super::filter::{Filter, FilterCondition, FindOptions, Pagination, UpdateDefinition};
use super::traits::{Query, Repository, RepositoryOutcome, RepositoryResult};
use crate::document::{fields, Document, DocumentKey};
use crate::guard::Guard;
use crate::outcome::{DataOutcome, Outcome};

/// [`Repository`] implementation for documents of type `D` stored in `C`
///
/// # Example
///
/// ```rust,ignore
/// use recipes_core::models::Recipe;
/// use recipes_core::repository::{DocumentRepository, MemoryCollection, Repository};
///
/// let recipes = DocumentRepository::new(MemoryCollection::<Recipe>::new("recipes"));
/// let added = recipes.add(Recipe::new("Ice cream", "Churned")).await?;
/// assert!(added.succeeded());
/// ```
pub struct DocumentRepository<D, C> {
    collection: C,
    _document: PhantomData<fn() -> D>,
}

impl<D, C: Clone> Clone for DocumentRepository<D, C> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            _document: PhantomData,
        }
    }
}

impl<D, C: std::fmt::Debug> std::fmt::Debug for DocumentRepository<D, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRepository")
            .field("collection", &self.collection)
            .finish()
    }
}

impl<D: Document, C: DocumentCollection<D>> DocumentRepository<D, C> {
    /// Wrap a collection
    pub fn new(collection: C) -> Self {
        Self {
            collection,
            _document: PhantomData,
        }
    }

    /// The wrapped collection
    pub fn collection(&self) -> &C {
        &self.collection
    }

    fn by_id(id: &D::Key) -> Filter {
        Filter::from(FilterCondition::eq(fields::ID, id.to_filter_value()))
    }

    fn guard_id(id: &D::Key, operation: RepositoryOperation) -> Option<RepositoryError> {
        Guard::against_blank(id, format_args!("{} id must not be blank", D::ENTITY), |message| {
            RepositoryError::missing_argument(operation, message)
        })
    }

    fn guard_document(document: &D, operation: RepositoryOperation) -> Option<RepositoryError> {
        Guard::against_blank(
            document.id(),
            format_args!("{} must be provided with an id", D::ENTITY),
            |message| RepositoryError::missing_argument(operation, message),
        )
    }
}

impl<D: Document, C: DocumentCollection<D>> Repository<D> for DocumentRepository<D, C> {
    type Collection = C;

    fn all(&self, with_deleted: bool) -> Query<'_, D, C> {
        debug!(
            collection = self.collection.name(),
            with_deleted, "Building query"
        );
        Query::new(&self.collection, with_deleted)
    }

    async fn find(&self, id: &D::Key, with_deleted: bool) -> RepositoryResult<RepositoryOutcome<D>> {
        if let Some(failure) = Self::guard_id(id, RepositoryOperation::Find) {
            return Ok(DataOutcome::fail(failure));
        }

        debug!(
            collection = self.collection.name(),
            id = %id,
            with_deleted,
            "Finding document"
        );

        let mut filter = Self::by_id(id);
        if !with_deleted {
            filter = filter.and(FilterCondition::eq(fields::IS_DELETED, false));
        }
        let options = FindOptions::new(filter).paginate(Pagination::first_page(1));

        let found = self.collection.find(&options).await?;
        Ok(match found.into_iter().next() {
            Some(document) => DataOutcome::ok(document),
            None => DataOutcome::fail(RepositoryError::not_found(
                RepositoryOperation::Find,
                D::ENTITY,
                id.to_string(),
            )),
        })
    }

    async fn add(&self, mut document: D) -> RepositoryResult<RepositoryOutcome<D>> {
        if let Some(failure) = Self::guard_document(&document, RepositoryOperation::Add) {
            return Ok(DataOutcome::fail(failure));
        }

        debug!(
            collection = self.collection.name(),
            id = %document.id(),
            "Adding document"
        );

        document.mark_created(Utc::now());
        self.collection.insert_one(&document).await?;
        Ok(DataOutcome::ok(document))
    }

    async fn add_range(&self, mut documents: Vec<D>) -> RepositoryResult<Outcome<RepositoryError>> {
        let guarded = Guard::against_empty(
            &documents,
            format_args!("at least one {} must be provided", D::ENTITY),
            |message| RepositoryError::missing_argument(RepositoryOperation::AddRange, message),
        )
        .or_else(|| {
            documents
                .iter()
                .find_map(|document| Self::guard_document(document, RepositoryOperation::AddRange))
        });
        if let Some(failure) = guarded {
            return Ok(Outcome::fail(failure));
        }

        debug!(
            collection = self.collection.name(),
            count = documents.len(),
            "Adding documents"
        );

        let now = Utc::now();
        for document in &mut documents {
            document.mark_created(now);
        }
        self.collection.insert_many(&documents).await?;
        Ok(Outcome::ok())
    }

    async fn update(
        &self,
        id: &D::Key,
        mut document: D,
    ) -> RepositoryResult<RepositoryOutcome<ReplaceResult>> {
        let guarded = Self::guard_id(id, RepositoryOperation::Update)
            .or_else(|| Self::guard_document(&document, RepositoryOperation::Update));
        if let Some(failure) = guarded {
            return Ok(DataOutcome::fail(failure));
        }

        // Mismatched ids are a no-op success, not a failure.
        if id != document.id() {
            warn!(
                collection = self.collection.name(),
                id = %id,
                document_id = %document.id(),
                "Update skipped: id does not match the document id"
            );
            return Ok(DataOutcome::ok(ReplaceResult::default()));
        }

        debug!(
            collection = self.collection.name(),
            id = %id,
            "Replacing document"
        );

        document.mark_modified(Utc::now());
        let replaced = self
            .collection
            .replace_one(&Self::by_id(id), &document)
            .await?;
        Ok(DataOutcome::ok(replaced))
    }

    async fn delete(&self, id: &D::Key) -> RepositoryResult<RepositoryOutcome<UpdateResult>> {
        if let Some(failure) = Self::guard_id(id, RepositoryOperation::Delete) {
            return Ok(DataOutcome::fail(failure));
        }

        debug!(
            collection = self.collection.name(),
            id = %id,
            "Soft deleting document"
        );

        let update = UpdateDefinition::new()
            .set(fields::IS_DELETED, true)
            .set(fields::DELETED_ON, Utc::now());
        let updated = self.collection.update_one(&Self::by_id(id), &update).await?;
        Ok(DataOutcome::ok(updated))
    }

    async fn undelete(&self, id: &D::Key) -> RepositoryResult<RepositoryOutcome<D>> {
        if let Some(failure) = Self::guard_id(id, RepositoryOperation::Undelete) {
            return Ok(DataOutcome::fail(failure));
        }

        debug!(
            collection = self.collection.name(),
            id = %id,
            "Restoring document"
        );

        let update = UpdateDefinition::new()
            .set(fields::IS_DELETED, false)
            .unset(fields::DELETED_ON);
        let restored = self
            .collection
            .find_one_and_update(&Self::by_id(id), &update)
            .await?;

        Ok(match restored {
            Some(document) => DataOutcome::ok(document),
            None => DataOutcome::fail(RepositoryError::not_found(
                RepositoryOperation::Undelete,
                D::ENTITY,
                id.to_string(),
            )),
        })
    }

    async fn hard_delete(&self, id: &D::Key) -> RepositoryResult<RepositoryOutcome<DeleteResult>> {
        if let Some(failure) = Self::guard_id(id, RepositoryOperation::HardDelete) {
            return Ok(DataOutcome::fail(failure));
        }

        debug!(
            collection = self.collection.name(),
            id = %id,
            "Removing document"
        );

        let removed = self.collection.delete_one(&Self::by_id(id)).await?;
        Ok(DataOutcome::ok(removed))
    }
}
