//! The storage seam under the generic repository
//!
//! [`DocumentCollection`] is the narrow set of collection calls the repository
//! needs. It mirrors a MongoDB collection closely enough that the MongoDB backend
//! is a thin translation, while the in-memory backend can evaluate the same calls
//! directly for tests.
//!
//! Methods use RPITIT (return-position `impl Trait` in traits) so implementors
//! can write plain `async fn`.
//!
//! Every method reports storage faults through [`RepositoryResult`]; "nothing
//! matched" is never an error at this level and shows up in the result counts.

use std::future::Future;

use super::filter::{Filter, FindOptions, UpdateDefinition};
use super::RepositoryResult;
use crate::document::Document;

/// Effect of a whole-document replacement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceResult {
    /// Documents that matched the filter
    pub matched_count: u64,
    /// Documents actually changed
    pub modified_count: u64,
}

/// Effect of a partial update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Documents that matched the filter
    pub matched_count: u64,
    /// Documents actually changed
    pub modified_count: u64,
}

/// Effect of a removal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteResult {
    /// Documents removed
    pub deleted_count: u64,
}

/// A named collection of `D` documents
///
/// # Example
///
/// ```rust,ignore
/// use recipes_core::repository::{DocumentCollection, Filter, FilterCondition, FindOptions};
///
/// let filter = Filter::from(FilterCondition::eq("isDeleted", false));
/// let live = collection.find(&FindOptions::new(filter.clone())).await?;
/// assert_eq!(live.len() as u64, collection.count(&filter).await?);
/// ```
pub trait DocumentCollection<D: Document>: Send + Sync {
    /// Collection name, used in logs and fault context
    fn name(&self) -> &str;

    /// Documents matching `options.filter`, sorted and windowed
    fn find(&self, options: &FindOptions) -> impl Future<Output = RepositoryResult<Vec<D>>> + Send;

    /// Number of documents matching `filter`
    fn count(&self, filter: &Filter) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Insert one document; a duplicate `_id` is a `DuplicateKey` fault
    fn insert_one(&self, document: &D) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Insert a batch of documents
    fn insert_many(&self, documents: &[D]) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Replace the first document matching `filter` with `document`
    fn replace_one(
        &self,
        filter: &Filter,
        document: &D,
    ) -> impl Future<Output = RepositoryResult<ReplaceResult>> + Send;

    /// Apply `update` to the first document matching `filter`
    fn update_one(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
    ) -> impl Future<Output = RepositoryResult<UpdateResult>> + Send;

    /// Apply `update` to the first match and return it as it is after the update
    fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
    ) -> impl Future<Output = RepositoryResult<Option<D>>> + Send;

    /// Remove the first document matching `filter`
    fn delete_one(&self, filter: &Filter)
        -> impl Future<Output = RepositoryResult<DeleteResult>> + Send;
}
