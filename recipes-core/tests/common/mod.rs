//! Shared test utilities for recipes-core integration tests.
//!
//! Provides a string-keyed `Note` document (so blank ids can be expressed), a
//! `CountingCollection` that records how many storage calls were made, and a
//! `FailingCollection` whose every call is a storage fault.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use recipes_core::document::{AuditFields, Auditable, Document, SoftDeletable};
use recipes_core::error::StorageError;
use recipes_core::repository::{
    DeleteResult, DocumentCollection, Filter, FindOptions, MemoryCollection, ReplaceResult,
    RepositoryResult, UpdateDefinition, UpdateResult,
};
use serde::{Deserialize, Serialize};

/// Minimal document keyed by a plain string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Note {
    pub fn new(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            audit: AuditFields::new(),
        }
    }
}

impl Auditable for Note {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

impl SoftDeletable for Note {}

impl Document for Note {
    type Key = String;
    const ENTITY: &'static str = "Note";

    fn id(&self) -> &String {
        &self.id
    }
}

/// In-memory collection that counts every call made against it
#[derive(Debug, Clone)]
pub struct CountingCollection<D> {
    inner: MemoryCollection<D>,
    calls: Arc<AtomicUsize>,
}

impl<D: Document> CountingCollection<D> {
    pub fn new(name: &str) -> Self {
        Self {
            inner: MemoryCollection::new(name),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl<D: Document> DocumentCollection<D> for CountingCollection<D> {
    fn name(&self) -> &str {
        DocumentCollection::<D>::name(&self.inner)
    }

    async fn find(&self, options: &FindOptions) -> RepositoryResult<Vec<D>> {
        self.record();
        self.inner.find(options).await
    }

    async fn count(&self, filter: &Filter) -> RepositoryResult<u64> {
        self.record();
        self.inner.count(filter).await
    }

    async fn insert_one(&self, document: &D) -> RepositoryResult<()> {
        self.record();
        self.inner.insert_one(document).await
    }

    async fn insert_many(&self, documents: &[D]) -> RepositoryResult<()> {
        self.record();
        self.inner.insert_many(documents).await
    }

    async fn replace_one(&self, filter: &Filter, document: &D) -> RepositoryResult<ReplaceResult> {
        self.record();
        self.inner.replace_one(filter, document).await
    }

    async fn update_one(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
    ) -> RepositoryResult<UpdateResult> {
        self.record();
        self.inner.update_one(filter, update).await
    }

    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
    ) -> RepositoryResult<Option<D>> {
        self.record();
        self.inner.find_one_and_update(filter, update).await
    }

    async fn delete_one(&self, filter: &Filter) -> RepositoryResult<DeleteResult> {
        self.record();
        self.inner.delete_one(filter).await
    }
}

/// Collection whose storage is unreachable
#[derive(Debug, Clone, Default)]
pub struct FailingCollection;

fn unreachable_store<T>() -> RepositoryResult<T> {
    Err(StorageError::connection_failed("connection refused"))
}

impl<D: Document> DocumentCollection<D> for FailingCollection {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn find(&self, _options: &FindOptions) -> RepositoryResult<Vec<D>> {
        unreachable_store()
    }

    async fn count(&self, _filter: &Filter) -> RepositoryResult<u64> {
        unreachable_store()
    }

    async fn insert_one(&self, _document: &D) -> RepositoryResult<()> {
        unreachable_store()
    }

    async fn insert_many(&self, _documents: &[D]) -> RepositoryResult<()> {
        unreachable_store()
    }

    async fn replace_one(&self, _filter: &Filter, _document: &D) -> RepositoryResult<ReplaceResult> {
        unreachable_store()
    }

    async fn update_one(
        &self,
        _filter: &Filter,
        _update: &UpdateDefinition,
    ) -> RepositoryResult<UpdateResult> {
        unreachable_store()
    }

    async fn find_one_and_update(
        &self,
        _filter: &Filter,
        _update: &UpdateDefinition,
    ) -> RepositoryResult<Option<D>> {
        unreachable_store()
    }

    async fn delete_one(&self, _filter: &Filter) -> RepositoryResult<DeleteResult> {
        unreachable_store()
    }
}
