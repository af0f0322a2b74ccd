//! MongoDB collection backend
//!
//! Translates [`Filter`], [`FindOptions`] and [`UpdateDefinition`] into BSON and
//! forwards each call to a `mongodb::Collection<D>`.

use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document as BsonDocument};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use super::collection::{DeleteResult, DocumentCollection, ReplaceResult, UpdateResult};
use super::filter::{
    like_tokens, FieldUpdate, Filter, FilterCondition, FilterOperator, FilterValue, FindOptions,
    LikeToken, OrderDirection, UpdateDefinition,
};
use super::RepositoryResult;
use crate::document::{format_timestamp, Document};
use crate::error::{StorageError, StorageOperation};

/// A [`DocumentCollection`] backed by a MongoDB collection
pub struct MongoCollection<D: Send + Sync> {
    inner: Collection<D>,
}

impl<D: Send + Sync> std::fmt::Debug for MongoCollection<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoCollection")
            .field("name", &self.inner.name())
            .finish()
    }
}

impl<D: Send + Sync> Clone for MongoCollection<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D: Document + Unpin> MongoCollection<D> {
    /// The collection called `name` in `database`
    pub fn new(database: &Database, name: &str) -> Self {
        Self {
            inner: database.collection(name),
        }
    }

    /// Wrap an existing driver handle
    pub fn from_collection(inner: Collection<D>) -> Self {
        Self { inner }
    }

    /// The underlying driver handle
    pub fn inner(&self) -> &Collection<D> {
        &self.inner
    }

    fn fault(&self, operation: StorageOperation) -> impl FnOnce(mongodb::error::Error) -> StorageError + '_ {
        move |err| {
            StorageError::from(err)
                .with_operation(operation)
                .add_context(self.inner.name().to_string())
        }
    }
}

impl<D: Document + Unpin> DocumentCollection<D> for MongoCollection<D> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn find(&self, options: &FindOptions) -> RepositoryResult<Vec<D>> {
        let mut find = self.inner.find(filter_document(&options.filter));
        if !options.sort.is_empty() {
            find = find.sort(sort_document(&options.sort));
        }
        if let Some(page) = options.pagination {
            find = find
                .skip(page.offset)
                .limit(i64::try_from(page.limit).unwrap_or(i64::MAX));
        }

        let cursor = find.await.map_err(self.fault(StorageOperation::Find))?;
        cursor
            .try_collect()
            .await
            .map_err(self.fault(StorageOperation::Find))
    }

    async fn count(&self, filter: &Filter) -> RepositoryResult<u64> {
        self.inner
            .count_documents(filter_document(filter))
            .await
            .map_err(self.fault(StorageOperation::Count))
    }

    async fn insert_one(&self, document: &D) -> RepositoryResult<()> {
        self.inner
            .insert_one(document)
            .await
            .map_err(self.fault(StorageOperation::Insert))?;
        Ok(())
    }

    async fn insert_many(&self, documents: &[D]) -> RepositoryResult<()> {
        self.inner
            .insert_many(documents)
            .await
            .map_err(self.fault(StorageOperation::Insert))?;
        Ok(())
    }

    async fn replace_one(&self, filter: &Filter, document: &D) -> RepositoryResult<ReplaceResult> {
        let result = self
            .inner
            .replace_one(filter_document(filter), document)
            .await
            .map_err(self.fault(StorageOperation::Replace))?;
        Ok(ReplaceResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn update_one(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
    ) -> RepositoryResult<UpdateResult> {
        let result = self
            .inner
            .update_one(filter_document(filter), update_document(update))
            .await
            .map_err(self.fault(StorageOperation::Update))?;
        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
    ) -> RepositoryResult<Option<D>> {
        self.inner
            .find_one_and_update(filter_document(filter), update_document(update))
            .return_document(ReturnDocument::After)
            .await
            .map_err(self.fault(StorageOperation::Update))
    }

    async fn delete_one(&self, filter: &Filter) -> RepositoryResult<DeleteResult> {
        let result = self
            .inner
            .delete_one(filter_document(filter))
            .await
            .map_err(self.fault(StorageOperation::Delete))?;
        Ok(DeleteResult {
            deleted_count: result.deleted_count,
        })
    }
}

fn to_bson(value: &FilterValue) -> Bson {
    match value {
        FilterValue::String(s) => Bson::String(s.clone()),
        FilterValue::Integer(n) => Bson::Int64(*n),
        FilterValue::Float(n) => Bson::Double(*n),
        FilterValue::Boolean(b) => Bson::Boolean(*b),
        // Same fixed-width form the audit fields are stored in
        FilterValue::DateTime(at) => Bson::String(format_timestamp(at)),
        FilterValue::StringList(list) => Bson::Array(list.iter().cloned().map(Bson::String).collect()),
        FilterValue::IntegerList(list) => Bson::Array(list.iter().copied().map(Bson::Int64).collect()),
        FilterValue::Null => Bson::Null,
    }
}

/// Anchored regex for a `%` / `_` pattern; matched with the `i` option
fn like_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 2);
    regex.push('^');
    for token in like_tokens(pattern) {
        match token {
            LikeToken::AnyRun => regex.push_str(".*"),
            LikeToken::AnyChar => regex.push('.'),
            LikeToken::Literal(
                c @ ('\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'),
            ) => {
                regex.push('\\');
                regex.push(c);
            }
            LikeToken::Literal(c) => regex.push(c),
        }
    }
    regex.push('$');
    regex
}

fn condition_document(condition: &FilterCondition) -> BsonDocument {
    let field = condition.field.as_str();
    let value = to_bson(&condition.value);
    match condition.operator {
        FilterOperator::Equal => doc! { field: { "$eq": value } },
        FilterOperator::NotEqual => doc! { field: { "$ne": value } },
        FilterOperator::GreaterThan => doc! { field: { "$gt": value } },
        FilterOperator::GreaterThanOrEqual => doc! { field: { "$gte": value } },
        FilterOperator::LessThan => doc! { field: { "$lt": value } },
        FilterOperator::LessThanOrEqual => doc! { field: { "$lte": value } },
        FilterOperator::Like => match &condition.value {
            FilterValue::String(pattern) => {
                doc! { field: { "$regex": like_to_regex(pattern), "$options": "i" } }
            }
            _ => doc! { field: { "$eq": value } },
        },
        FilterOperator::In => match value {
            Bson::Array(values) => doc! { field: { "$in": values } },
            single => doc! { field: { "$in": [single] } },
        },
        FilterOperator::IsNull => doc! { field: Bson::Null },
        FilterOperator::IsNotNull => doc! { field: { "$ne": Bson::Null } },
    }
}

/// `{}` for the empty filter, otherwise `{"$and": [...]}`
pub(crate) fn filter_document(filter: &Filter) -> BsonDocument {
    if filter.is_empty() {
        return BsonDocument::new();
    }
    let clauses: Vec<Bson> = filter
        .conditions
        .iter()
        .map(|condition| Bson::Document(condition_document(condition)))
        .collect();
    doc! { "$and": clauses }
}

pub(crate) fn sort_document(sort: &[(String, OrderDirection)]) -> BsonDocument {
    sort.iter()
        .map(|(field, direction)| {
            let order = match direction {
                OrderDirection::Ascending => 1,
                OrderDirection::Descending => -1,
            };
            (field.clone(), Bson::Int32(order))
        })
        .collect()
}

pub(crate) fn update_document(update: &UpdateDefinition) -> BsonDocument {
    let mut set = BsonDocument::new();
    let mut unset = BsonDocument::new();
    for change in &update.changes {
        match change {
            FieldUpdate::Set { field, value } => {
                set.insert(field.clone(), to_bson(value));
            }
            FieldUpdate::Unset { field } => {
                unset.insert(field.clone(), "");
            }
        }
    }

    let mut document = BsonDocument::new();
    if !set.is_empty() {
        document.insert("$set", set);
    }
    if !unset.is_empty() {
        document.insert("$unset", unset);
    }
    document
}
