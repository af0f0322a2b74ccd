//! In-memory collection backend
//!
//! Documents are kept in their serialized JSON form, so filters and updates see
//! exactly the persisted field names (`_id`, `isDeleted`, ...) a MongoDB server
//! would. Used by the test suites and by services running without a database.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::collection::{DeleteResult, DocumentCollection, ReplaceResult, UpdateResult};
use super::filter::{
    like_tokens, FieldUpdate, Filter, FilterCondition, FilterOperator, FilterValue, FindOptions,
    LikeToken, OrderDirection, UpdateDefinition,
};
use super::RepositoryResult;
use crate::document::{fields, format_timestamp, Document};
use crate::error::{StorageError, StorageOperation};

/// A collection held in process memory
///
/// Clones share the same storage.
///
/// # Example
///
/// ```rust,ignore
/// use recipes_core::models::Recipe;
/// use recipes_core::repository::MemoryCollection;
///
/// let recipes = MemoryCollection::<Recipe>::new("recipes");
/// let shared = recipes.clone(); // same documents
/// ```
pub struct MemoryCollection<D> {
    name: String,
    documents: Arc<RwLock<Vec<Value>>>,
    _document: PhantomData<fn() -> D>,
}

impl<D> Clone for MemoryCollection<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            documents: Arc::clone(&self.documents),
            _document: PhantomData,
        }
    }
}

impl<D> std::fmt::Debug for MemoryCollection<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCollection")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<D: Document> MemoryCollection<D> {
    /// An empty collection called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Arc::new(RwLock::new(Vec::new())),
            _document: PhantomData,
        }
    }

    /// The stored documents in their persisted JSON form, in insertion order
    pub async fn snapshot(&self) -> Vec<Value> {
        self.documents.read().await.clone()
    }

    fn to_stored(&self, document: &D, operation: StorageOperation) -> RepositoryResult<Value> {
        let value = serde_json::to_value(document).map_err(|e| self.fault(e.into(), operation))?;
        if !value.is_object() {
            return Err(StorageError::serialization(
                operation,
                "documents must serialize to an object",
            )
            .add_context(self.name.clone()));
        }
        Ok(value)
    }

    fn from_stored(&self, value: &Value, operation: StorageOperation) -> RepositoryResult<D> {
        D::deserialize(value).map_err(|e| self.fault(e.into(), operation))
    }

    fn fault(&self, error: StorageError, operation: StorageOperation) -> StorageError {
        error.with_operation(operation).add_context(self.name.clone())
    }

    fn duplicate(&self, id: &Value) -> StorageError {
        StorageError::duplicate_key(
            StorageOperation::Insert,
            format!("duplicate key error: {} {}", fields::ID, id),
        )
        .add_context(self.name.clone())
    }
}

impl<D: Document> DocumentCollection<D> for MemoryCollection<D> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self, options: &FindOptions) -> RepositoryResult<Vec<D>> {
        let documents = self.documents.read().await;
        let mut matched: Vec<&Value> = documents
            .iter()
            .filter(|doc| matches_filter(doc, &options.filter))
            .collect();

        if !options.sort.is_empty() {
            matched.sort_by(|a, b| compare_documents(a, b, &options.sort));
        }

        let (skip, take) = match options.pagination {
            Some(page) => (to_usize(page.offset), to_usize(page.limit)),
            None => (0, usize::MAX),
        };

        matched
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|doc| self.from_stored(doc, StorageOperation::Find))
            .collect()
    }

    async fn count(&self, filter: &Filter) -> RepositoryResult<u64> {
        let documents = self.documents.read().await;
        let count = documents.iter().filter(|doc| matches_filter(doc, filter)).count();
        Ok(count as u64)
    }

    async fn insert_one(&self, document: &D) -> RepositoryResult<()> {
        let value = self.to_stored(document, StorageOperation::Insert)?;
        let id = value.get(fields::ID).cloned().unwrap_or(Value::Null);

        let mut documents = self.documents.write().await;
        if documents.iter().any(|doc| doc.get(fields::ID) == Some(&id)) {
            return Err(self.duplicate(&id));
        }
        documents.push(value);
        Ok(())
    }

    async fn insert_many(&self, batch: &[D]) -> RepositoryResult<()> {
        let values = batch
            .iter()
            .map(|doc| self.to_stored(doc, StorageOperation::Insert))
            .collect::<RepositoryResult<Vec<_>>>()?;

        let mut documents = self.documents.write().await;
        for (index, value) in values.iter().enumerate() {
            let id = value.get(fields::ID).cloned().unwrap_or(Value::Null);
            let in_store = documents.iter().any(|doc| doc.get(fields::ID) == Some(&id));
            let in_batch = values[..index]
                .iter()
                .any(|earlier| earlier.get(fields::ID) == Some(&id));
            if in_store || in_batch {
                return Err(self.duplicate(&id));
            }
        }
        documents.extend(values);
        Ok(())
    }

    async fn replace_one(&self, filter: &Filter, document: &D) -> RepositoryResult<ReplaceResult> {
        let replacement = self.to_stored(document, StorageOperation::Replace)?;

        let mut documents = self.documents.write().await;
        let Some(slot) = documents.iter_mut().find(|doc| matches_filter(doc, filter)) else {
            return Ok(ReplaceResult::default());
        };

        if slot.get(fields::ID) != replacement.get(fields::ID) {
            return Err(StorageError::query_failed(
                StorageOperation::Replace,
                "the immutable field '_id' was found to have been altered",
            )
            .add_context(self.name.clone()));
        }

        let modified = *slot != replacement;
        *slot = replacement;
        Ok(ReplaceResult {
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn update_one(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
    ) -> RepositoryResult<UpdateResult> {
        let mut documents = self.documents.write().await;
        let Some(slot) = documents.iter_mut().find(|doc| matches_filter(doc, filter)) else {
            return Ok(UpdateResult::default());
        };

        let modified = apply_update(slot, update);
        Ok(UpdateResult {
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &UpdateDefinition,
    ) -> RepositoryResult<Option<D>> {
        let mut documents = self.documents.write().await;
        let Some(slot) = documents.iter_mut().find(|doc| matches_filter(doc, filter)) else {
            return Ok(None);
        };

        apply_update(slot, update);
        self.from_stored(slot, StorageOperation::Update).map(Some)
    }

    async fn delete_one(&self, filter: &Filter) -> RepositoryResult<DeleteResult> {
        let mut documents = self.documents.write().await;
        match documents.iter().position(|doc| matches_filter(doc, filter)) {
            Some(index) => {
                documents.remove(index);
                Ok(DeleteResult { deleted_count: 1 })
            }
            None => Ok(DeleteResult::default()),
        }
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

fn lookup<'v>(document: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(document, |current, segment| current.get(segment))
}

fn to_json(value: &FilterValue) -> Value {
    match value {
        FilterValue::String(s) => Value::String(s.clone()),
        FilterValue::Integer(n) => Value::from(*n),
        FilterValue::Float(n) => Value::from(*n),
        FilterValue::Boolean(b) => Value::Bool(*b),
        FilterValue::DateTime(at) => Value::String(format_timestamp(at)),
        FilterValue::StringList(list) => list.iter().cloned().map(Value::String).collect(),
        FilterValue::IntegerList(list) => list.iter().copied().map(Value::from).collect(),
        FilterValue::Null => Value::Null,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// Ordering between two scalars of the same type; `None` when incomparable
fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => match (parse_timestamp(a), parse_timestamp(b)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => Some(a.cmp(b)),
        },
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    compare_values(left, right) == Some(Ordering::Equal) || left == right
}

/// Equality where an array field matches if any element does
fn field_equals(field: &Value, expected: &Value) -> bool {
    values_equal(field, expected)
        || matches!(field, Value::Array(items) if items.iter().any(|item| values_equal(item, expected)))
}

fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern = like_tokens(&pattern.to_lowercase());

    // matches[j]: text[..i] matches pattern[..j]
    let mut matches = vec![false; pattern.len() + 1];
    matches[0] = true;
    for j in 1..=pattern.len() {
        matches[j] = matches[j - 1] && pattern[j - 1] == LikeToken::AnyRun;
    }

    for &c in &text {
        let mut next = vec![false; pattern.len() + 1];
        for j in 1..=pattern.len() {
            next[j] = match pattern[j - 1] {
                LikeToken::AnyRun => next[j - 1] || matches[j],
                LikeToken::AnyChar => matches[j - 1],
                LikeToken::Literal(p) => matches[j - 1] && p == c,
            };
        }
        matches = next;
    }

    matches[pattern.len()]
}

fn matches_condition(document: &Value, condition: &FilterCondition) -> bool {
    let field = lookup(document, &condition.field);
    let expected = to_json(&condition.value);

    let ordered = |wanted: fn(Ordering) -> bool| {
        field
            .and_then(|value| compare_values(value, &expected))
            .is_some_and(wanted)
    };

    match condition.operator {
        FilterOperator::Equal => field.is_some_and(|value| field_equals(value, &expected)),
        FilterOperator::NotEqual => !field.is_some_and(|value| field_equals(value, &expected)),
        FilterOperator::GreaterThan => ordered(Ordering::is_gt),
        FilterOperator::GreaterThanOrEqual => ordered(Ordering::is_ge),
        FilterOperator::LessThan => ordered(Ordering::is_lt),
        FilterOperator::LessThanOrEqual => ordered(Ordering::is_le),
        FilterOperator::Like => match (field, &condition.value) {
            (Some(Value::String(text)), FilterValue::String(pattern)) => like_match(text, pattern),
            _ => false,
        },
        FilterOperator::In => match (field, &expected) {
            (Some(value), Value::Array(options)) => {
                options.iter().any(|option| field_equals(value, option))
            }
            _ => false,
        },
        FilterOperator::IsNull => field.map_or(true, Value::is_null),
        FilterOperator::IsNotNull => field.is_some_and(|value| !value.is_null()),
    }
}

fn matches_filter(document: &Value, filter: &Filter) -> bool {
    filter
        .conditions
        .iter()
        .all(|condition| matches_condition(document, condition))
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_documents(left: &Value, right: &Value, sort: &[(String, OrderDirection)]) -> Ordering {
    sort.iter()
        .map(|(field, direction)| {
            let a = lookup(left, field);
            let b = lookup(right, field);
            let ordering = type_rank(a).cmp(&type_rank(b)).then_with(|| match (a, b) {
                (Some(a), Some(b)) => compare_values(a, b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            });
            match direction {
                OrderDirection::Ascending => ordering,
                OrderDirection::Descending => ordering.reverse(),
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn set_path(document: &mut Value, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = document;
    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

fn unset_path(document: &mut Value, path: &str) {
    let (parent, last) = match path.rsplit_once('.') {
        Some((parent, last)) => (
            parent
                .split('.')
                .try_fold(&mut *document, |current, segment| current.get_mut(segment)),
            last,
        ),
        None => (Some(document), path),
    };
    if let Some(Value::Object(map)) = parent {
        map.remove(last);
    }
}

/// Apply every change to `document`; returns whether anything changed
fn apply_update(document: &mut Value, update: &UpdateDefinition) -> bool {
    let before = document.clone();
    for change in &update.changes {
        match change {
            FieldUpdate::Set { field, value } => set_path(document, field, to_json(value)),
            FieldUpdate::Unset { field } => unset_path(document, field),
        }
    }
    *document != before
}
