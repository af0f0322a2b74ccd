//! Persisted document contract
//!
//! A document is anything the generic repository can store: it has a unique key,
//! audit timestamps, and a soft-delete flag. These are expressed as capability
//! traits rather than a base type:
//!
//! - [`DocumentKey`]: what a primary key must support
//! - [`Auditable`]: `createdOn` / `modifiedOn` stamping
//! - [`SoftDeletable`]: the `isDeleted` / `deletedOn` pair
//! - [`Document`]: ties them together with serialization
//!
//! Concrete documents embed [`AuditFields`] with `#[serde(flatten)]` and point the
//! two audit traits at it.
//!
//! # Example
//!
//! ```rust
//! use recipes_core::document::{AuditFields, Auditable, Document, SoftDeletable};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Note {
//!     #[serde(rename = "_id")]
//!     id: String,
//!     text: String,
//!     #[serde(flatten)]
//!     audit: AuditFields,
//! }
//!
//! impl Auditable for Note {
//!     fn audit(&self) -> &AuditFields { &self.audit }
//!     fn audit_mut(&mut self) -> &mut AuditFields { &mut self.audit }
//! }
//!
//! impl SoftDeletable for Note {}
//!
//! impl Document for Note {
//!     type Key = String;
//!     const ENTITY: &'static str = "Note";
//!     fn id(&self) -> &String { &self.id }
//! }
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::ids::{IdKind, TypedId};
use crate::repository::FilterValue;

/// Persisted field names shared by every document
pub mod fields {
    /// Primary key
    pub const ID: &str = "_id";
    /// Insertion timestamp
    pub const CREATED_ON: &str = "createdOn";
    /// Last replacement timestamp
    pub const MODIFIED_ON: &str = "modifiedOn";
    /// Soft-delete flag
    pub const IS_DELETED: &str = "isDeleted";
    /// Soft-delete timestamp
    pub const DELETED_ON: &str = "deletedOn";
}

/// A document primary key
///
/// Keys are compared for equality and turned into filter values. A key may have
/// a "blank" state (an empty string, for instance) that guards reject before any
/// storage call.
pub trait DocumentKey: Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The value used to match this key in a filter
    fn to_filter_value(&self) -> FilterValue;

    /// Whether this key stands for "no key"
    fn is_blank(&self) -> bool {
        false
    }
}

impl DocumentKey for String {
    fn to_filter_value(&self) -> FilterValue {
        FilterValue::String(self.clone())
    }

    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl DocumentKey for i64 {
    fn to_filter_value(&self) -> FilterValue {
        FilterValue::Integer(*self)
    }
}

impl<K: IdKind> DocumentKey for TypedId<K> {
    fn to_filter_value(&self) -> FilterValue {
        FilterValue::String(self.as_str().to_string())
    }
}

/// Audit and soft-delete state embedded in every document
///
/// Invariant (by convention): `is_deleted` is `true` exactly when `deleted_on`
/// is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    /// Set when the document is added
    #[serde(with = "timestamp")]
    pub created_on: DateTime<Utc>,

    /// Set every time the document is replaced
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::optional")]
    pub modified_on: Option<DateTime<Utc>>,

    /// Soft-delete flag
    #[serde(default)]
    pub is_deleted: bool,

    /// Set when the document is soft-deleted
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::optional")]
    pub deleted_on: Option<DateTime<Utc>>,
}

/// RFC 3339 rendering of a stored timestamp
///
/// Always nanosecond precision with a `Z` suffix, so every rendering has the
/// same width and string order matches time order. Filter values compared
/// against stored timestamps must be rendered the same way.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }

    pub mod optional {
        use super::*;

        pub fn serialize<S: Serializer>(
            at: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match at {
                Some(at) => serializer.serialize_some(&format_timestamp(at)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<DateTime<Utc>>::deserialize(deserializer)
        }
    }
}

impl AuditFields {
    /// Fresh audit state for a document that has not been stored yet
    #[must_use]
    pub fn new() -> Self {
        Self {
            created_on: Utc::now(),
            modified_on: None,
            is_deleted: false,
            deleted_on: None,
        }
    }
}

impl Default for AuditFields {
    fn default() -> Self {
        Self::new()
    }
}

/// Documents that record when they were created and last modified
pub trait Auditable {
    /// Borrow the embedded audit state
    fn audit(&self) -> &AuditFields;

    /// Mutably borrow the embedded audit state
    fn audit_mut(&mut self) -> &mut AuditFields;

    /// When the document was added
    fn created_on(&self) -> DateTime<Utc> {
        self.audit().created_on
    }

    /// When the document was last replaced
    fn modified_on(&self) -> Option<DateTime<Utc>> {
        self.audit().modified_on
    }

    /// Stamp the insertion time
    fn mark_created(&mut self, at: DateTime<Utc>) {
        self.audit_mut().created_on = at;
    }

    /// Stamp the replacement time
    fn mark_modified(&mut self, at: DateTime<Utc>) {
        self.audit_mut().modified_on = Some(at);
    }
}

/// Documents that can be hidden without being removed
pub trait SoftDeletable: Auditable {
    /// Whether the document is soft-deleted
    fn is_deleted(&self) -> bool {
        self.audit().is_deleted
    }

    /// When the document was soft-deleted
    fn deleted_on(&self) -> Option<DateTime<Utc>> {
        self.audit().deleted_on
    }

    /// Flag the document deleted at `at`
    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        let audit = self.audit_mut();
        audit.is_deleted = true;
        audit.deleted_on = Some(at);
    }

    /// Clear the deleted flag and timestamp
    fn mark_restored(&mut self) {
        let audit = self.audit_mut();
        audit.is_deleted = false;
        audit.deleted_on = None;
    }
}

/// A document the generic repository can store
pub trait Document: SoftDeletable + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Primary key type
    type Key: DocumentKey;

    /// Human-readable entity name used in failures and logs (e.g., "Recipe")
    const ENTITY: &'static str;

    /// The document's primary key
    fn id(&self) -> &Self::Key;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Note {
        #[serde(rename = "_id")]
        id: String,
        text: String,
        #[serde(flatten)]
        audit: AuditFields,
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

    fn note() -> Note {
        Note {
            id: "n1".to_string(),
            text: "hello".to_string(),
            audit: AuditFields::new(),
        }
    }

    #[test]
    fn test_string_key_blank() {
        assert!(String::new().is_blank());
        assert!(" \t".to_string().is_blank());
        assert!(!"n1".to_string().is_blank());
    }

    #[test]
    fn test_typed_id_key_filter_value() {
        let id = crate::ids::RecipeId::new();
        assert_eq!(id.to_filter_value(), FilterValue::String(id.as_str().to_string()));
        assert!(!id.is_blank());
    }

    #[test]
    fn test_integer_key() {
        assert_eq!(7_i64.to_filter_value(), FilterValue::Integer(7));
        assert!(!0_i64.is_blank());
    }

    #[test]
    fn test_soft_delete_flag_and_timestamp_move_together() {
        let mut note = note();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        note.mark_deleted(at);
        assert!(note.is_deleted());
        assert_eq!(note.deleted_on(), Some(at));

        note.mark_restored();
        assert!(!note.is_deleted());
        assert!(note.deleted_on().is_none());
    }

    #[test]
    fn test_persisted_shape() {
        let mut note = note();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        note.mark_created(at);

        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value[fields::ID], "n1");
        assert_eq!(value[fields::IS_DELETED], false);
        assert!(value.get(fields::CREATED_ON).is_some());
        assert!(value.get(fields::MODIFIED_ON).is_none());
        assert!(value.get(fields::DELETED_ON).is_none());

        note.mark_modified(at);
        let value = serde_json::to_value(&note).unwrap();
        assert!(value.get(fields::MODIFIED_ON).is_some());
    }

    #[test]
    fn test_missing_soft_delete_fields_default() {
        let note: Note = serde_json::from_value(serde_json::json!({
            "_id": "n2",
            "text": "legacy",
            "createdOn": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert!(!note.is_deleted());
        assert!(note.modified_on().is_none());
    }

    #[test]
    fn test_stored_timestamps_sort_as_strings() {
        let whole = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 20).unwrap();
        let fraction = whole + chrono::Duration::milliseconds(500);

        let mut early = note();
        early.mark_created(whole);
        let mut late = note();
        late.mark_created(fraction);

        let early = serde_json::to_value(&early).unwrap()[fields::CREATED_ON].clone();
        let late = serde_json::to_value(&late).unwrap()[fields::CREATED_ON].clone();
        let (early, late) = (early.as_str().unwrap(), late.as_str().unwrap());

        assert_eq!(early, "2024-05-01T12:00:20.000000000Z");
        assert_eq!(early.len(), late.len());
        assert!(early < late);
        assert_eq!(format_timestamp(&fraction), late);
    }

    #[test]
    fn test_optional_timestamps_round_trip() {
        let mut note = note();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        note.mark_deleted(at);

        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value[fields::DELETED_ON], "2024-05-01T12:00:00.000000000Z");

        let back: Note = serde_json::from_value(value).unwrap();
        assert_eq!(back.audit.deleted_on, Some(at));
    }
}
