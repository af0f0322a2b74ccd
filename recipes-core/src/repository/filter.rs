//! Filters, ordering, pagination and update definitions for collection calls
//!
//! These types describe *what* a collection should match or change without
//! committing to a storage dialect. Each backend translates them: the in-memory
//! collection evaluates them directly, the MongoDB collection renders BSON.
//!
//! # Example
//!
//! ```rust
//! use recipes_core::repository::{Filter, FilterCondition, FindOptions, OrderDirection, Pagination};
//!
//! let options = FindOptions::new(
//!     Filter::new()
//!         .and(FilterCondition::eq("isDeleted", false))
//!         .and(FilterCondition::like("title", "%cream%")),
//! )
//! .sort_by("createdOn", OrderDirection::Descending)
//! .paginate(Pagination::page(2, 10));
//!
//! assert_eq!(options.filter.conditions.len(), 2);
//! assert_eq!(options.pagination.map(|p| p.offset), Some(10));
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Offset/limit window over a result set
///
/// # Example
///
/// ```rust
/// use recipes_core::repository::Pagination;
///
/// let third = Pagination::page(3, 20);
/// assert_eq!(third.offset, 40);
/// assert_eq!(third.limit, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of documents to skip
    pub offset: u64,
    /// Maximum number of documents to return
    pub limit: u64,
}

impl Pagination {
    /// Skip `offset` documents and take at most `limit`
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// The first `limit` documents
    #[must_use]
    pub const fn first_page(limit: u64) -> Self {
        Self { offset: 0, limit }
    }

    /// A 1-indexed page; page 0 is treated as page 1
    #[must_use]
    pub const fn page(page_number: u64, page_size: u64) -> Self {
        Self {
            offset: page_number.saturating_sub(1).saturating_mul(page_size),
            limit: page_size,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first_page(20)
    }
}

/// Comparison applied by a [`FilterCondition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Field equals value
    Equal,
    /// Field differs from value (a missing field differs from everything)
    NotEqual,
    /// Field is greater than value
    GreaterThan,
    /// Field is greater than or equal to value
    GreaterThanOrEqual,
    /// Field is less than value
    LessThan,
    /// Field is less than or equal to value
    LessThanOrEqual,
    /// Case-insensitive pattern match; `%` matches any run, `_` one character
    /// and `\` makes the next character literal
    Like,
    /// Field equals one of the listed values
    In,
    /// Field is missing or null
    IsNull,
    /// Field is present and not null
    IsNotNull,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "$eq"),
            Self::NotEqual => write!(f, "$ne"),
            Self::GreaterThan => write!(f, "$gt"),
            Self::GreaterThanOrEqual => write!(f, "$gte"),
            Self::LessThan => write!(f, "$lt"),
            Self::LessThanOrEqual => write!(f, "$lte"),
            Self::Like => write!(f, "$regex"),
            Self::In => write!(f, "$in"),
            Self::IsNull => write!(f, "$null"),
            Self::IsNotNull => write!(f, "$notNull"),
        }
    }
}

/// A scalar or list value used in filters and updates
///
/// Serializes to the plain value (untagged), which is how it is written into
/// stored documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// String value
    String(String),
    /// 64-bit integer value
    Integer(i64),
    /// 64-bit floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// UTC timestamp
    DateTime(DateTime<Utc>),
    /// List of strings (for `In`)
    StringList(Vec<String>),
    /// List of integers (for `In`)
    IntegerList(Vec<i64>),
    /// Null
    Null,
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(at: DateTime<Utc>) -> Self {
        Self::DateTime(at)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(list: Vec<String>) -> Self {
        Self::StringList(list)
    }
}

impl From<Vec<i64>> for FilterValue {
    fn from(list: Vec<i64>) -> Self {
        Self::IntegerList(list)
    }
}

/// One `field <operator> value` test; `field` may be a dotted path
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// Field path to test
    pub field: String,
    /// Comparison to apply
    pub operator: FilterOperator,
    /// Right-hand side of the comparison
    pub value: FilterValue,
}

impl FilterCondition {
    /// Build a condition from its parts
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// `field == value`
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Equal, value.into())
    }

    /// `field != value`
    pub fn ne(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::NotEqual, value.into())
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::GreaterThan, value.into())
    }

    /// `field >= value`
    pub fn gte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::GreaterThanOrEqual, value.into())
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::LessThan, value.into())
    }

    /// `field <= value`
    pub fn lte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::LessThanOrEqual, value.into())
    }

    /// Case-insensitive pattern match, e.g. `like("title", "%cream%")`
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Like, FilterValue::String(pattern.into()))
    }

    /// Case-insensitive substring match; `term` is taken literally
    pub fn contains(field: impl Into<String>, term: &str) -> Self {
        Self::like(field, format!("%{}%", escape_like(term)))
    }

    /// `field` equals one of `values`
    pub fn in_list(field: impl Into<String>, values: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::In, values.into())
    }

    /// `field` is missing or null
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNull, FilterValue::Null)
    }

    /// `field` is present and not null
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNotNull, FilterValue::Null)
    }
}

/// Escape character for [`FilterOperator::Like`] patterns
pub const LIKE_ESCAPE: char = '\\';

/// Escape `term` so every character matches itself inside a LIKE pattern
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// One element of a parsed LIKE pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LikeToken {
    /// `%`
    AnyRun,
    /// `_`
    AnyChar,
    Literal(char),
}

/// Split a LIKE pattern into tokens; a trailing escape is a literal
pub(crate) fn like_tokens(pattern: &str) -> Vec<LikeToken> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => LikeToken::AnyRun,
            '_' => LikeToken::AnyChar,
            LIKE_ESCAPE => LikeToken::Literal(chars.next().unwrap_or(LIKE_ESCAPE)),
            c => LikeToken::Literal(c),
        });
    }
    tokens
}

/// A conjunction of conditions; the empty filter matches every document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// Conditions that must all hold
    pub conditions: Vec<FilterCondition>,
}

impl Filter {
    /// The match-everything filter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition
    #[must_use]
    pub fn and(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Whether the filter has no conditions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl From<FilterCondition> for Filter {
    fn from(condition: FilterCondition) -> Self {
        Self {
            conditions: vec![condition],
        }
    }
}

impl From<Vec<FilterCondition>> for Filter {
    fn from(conditions: Vec<FilterCondition>) -> Self {
        Self { conditions }
    }
}

/// Everything a collection needs to answer a `find`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Which documents to match
    pub filter: Filter,
    /// Sort keys, applied in order
    pub sort: Vec<(String, OrderDirection)>,
    /// Window over the sorted matches
    pub pagination: Option<Pagination>,
}

impl FindOptions {
    /// Match `filter` with natural order and no window
    #[must_use]
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            sort: Vec::new(),
            pagination: None,
        }
    }

    /// Append a sort key
    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.sort.push((field.into(), direction));
        self
    }

    /// Restrict to a window
    #[must_use]
    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

/// A single field change inside an [`UpdateDefinition`]
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// Assign `value` to `field`
    Set {
        /// Field path
        field: String,
        /// New value
        value: FilterValue,
    },
    /// Remove `field` from the document
    Unset {
        /// Field path
        field: String,
    },
}

/// A partial update: a list of `$set` / `$unset` changes
///
/// # Example
///
/// ```rust
/// use recipes_core::repository::UpdateDefinition;
///
/// let restore = UpdateDefinition::new().set("isDeleted", false).unset("deletedOn");
/// assert_eq!(restore.changes.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateDefinition {
    /// Changes, applied in order
    pub changes: Vec<FieldUpdate>,
}

impl UpdateDefinition {
    /// An update that changes nothing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a field
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.changes.push(FieldUpdate::Set {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Remove a field
    #[must_use]
    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.changes.push(FieldUpdate::Unset {
            field: field.into(),
        });
        self
    }
}
