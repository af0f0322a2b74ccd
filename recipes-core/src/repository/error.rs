//! Repository failure types
//!
//! A [`RepositoryError`] is an expected failure: it is returned inside a
//! [`DataOutcome`](crate::outcome::DataOutcome) or [`Outcome`](crate::outcome::Outcome),
//! never through the storage-fault channel.
//!
//! # Example
//!
//! ```rust
//! use recipes_core::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
//!
//! let error = RepositoryError::not_found(RepositoryOperation::Find, "Recipe", "rcp_123");
//! assert!(matches!(error.kind, RepositoryErrorKind::NotFound));
//! assert!(error.entity_id.is_some());
//! ```

use std::fmt;

/// Operation being performed when the repository failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Finding a single document by id
    Find,
    /// Adding one document
    Add,
    /// Adding a batch of documents
    AddRange,
    /// Replacing a document
    Update,
    /// Soft deleting a document
    Delete,
    /// Restoring a soft-deleted document
    Undelete,
    /// Permanently removing a document
    HardDelete,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Find => write!(f, "find"),
            Self::Add => write!(f, "add"),
            Self::AddRange => write!(f, "add_range"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Undelete => write!(f, "undelete"),
            Self::HardDelete => write!(f, "hard_delete"),
        }
    }
}

/// Category of repository failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// A required argument was absent or blank; nothing was sent to storage
    MissingArgument,
    /// No document matched
    NotFound,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgument => write!(f, "missing_argument"),
            Self::NotFound => write!(f, "not_found"),
        }
    }
}

/// Structured repository failure with operation context
///
/// # Example
///
/// ```rust
/// use recipes_core::repository::{RepositoryError, RepositoryOperation};
///
/// let error = RepositoryError::not_found(RepositoryOperation::Find, "Recipe", "rcp_abc");
/// println!("{}", error); // "Repository not_found failure during find: Recipe 'rcp_abc' was not found [Recipe: rcp_abc]"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the failure occurred
    pub operation: RepositoryOperation,
    /// The category of failure
    pub kind: RepositoryErrorKind,
    /// Human-readable message
    pub message: String,
    /// The type of entity involved (e.g., "Recipe", "User")
    pub entity_type: Option<String>,
    /// The id of the entity involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository failure
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "missing argument" failure
    ///
    /// # Example
    ///
    /// ```rust
    /// use recipes_core::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
    ///
    /// let error = RepositoryError::missing_argument(RepositoryOperation::Delete, "id must not be blank");
    /// assert_eq!(error.kind, RepositoryErrorKind::MissingArgument);
    /// ```
    pub fn missing_argument(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::MissingArgument, message)
    }

    /// Create a "not found" failure with entity context
    pub fn not_found(
        operation: RepositoryOperation,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        let entity_type = entity_type.into();
        let entity_id = entity_id.into();
        Self {
            operation,
            kind: RepositoryErrorKind::NotFound,
            message: format!("{} '{}' was not found", entity_type, entity_id),
            entity_type: Some(entity_type),
            entity_id: Some(entity_id),
        }
    }

    /// Add entity context to an existing failure
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Whether this failure means "no such document"
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == RepositoryErrorKind::NotFound
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} failure during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(ref entity_type), Some(ref entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_operation_display() {
        assert_eq!(format!("{}", RepositoryOperation::Find), "find");
        assert_eq!(format!("{}", RepositoryOperation::Add), "add");
        assert_eq!(format!("{}", RepositoryOperation::AddRange), "add_range");
        assert_eq!(format!("{}", RepositoryOperation::Update), "update");
        assert_eq!(format!("{}", RepositoryOperation::Delete), "delete");
        assert_eq!(format!("{}", RepositoryOperation::Undelete), "undelete");
        assert_eq!(format!("{}", RepositoryOperation::HardDelete), "hard_delete");
    }

    #[test]
    fn test_every_operation_names_a_failing_repository_call() {
        // Exhaustive on purpose: a variant no repository call reports must not exist
        let reported_by = |operation: RepositoryOperation| match operation {
            RepositoryOperation::Find => "find",
            RepositoryOperation::Add => "add",
            RepositoryOperation::AddRange => "add_range",
            RepositoryOperation::Update => "update",
            RepositoryOperation::Delete => "delete",
            RepositoryOperation::Undelete => "undelete",
            RepositoryOperation::HardDelete => "hard_delete",
        };
        for operation in [
            RepositoryOperation::Find,
            RepositoryOperation::Add,
            RepositoryOperation::AddRange,
            RepositoryOperation::Update,
            RepositoryOperation::Delete,
            RepositoryOperation::Undelete,
            RepositoryOperation::HardDelete,
        ] {
            assert_eq!(operation.to_string(), reported_by(operation));
        }
    }

    #[test]
    fn test_repository_error_kind_display() {
        assert_eq!(
            format!("{}", RepositoryErrorKind::MissingArgument),
            "missing_argument"
        );
        assert_eq!(format!("{}", RepositoryErrorKind::NotFound), "not_found");
    }

    #[test]
    fn test_missing_argument_convenience() {
        let error = RepositoryError::missing_argument(RepositoryOperation::Add, "id is blank");
        assert_eq!(error.operation, RepositoryOperation::Add);
        assert_eq!(error.kind, RepositoryErrorKind::MissingArgument);
        assert_eq!(error.message, "id is blank");
        assert!(error.entity_type.is_none());
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_not_found_convenience() {
        let error = RepositoryError::not_found(RepositoryOperation::Undelete, "Recipe", "rcp_1");
        assert_eq!(error.operation, RepositoryOperation::Undelete);
        assert!(error.is_not_found());
        assert_eq!(error.entity_type, Some("Recipe".to_string()));
        assert_eq!(error.entity_id, Some("rcp_1".to_string()));
        assert_eq!(error.message, "Recipe 'rcp_1' was not found");
    }

    #[test]
    fn test_with_entity() {
        let error = RepositoryError::missing_argument(RepositoryOperation::Update, "blank")
            .with_entity("User", "");
        assert_eq!(error.entity_type, Some("User".to_string()));
        assert_eq!(error.entity_id, Some(String::new()));
    }

    #[test]
    fn test_display_without_entity() {
        let error = RepositoryError::missing_argument(RepositoryOperation::AddRange, "empty batch");
        let display = format!("{}", error);
        assert!(display.contains("missing_argument"));
        assert!(display.contains("add_range"));
        assert!(!display.contains('['));
    }

    #[test]
    fn test_display_with_entity() {
        let error = RepositoryError::not_found(RepositoryOperation::Find, "Role", "rol_1");
        let display = format!("{}", error);
        assert!(display.contains("not_found"));
        assert!(display.contains("[Role: rol_1]"));
    }

    #[test]
    fn test_error_is_error_trait() {
        let error: Box<dyn std::error::Error> =
            Box::new(RepositoryError::not_found(RepositoryOperation::Find, "User", "123"));
        assert!(error.to_string().contains("not_found"));
    }
}
