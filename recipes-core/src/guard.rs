//! Precondition checks that return a typed failure instead of panicking
//!
//! Each check returns `Some(failure)` when it trips and `None` when the value is
//! acceptable. The failure is built by a caller-supplied constructor that receives
//! the rendered message, so any failure type can be produced without the guard
//! knowing about it.
//!
//! # Example
//!
//! ```rust
//! use recipes_core::guard::Guard;
//!
//! let title: Option<&String> = None;
//! let failure = Guard::against_null(title, "title must be provided", |message| message);
//! assert_eq!(failure.as_deref(), Some("title must be provided"));
//! ```

use std::fmt;

use crate::document::DocumentKey;

/// Namespace for precondition checks
#[derive(Debug, Clone, Copy, Default)]
pub struct Guard;

impl Guard {
    /// Trip when `value` is absent
    pub fn against_null<T: ?Sized, F>(
        value: Option<&T>,
        message: impl fmt::Display,
        make_failure: impl FnOnce(String) -> F,
    ) -> Option<F> {
        match value {
            Some(_) => None,
            None => Some(make_failure(message.to_string())),
        }
    }

    /// Trip when `key` is blank (the key type's notion of "no key")
    pub fn against_blank<K: DocumentKey, F>(
        key: &K,
        message: impl fmt::Display,
        make_failure: impl FnOnce(String) -> F,
    ) -> Option<F> {
        key.is_blank().then(|| make_failure(message.to_string()))
    }

    /// Trip when `items` holds nothing
    pub fn against_empty<T, F>(
        items: &[T],
        message: impl fmt::Display,
        make_failure: impl FnOnce(String) -> F,
    ) -> Option<F> {
        items.is_empty().then(|| make_failure(message.to_string()))
    }
}
