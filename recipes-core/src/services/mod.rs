//! Service layer for the Recipes and Identity services
//!
//! Services sit between HTTP handlers and repositories. They accept raw client
//! input, chain repository calls through outcomes, and finish with a
//! [`ProblemDetails`] failure that renders directly as an HTTP response.
//! Storage faults stop here: they are logged and become 500 (or 409) problems.

mod identity;
mod problem;
mod recipes;

pub use identity::IdentityService;
pub use problem::{ProblemDetails, PROBLEM_JSON};
pub use recipes::{RecipeListQuery, RecipePage, RecipeService};

use crate::ids::{IdKind, TypedId};
use crate::outcome::DataOutcome;

/// Parse a client-supplied id, failing with 400 when it is malformed
pub(crate) fn parse_id<K: IdKind>(raw: &str) -> DataOutcome<TypedId<K>, ProblemDetails> {
    match raw.parse::<TypedId<K>>() {
        Ok(id) => DataOutcome::ok(id),
        Err(err) => DataOutcome::fail(ProblemDetails::bad_request(format!(
            "'{}' is not a valid id: {}",
            raw, err
        ))),
    }
}

/// Fail with 400 when `value` is blank
pub(crate) fn require(value: &str, field: &str) -> Option<ProblemDetails> {
    value
        .trim()
        .is_empty()
        .then(|| ProblemDetails::bad_request(format!("{} must not be empty", field)))
}
