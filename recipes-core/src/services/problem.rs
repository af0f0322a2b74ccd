//! Problem details (RFC 9457) for the service boundary
//!
//! Service operations fail with a [`ProblemDetails`]: a machine-readable type
//! URI, a short title, the HTTP status and a human detail string. Repository
//! failures and storage faults are translated here, and both outcome types
//! render straight into axum responses.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use crate::error::{StorageError, StorageErrorKind};
use crate::outcome::{DataOutcome, Outcome};
use crate::repository::{RepositoryError, RepositoryErrorKind, RepositoryOutcome, RepositoryResult};

/// Media type of a problem details body
pub const PROBLEM_JSON: &str = "application/problem+json";

const BAD_REQUEST_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.5.1";
const UNAUTHORIZED_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.5.2";
const NOT_FOUND_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.5.5";
const CONFLICT_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.5.10";
const INTERNAL_ERROR_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.6.1";

/// A structured, user-facing failure
///
/// # Example
///
/// ```rust
/// use recipes_core::services::ProblemDetails;
///
/// let problem = ProblemDetails::not_found("Recipe 'rcp_1' was not found");
/// assert_eq!(problem.status, 404);
/// assert_eq!(problem.title, "Not Found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI identifying the problem type
    #[serde(rename = "type")]
    pub problem_type: String,
    /// Short summary of the problem type
    pub title: String,
    /// HTTP status code
    pub status: u16,
    /// Explanation specific to this occurrence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProblemDetails {
    fn new(problem_type: &str, title: &str, status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            problem_type: problem_type.to_string(),
            title: title.to_string(),
            status: status.as_u16(),
            detail: Some(detail.into()),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(BAD_REQUEST_TYPE, "Bad Request", StatusCode::BAD_REQUEST, detail)
    }

    /// 401 Unauthorized
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(UNAUTHORIZED_TYPE, "Unauthorized", StatusCode::UNAUTHORIZED, detail)
    }

    /// 404 Not Found
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(NOT_FOUND_TYPE, "Not Found", StatusCode::NOT_FOUND, detail)
    }

    /// 409 Conflict
    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::new(CONFLICT_TYPE, "Conflict", StatusCode::CONFLICT, detail)
    }

    /// 500 Internal Server Error
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(
            INTERNAL_ERROR_TYPE,
            "Internal Server Error",
            StatusCode::INTERNAL_SERVER_ERROR,
            detail,
        )
    }

    /// The status as an axum [`StatusCode`]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.status)?;
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProblemDetails {}

impl From<RepositoryError> for ProblemDetails {
    fn from(err: RepositoryError) -> Self {
        match err.kind {
            RepositoryErrorKind::NotFound => Self::not_found(err.message),
            RepositoryErrorKind::MissingArgument => Self::bad_request(err.message),
        }
    }
}

impl From<StorageError> for ProblemDetails {
    fn from(err: StorageError) -> Self {
        // Fault details stay in the logs
        match err.kind {
            StorageErrorKind::DuplicateKey => {
                Self::conflict("A document with the same key already exists")
            }
            _ => Self::internal("An internal error occurred"),
        }
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, [(header::CONTENT_TYPE, PROBLEM_JSON)], Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for DataOutcome<T, ProblemDetails> {
    fn into_response(self) -> Response {
        match self {
            DataOutcome::Succeeded(data) => (StatusCode::OK, Json(data)).into_response(),
            DataOutcome::Failed(problem) => problem.into_response(),
        }
    }
}

impl IntoResponse for Outcome<ProblemDetails> {
    fn into_response(self) -> Response {
        self.resolve(
            |_| StatusCode::NO_CONTENT.into_response(),
            |failed| match failed.into_failure() {
                Some(problem) => problem.into_response(),
                None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            },
        )
    }
}

fn log_fault(fault: &StorageError) {
    error!(
        operation = %fault.operation,
        kind = %fault.kind,
        context = ?fault.context,
        retriable = fault.is_retriable(),
        "Storage fault: {}", fault.message
    );
}

/// Fold both repository layers into one service outcome, logging storage faults
pub(crate) fn settle<T>(result: RepositoryResult<RepositoryOutcome<T>>) -> DataOutcome<T, ProblemDetails> {
    match result {
        Ok(outcome) => outcome.map_failure(ProblemDetails::from),
        Err(fault) => {
            log_fault(&fault);
            DataOutcome::fail(ProblemDetails::from(fault))
        }
    }
}

/// [`settle`] for operations without data
pub(crate) fn settle_outcome(
    result: RepositoryResult<Outcome<RepositoryError>>,
) -> Outcome<ProblemDetails> {
    match result {
        Ok(outcome) => outcome.map_failure(ProblemDetails::from),
        Err(fault) => {
            log_fault(&fault);
            Outcome::fail(ProblemDetails::from(fault))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageOperation;
    use crate::repository::RepositoryOperation;

    #[test]
    fn test_constructors_set_status_and_type() {
        let cases = [
            (ProblemDetails::bad_request("x"), 400, BAD_REQUEST_TYPE),
            (ProblemDetails::unauthorized("x"), 401, UNAUTHORIZED_TYPE),
            (ProblemDetails::not_found("x"), 404, NOT_FOUND_TYPE),
            (ProblemDetails::conflict("x"), 409, CONFLICT_TYPE),
            (ProblemDetails::internal("x"), 500, INTERNAL_ERROR_TYPE),
        ];
        for (problem, status, problem_type) in cases {
            assert_eq!(problem.status, status);
            assert_eq!(problem.problem_type, problem_type);
            assert_eq!(problem.detail.as_deref(), Some("x"));
        }
    }

    #[test]
    fn test_from_repository_error() {
        let missing = RepositoryError::missing_argument(RepositoryOperation::Add, "id is blank");
        assert_eq!(ProblemDetails::from(missing).status, 400);

        let absent = RepositoryError::not_found(RepositoryOperation::Find, "Recipe", "rcp_1");
        let problem = ProblemDetails::from(absent);
        assert_eq!(problem.status, 404);
        assert_eq!(problem.detail.as_deref(), Some("Recipe 'rcp_1' was not found"));
    }

    #[test]
    fn test_from_storage_error_hides_details() {
        let duplicate = StorageError::duplicate_key(StorageOperation::Insert, "E11000 dup key");
        assert_eq!(ProblemDetails::from(duplicate).status, 409);

        let refused = StorageError::connection_failed("connection refused at 10.0.0.3");
        let problem = ProblemDetails::from(refused);
        assert_eq!(problem.status, 500);
        assert!(!problem.detail.unwrap_or_default().contains("10.0.0.3"));
    }

    #[test]
    fn test_serializes_type_field() {
        let value = serde_json::to_value(ProblemDetails::not_found("gone")).unwrap();
        assert_eq!(value["type"], NOT_FOUND_TYPE);
        assert_eq!(value["title"], "Not Found");
        assert_eq!(value["status"], 404);
        assert_eq!(value["detail"], "gone");
    }

    #[test]
    fn test_problem_response_content_type() {
        let response = ProblemDetails::conflict("taken").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(response.headers()[header::CONTENT_TYPE], PROBLEM_JSON);
    }

    #[test]
    fn test_outcome_responses() {
        let ok: Outcome<ProblemDetails> = Outcome::ok();
        assert_eq!(ok.into_response().status(), StatusCode::NO_CONTENT);

        let failed: Outcome<ProblemDetails> = Outcome::fail(ProblemDetails::bad_request("no"));
        assert_eq!(failed.into_response().status(), StatusCode::BAD_REQUEST);

        let data: DataOutcome<u32, ProblemDetails> = DataOutcome::ok(7);
        assert_eq!(data.into_response().status(), StatusCode::OK);
    }

    #[test]
    fn test_settle_maps_both_layers() {
        let ok: RepositoryResult<RepositoryOutcome<u32>> = Ok(DataOutcome::ok(1));
        assert_eq!(settle(ok).data(), Some(&1));

        let fault: RepositoryResult<RepositoryOutcome<u32>> =
            Err(StorageError::connection_failed("down"));
        assert_eq!(settle(fault).failure().map(|p| p.status), Some(500));
    }
}
