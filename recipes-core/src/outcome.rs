//! Success-or-typed-failure values for fallible operations
//!
//! Expected failures are carried as values instead of being raised, so every
//! fallible call site can be inspected locally and composed:
//!
//! - [`Outcome`]: the result of an operation that produces no data
//! - [`DataOutcome`]: the result of an operation that produces data on success
//! - [`Fallible`]: read-only projection shared by both (and by `std::result::Result`)
//! - [`FromFailure`]: how a continuation's return type is built from a failure
//!
//! # Composition
//!
//! A sequence of sub-operations folds into one aggregate outcome with
//! [`Outcome::depend_on`]; a pipeline of data-producing steps chains with
//! [`DataOutcome::bind`] / [`DataOutcome::bind_async`]; the final value is turned
//! into something external (an HTTP response, a log line) with `resolve`.
//!
//! # Example
//!
//! ```rust
//! use recipes_core::outcome::{DataOutcome, Outcome};
//!
//! let mut aggregate: Outcome<String> = Outcome::ok();
//! let lookup: DataOutcome<u32, String> = DataOutcome::fail("missing".to_string());
//!
//! assert!(!aggregate.depend_on(&lookup));
//! assert_eq!(aggregate.failure(), Some(&"missing".to_string()));
//!
//! let doubled: DataOutcome<u32, String> = DataOutcome::ok(21).bind(|n| DataOutcome::ok(n * 2));
//! assert_eq!(doubled.data(), Some(&42));
//! ```

use std::future::Future;

/// Read-only view over anything that either succeeded or carries a failure
///
/// `succeeded()` and `failed()` are mutually exclusive projections of `failure()`.
pub trait Fallible<F> {
    /// The failure, if the operation failed
    fn failure(&self) -> Option<&F>;

    /// `true` when no failure is present
    fn succeeded(&self) -> bool {
        self.failure().is_none()
    }

    /// `true` when a failure is present
    fn failed(&self) -> bool {
        self.failure().is_some()
    }
}

/// Construct a failed value of `Self` from a bare failure
///
/// Used by [`DataOutcome::bind`] to short-circuit into whatever outcome type the
/// continuation would have produced.
pub trait FromFailure<F> {
    /// Build a failed value carrying `failure`
    fn from_failure(failure: F) -> Self;
}

impl<T, F> Fallible<F> for std::result::Result<T, F> {
    fn failure(&self) -> Option<&F> {
        self.as_ref().err()
    }
}

impl<T, F> FromFailure<F> for std::result::Result<T, F> {
    fn from_failure(failure: F) -> Self {
        Err(failure)
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Outcome of an operation that produces no data
///
/// Exactly one of `succeeded()` / `failed()` holds at any time.
///
/// # Example
///
/// ```rust
/// use recipes_core::outcome::Outcome;
///
/// let ok: Outcome<&str> = Outcome::ok();
/// assert!(ok.succeeded());
///
/// let failed = Outcome::fail("disk full");
/// assert!(failed.failed());
/// assert_eq!(failed.failure(), Some(&"disk full"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Outcome<F> {
    failure: Option<F>,
}

impl<F> Outcome<F> {
    /// A successful outcome
    pub const fn ok() -> Self {
        Self { failure: None }
    }

    /// A failed outcome carrying `failure`
    pub const fn fail(failure: F) -> Self {
        Self {
            failure: Some(failure),
        }
    }

    /// `true` when no failure is present
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// `true` when a failure is present
    #[must_use]
    pub const fn failed(&self) -> bool {
        self.failure.is_some()
    }

    /// The failure, if any
    #[must_use]
    pub const fn failure(&self) -> Option<&F> {
        self.failure.as_ref()
    }

    /// Consume the outcome, returning the failure if any
    #[must_use]
    pub fn into_failure(self) -> Option<F> {
        self.failure
    }

    /// Overwrite the failure in place, downgrading a successful outcome
    pub fn set_failure(&mut self, failure: F) {
        self.failure = Some(failure);
    }

    /// Fold a dependency's failure into this outcome
    ///
    /// When `dependency` failed its failure is copied into `self`, overwriting any
    /// earlier failure, and `false` is returned. When it succeeded `self` is left
    /// untouched and `true` is returned, so callers can early-return:
    ///
    /// ```rust
    /// use recipes_core::outcome::Outcome;
    ///
    /// fn save_all(steps: &[Outcome<String>]) -> Outcome<String> {
    ///     let mut aggregate = Outcome::ok();
    ///     for step in steps {
    ///         if !aggregate.depend_on(step) {
    ///             return aggregate;
    ///         }
    ///     }
    ///     aggregate
    /// }
    ///
    /// let steps = [Outcome::ok(), Outcome::fail("step two".to_string()), Outcome::ok()];
    /// assert_eq!(save_all(&steps).failure(), Some(&"step two".to_string()));
    /// ```
    pub fn depend_on<D>(&mut self, dependency: &D) -> bool
    where
        D: Fallible<F> + ?Sized,
        F: Clone,
    {
        match dependency.failure() {
            Some(failure) => {
                self.failure = Some(failure.clone());
                false
            }
            None => true,
        }
    }

    /// Consuming form of [`depend_on`](Self::depend_on)
    pub fn and_depend_on<D>(mut self, dependency: &D) -> Self
    where
        D: Fallible<F> + ?Sized,
        F: Clone,
    {
        self.depend_on(dependency);
        self
    }

    /// Run exactly one of the two callbacks and return what it produced
    ///
    /// The chosen callback receives the outcome itself.
    pub fn resolve<M>(
        self,
        on_success: impl FnOnce(Self) -> M,
        on_failure: impl FnOnce(Self) -> M,
    ) -> M {
        if self.succeeded() {
            on_success(self)
        } else {
            on_failure(self)
        }
    }

    /// Attach data to a successful outcome; a failure is carried over unchanged
    ///
    /// `data` only runs on success.
    pub fn with_data<T>(self, data: impl FnOnce() -> T) -> DataOutcome<T, F> {
        match self.failure {
            Some(failure) => DataOutcome::Failed(failure),
            None => DataOutcome::Succeeded(data()),
        }
    }

    /// Transform the failure type
    pub fn map_failure<G>(self, f: impl FnOnce(F) -> G) -> Outcome<G> {
        Outcome {
            failure: self.failure.map(f),
        }
    }

    /// Convert into a `std::result::Result` for use with `?`
    ///
    /// # Errors
    ///
    /// Returns the carried failure when the outcome failed.
    pub fn into_result(self) -> std::result::Result<(), F> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

impl<F> Default for Outcome<F> {
    fn default() -> Self {
        Self::ok()
    }
}

impl<F> Fallible<F> for Outcome<F> {
    fn failure(&self) -> Option<&F> {
        self.failure.as_ref()
    }
}

impl<F> FromFailure<F> for Outcome<F> {
    fn from_failure(failure: F) -> Self {
        Self::fail(failure)
    }
}

impl<F> From<std::result::Result<(), F>> for Outcome<F> {
    fn from(result: std::result::Result<(), F>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(failure) => Self::fail(failure),
        }
    }
}

impl<F> From<Outcome<F>> for std::result::Result<(), F> {
    fn from(outcome: Outcome<F>) -> Self {
        outcome.into_result()
    }
}

// ============================================================================
// DataOutcome
// ============================================================================

/// Outcome of an operation that produces data on success
///
/// A sum type: a successful outcome always has its data and a failed one never
/// does.
///
/// # Example
///
/// ```rust
/// use recipes_core::outcome::DataOutcome;
///
/// let found: DataOutcome<&str, String> = DataOutcome::ok("Ice cream");
/// assert_eq!(found.data(), Some(&"Ice cream"));
///
/// let missing: DataOutcome<&str, String> = DataOutcome::fail("not found".to_string());
/// assert!(missing.data().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum DataOutcome<T, F> {
    /// The operation succeeded and produced `T`
    Succeeded(T),
    /// The operation failed with `F`
    Failed(F),
}

impl<T, F> DataOutcome<T, F> {
    /// A successful outcome carrying `data`
    pub const fn ok(data: T) -> Self {
        Self::Succeeded(data)
    }

    /// A failed outcome carrying `failure`
    pub const fn fail(failure: F) -> Self {
        Self::Failed(failure)
    }

    /// `true` when the operation succeeded
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// `true` when the operation failed
    #[must_use]
    pub const fn failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The failure, if any
    #[must_use]
    pub const fn failure(&self) -> Option<&F> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    /// The data, if the operation succeeded
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Succeeded(data) => Some(data),
            Self::Failed(_) => None,
        }
    }

    /// Consume the outcome, returning the data if any
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Succeeded(data) => Some(data),
            Self::Failed(_) => None,
        }
    }

    /// Consume the outcome, returning the failure if any
    #[must_use]
    pub fn into_failure(self) -> Option<F> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    /// Overwrite with a failure in place; any data is dropped
    pub fn set_failure(&mut self, failure: F) {
        *self = Self::Failed(failure);
    }

    /// Fold a dependency's failure into this outcome
    ///
    /// Same contract as [`Outcome::depend_on`]. Downgrading a successful outcome
    /// drops its data.
    pub fn depend_on<D>(&mut self, dependency: &D) -> bool
    where
        D: Fallible<F> + ?Sized,
        F: Clone,
    {
        match dependency.failure() {
            Some(failure) => {
                *self = Self::Failed(failure.clone());
                false
            }
            None => true,
        }
    }

    /// Consuming form of [`depend_on`](Self::depend_on)
    pub fn and_depend_on<D>(mut self, dependency: &D) -> Self
    where
        D: Fallible<F> + ?Sized,
        F: Clone,
    {
        self.depend_on(dependency);
        self
    }

    /// Run exactly one of the two callbacks and return what it produced
    pub fn resolve<M>(
        self,
        on_success: impl FnOnce(Self) -> M,
        on_failure: impl FnOnce(Self) -> M,
    ) -> M {
        if self.succeeded() {
            on_success(self)
        } else {
            on_failure(self)
        }
    }

    /// Apply `function` to the data, or short-circuit with the failure
    ///
    /// On failure `function` is never invoked and a new failed `R` carrying the
    /// original failure is returned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recipes_core::outcome::DataOutcome;
    ///
    /// let parsed: DataOutcome<&str, String> = DataOutcome::ok("42");
    /// let number: DataOutcome<i32, String> = parsed.bind(|raw| match raw.parse() {
    ///     Ok(n) => DataOutcome::ok(n),
    ///     Err(_) => DataOutcome::fail(format!("not a number: {raw}")),
    /// });
    /// assert_eq!(number.data(), Some(&42));
    /// ```
    pub fn bind<R>(self, function: impl FnOnce(T) -> R) -> R
    where
        R: FromFailure<F>,
    {
        match self {
            Self::Succeeded(data) => function(data),
            Self::Failed(failure) => R::from_failure(failure),
        }
    }

    /// Asynchronous form of [`bind`](Self::bind)
    ///
    /// Suspends only on the success path, while the continuation runs. The failure
    /// path completes on first poll without invoking `function`.
    pub async fn bind_async<R, Fut>(self, function: impl FnOnce(T) -> Fut) -> R
    where
        Fut: Future<Output = R>,
        R: FromFailure<F>,
    {
        match self {
            Self::Succeeded(data) => function(data).await,
            Self::Failed(failure) => R::from_failure(failure),
        }
    }

    /// Transform the data of a successful outcome
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DataOutcome<U, F> {
        match self {
            Self::Succeeded(data) => DataOutcome::Succeeded(f(data)),
            Self::Failed(failure) => DataOutcome::Failed(failure),
        }
    }

    /// Transform the failure type
    pub fn map_failure<G>(self, f: impl FnOnce(F) -> G) -> DataOutcome<T, G> {
        match self {
            Self::Succeeded(data) => DataOutcome::Succeeded(data),
            Self::Failed(failure) => DataOutcome::Failed(f(failure)),
        }
    }

    /// Forget the data, keeping only success or failure
    pub fn without_data(self) -> Outcome<F> {
        Outcome {
            failure: self.into_failure(),
        }
    }

    /// Convert into a `std::result::Result` for use with `?`
    ///
    /// # Errors
    ///
    /// Returns the carried failure when the outcome failed.
    pub fn into_result(self) -> std::result::Result<T, F> {
        match self {
            Self::Succeeded(data) => Ok(data),
            Self::Failed(failure) => Err(failure),
        }
    }
}

impl<T, F> Fallible<F> for DataOutcome<T, F> {
    fn failure(&self) -> Option<&F> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

impl<T, F> FromFailure<F> for DataOutcome<T, F> {
    fn from_failure(failure: F) -> Self {
        Self::Failed(failure)
    }
}

impl<T, F> From<std::result::Result<T, F>> for DataOutcome<T, F> {
    fn from(result: std::result::Result<T, F>) -> Self {
        match result {
            Ok(data) => Self::Succeeded(data),
            Err(failure) => Self::Failed(failure),
        }
    }
}

impl<T, F> From<DataOutcome<T, F>> for std::result::Result<T, F> {
    fn from(outcome: DataOutcome<T, F>) -> Self {
        outcome.into_result()
    }
}
