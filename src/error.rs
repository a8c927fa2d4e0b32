//! Failure taxonomy for step evaluation.
//!
//! Every failure is a typed value that carries the annotation of the query or
//! element that triggered it, plus the source location of the call that built
//! the failing step. Rendering (`Display`) produces a multi-line diagnostic
//! with a hint, suitable for handing straight to a test framework.

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::query::QueryKind;

/// Source file position captured at the call site that built a step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file path, as reported by the compiler.
    pub file: Cow<'static, str>,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl SourceLocation {
    /// Capture the location of the caller.
    ///
    /// Propagates through any chain of `#[track_caller]` functions, so the
    /// recorded position is the user's call site rather than a combinator
    /// frame inside this crate.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: Cow::Borrowed(location.file()),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Why a step failed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepError {
    /// An element was interacted with but failed its immediate existence check.
    #[error("{}", missing_element(.element))]
    ElementDoesNotExist {
        /// How the element was derived.
        element: QueryKind,
        /// Where the failing step was built.
        location: SourceLocation,
    },

    /// Waiting for an element to exist (or satisfy a predicate) ran out of time.
    #[error("{}", element_timeout(.element, .timeout, .predicate.as_deref()))]
    TimedOutWaitingForElement {
        /// How the element was derived.
        element: QueryKind,
        /// How long the wait lasted.
        timeout: Duration,
        /// Rendered element predicate, if the wait was for more than existence.
        predicate: Option<String>,
        /// Where the failing step was built.
        location: SourceLocation,
    },

    /// Waiting for a query to reach a minimum match count ran out of time.
    #[error(
        "Timed out after {:.1}s waiting for at least {min_count} of {query}.\n\
         Hint: raise the timeout if the screen is slow to load, or loosen the predicate if the elements never match.",
        .timeout.as_secs_f64()
    )]
    TimedOutWaitingForQuery {
        /// How the query was derived.
        query: QueryKind,
        /// How long the wait lasted.
        timeout: Duration,
        /// Minimum number of matches that was expected.
        min_count: usize,
        /// Where the failing step was built.
        location: SourceLocation,
    },

    /// Waiting for a query to satisfy a compound count predicate ran out of time.
    #[error(
        "Timed out after {:.1}s waiting for {query} to satisfy `{predicate}`.\n\
         Hint: check the predicate against what is actually on screen, or raise the timeout.",
        .timeout.as_secs_f64()
    )]
    TimedOutWaitingForQueryWithPredicate {
        /// How the query was derived.
        query: QueryKind,
        /// How long the wait lasted.
        timeout: Duration,
        /// Rendered count predicate.
        predicate: String,
        /// Where the failing step was built.
        location: SourceLocation,
    },

    /// Resolving a single element found no candidates.
    #[error(
        "Expected exactly one of {query}, but nothing matched.\n\
         Hint: add a `.wait()` before narrowing if the element appears asynchronously, or loosen the predicate."
    )]
    NoElementsMatchingQuery {
        /// How the query was derived.
        query: QueryKind,
        /// Where the failing step was built.
        location: SourceLocation,
    },

    /// Resolving a single element found more than one candidate.
    #[error(
        "Expected exactly one of {query}, but {count} matched.\n\
         Hint: narrow with a stricter predicate or an accessibility identifier, or pick one explicitly with `.first()` or `.bound_by(..)`."
    )]
    AmbiguousMatch {
        /// How the query was derived.
        query: QueryKind,
        /// Number of candidates observed.
        count: usize,
        /// Where the failing step was built.
        location: SourceLocation,
    },

    /// A terminal assertion on a step's value did not hold.
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// What was asserted.
        message: String,
        /// Where the failing step was built.
        location: SourceLocation,
    },
}

impl StepError {
    /// Build an assertion failure attributed to the caller.
    #[track_caller]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
            location: SourceLocation::caller(),
        }
    }

    /// Where the failing step was built.
    pub fn location(&self) -> &SourceLocation {
        match self {
            Self::ElementDoesNotExist { location, .. }
            | Self::TimedOutWaitingForElement { location, .. }
            | Self::TimedOutWaitingForQuery { location, .. }
            | Self::TimedOutWaitingForQueryWithPredicate { location, .. }
            | Self::NoElementsMatchingQuery { location, .. }
            | Self::AmbiguousMatch { location, .. }
            | Self::AssertionFailed { location, .. } => location,
        }
    }

    /// The query or element annotation involved, if any.
    pub fn annotation(&self) -> Option<&QueryKind> {
        match self {
            Self::ElementDoesNotExist { element, .. }
            | Self::TimedOutWaitingForElement { element, .. } => Some(element),
            Self::TimedOutWaitingForQuery { query, .. }
            | Self::TimedOutWaitingForQueryWithPredicate { query, .. }
            | Self::NoElementsMatchingQuery { query, .. }
            | Self::AmbiguousMatch { query, .. } => Some(query),
            Self::AssertionFailed { .. } => None,
        }
    }

    /// Returns `true` for the wait expiry variants.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::TimedOutWaitingForElement { .. }
                | Self::TimedOutWaitingForQuery { .. }
                | Self::TimedOutWaitingForQueryWithPredicate { .. }
        )
    }
}

fn missing_element(element: &QueryKind) -> String {
    if element.is_keyboard() {
        return "The software keyboard is not shown, so text cannot be typed.\n\
                Hint: tap the text field first so it takes focus, and make sure no hardware keyboard is attached."
            .to_string();
    }
    format!(
        "{} does not exist.\n\
         Hint: add a `.wait()` before interacting if the element appears asynchronously.",
        capitalize(&element.to_string())
    )
}

fn element_timeout(element: &QueryKind, timeout: &Duration, predicate: Option<&str>) -> String {
    let secs = timeout.as_secs_f64();
    match predicate {
        Some(predicate) => format!(
            "Timed out after {secs:.1}s waiting for {element} to satisfy `{predicate}`.\n\
             Hint: the element may exist but never reach that state; check the predicate or raise the timeout."
        ),
        None => format!(
            "Timed out after {secs:.1}s waiting for {element} to exist.\n\
             Hint: raise the timeout if the screen is slow to load, or loosen the query if the element never appears."
        ),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
