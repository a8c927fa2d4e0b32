//! Annotated queries and elements.
//!
//! A driver query or element handle travels together with a [`QueryKind`]
//! describing how it was derived. The annotation is only used to render
//! diagnostics; it never steers control flow.
//!
//! Queries ([`AnnotatedQuery`]) stand for "any number of candidates" and
//! elements ([`AnnotatedElement`]) for "one specific candidate". Gestures are
//! only defined on elements, so a call site has to narrow explicitly with
//! [`first`](Step::first), [`bound_by`](Step::bound_by),
//! [`only_element`](Step::only_element) or
//! [`matching_exactly`](Step::matching_exactly) before it can interact.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::{Driver, ElementCategory};
use crate::error::{SourceLocation, StepError};
use crate::predicate::{Attribute, CountCondition, Predicate};
use crate::step::{Step, StepResult};
use crate::wait::{poll_until, WaitPolicy};

/// How a query or element was derived.
///
/// Kinds are never mutated: narrowing wraps the parent kind in a new one, so
/// the rendered description reads as the full derivation chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKind {
    /// Every element of a category.
    All(ElementCategory),
    /// The element at an ordinal position.
    BoundBy {
        /// Zero-based position.
        index: usize,
        /// Parent query.
        of: Box<QueryKind>,
    },
    /// The element whose label or identifier equals a string.
    MatchingExactly {
        /// Text looked up.
        text: String,
        /// Parent query.
        of: Box<QueryKind>,
    },
    /// Elements carrying an accessibility identifier.
    MatchingIdentifier {
        /// Identifier looked up.
        identifier: String,
        /// Parent query.
        of: Box<QueryKind>,
    },
    /// Elements satisfying a predicate.
    MatchingPredicate {
        /// Rendered predicate.
        format: String,
        /// Parent query.
        of: Box<QueryKind>,
    },
    /// The first match, count not asserted.
    FirstOf(Box<QueryKind>),
    /// The single match, count asserted to be one.
    OnlyElementOf(Box<QueryKind>),
    /// The software keyboard.
    Keyboard,
}

impl QueryKind {
    /// Wrap as the element at `index`.
    pub fn bound_by(self, index: usize) -> Self {
        Self::BoundBy {
            index,
            of: Box::new(self),
        }
    }

    /// Wrap as the element matching `text` exactly.
    pub fn matching_exactly(self, text: impl Into<String>) -> Self {
        Self::MatchingExactly {
            text: text.into(),
            of: Box::new(self),
        }
    }

    /// Wrap as narrowed by an accessibility identifier.
    pub fn matching_identifier(self, identifier: impl Into<String>) -> Self {
        Self::MatchingIdentifier {
            identifier: identifier.into(),
            of: Box::new(self),
        }
    }

    /// Wrap as narrowed by a predicate.
    pub fn matching_predicate(self, predicate: &Predicate) -> Self {
        Self::MatchingPredicate {
            format: predicate.format(),
            of: Box::new(self),
        }
    }

    /// Wrap as the first match.
    pub fn first(self) -> Self {
        Self::FirstOf(Box::new(self))
    }

    /// Wrap as the only match.
    pub fn only_element(self) -> Self {
        Self::OnlyElementOf(Box::new(self))
    }

    /// The kind this one was derived from, if any.
    pub fn parent(&self) -> Option<&QueryKind> {
        match self {
            Self::All(_) | Self::Keyboard => None,
            Self::BoundBy { of, .. }
            | Self::MatchingExactly { of, .. }
            | Self::MatchingIdentifier { of, .. }
            | Self::MatchingPredicate { of, .. }
            | Self::FirstOf(of)
            | Self::OnlyElementOf(of) => Some(of),
        }
    }

    /// Returns `true` for the software keyboard.
    pub fn is_keyboard(&self) -> bool {
        matches!(self, Self::Keyboard)
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All(category) => write!(f, "all {category}"),
            Self::BoundBy { index, of } => write!(f, "element #{index} of {of}"),
            Self::MatchingExactly { text, of } => {
                write!(f, "the element of {of} labelled \"{text}\"")
            }
            Self::MatchingIdentifier { identifier, of } => {
                write!(f, "{of} identified as \"{identifier}\"")
            }
            Self::MatchingPredicate { format, of } => write!(f, "{of} matching `{format}`"),
            Self::FirstOf(of) => write!(f, "the first of {of}"),
            Self::OnlyElementOf(of) => write!(f, "the only one of {of}"),
            Self::Keyboard => f.write_str("the software keyboard"),
        }
    }
}

/// A driver query paired with its derivation.
pub struct AnnotatedQuery<D: Driver> {
    kind: QueryKind,
    query: D::Query,
}

impl<D: Driver> AnnotatedQuery<D> {
    /// Pair a driver query with its derivation.
    pub fn new(kind: QueryKind, query: D::Query) -> Self {
        Self { kind, query }
    }

    /// How the query was derived.
    pub fn kind(&self) -> &QueryKind {
        &self.kind
    }

    /// The driver's handle.
    pub fn query(&self) -> &D::Query {
        &self.query
    }

    /// Narrow by a predicate.
    pub fn matching(&self, driver: &D, predicate: &Predicate) -> Self {
        Self::new(
            self.kind.clone().matching_predicate(predicate),
            driver.matching_predicate(&self.query, predicate),
        )
    }

    /// Narrow by an accessibility identifier.
    pub fn matching_identifier(&self, driver: &D, identifier: &str) -> Self {
        Self::new(
            self.kind.clone().matching_identifier(identifier),
            driver.matching_identifier(&self.query, identifier),
        )
    }

    /// The match whose label or identifier is exactly `text`, existence unchecked.
    pub fn matching_exactly(&self, driver: &D, text: &str) -> AnnotatedElement<D> {
        AnnotatedElement::new(
            self.kind.clone().matching_exactly(text),
            driver.element_matching_text(&self.query, text),
        )
    }

    /// The first match, existence unchecked.
    pub fn first(&self, driver: &D) -> AnnotatedElement<D> {
        AnnotatedElement::new(self.kind.clone().first(), driver.first(&self.query))
    }

    /// The match at `index`, existence unchecked.
    pub fn bound_by(&self, driver: &D, index: usize) -> AnnotatedElement<D> {
        AnnotatedElement::new(
            self.kind.clone().bound_by(index),
            driver.element_bound_by(&self.query, index),
        )
    }

    /// The single match, after counting the live query.
    pub fn only_element(
        &self,
        driver: &D,
        location: &SourceLocation,
    ) -> StepResult<AnnotatedElement<D>> {
        match driver.count(&self.query) {
            0 => Err(StepError::NoElementsMatchingQuery {
                query: self.kind.clone(),
                location: location.clone(),
            }),
            1 => Ok(AnnotatedElement::new(
                self.kind.clone().only_element(),
                driver.only_element(&self.query),
            )),
            count => Err(StepError::AmbiguousMatch {
                query: self.kind.clone(),
                count,
                location: location.clone(),
            }),
        }
    }
}

impl<D: Driver> Clone for AnnotatedQuery<D> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            query: self.query.clone(),
        }
    }
}

impl<D: Driver> fmt::Debug for AnnotatedQuery<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotatedQuery")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// A driver element handle paired with its derivation.
///
/// The element may or may not exist; that is only known once it is checked.
pub struct AnnotatedElement<D: Driver> {
    kind: QueryKind,
    element: D::Element,
}

impl<D: Driver> AnnotatedElement<D> {
    /// Pair a driver element with its derivation.
    pub fn new(kind: QueryKind, element: D::Element) -> Self {
        Self { kind, element }
    }

    /// The software keyboard.
    pub fn keyboard(driver: &D) -> Self {
        Self::new(QueryKind::Keyboard, driver.keyboard())
    }

    /// How the element was derived.
    pub fn kind(&self) -> &QueryKind {
        &self.kind
    }

    /// The driver's handle.
    pub fn element(&self) -> &D::Element {
        &self.element
    }

    /// Succeed if the element is on screen right now.
    pub fn ensure_exists(&self, driver: &D, location: &SourceLocation) -> StepResult<()> {
        if driver.exists(&self.element) {
            Ok(())
        } else {
            Err(StepError::ElementDoesNotExist {
                element: self.kind.clone(),
                location: location.clone(),
            })
        }
    }
}

impl<D: Driver> Clone for AnnotatedElement<D> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            element: self.element.clone(),
        }
    }
}

impl<D: Driver> fmt::Debug for AnnotatedElement<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotatedElement")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Root queries
// ============================================================================

/// Every element of `category`.
pub fn query<D: Driver + 'static>(category: ElementCategory) -> Step<D, AnnotatedQuery<D>> {
    Step::new(move |driver: &D| {
        Ok(AnnotatedQuery::new(
            QueryKind::All(category),
            driver.query(category),
        ))
    })
}

/// Every button.
pub fn buttons<D: Driver + 'static>() -> Step<D, AnnotatedQuery<D>> {
    query(ElementCategory::Button)
}

/// Every text field.
pub fn text_fields<D: Driver + 'static>() -> Step<D, AnnotatedQuery<D>> {
    query(ElementCategory::TextField)
}

/// Every secure text field.
pub fn secure_text_fields<D: Driver + 'static>() -> Step<D, AnnotatedQuery<D>> {
    query(ElementCategory::SecureTextField)
}

/// Every static text.
pub fn static_texts<D: Driver + 'static>() -> Step<D, AnnotatedQuery<D>> {
    query(ElementCategory::StaticText)
}

/// Every cell.
pub fn cells<D: Driver + 'static>() -> Step<D, AnnotatedQuery<D>> {
    query(ElementCategory::Cell)
}

/// Every switch.
pub fn switches<D: Driver + 'static>() -> Step<D, AnnotatedQuery<D>> {
    query(ElementCategory::Switch)
}

/// The software keyboard.
pub fn keyboard<D: Driver + 'static>() -> Step<D, AnnotatedElement<D>> {
    Step::new(|driver: &D| Ok(AnnotatedElement::keyboard(driver)))
}

// ============================================================================
// Query narrowing
// ============================================================================

impl<D: Driver + 'static> Step<D, AnnotatedQuery<D>> {
    /// Narrow by a predicate. The match count is not constrained.
    pub fn matching(self, predicate: Predicate) -> Self {
        self.with_driver(move |driver, query| Ok(query.matching(driver, &predicate)))
    }

    /// Narrow to elements whose label contains `text`, ignoring case.
    #[doc(alias = "containing")]
    pub fn label_containing(self, text: impl Into<String>) -> Self {
        self.matching(Predicate::contains(Attribute::Label, text))
    }

    /// Narrow to fields whose placeholder contains `text`, ignoring case.
    pub fn placeholder_containing(self, text: impl Into<String>) -> Self {
        self.matching(Predicate::contains(Attribute::PlaceholderValue, text))
    }

    /// Narrow to elements carrying an accessibility identifier.
    pub fn matching_identifier(self, identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        self.with_driver(move |driver, query| Ok(query.matching_identifier(driver, &identifier)))
    }

    /// The element labelled or identified exactly `text`. Fails with
    /// [`StepError::ElementDoesNotExist`] if it is not on screen.
    #[track_caller]
    pub fn matching_exactly(self, text: impl Into<String>) -> Step<D, AnnotatedElement<D>> {
        let text = text.into();
        let location = SourceLocation::caller();
        self.with_driver(move |driver, query| {
            let element = query.matching_exactly(driver, &text);
            element.ensure_exists(driver, &location)?;
            Ok(element)
        })
    }

    /// The first match. The count is not asserted and existence is not
    /// checked until the element is used.
    pub fn first(self) -> Step<D, AnnotatedElement<D>> {
        self.with_driver(|driver, query| Ok(query.first(driver)))
    }

    /// The match at `index`.
    pub fn bound_by(self, index: usize) -> Step<D, AnnotatedElement<D>> {
        self.with_driver(move |driver, query| Ok(query.bound_by(driver, index)))
    }

    /// The single match.
    ///
    /// Counts the live query at evaluation time and fails with
    /// [`StepError::NoElementsMatchingQuery`] or [`StepError::AmbiguousMatch`]
    /// unless exactly one element matches.
    #[track_caller]
    pub fn only_element(self) -> Step<D, AnnotatedElement<D>> {
        let location = SourceLocation::caller();
        self.with_driver(move |driver, query| query.only_element(driver, &location))
    }

    /// Number of live matches.
    pub fn count(self) -> Step<D, usize> {
        self.with_driver(|driver, query| Ok(driver.count(query.query())))
    }

    /// Wait, with the default policy, for at least one match.
    #[track_caller]
    pub fn wait(self) -> Self {
        self.wait_with(WaitPolicy::default(), 1)
    }

    /// Wait up to `timeout` for at least `min_count` matches.
    #[track_caller]
    pub fn wait_for(self, timeout: Duration, min_count: usize) -> Self {
        self.wait_with(WaitPolicy::new(timeout), min_count)
    }

    /// Wait for at least `min_count` matches under `policy`.
    ///
    /// Fails with [`StepError::TimedOutWaitingForQuery`] on expiry.
    #[track_caller]
    pub fn wait_with(self, policy: WaitPolicy, min_count: usize) -> Self {
        let location = SourceLocation::caller();
        self.with_driver(move |driver, query| {
            if poll_until(&policy, || driver.count(query.query()) >= min_count) {
                return Ok(query);
            }
            #[cfg(feature = "tracing")]
            tracing::warn!(query = %query.kind(), min_count, "wait.timeout");
            Err(StepError::TimedOutWaitingForQuery {
                query: query.kind().clone(),
                timeout: policy.timeout,
                min_count,
                location: location.clone(),
            })
        })
    }

    /// Wait up to `timeout` for the live count to satisfy `condition`.
    ///
    /// Fails with [`StepError::TimedOutWaitingForQueryWithPredicate`] on expiry.
    #[track_caller]
    pub fn wait_until(self, timeout: Duration, condition: CountCondition) -> Self {
        let location = SourceLocation::caller();
        let policy = WaitPolicy::new(timeout);
        self.with_driver(move |driver, query| {
            if poll_until(&policy, || condition.holds(driver.count(query.query()))) {
                return Ok(query);
            }
            #[cfg(feature = "tracing")]
            tracing::warn!(query = %query.kind(), condition = %condition, "wait.timeout");
            Err(StepError::TimedOutWaitingForQueryWithPredicate {
                query: query.kind().clone(),
                timeout,
                predicate: condition.to_string(),
                location: location.clone(),
            })
        })
    }
}

// ============================================================================
// Element checks and reads
// ============================================================================

impl<D: Driver + 'static> Step<D, AnnotatedElement<D>> {
    /// Fail with [`StepError::ElementDoesNotExist`] unless the element is on
    /// screen right now.
    #[track_caller]
    pub fn exists(self) -> Self {
        let location = SourceLocation::caller();
        self.with_driver(move |driver, element| {
            element.ensure_exists(driver, &location)?;
            Ok(element)
        })
    }

    /// Whether the element is on screen right now. Never fails on its own;
    /// pair with [`Step::assert`] for a located assertion.
    pub fn is_present(self) -> Step<D, bool> {
        self.with_driver(|driver, element| Ok(driver.exists(element.element())))
    }

    /// Wait, with the default timeout, for the element to exist.
    #[track_caller]
    pub fn wait(self) -> Self {
        self.wait_for(WaitPolicy::DEFAULT_TIMEOUT)
    }

    /// Wait up to `timeout` for the element to exist.
    ///
    /// Fails with [`StepError::TimedOutWaitingForElement`] on expiry.
    #[track_caller]
    pub fn wait_for(self, timeout: Duration) -> Self {
        let location = SourceLocation::caller();
        self.with_driver(move |driver, element| {
            if driver.wait_for_existence(element.element(), timeout) {
                return Ok(element);
            }
            #[cfg(feature = "tracing")]
            tracing::warn!(element = %element.kind(), "wait.timeout");
            Err(StepError::TimedOutWaitingForElement {
                element: element.kind().clone(),
                timeout,
                predicate: None,
                location: location.clone(),
            })
        })
    }

    /// Wait up to `timeout` for the element to exist and satisfy `predicate`.
    #[track_caller]
    pub fn wait_until(self, timeout: Duration, predicate: Predicate) -> Self {
        let location = SourceLocation::caller();
        let policy = WaitPolicy::new(timeout);
        self.with_driver(move |driver, element| {
            let handle = element.element();
            let holds = || driver.exists(handle) && driver.evaluate(handle, &predicate);
            if poll_until(&policy, holds) {
                return Ok(element);
            }
            #[cfg(feature = "tracing")]
            tracing::warn!(element = %element.kind(), predicate = %predicate, "wait.timeout");
            Err(StepError::TimedOutWaitingForElement {
                element: element.kind().clone(),
                timeout,
                predicate: Some(predicate.format()),
                location: location.clone(),
            })
        })
    }

    /// The element's label. Checks existence first.
    #[track_caller]
    pub fn label(self) -> Step<D, String> {
        let location = SourceLocation::caller();
        self.with_driver(move |driver, element| {
            element.ensure_exists(driver, &location)?;
            Ok(driver.label(element.element()))
        })
    }

    /// The element's value. Checks existence first.
    #[track_caller]
    pub fn value(self) -> Step<D, Option<String>> {
        let location = SourceLocation::caller();
        self.with_driver(move |driver, element| {
            element.ensure_exists(driver, &location)?;
            Ok(driver.value(element.element()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_render_as_a_derivation_chain() {
        let kind = QueryKind::All(ElementCategory::TextField)
            .matching_predicate(&Predicate::contains(Attribute::PlaceholderValue, "Username"))
            .first();
        assert_eq!(
            kind.to_string(),
            "the first of all text fields matching `placeholderValue CONTAINS[c] 'Username'`"
        );
    }

    #[test]
    fn wrapping_keeps_the_parent_intact() {
        let root = QueryKind::All(ElementCategory::Button);
        let only = root.clone().matching_identifier("login").only_element();
        assert_eq!(only.parent().and_then(QueryKind::parent), Some(&root));
        assert_eq!(
            only.to_string(),
            "the only one of all buttons identified as \"login\""
        );
    }

    #[test]
    fn bound_and_exact_descriptions() {
        let cells = QueryKind::All(ElementCategory::Cell);
        assert_eq!(cells.clone().bound_by(2).to_string(), "element #2 of all cells");
        assert_eq!(
            cells.matching_exactly("Inbox").to_string(),
            "the element of all cells labelled \"Inbox\""
        );
        assert!(QueryKind::Keyboard.is_keyboard());
        assert!(QueryKind::Keyboard.parent().is_none());
    }
}
