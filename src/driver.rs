//! Boundary to the UI-automation driver.
//!
//! The combinator core never talks to an application directly. Everything it
//! knows about the screen comes through a [`Driver`], which is supplied once,
//! when a composed step is evaluated. Query and element handles are opaque
//! to the core; they are only passed back to the driver that produced them.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::predicate::Predicate;
use crate::wait::{poll_until, WaitPolicy};

/// Category of on-screen element a root query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementCategory {
    /// Any element.
    Any,
    /// Push buttons.
    Button,
    /// Editable single-line text fields.
    TextField,
    /// Text fields that obscure their contents.
    SecureTextField,
    /// Read-only labels.
    StaticText,
    /// Table and collection cells.
    Cell,
    /// On/off switches.
    Switch,
    /// Images.
    Image,
}

impl ElementCategory {
    /// Plural, human-readable name used in diagnostics.
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Any => "elements",
            Self::Button => "buttons",
            Self::TextField => "text fields",
            Self::SecureTextField => "secure text fields",
            Self::StaticText => "static texts",
            Self::Cell => "cells",
            Self::Switch => "switches",
            Self::Image => "images",
        }
    }

    /// Whether elements of this category accept typed text.
    pub fn accepts_text(&self) -> bool {
        matches!(self, Self::TextField | Self::SecureTextField)
    }
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

/// Direction of a swipe gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwipeDirection {
    /// Towards the top of the screen.
    Up,
    /// Towards the bottom of the screen.
    Down,
    /// Towards the leading edge.
    Left,
    /// Towards the trailing edge.
    Right,
}

/// Swipe velocity in points per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub f64);

impl Velocity {
    /// A slow, deliberate swipe.
    pub const SLOW: Self = Self(300.0);
    /// The driver's usual swipe speed.
    pub const DEFAULT: Self = Self(1000.0);
    /// A flick.
    pub const FAST: Self = Self(2500.0);

    /// Points per second.
    pub fn points_per_second(&self) -> f64 {
        self.0
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// An automation driver that can locate elements, report their state and
/// perform gestures.
///
/// Implementations are only ever read through a shared reference. Gestures
/// are fire-and-forget: the core checks existence before calling them, so a
/// driver is never asked to touch an element it has not just reported as
/// present.
pub trait Driver {
    /// Handle for a not-yet-resolved collection of candidate elements.
    type Query: Clone + 'static;
    /// Handle for a single candidate element.
    type Element: Clone + 'static;

    /// Root query for every element of the given category.
    fn query(&self, category: ElementCategory) -> Self::Query;

    /// Narrow a query by an attribute predicate.
    fn matching_predicate(&self, query: &Self::Query, predicate: &Predicate) -> Self::Query;

    /// Narrow a query to elements carrying an accessibility identifier.
    fn matching_identifier(&self, query: &Self::Query, identifier: &str) -> Self::Query;

    /// Number of elements the query matches right now.
    fn count(&self, query: &Self::Query) -> usize;

    /// The first match of a query, whether or not it exists.
    fn first(&self, query: &Self::Query) -> Self::Element;

    /// The match at an ordinal position.
    fn element_bound_by(&self, query: &Self::Query, index: usize) -> Self::Element;

    /// The single match of a query. Only called once the core has counted
    /// exactly one candidate.
    fn only_element(&self, query: &Self::Query) -> Self::Element {
        self.element_bound_by(query, 0)
    }

    /// The match whose label or identifier equals `text`.
    fn element_matching_text(&self, query: &Self::Query, text: &str) -> Self::Element;

    /// The on-screen software keyboard.
    fn keyboard(&self) -> Self::Element;

    /// Whether the element is currently on screen.
    fn exists(&self, element: &Self::Element) -> bool;

    /// Block until the element exists or `timeout` elapses.
    ///
    /// Returns whether the element exists. The default polls [`Driver::exists`].
    fn wait_for_existence(&self, element: &Self::Element, timeout: Duration) -> bool {
        poll_until(&WaitPolicy::new(timeout), || self.exists(element))
    }

    /// Whether the element satisfies an attribute predicate right now.
    fn evaluate(&self, element: &Self::Element, predicate: &Predicate) -> bool;

    /// The element's accessibility label.
    fn label(&self, element: &Self::Element) -> String;

    /// The element's current value, if it has one.
    fn value(&self, element: &Self::Element) -> Option<String>;

    /// Tap the element once.
    fn tap(&self, element: &Self::Element);

    /// Tap the element twice in quick succession.
    fn double_tap(&self, element: &Self::Element);

    /// Press and hold the element.
    fn long_press(&self, element: &Self::Element, duration: Duration);

    /// Swipe across the element.
    fn swipe(&self, element: &Self::Element, direction: SwipeDirection, velocity: Option<Velocity>);

    /// Press the element and drag it onto another.
    fn drag(&self, element: &Self::Element, to: &Self::Element);

    /// Type text into the focused element.
    fn type_text(&self, element: &Self::Element, text: &str);
}
