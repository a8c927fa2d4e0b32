//! In-memory driver for testing step chains without an application.
//!
//! A [`FakeDriver`] holds named screens of [`FakeElement`]s. Exactly one
//! screen is current. Elements can be set to appear some time after their
//! screen is entered, tapping a text input focuses it and shows the software
//! keyboard, and tapping an element configured with
//! [`FakeElement::navigating_to`] switches screens. Every gesture is recorded.
//!
//! Handles are resolved against the live screen each time they are used, so a
//! handle taken before an element appears will find it afterwards.

use std::borrow::Cow;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::driver::{Driver, ElementCategory, SwipeDirection, Velocity};
use crate::predicate::{Attribute, Attributes, Predicate};

/// An element on a fake screen.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeElement {
    category: ElementCategory,
    label: String,
    identifier: Option<String>,
    placeholder: Option<String>,
    title: Option<String>,
    value: Option<String>,
    enabled: bool,
    appears_after: Duration,
    navigates_to: Option<String>,
}

impl FakeElement {
    /// An element of `category` with an accessibility label.
    pub fn new(category: ElementCategory, label: impl Into<String>) -> Self {
        Self {
            category,
            label: label.into(),
            identifier: None,
            placeholder: None,
            title: None,
            value: None,
            enabled: true,
            appears_after: Duration::ZERO,
            navigates_to: None,
        }
    }

    /// A button.
    pub fn button(label: impl Into<String>) -> Self {
        Self::new(ElementCategory::Button, label)
    }

    /// An empty text field showing a placeholder.
    pub fn text_field(placeholder: impl Into<String>) -> Self {
        Self::new(ElementCategory::TextField, "").with_placeholder(placeholder)
    }

    /// An empty secure text field showing a placeholder.
    pub fn secure_text_field(placeholder: impl Into<String>) -> Self {
        Self::new(ElementCategory::SecureTextField, "").with_placeholder(placeholder)
    }

    /// A label.
    pub fn static_text(label: impl Into<String>) -> Self {
        Self::new(ElementCategory::StaticText, label)
    }

    /// A table cell.
    pub fn cell(label: impl Into<String>) -> Self {
        Self::new(ElementCategory::Cell, label)
    }

    /// Set the accessibility identifier.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Set the placeholder.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the initial value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Mark as not accepting interaction.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Only show the element once its screen has been current for `delay`.
    pub fn appearing_after(mut self, delay: Duration) -> Self {
        self.appears_after = delay;
        self
    }

    /// Switch to the named screen when tapped.
    pub fn navigating_to(mut self, screen: impl Into<String>) -> Self {
        self.navigates_to = Some(screen.into());
        self
    }

    /// Element category.
    pub fn category(&self) -> ElementCategory {
        self.category
    }

    /// Accessibility label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current value.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Name used in the gesture log: label, else placeholder, else identifier.
    pub fn display_name(&self) -> &str {
        if !self.label.is_empty() {
            return &self.label;
        }
        self.placeholder
            .as_deref()
            .or(self.identifier.as_deref())
            .unwrap_or_default()
    }

    fn answers_to(&self, text: &str) -> bool {
        self.label == text || self.identifier.as_deref() == Some(text)
    }
}

impl Attributes for FakeElement {
    fn attribute(&self, attribute: Attribute) -> Option<Cow<'_, str>> {
        match attribute {
            Attribute::Label => Some(Cow::Borrowed(&self.label)),
            Attribute::Identifier => self.identifier.as_deref().map(Cow::Borrowed),
            Attribute::Value => self.value.as_deref().map(Cow::Borrowed),
            Attribute::PlaceholderValue => self.placeholder.as_deref().map(Cow::Borrowed),
            Attribute::Title => self.title.as_deref().map(Cow::Borrowed),
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// A gesture the fake driver received.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Single tap on the named element.
    Tap(String),
    /// Double tap on the named element.
    DoubleTap(String),
    /// Long press on the named element.
    LongPress(String, Duration),
    /// Swipe across the named element.
    Swipe(String, SwipeDirection, Option<Velocity>),
    /// Drag from one element onto another.
    Drag {
        /// Dragged element.
        from: String,
        /// Drop target.
        to: String,
    },
    /// Text typed into the named element.
    TypeText(String, String),
}

#[derive(Debug, Clone, PartialEq)]
enum Filter {
    Predicate(Predicate),
    Identifier(String),
}

/// Query handle of the fake driver.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeQuery {
    category: ElementCategory,
    filters: Vec<Filter>,
}

impl FakeQuery {
    fn narrowed(&self, filter: Filter) -> Self {
        let mut filters = self.filters.clone();
        filters.push(filter);
        Self {
            category: self.category,
            filters,
        }
    }

    fn admits(&self, element: &FakeElement) -> bool {
        let category_matches =
            self.category == ElementCategory::Any || self.category == element.category;
        category_matches
            && self.filters.iter().all(|filter| match filter {
                Filter::Predicate(predicate) => predicate.evaluate(element),
                Filter::Identifier(identifier) => {
                    element.identifier.as_deref() == Some(identifier.as_str())
                }
            })
    }
}

/// Element handle of the fake driver.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeHandle {
    /// The match of a query at a position.
    Bound {
        /// Query the element came from.
        query: FakeQuery,
        /// Zero-based position among the live matches.
        index: usize,
    },
    /// The match of a query labelled or identified by a string.
    Text {
        /// Query the element came from.
        query: FakeQuery,
        /// Label or identifier.
        text: String,
    },
    /// The software keyboard.
    Keyboard,
}

#[derive(Debug)]
struct State {
    screens: HashMap<String, Vec<FakeElement>>,
    current: String,
    entered_at: Instant,
    focused: Option<usize>,
    hardware_keyboard: bool,
    gestures: Vec<Gesture>,
}

impl State {
    fn elements(&self) -> &[FakeElement] {
        self.screens
            .get(&self.current)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn is_visible(&self, element: &FakeElement) -> bool {
        self.entered_at.elapsed() >= element.appears_after
    }

    /// Positions, on the current screen, of the visible elements a query admits.
    fn matches(&self, query: &FakeQuery) -> Vec<usize> {
        self.elements()
            .iter()
            .enumerate()
            .filter(|(_, element)| self.is_visible(element) && query.admits(element))
            .map(|(index, _)| index)
            .collect()
    }

    fn resolve(&self, handle: &FakeHandle) -> Option<usize> {
        match handle {
            FakeHandle::Bound { query, index } => self.matches(query).get(*index).copied(),
            FakeHandle::Text { query, text } => {
                let elements = self.elements();
                self.matches(query)
                    .into_iter()
                    .find(|&i| elements[i].answers_to(text))
            }
            FakeHandle::Keyboard => None,
        }
    }

    fn keyboard_shown(&self) -> bool {
        !self.hardware_keyboard
            && self
                .focused
                .and_then(|i| self.elements().get(i))
                .is_some_and(|element| self.is_visible(element))
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut FakeElement> {
        self.screens
            .get_mut(&self.current)
            .and_then(|elements| elements.get_mut(index))
    }

    fn name_of(&self, handle: &FakeHandle) -> String {
        match handle {
            FakeHandle::Keyboard => "keyboard".to_string(),
            other => self
                .resolve(other)
                .map(|i| self.elements()[i].display_name().to_string())
                .unwrap_or_default(),
        }
    }

    fn enter(&mut self, screen: String) {
        self.current = screen;
        self.entered_at = Instant::now();
        self.focused = None;
    }
}

/// A [`Driver`] over in-memory screens.
#[derive(Debug)]
pub struct FakeDriver {
    state: Mutex<State>,
}

impl FakeDriver {
    /// A driver whose current screen is `screen`, holding `elements`.
    pub fn new(screen: impl Into<String>, elements: impl IntoIterator<Item = FakeElement>) -> Self {
        let screen = screen.into();
        let mut screens = HashMap::new();
        screens.insert(screen.clone(), elements.into_iter().collect());
        Self {
            state: Mutex::new(State {
                screens,
                current: screen,
                entered_at: Instant::now(),
                focused: None,
                hardware_keyboard: false,
                gestures: Vec::new(),
            }),
        }
    }

    /// Add another screen, reachable through [`FakeElement::navigating_to`].
    pub fn with_screen(
        self,
        screen: impl Into<String>,
        elements: impl IntoIterator<Item = FakeElement>,
    ) -> Self {
        self.state
            .lock()
            .screens
            .insert(screen.into(), elements.into_iter().collect());
        self
    }

    /// Simulate an attached hardware keyboard, which hides the software one.
    pub fn attach_hardware_keyboard(&self) {
        self.state.lock().hardware_keyboard = true;
    }

    /// Name of the current screen.
    pub fn current_screen(&self) -> String {
        self.state.lock().current.clone()
    }

    /// Every gesture received so far, oldest first.
    pub fn gestures(&self) -> Vec<Gesture> {
        self.state.lock().gestures.clone()
    }

    /// Snapshot of the first element on the current screen whose label,
    /// identifier or placeholder is `name`.
    pub fn element(&self, name: &str) -> Option<FakeElement> {
        self.state
            .lock()
            .elements()
            .iter()
            .find(|element| {
                element.answers_to(name) || element.placeholder.as_deref() == Some(name)
            })
            .cloned()
    }

    fn record(&self, gesture: Gesture) {
        self.state.lock().gestures.push(gesture);
    }
}

impl Driver for FakeDriver {
    type Query = FakeQuery;
    type Element = FakeHandle;

    fn query(&self, category: ElementCategory) -> FakeQuery {
        FakeQuery {
            category,
            filters: Vec::new(),
        }
    }

    fn matching_predicate(&self, query: &FakeQuery, predicate: &Predicate) -> FakeQuery {
        query.narrowed(Filter::Predicate(predicate.clone()))
    }

    fn matching_identifier(&self, query: &FakeQuery, identifier: &str) -> FakeQuery {
        query.narrowed(Filter::Identifier(identifier.to_string()))
    }

    fn count(&self, query: &FakeQuery) -> usize {
        self.state.lock().matches(query).len()
    }

    fn first(&self, query: &FakeQuery) -> FakeHandle {
        self.element_bound_by(query, 0)
    }

    fn element_bound_by(&self, query: &FakeQuery, index: usize) -> FakeHandle {
        FakeHandle::Bound {
            query: query.clone(),
            index,
        }
    }

    fn element_matching_text(&self, query: &FakeQuery, text: &str) -> FakeHandle {
        FakeHandle::Text {
            query: query.clone(),
            text: text.to_string(),
        }
    }

    fn keyboard(&self) -> FakeHandle {
        FakeHandle::Keyboard
    }

    fn exists(&self, element: &FakeHandle) -> bool {
        let state = self.state.lock();
        match element {
            FakeHandle::Keyboard => state.keyboard_shown(),
            other => state.resolve(other).is_some(),
        }
    }

    fn evaluate(&self, element: &FakeHandle, predicate: &Predicate) -> bool {
        let state = self.state.lock();
        state
            .resolve(element)
            .is_some_and(|i| predicate.evaluate(&state.elements()[i]))
    }

    fn label(&self, element: &FakeHandle) -> String {
        let state = self.state.lock();
        state
            .resolve(element)
            .map(|i| state.elements()[i].label.clone())
            .unwrap_or_default()
    }

    fn value(&self, element: &FakeHandle) -> Option<String> {
        let state = self.state.lock();
        state
            .resolve(element)
            .and_then(|i| state.elements()[i].value.clone())
    }

    fn tap(&self, element: &FakeHandle) {
        let mut state = self.state.lock();
        let name = state.name_of(element);
        state.gestures.push(Gesture::Tap(name));

        let Some(index) = state.resolve(element) else {
            return;
        };
        let tapped = &state.elements()[index];
        if !tapped.enabled {
            return;
        }
        if let Some(next) = tapped.navigates_to.clone() {
            state.enter(next);
        } else if tapped.category.accepts_text() {
            state.focused = Some(index);
        }
    }

    fn double_tap(&self, element: &FakeHandle) {
        let name = self.state.lock().name_of(element);
        self.record(Gesture::DoubleTap(name));
    }

    fn long_press(&self, element: &FakeHandle, duration: Duration) {
        let name = self.state.lock().name_of(element);
        self.record(Gesture::LongPress(name, duration));
    }

    fn swipe(&self, element: &FakeHandle, direction: SwipeDirection, velocity: Option<Velocity>) {
        let name = self.state.lock().name_of(element);
        self.record(Gesture::Swipe(name, direction, velocity));
    }

    fn drag(&self, element: &FakeHandle, to: &FakeHandle) {
        let (from, to) = {
            let state = self.state.lock();
            (state.name_of(element), state.name_of(to))
        };
        self.record(Gesture::Drag { from, to });
    }

    fn type_text(&self, element: &FakeHandle, text: &str) {
        let mut state = self.state.lock();
        let name = state.name_of(element);
        state.gestures.push(Gesture::TypeText(name, text.to_string()));
        let index = state.resolve(element);
        if let Some(target) = index.and_then(|i| state.element_mut(i)) {
            target.value.get_or_insert_with(String::new).push_str(text);
        }
    }
}
