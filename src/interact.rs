//! Gestures on annotated elements.
//!
//! Every gesture checks that its element exists before calling into the
//! driver and fails with [`StepError::ElementDoesNotExist`] otherwise. The
//! gestures return the element so several can be chained on it.
//!
//! [`StepError::ElementDoesNotExist`]: crate::StepError::ElementDoesNotExist

use std::time::Duration;

use crate::driver::{Driver, SwipeDirection, Velocity};
use crate::error::SourceLocation;
use crate::query::AnnotatedElement;
use crate::step::Step;

impl<D: Driver + 'static> Step<D, AnnotatedElement<D>> {
    #[track_caller]
    fn gesture(
        self,
        _name: &'static str,
        perform: impl Fn(&D, &D::Element) + 'static,
    ) -> Self {
        let location = SourceLocation::caller();
        self.with_driver(move |driver, element| {
            element.ensure_exists(driver, &location)?;
            #[cfg(feature = "tracing")]
            tracing::debug!(element = %element.kind(), gesture = _name, "gesture");
            perform(driver, element.element());
            Ok(element)
        })
    }

    /// Tap the element.
    #[track_caller]
    pub fn tap(self) -> Self {
        self.gesture("tap", |driver, element| driver.tap(element))
    }

    /// Double-tap the element.
    #[track_caller]
    pub fn double_tap(self) -> Self {
        self.gesture("double_tap", |driver, element| driver.double_tap(element))
    }

    /// Press and hold the element for `duration`.
    #[track_caller]
    pub fn long_press(self, duration: Duration) -> Self {
        self.gesture("long_press", move |driver, element| {
            driver.long_press(element, duration)
        })
    }

    /// Swipe across the element at the driver's default speed.
    #[track_caller]
    pub fn swipe(self, direction: SwipeDirection) -> Self {
        self.gesture("swipe", move |driver, element| {
            driver.swipe(element, direction, None)
        })
    }

    /// Swipe across the element at a given velocity.
    #[track_caller]
    pub fn swipe_with_velocity(self, direction: SwipeDirection, velocity: Velocity) -> Self {
        self.gesture("swipe", move |driver, element| {
            driver.swipe(element, direction, Some(velocity))
        })
    }

    /// Drag the element onto `target`.
    ///
    /// The target step runs after this one; both elements must exist.
    #[track_caller]
    pub fn drag_to(self, target: Step<D, AnnotatedElement<D>>) -> Self {
        let location = SourceLocation::caller();
        self.zip(target).with_driver(move |driver, (from, to)| {
            from.ensure_exists(driver, &location)?;
            to.ensure_exists(driver, &location)?;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                element = %from.kind(),
                target = %to.kind(),
                gesture = "drag",
                "gesture"
            );
            driver.drag(from.element(), to.element());
            Ok(from)
        })
    }

    /// Type `text` into the element.
    ///
    /// Requires the element to exist and the software keyboard to be shown,
    /// checked in that order. A missing keyboard fails with its own
    /// diagnostic rather than a generic existence failure.
    #[track_caller]
    pub fn type_text(self, text: impl Into<String>) -> Self {
        let text = text.into();
        let location = SourceLocation::caller();
        self.with_driver(move |driver, element| {
            element.ensure_exists(driver, &location)?;
            AnnotatedElement::keyboard(driver).ensure_exists(driver, &location)?;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                element = %element.kind(),
                chars = text.chars().count(),
                gesture = "type_text",
                "gesture"
            );
            driver.type_text(element.element(), &text);
            Ok(element)
        })
    }
}
