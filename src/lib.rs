#![deny(missing_docs)]

//! Wraith: composable, diagnosable steps for UI automation.
//!
//! # Design Goals
//!
//! Wraith is focused on **failures you can read** and **chains the compiler checks**:
//!
//! - **Deferred steps**: a [`Step`] is built without an application and evaluated later against a [`Driver`]
//! - **Annotated queries**: every query and element carries how it was derived, so failures say what was looked for
//! - **Explicit narrowing**: gestures exist only on single elements, never on "whatever matched first"
//! - **Screen typestate**: operations scoped to a screen only type-check on chains that are on that screen
//!
//! # Core Concepts
//!
//! - [`Step`]: a deferred, failable computation from a driver to a value
//! - [`AnnotatedQuery`] / [`AnnotatedElement`]: driver handles plus their [`QueryKind`]
//! - [`StepError`]: the closed set of failure causes, each attributed to a source location
//! - [`Screen`]: marker types for the screen-scoped typestate, declared with [`screen!`]
//! - [`Run`]: evaluates a scenario and hands failures to a [`FailureSink`]
//!
//! # Example
//!
//! ```
//! use wraith::fake::{FakeDriver, FakeElement};
//! use wraith::{run, steps, text_fields};
//!
//! let driver = FakeDriver::new("login", [FakeElement::text_field("Username")]);
//! let scenario = steps![
//!     text_fields()
//!         .placeholder_containing("user")
//!         .first()
//!         .tap()
//!         .type_text("FooBarson")
//!         .discard(),
//! ];
//!
//! run(&scenario, &driver).expect("the field accepts text");
//! ```

// Re-export paste for macros
pub use paste;

// Modules
pub mod block;
mod combinators;
pub mod driver;
pub mod error;
pub mod fake;
mod interact;
mod macros;
pub mod predicate;
pub mod query;
pub mod run;
pub mod screen;
pub mod step;
pub mod wait;

// Re-exports for convenience
pub use block::{given, sequence, then, when, Stage};
pub use combinators::OrElse;
pub use driver::{Driver, ElementCategory, SwipeDirection, Velocity};
pub use error::{SourceLocation, StepError};
pub use predicate::{Attribute, Attributes, Comparison, CountCondition, Predicate};
pub use query::{
    buttons, cells, keyboard, query, secure_text_fields, static_texts, switches, text_fields,
    AnnotatedElement, AnnotatedQuery, QueryKind,
};
pub use run::{run, Failure, FailureSink, PanicSink, Run, RunId, RunOutcome, RunReport};
pub use screen::Screen;
pub use step::{Step, StepResult};
pub use wait::WaitPolicy;

#[cfg(test)]
mod tests;
