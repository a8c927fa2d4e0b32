//! Tests for step chains driven through the fake driver.
//!
//! ## Test Organization
//!
//! - `common`: Shared fixtures, screens, and counting steps
//! - `basic`: Combinator laws over driver-backed steps
//! - `narrowing`: Query narrowing and single-element resolution
//! - `waiting`: Bounded waits on queries and elements
//! - `interaction`: Gestures, existence checks, and the software keyboard
//! - `screens`: Screen-scoped chains
//! - `scenarios`: End-to-end flows through `Run`
//!
//! ## Test App
//!
//! Most tests use a small login app with three screens:
//! - `login`: username and password fields, a "Log in" button
//! - `dashboard`: a delayed greeting, a "Settings" button, three cells
//! - `settings`: a single title

mod common;

mod basic;
mod waiting;
