//! Common fixtures for tests.
//!
//! This module contains:
//! - `login_app`: the three-screen fake app most tests drive
//! - `Login`, `Dashboard`, `Settings`: screens declared with `screen!`
//! - Counting helpers for observing which steps ran

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::fake::{FakeDriver, FakeElement};
use crate::{buttons, screen, secure_text_fields, static_texts, steps, text_fields, Step};

/// Short timeout so failing waits do not slow the suite down.
pub const SHORT: Duration = Duration::from_millis(200);

// ============================================================================
// Test App
// ============================================================================

/// Login, dashboard and settings screens; the app starts on login.
pub fn login_app() -> FakeDriver {
    FakeDriver::new(
        "login",
        [
            FakeElement::static_text("Sign in to continue"),
            FakeElement::text_field("Username").with_identifier("username"),
            FakeElement::secure_text_field("Password").with_identifier("password"),
            FakeElement::button("Log in")
                .with_identifier("login")
                .navigating_to("dashboard"),
            FakeElement::button("Forgot password?"),
        ],
    )
    .with_screen(
        "dashboard",
        [
            FakeElement::static_text("Welcome back").appearing_after(Duration::from_millis(50)),
            FakeElement::button("Settings").navigating_to("settings"),
            FakeElement::cell("Inbox"),
            FakeElement::cell("Drafts"),
            FakeElement::cell("Sent"),
        ],
    )
    .with_screen("settings", [FakeElement::static_text("Settings")])
}

// ============================================================================
// Screens
// ============================================================================

screen!(pub Settings);

screen! {
    pub Dashboard<D> {
        fn expect_greeting(self) -> Step<D, Dashboard> {
            self.then(
                static_texts()
                    .label_containing("Welcome")
                    .wait_for(Duration::from_secs(1), 1)
                    .only_element()
                    .discard(),
            )
            .haunt()
        }

        fn open_settings(self) -> Step<D, Settings> {
            self.then(buttons().matching_exactly("Settings").tap().discard())
                .haunt()
        }
    }
}

screen! {
    pub Login<D> {
        fn login(self, username: &str, password: &str) -> Step<D, Dashboard> {
            self.then(steps![
                text_fields()
                    .placeholder_containing("Username")
                    .first()
                    .tap()
                    .type_text(username)
                    .discard(),
                secure_text_fields()
                    .placeholder_containing("Password")
                    .first()
                    .tap()
                    .type_text(password)
                    .discard(),
                buttons().label_containing("Log in").only_element().tap().discard(),
            ])
            .haunt()
        }
    }
}

// ============================================================================
// Counting
// ============================================================================

/// A step that bumps `counter` each time it runs and returns the new count.
pub fn counting(counter: &Rc<Cell<u32>>) -> Step<FakeDriver, u32> {
    let counter = counter.clone();
    Step::new(move |_| {
        counter.set(counter.get() + 1);
        Ok(counter.get())
    })
}
