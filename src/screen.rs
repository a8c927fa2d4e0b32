//! Screen-scoped typestate.
//!
//! A screen is a zero-sized marker type. A chain that has reached a screen is
//! a `Step<D, Screen>`, and operations that only make sense on that screen
//! are written for exactly that type (see the [`screen!`](crate::screen!)
//! macro). Calling a `Dashboard` operation on a chain that is on `Login` is
//! therefore a type error, with no runtime state machine involved.
//!
//! An operation moves the chain to another screen by building an ordinary
//! `Step<D, ()>` and retagging it with [`Step::haunt`]. A chain ends by
//! dropping the marker with [`Step::discard`].

use crate::step::Step;

/// Marker type for a screen or app state.
///
/// Implemented by the types [`screen!`](crate::screen!) declares.
pub trait Screen: Copy + Default + 'static {
    /// Human-readable screen name.
    const NAME: &'static str;
}

impl<D: 'static, S: Screen> Step<D, S> {
    /// Start a chain on screen `S`. Never touches the driver.
    pub fn enter() -> Self {
        Self::always(S::default())
    }
}

impl<D: 'static> Step<D, ()> {
    /// Retag a finished step as having reached screen `S`.
    ///
    /// Failures pass through; the marker only appears on success.
    pub fn haunt<S: Screen>(self) -> Step<D, S> {
        self.map(|()| {
            #[cfg(feature = "tracing")]
            tracing::debug!(screen = S::NAME, "screen.enter");
            S::default()
        })
    }
}
