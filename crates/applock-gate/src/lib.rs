//! Gate state machine for the app lock
//!
//! Pure decision logic for the screen that stands between the user and the
//! application while the lock is engaged. The gate observes coordinator
//! state changes plus host lifecycle callbacks and produces declarative
//! [`GateAction`]s; a platform shell executes them (render an overlay,
//! launch the authentication ceremony, call back into the coordinator).
//! This keeps the same decision logic testable without any UI toolkit.
//!
//! # Components
//!
//! - [`AppLockGate`]: The gate state machine
//! - [`GateAction`]: Actions for the shell to execute
//! - [`Overlay`]: What the overlay should currently display

mod action;
mod gate;

pub use action::{GateAction, Overlay};
pub use gate::AppLockGate;
