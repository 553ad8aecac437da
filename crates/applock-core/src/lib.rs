//! App lock core logic
//!
//! Pure state machine logic for gating access to the application behind
//! biometric or device-credential authentication, completely decoupled from
//! platform APIs. This enables deterministic testing of every transition.
//!
//! # Architecture
//!
//! The coordinator is implemented as a deterministic state machine that is
//! isolated from I/O, time, and the platform's credential manager. All
//! external effects are supplied explicitly through small traits: a
//! [`Clock`] for monotonic elapsed time, an [`Availability`] probe for the
//! device's authentication capability, a [`ConfigRepository`] for persisted
//! settings, and an [`AppLockAuthenticator`] that performs one
//! authentication ceremony.
//!
//! The coordinator owns a single [`AppLockState`] cell and is the only
//! writer. It is driven from one logical thread: every transition method
//! takes `&mut self`, so the single-writer discipline is enforced by the
//! borrow checker rather than by locks. Observers subscribe through a watch
//! channel that replays the latest state to late subscribers.
//!
//! Suspending operations (`authenticate`, `request_enable`) are composed
//! from split begin/finish transitions so that interleavings with
//! non-suspending calls (for example `lock_now` while a ceremony is
//! pending) stay expressible and testable. Stale ceremony results are
//! discarded by attempt-id comparison, never by cancellation.
//!
//! # Components
//!
//! - [`coordinator`]: The app lock coordinator state machine
//! - [`state`]: Lock state model
//! - [`config`]: Lock configuration and its persistence trait
//! - [`availability`]: Device authentication capability probe
//! - [`authenticator`]: Authentication ceremony trait
//! - [`clock`]: Monotonic time source
//! - [`error`]: Authentication failure taxonomy

pub mod authenticator;
pub mod availability;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod state;

pub use authenticator::AppLockAuthenticator;
pub use availability::{Availability, UnavailableReason};
pub use clock::{Clock, SystemClock};
pub use config::{AppLockConfig, ConfigRepository, MemoryConfigRepository};
pub use coordinator::AppLockCoordinator;
pub use error::{AppLockError, AppLockResult};
pub use state::AppLockState;
