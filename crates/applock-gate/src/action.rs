//! Gate actions
//!
//! Actions produced by the gate state machine for the platform shell to
//! execute.

use applock_core::{AppLockError, UnavailableReason};

/// What the lock overlay should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    /// Plain full-screen cover that obscures app content, e.g. in the task
    /// switcher. Not interactive.
    Privacy,

    /// The last authentication attempt failed; offers retry and close.
    Failed(AppLockError),

    /// The device cannot authenticate; offers guidance (open settings or
    /// try again, depending on the reason) and close.
    Unavailable(UnavailableReason),
}

/// Actions produced by the gate state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateAction {
    /// Cover the app content with the given overlay, replacing any other.
    ShowOverlay(Overlay),

    /// Remove the overlay and reveal app content.
    HideOverlay,

    /// Call `ensure_unlocked` on the coordinator. The resulting state
    /// change flows back into the gate through `on_state_changed`.
    EnsureUnlocked,

    /// Call `refresh_availability` on the coordinator (device-settings
    /// return path).
    RefreshAvailability,

    /// Run one authentication ceremony for this attempt.
    Authenticate {
        /// The coordinator attempt this ceremony belongs to.
        attempt_id: u64,
    },
}
