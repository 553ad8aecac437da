//! Lock state model.
//!
//! Exactly one variant is active at any instant. State is created at
//! coordinator construction, mutated exclusively by the coordinator's
//! transition methods, and lives for the lifetime of the coordinator.

use crate::{availability::UnavailableReason, error::AppLockError};

/// Current state of the app lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppLockState {
    /// The lock feature is off.
    Disabled,

    /// The lock is on but the device cannot authenticate.
    ///
    /// Fails closed: never considered unlocked, even though no prompt can
    /// be shown.
    Unavailable {
        /// Why the device cannot authenticate.
        reason: UnavailableReason,
    },

    /// Authentication is required and no attempt is in flight.
    Locked,

    /// An authentication ceremony is in progress.
    Unlocking {
        /// Correlation token for this ceremony. Strictly increasing per
        /// coordinator instance; a result bearing a stale id is discarded.
        attempt_id: u64,
    },

    /// Access is granted.
    Unlocked {
        /// Monotonic elapsed milliseconds at which the app last left the
        /// foreground, or `None` while it is in the foreground.
        last_hidden_at: Option<u64>,
    },

    /// The last authentication attempt failed; access is denied until a
    /// fresh attempt is started.
    Failed {
        /// What went wrong.
        error: AppLockError,
    },
}

impl AppLockState {
    /// Whether this state grants access.
    ///
    /// Only `Unlocked` and `Disabled` grant access; every other state,
    /// including `Unavailable`, fails closed.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked { .. } | Self::Disabled)
    }
}
