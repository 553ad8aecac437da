//! Authentication failure taxonomy.
//!
//! Errors fall into three groups with different handling at the state
//! level: environmental unavailability ([`AppLockError::NotAvailable`],
//! [`AppLockError::NotEnrolled`]) routes to
//! [`AppLockState::Unavailable`](crate::AppLockState::Unavailable),
//! transient failures surface as
//! [`AppLockState::Failed`](crate::AppLockState::Failed) for the caller to
//! render and retry, and [`AppLockError::Interrupted`] is recovered locally
//! by the coordinator. Nothing here is fatal to the process; the worst
//! outcome is a denial of access.

use thiserror::Error;

/// Outcome of one authentication attempt.
pub type AppLockResult = Result<(), AppLockError>;

/// Why an authentication attempt did not grant access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppLockError {
    /// Authentication is not available on this device.
    #[error("authentication is not available on this device")]
    NotAvailable,

    /// No biometric or device credential is enrolled.
    #[error("no biometric or device credential is enrolled")]
    NotEnrolled,

    /// The user failed to authenticate.
    #[error("authentication failed")]
    Failed,

    /// The user dismissed the authentication prompt.
    #[error("authentication was canceled")]
    Canceled,

    /// The authentication subsystem was torn down by unrelated lifecycle
    /// churn, not by a user action. The coordinator silently reverts to
    /// `Locked` so the caller can retry without a visible error.
    #[error("authentication was interrupted")]
    Interrupted,

    /// Platform-imposed cooldown after repeated failed attempts.
    #[error("locked out after too many failed attempts")]
    Lockout {
        /// `> 0`: known cooldown window in seconds. [`Self::DURATION_UNKNOWN`]:
        /// lockout of unknown duration. [`Self::DURATION_PERMANENT`]: permanent
        /// until the device credential is reset.
        duration_seconds: i32,
    },

    /// The authentication ceremony could not even begin.
    #[error("authentication could not be started: {message}")]
    UnableToStart {
        /// Host API failure description.
        message: String,
    },
}

impl AppLockError {
    /// Lockout of unknown duration.
    pub const DURATION_UNKNOWN: i32 = 0;

    /// Permanent lockout; requires a device credential reset.
    pub const DURATION_PERMANENT: i32 = -1;

    /// Create an `UnableToStart` error from anything stringish.
    pub fn unable_to_start(message: impl Into<String>) -> Self {
        Self::UnableToStart { message: message.into() }
    }
}
