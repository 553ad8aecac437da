//! Device authentication capability probe.
//!
//! The coordinator never talks to the platform's credential manager
//! directly; it asks an [`Availability`] implementation whether an
//! authentication ceremony could run at all. The probe is consulted at
//! construction, when settings enable the lock, and on the return path from
//! device settings (`refresh_availability`).

/// Why the device cannot authenticate right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The device has no biometric hardware and no device credential.
    NoHardware,
    /// Hardware exists but no credential is enrolled.
    NotEnrolled,
    /// The authentication subsystem is temporarily out of service.
    TemporarilyUnavailable,
    /// The platform reported an unrecognized status.
    Unknown,
}

/// Probes whether an authentication ceremony can currently be performed.
pub trait Availability {
    /// `Ok(())` if authentication can run, otherwise the reason it cannot.
    fn probe(&self) -> Result<(), UnavailableReason>;
}
