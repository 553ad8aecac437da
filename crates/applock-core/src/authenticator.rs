//! Authentication ceremony trait.
//!
//! The actual prompt UI and credential-manager integration are platform
//! concerns; the coordinator only consumes this capability. One call is one
//! ceremony, and the same authenticator may be invoked repeatedly across
//! distinct attempt ids.

use async_trait::async_trait;

use crate::error::AppLockResult;

/// Performs a single authentication ceremony.
///
/// May suspend on hardware or UI interaction for an arbitrarily long time.
#[async_trait]
pub trait AppLockAuthenticator: Send + Sync {
    /// Run one ceremony and resolve to its outcome.
    async fn authenticate(&self) -> AppLockResult;
}
