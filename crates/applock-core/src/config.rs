//! Lock configuration and its persistence trait.
//!
//! [`AppLockConfig`] is an immutable value: settings changes replace it
//! wholesale, it is never partially mutated. The coordinator reads and
//! writes it through the injected [`ConfigRepository`]; the persistence
//! format itself is out of scope and lives behind the trait.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

/// App lock settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppLockConfig {
    /// Whether the lock feature is on.
    pub enabled: bool,
    /// How long the app may stay backgrounded before re-locking.
    ///
    /// Zero means re-lock on any foreground transition, regardless of how
    /// briefly the app was backgrounded.
    pub timeout: Duration,
}

impl AppLockConfig {
    /// Create a config with the lock enabled and the given timeout.
    pub fn enabled(timeout: Duration) -> Self {
        Self { enabled: true, timeout }
    }

    /// Background timeout in whole milliseconds.
    pub fn timeout_millis(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Supplies and stores the persisted [`AppLockConfig`].
///
/// The coordinator reads through this on every decision rather than caching,
/// so settings written by other components (e.g. a settings screen) are
/// picked up without an explicit notification.
pub trait ConfigRepository {
    /// Current persisted config.
    fn load(&self) -> AppLockConfig;

    /// Replace the persisted config wholesale.
    fn store(&self, config: &AppLockConfig);
}

/// In-memory [`ConfigRepository`] backed by a shared cell.
///
/// Clones share the same underlying config, which lets tests and embedders
/// mutate settings while the coordinator holds its own handle.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigRepository {
    config: Arc<Mutex<AppLockConfig>>,
}

impl MemoryConfigRepository {
    /// Create a repository seeded with the given config.
    pub fn new(config: AppLockConfig) -> Self {
        Self { config: Arc::new(Mutex::new(config)) }
    }

    /// Replace the stored config.
    pub fn set(&self, config: AppLockConfig) {
        *self.config.lock().unwrap_or_else(PoisonError::into_inner) = config;
    }
}

impl ConfigRepository for MemoryConfigRepository {
    fn load(&self) -> AppLockConfig {
        self.config.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn store(&self, config: &AppLockConfig) {
        self.set(config.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_disabled_with_immediate_relock() {
        let config = AppLockConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.timeout_millis(), 0);
    }

    #[test]
    fn memory_repository_clones_share_state() {
        let repository = MemoryConfigRepository::new(AppLockConfig::default());
        let handle = repository.clone();

        handle.set(AppLockConfig::enabled(Duration::from_secs(60)));

        assert!(repository.load().enabled);
        assert_eq!(repository.load().timeout_millis(), 60_000);
    }
}
