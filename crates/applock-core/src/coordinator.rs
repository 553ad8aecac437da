//! App lock coordinator state machine.
//!
//! The coordinator owns the single [`AppLockState`] cell, consumes
//! lifecycle signals and UI intents, and drives the injected
//! [`AppLockAuthenticator`] when unlocking is required. Authentication
//! results flow back through the state machine, never around it.
//!
//! # State Machine
//!
//! ```text
//!              settings off                     settings on + available
//! ┌──────────┐<──────────────── any state ─────────────────>┌────────┐
//! │ Disabled │                                              │ Locked │
//! └──────────┘                                              └────────┘
//!                                                            │      ↑
//!                                            ensure_unlocked │      │ interrupted / lock_now
//!                                                            ↓      │
//! ┌─────────────┐   refresh: available      ┌───────────────────┐   │
//! │ Unavailable │──────────────────>Locked  │ Unlocking{attempt}│───┘
//! └─────────────┘                           └───────────────────┘
//!                                              │            │
//!                                      success │            │ other failure
//!                                              ↓            ↓
//!                                        ┌──────────┐   ┌────────┐
//!                                        │ Unlocked │   │ Failed │
//!                                        └──────────┘   └────────┘
//! ```
//!
//! # Concurrency
//!
//! Not internally thread-safe; drive it from a single logical thread. All
//! transition methods take `&mut self`, so the single-writer rule is
//! enforced by construction. The suspending operations are composed from
//! split begin/finish transitions ([`begin_authentication`] /
//! [`finish_authentication`]), which keeps interleavings such as
//! `lock_now` during a pending ceremony expressible: the superseded
//! attempt's eventual result is discarded by attempt-id mismatch.
//!
//! [`begin_authentication`]: AppLockCoordinator::begin_authentication
//! [`finish_authentication`]: AppLockCoordinator::finish_authentication

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::{
    authenticator::AppLockAuthenticator,
    availability::{Availability, UnavailableReason},
    clock::Clock,
    config::{AppLockConfig, ConfigRepository},
    error::{AppLockError, AppLockResult},
    state::AppLockState,
};

/// Owns the current [`AppLockState`] and mediates all transitions.
#[derive(Debug)]
pub struct AppLockCoordinator<R, A, C> {
    config_repository: R,
    availability: A,
    clock: C,
    next_attempt_id: u64,
    auth_in_flight: bool,
    state_tx: watch::Sender<AppLockState>,
}

impl<R, A, C> AppLockCoordinator<R, A, C>
where
    R: ConfigRepository,
    A: Availability,
    C: Clock,
{
    /// Create a coordinator seeded from persisted config and a fresh
    /// availability probe.
    ///
    /// Lock disabled: starts `Disabled`. Lock enabled: starts `Locked` when
    /// the device can authenticate, `Unavailable` otherwise.
    pub fn new(config_repository: R, availability: A, clock: C) -> Self {
        let initial = if config_repository.load().enabled {
            match availability.probe() {
                Ok(()) => AppLockState::Locked,
                Err(reason) => AppLockState::Unavailable { reason },
            }
        } else {
            AppLockState::Disabled
        };

        let (state_tx, _) = watch::channel(initial);
        Self {
            config_repository,
            availability,
            clock,
            next_attempt_id: 0,
            auth_in_flight: false,
            state_tx,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> AppLockState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state changes.
    ///
    /// The receiver replays the latest value to late subscribers. Equal
    /// states are never re-emitted.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AppLockState> {
        self.state_tx.subscribe()
    }

    /// Current persisted config, read through the repository.
    #[must_use]
    pub fn config(&self) -> AppLockConfig {
        self.config_repository.load()
    }

    /// Whether the lock feature is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config().enabled
    }

    /// The app returned to the foreground.
    ///
    /// Re-probes availability first: the user may have unenrolled their
    /// credential while the app was away, and that is an environmental
    /// condition, not an authentication failure. Then re-locks when the
    /// background timeout has elapsed (inclusive boundary); otherwise
    /// clears the background timestamp. A zero timeout re-locks on any
    /// foreground transition.
    pub fn on_app_foregrounded(&mut self) {
        if !self.is_enabled() {
            return;
        }

        // An in-flight ceremony is left to fail on its own.
        if !matches!(self.state(), AppLockState::Unlocking { .. })
            && let Err(reason) = self.availability.probe()
        {
            self.set_state(AppLockState::Unavailable { reason });
            return;
        }

        let AppLockState::Unlocked { last_hidden_at: Some(hidden_at) } = self.state() else {
            return;
        };

        let elapsed = self.clock.elapsed_millis().saturating_sub(hidden_at);
        if elapsed >= self.config().timeout_millis() {
            self.set_state(AppLockState::Locked);
        } else {
            self.set_state(AppLockState::Unlocked { last_hidden_at: None });
        }
    }

    /// The app left the foreground.
    ///
    /// Records the monotonic timestamp for later timeout comparison. A
    /// stale `Failed` state resets to `Locked` so the next foreground
    /// re-prompts instead of showing an old error. An in-flight
    /// `Unlocking` is left alone: background/foreground churn does not
    /// cancel a pending ceremony.
    pub fn on_app_backgrounded(&mut self) {
        match self.state() {
            AppLockState::Unlocked { .. } if self.is_enabled() => {
                let now = self.clock.elapsed_millis();
                self.set_state(AppLockState::Unlocked { last_hidden_at: Some(now) });
            },
            AppLockState::Failed { .. } => self.set_state(AppLockState::Locked),
            _ => {},
        }
    }

    /// The screen turned off.
    ///
    /// Locks immediately, bypassing the background timeout. Does not
    /// disturb a pending `Unlocking` ceremony.
    pub fn on_screen_off(&mut self) {
        match self.state() {
            AppLockState::Unlocked { .. } | AppLockState::Failed { .. } if self.is_enabled() => {
                self.set_state(AppLockState::Locked);
            },
            _ => {},
        }
    }

    /// Lock immediately.
    ///
    /// Supersedes an in-flight `Unlocking`: the pending ceremony is not
    /// torn down, but its eventual result no longer matches the current
    /// attempt and is discarded. No-op while `Disabled` (nothing to lock)
    /// or `Unavailable` (already fails closed, keeps its reason).
    pub fn lock_now(&mut self) {
        match self.state() {
            AppLockState::Disabled | AppLockState::Unavailable { .. } => {},
            _ => self.set_state(AppLockState::Locked),
        }
    }

    /// Request that the app become unlocked.
    ///
    /// Returns `true` when the caller should proceed (either access is
    /// already granted, or a new `Unlocking` attempt was just started and
    /// the caller should run the ceremony). Returns `false` when a ceremony
    /// is already in flight (the caller must not show a second prompt) or
    /// when authentication is unavailable.
    pub fn ensure_unlocked(&mut self) -> bool {
        match self.state() {
            AppLockState::Disabled | AppLockState::Unlocked { .. } => true,
            AppLockState::Unlocking { .. } | AppLockState::Unavailable { .. } => false,
            AppLockState::Locked | AppLockState::Failed { .. } => {
                self.next_attempt_id += 1;
                self.set_state(AppLockState::Unlocking { attempt_id: self.next_attempt_id });
                true
            },
        }
    }

    /// Settings changed; persist the new config and react.
    ///
    /// Disabling always wins, from any state. Enabling from `Disabled`
    /// probes availability and lands in `Locked` or `Unavailable`
    /// (fail-closed). Timeout-only changes while already enabled leave the
    /// current state alone.
    pub fn on_settings_changed(&mut self, config: AppLockConfig) {
        self.config_repository.store(&config);

        if !config.enabled {
            self.set_state(AppLockState::Disabled);
            return;
        }

        if self.state() == AppLockState::Disabled {
            match self.availability.probe() {
                Ok(()) => self.set_state(AppLockState::Locked),
                Err(reason) => self.set_state(AppLockState::Unavailable { reason }),
            }
        }
    }

    /// Re-probe availability after the user returns from device settings.
    ///
    /// Only meaningful while `Unavailable`. Honors a config change that
    /// happened in the meantime (the user may have turned the lock off
    /// while it was unavailable).
    pub fn refresh_availability(&mut self) {
        if !matches!(self.state(), AppLockState::Unavailable { .. }) {
            return;
        }

        if !self.is_enabled() {
            self.set_state(AppLockState::Disabled);
            return;
        }

        match self.availability.probe() {
            Ok(()) => self.set_state(AppLockState::Locked),
            Err(reason) => self.set_state(AppLockState::Unavailable { reason }),
        }
    }

    /// Claim the current `Unlocking` attempt for a ceremony.
    ///
    /// Returns the attempt id to pass back to [`finish_authentication`].
    /// At most one ceremony may be in flight: a second claim before the
    /// first finishes is refused, which is what prevents double biometric
    /// prompts in multi-window setups.
    ///
    /// # Errors
    ///
    /// `UnableToStart` when the state is not `Unlocking` or a ceremony is
    /// already in flight.
    ///
    /// [`finish_authentication`]: Self::finish_authentication
    pub fn begin_authentication(&mut self) -> Result<u64, AppLockError> {
        let AppLockState::Unlocking { attempt_id } = self.state() else {
            return Err(AppLockError::unable_to_start("not in Unlocking state"));
        };

        if self.auth_in_flight {
            return Err(AppLockError::unable_to_start("authentication already in progress"));
        }

        self.auth_in_flight = true;
        Ok(attempt_id)
    }

    /// Feed a ceremony result back into the state machine.
    ///
    /// Applied only when `attempt_id` still matches the current
    /// `Unlocking` attempt: success unlocks, `Interrupted` silently
    /// reverts to `Locked` (the caller is expected to retry), any other
    /// failure surfaces as `Failed`. A stale result (the attempt was
    /// superseded by `lock_now`, a settings change, or a newer attempt)
    /// changes nothing.
    ///
    /// Returns the result unchanged for the caller's own error handling.
    pub fn finish_authentication(&mut self, attempt_id: u64, result: AppLockResult) -> AppLockResult {
        self.auth_in_flight = false;

        match self.state() {
            AppLockState::Unlocking { attempt_id: current } if current == attempt_id => {
                match &result {
                    Ok(()) => self.set_state(AppLockState::Unlocked { last_hidden_at: None }),
                    Err(AppLockError::Interrupted) => self.set_state(AppLockState::Locked),
                    Err(error) => self.set_state(AppLockState::Failed { error: error.clone() }),
                }
            },
            _ => trace!(attempt_id, "discarding stale authentication result"),
        }

        result
    }

    /// Run one authentication ceremony against the current `Unlocking`
    /// attempt.
    ///
    /// Convenience composition of [`begin_authentication`], awaiting the
    /// authenticator, and [`finish_authentication`].
    ///
    /// # Errors
    ///
    /// `UnableToStart` when no attempt can be claimed, otherwise whatever
    /// the authenticator resolved to.
    ///
    /// [`begin_authentication`]: Self::begin_authentication
    /// [`finish_authentication`]: Self::finish_authentication
    pub async fn authenticate<Auth>(&mut self, authenticator: &Auth) -> AppLockResult
    where
        Auth: AppLockAuthenticator + ?Sized,
    {
        let attempt_id = self.begin_authentication()?;
        let result = authenticator.authenticate().await;
        self.finish_authentication(attempt_id, result)
    }

    /// Claim an enable ceremony.
    ///
    /// # Errors
    ///
    /// `NotAvailable`/`NotEnrolled` when the device cannot authenticate,
    /// `UnableToStart` when a ceremony is already in flight.
    pub fn begin_enable(&mut self) -> AppLockResult {
        if let Err(reason) = self.availability.probe() {
            return Err(match reason {
                UnavailableReason::NotEnrolled => AppLockError::NotEnrolled,
                _ => AppLockError::NotAvailable,
            });
        }

        if self.auth_in_flight {
            return Err(AppLockError::unable_to_start("authentication already in progress"));
        }

        self.auth_in_flight = true;
        Ok(())
    }

    /// Complete an enable ceremony.
    ///
    /// On success, persists `enabled = true` and transitions to `Unlocked`
    /// in the same logical step. On failure neither config nor state
    /// changes.
    pub fn finish_enable(&mut self, result: AppLockResult) -> AppLockResult {
        self.auth_in_flight = false;

        if result.is_ok() {
            let config = AppLockConfig { enabled: true, ..self.config() };
            self.config_repository.store(&config);
            self.set_state(AppLockState::Unlocked { last_hidden_at: None });
        }

        result
    }

    /// Enable the lock, authenticating first.
    ///
    /// Authentication runs *before* `enabled = true` is persisted, so a
    /// failed or canceled ceremony can never leave the user locked out by
    /// a config flip whose authenticator never succeeded.
    ///
    /// # Errors
    ///
    /// See [`begin_enable`](Self::begin_enable); otherwise whatever the
    /// authenticator resolved to.
    pub async fn request_enable<Auth>(&mut self, authenticator: &Auth) -> AppLockResult
    where
        Auth: AppLockAuthenticator + ?Sized,
    {
        self.begin_enable()?;
        let result = authenticator.authenticate().await;
        self.finish_enable(result)
    }

    fn set_state(&self, next: AppLockState) {
        self.state_tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            debug!(from = ?state, to = ?next, "app lock transition");
            *state = next.clone();
            true
        });
    }
}
