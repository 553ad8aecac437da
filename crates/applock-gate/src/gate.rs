//! Gate state machine.
//!
//! Mirrors the lifecycle of one host screen: `on_start` begins observing
//! coordinator state, `on_resume`/`on_pause` track whether the screen is
//! interactive, `on_stop` ends observation. The gate never talks to the
//! coordinator directly; it emits [`GateAction`]s and receives the
//! resulting state changes back through [`AppLockGate::on_state_changed`].
//!
//! Two rules carried over from production behavior are worth calling out:
//! a ceremony is launched at most once per attempt id (the coordinator's
//! single-flight rule would reject a duplicate anyway, but the gate avoids
//! even asking), and a `Failed` state never auto-retries: retry is
//! click-driven, which prevents an infinite prompt loop.

use applock_core::{AppLockError, AppLockResult, AppLockState};
use tracing::debug;

use crate::action::{GateAction, Overlay};

/// Decision logic for the lock screen of one host activity/window.
#[derive(Debug, Default)]
pub struct AppLockGate {
    overlay: Option<Overlay>,
    last_attempt_id: Option<u64>,
    resumed: bool,
}

impl AppLockGate {
    /// Create a gate with no overlay and no ceremony launched.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay currently displayed, if any.
    #[must_use]
    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// The host screen started; begin reacting to coordinator state.
    ///
    /// Equivalent to receiving the current state as a fresh change.
    pub fn on_start(&mut self, state: &AppLockState) -> Vec<GateAction> {
        self.on_state_changed(state)
    }

    /// The coordinator's observable state changed.
    pub fn on_state_changed(&mut self, state: &AppLockState) -> Vec<GateAction> {
        let mut actions = Vec::new();
        self.sync_overlay(state, &mut actions);
        if self.resumed {
            self.trigger_authentication(state, &mut actions);
        }
        actions
    }

    /// The host screen became interactive.
    pub fn on_resume(&mut self, state: &AppLockState) -> Vec<GateAction> {
        self.resumed = true;
        let mut actions = Vec::new();

        // The user may have set up authentication in device settings while
        // we were paused.
        if matches!(state, AppLockState::Unavailable { .. }) {
            actions.push(GateAction::RefreshAvailability);
        }

        self.trigger_authentication(state, &mut actions);

        // Quick pause/resume while unlocked: drop the privacy overlay.
        // Ordered after the trigger to avoid revealing content for a frame
        // when a re-lock is about to happen.
        if state.is_unlocked() {
            self.set_overlay(None, &mut actions);
        }

        actions
    }

    /// The host screen is no longer interactive.
    ///
    /// Shows the privacy overlay so the task switcher cannot capture app
    /// content, unless a content overlay (failed/unavailable) is already
    /// up. Those overlays hide content on their own, and replacing them
    /// would strand the user behind a non-interactive screen: the
    /// coordinator never re-emits an equal state on resume, so the content
    /// overlay would not come back.
    pub fn on_pause(&mut self, lock_enabled: bool) -> Vec<GateAction> {
        self.resumed = false;
        let mut actions = Vec::new();

        let content_overlay_up =
            matches!(self.overlay, Some(Overlay::Failed(_) | Overlay::Unavailable(_)));
        if lock_enabled && !content_overlay_up {
            self.set_overlay(Some(Overlay::Privacy), &mut actions);
        }

        actions
    }

    /// The host screen stopped; state changes are no longer delivered.
    ///
    /// Forgets the launched attempt id so the next start can relaunch a
    /// ceremony for an attempt that is still pending.
    pub fn on_stop(&mut self) {
        self.last_attempt_id = None;
    }

    /// The host screen is going away.
    pub fn on_destroy(&mut self) -> Vec<GateAction> {
        self.last_attempt_id = None;
        let mut actions = Vec::new();
        self.set_overlay(None, &mut actions);
        actions
    }

    /// The user tapped retry on the failed overlay.
    ///
    /// Only requests a fresh attempt; the resulting `Unlocking` state flows
    /// back through [`Self::on_state_changed`] and launches the ceremony.
    pub fn on_retry_clicked(&mut self) -> Vec<GateAction> {
        vec![GateAction::EnsureUnlocked]
    }

    /// The user tapped try-again on the unavailable overlay.
    pub fn on_unavailable_retry_clicked(&mut self) -> Vec<GateAction> {
        vec![GateAction::RefreshAvailability]
    }

    /// A ceremony launched by this gate finished.
    ///
    /// `UnableToStart` while the coordinator is still `Unlocking` means
    /// another window's ceremony holds the single-flight claim; forget the
    /// attempt id so this gate can relaunch once that ceremony resolves
    /// and the state changes.
    pub fn on_auth_finished(&mut self, result: &AppLockResult, state: &AppLockState) {
        if matches!(result, Err(AppLockError::UnableToStart { .. }))
            && matches!(state, AppLockState::Unlocking { .. })
        {
            self.last_attempt_id = None;
        }
    }

    fn sync_overlay(&mut self, state: &AppLockState, actions: &mut Vec<GateAction>) {
        let desired = if state.is_unlocked() {
            None
        } else {
            Some(match state {
                AppLockState::Failed { error } => Overlay::Failed(error.clone()),
                AppLockState::Unavailable { reason } => Overlay::Unavailable(*reason),
                _ => Overlay::Privacy,
            })
        };
        self.set_overlay(desired, actions);
    }

    fn set_overlay(&mut self, desired: Option<Overlay>, actions: &mut Vec<GateAction>) {
        if self.overlay == desired {
            return;
        }
        match &desired {
            Some(overlay) => actions.push(GateAction::ShowOverlay(overlay.clone())),
            None => actions.push(GateAction::HideOverlay),
        }
        self.overlay = desired;
    }

    fn trigger_authentication(&mut self, state: &AppLockState, actions: &mut Vec<GateAction>) {
        match state {
            AppLockState::Unlocking { attempt_id } => {
                if self.last_attempt_id != Some(*attempt_id) {
                    self.last_attempt_id = Some(*attempt_id);
                    debug!(attempt_id, "launching authentication ceremony");
                    actions.push(GateAction::Authenticate { attempt_id: *attempt_id });
                }
            },
            AppLockState::Locked => actions.push(GateAction::EnsureUnlocked),
            // Failed never auto-retries (no prompt loop); Unavailable has no
            // ceremony to run; Disabled and Unlocked need nothing.
            _ => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use applock_core::UnavailableReason;

    use super::*;

    #[test]
    fn start_while_locked_covers_content() {
        let mut gate = AppLockGate::new();

        let actions = gate.on_start(&AppLockState::Locked);

        assert_eq!(actions, vec![GateAction::ShowOverlay(Overlay::Privacy)]);
    }

    #[test]
    fn unlocked_state_reveals_content() {
        let mut gate = AppLockGate::new();
        gate.on_start(&AppLockState::Locked);

        let actions = gate.on_state_changed(&AppLockState::Unlocked { last_hidden_at: None });

        assert_eq!(actions, vec![GateAction::HideOverlay]);
        assert_eq!(gate.overlay(), None);
    }

    #[test]
    fn not_resumed_never_launches_a_ceremony() {
        let mut gate = AppLockGate::new();

        let actions = gate.on_state_changed(&AppLockState::Unlocking { attempt_id: 1 });

        assert_eq!(actions, vec![GateAction::ShowOverlay(Overlay::Privacy)]);
    }

    #[test]
    fn unavailable_reason_is_displayed() {
        let mut gate = AppLockGate::new();

        let actions = gate
            .on_state_changed(&AppLockState::Unavailable { reason: UnavailableReason::NoHardware });

        assert_eq!(
            actions,
            vec![GateAction::ShowOverlay(Overlay::Unavailable(UnavailableReason::NoHardware))]
        );
    }
}
