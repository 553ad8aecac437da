//! Property-based tests over random operation sequences.
//!
//! Generates arbitrary interleavings of lifecycle signals, UI intents, and
//! ceremony resolutions and checks the coordinator's global invariants
//! after every step:
//!
//! - single-flight: while `Unlocking`, a second `ensure_unlocked` returns
//!   `false` and produces no new attempt id;
//! - attempt ids are strictly increasing;
//! - fail-closed: only `Unlocked` and `Disabled` report unlocked.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use applock_core::{
    AppLockConfig, AppLockCoordinator, AppLockError, AppLockState, Availability, Clock,
    MemoryConfigRepository, UnavailableReason,
};
use proptest::prelude::*;

#[derive(Clone)]
struct FakeAvailability(Arc<AtomicBool>);

impl Availability for FakeAvailability {
    fn probe(&self) -> Result<(), UnavailableReason> {
        if self.0.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(UnavailableReason::TemporarilyUnavailable)
        }
    }
}

#[derive(Clone, Default)]
struct FakeClock(Arc<AtomicU64>);

impl Clock for FakeClock {
    fn elapsed_millis(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// One step of a randomized scenario.
#[derive(Debug, Clone)]
enum Op {
    Foreground,
    Background,
    ScreenOff,
    LockNow,
    EnsureUnlocked,
    Enable { timeout_millis: u64 },
    Disable,
    RefreshAvailability,
    FlipAvailability,
    AdvanceTime { millis: u64 },
    ResolveSuccess,
    ResolveInterrupted,
    ResolveFailed,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Foreground),
        Just(Op::Background),
        Just(Op::ScreenOff),
        Just(Op::LockNow),
        Just(Op::EnsureUnlocked),
        (0u64..120_000).prop_map(|timeout_millis| Op::Enable { timeout_millis }),
        Just(Op::Disable),
        Just(Op::RefreshAvailability),
        Just(Op::FlipAvailability),
        (0u64..120_000).prop_map(|millis| Op::AdvanceTime { millis }),
        Just(Op::ResolveSuccess),
        Just(Op::ResolveInterrupted),
        Just(Op::ResolveFailed),
    ]
}

proptest! {
    #[test]
    fn invariants_hold_for_all_operation_sequences(
        start_enabled in any::<bool>(),
        ops in prop::collection::vec(op_strategy(), 1..100),
    ) {
        let available = Arc::new(AtomicBool::new(true));
        let clock = FakeClock::default();
        let config = if start_enabled {
            AppLockConfig::enabled(Duration::from_millis(1000))
        } else {
            AppLockConfig::default()
        };
        let mut subject = AppLockCoordinator::new(
            MemoryConfigRepository::new(config),
            FakeAvailability(Arc::clone(&available)),
            clock.clone(),
        );

        // Ceremony the driver has claimed but not yet resolved.
        let mut pending: Option<u64> = None;
        let mut max_attempt_id = 0u64;

        for op in ops {
            match op {
                Op::Foreground => subject.on_app_foregrounded(),
                Op::Background => subject.on_app_backgrounded(),
                Op::ScreenOff => subject.on_screen_off(),
                Op::LockNow => subject.lock_now(),
                Op::EnsureUnlocked => {
                    let started = subject.ensure_unlocked();
                    if started
                        && pending.is_none()
                        && let Ok(attempt_id) = subject.begin_authentication()
                    {
                        pending = Some(attempt_id);
                    }
                },
                Op::Enable { timeout_millis } => subject.on_settings_changed(
                    AppLockConfig::enabled(Duration::from_millis(timeout_millis)),
                ),
                Op::Disable => subject.on_settings_changed(AppLockConfig::default()),
                Op::RefreshAvailability => subject.refresh_availability(),
                Op::FlipAvailability => {
                    let current = available.load(Ordering::Relaxed);
                    available.store(!current, Ordering::Relaxed);
                },
                Op::AdvanceTime { millis } => {
                    clock.0.fetch_add(millis, Ordering::Relaxed);
                },
                Op::ResolveSuccess => {
                    if let Some(attempt_id) = pending.take() {
                        subject.finish_authentication(attempt_id, Ok(()));
                    }
                },
                Op::ResolveInterrupted => {
                    if let Some(attempt_id) = pending.take() {
                        subject.finish_authentication(attempt_id, Err(AppLockError::Interrupted));
                    }
                },
                Op::ResolveFailed => {
                    if let Some(attempt_id) = pending.take() {
                        subject.finish_authentication(attempt_id, Err(AppLockError::Failed));
                    }
                },
            }

            let state = subject.state();

            // Fail-closed: only Unlocked and Disabled grant access.
            match &state {
                AppLockState::Unlocked { .. } | AppLockState::Disabled => {
                    prop_assert!(state.is_unlocked());
                },
                _ => prop_assert!(!state.is_unlocked()),
            }

            // Attempt ids never decrease; a fresh attempt gets a larger id.
            if let AppLockState::Unlocking { attempt_id } = state {
                prop_assert!(attempt_id >= max_attempt_id);
                max_attempt_id = attempt_id;

                // Single-flight: a second request never spawns a new attempt.
                prop_assert!(!subject.ensure_unlocked());
                prop_assert_eq!(subject.state(), AppLockState::Unlocking { attempt_id });
            }
        }
    }
}
