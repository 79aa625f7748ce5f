//! # Secured-Action Gate
//!
//! The single entry point privileged actions go through.
//!
//! ```text
//! run(required, on_succeed, on_fail)
//!   │
//!   ├─ policy.satisfies(store.get(), required) ──► on_succeed()   (same call)
//!   │
//!   └─ login.attempt(required)
//!         ├─ ok   ──► store.promote(required) ──► on_succeed()
//!         └─ err  ──► on_fail(err)                (store untouched)
//! ```
//!
//! Exactly one of the two continuations runs per call. The gate never
//! suspends itself: it either resolves before `run` returns or hands the
//! request to the login service.

use crate::continuation::Continuations;
use crate::login::LoginService;
use secgate_core::{GateError, LevelPolicy, LevelStore, SecurityLevel};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Runs actions behind a required security level.
#[derive(Clone)]
pub struct SecuredGate {
    store: LevelStore,
    login: Arc<dyn LoginService>,
    policy: LevelPolicy,
}

impl std::fmt::Debug for SecuredGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecuredGate")
            .field("current", &self.store.get())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl SecuredGate {
    /// Create a gate over `store` that logs in through `login`.
    #[must_use]
    pub fn new(store: LevelStore, login: Arc<dyn LoginService>) -> Self {
        Self {
            store,
            login,
            policy: LevelPolicy::default(),
        }
    }

    /// Replace the level comparison policy.
    #[must_use]
    pub fn with_policy(mut self, policy: LevelPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get the level store this gate reads and promotes.
    #[must_use]
    pub fn store(&self) -> &LevelStore {
        &self.store
    }

    /// Get the current level.
    #[must_use]
    pub fn current_level(&self) -> SecurityLevel {
        self.store.get()
    }

    /// Get the comparison policy.
    #[must_use]
    pub fn policy(&self) -> LevelPolicy {
        self.policy
    }

    /// Run `on_succeed` once `required` is held, logging in first if needed.
    ///
    /// If the current level already satisfies `required`, `on_succeed` runs
    /// before this returns and the login service is not called. Otherwise
    /// a login for `required` is started; on success the store is set to
    /// `required` before `on_succeed` runs, on failure `on_fail` receives
    /// the reason and the store is left as it was.
    pub fn run(
        &self,
        required: SecurityLevel,
        on_succeed: impl FnOnce() + Send + 'static,
        on_fail: impl FnOnce(GateError) + Send + 'static,
    ) {
        let current = self.store.get();

        if self.policy.satisfies(current, required) {
            tracing::info!(
                event = "gate_satisfied",
                required = %required,
                current = %current,
                "Already {} secure, go ahead",
                current
            );
            on_succeed();
            return;
        }

        tracing::info!(
            event = "gate_login_required",
            required = %required,
            current = %current,
            policy = %self.policy,
            "Not {} secure, opening auth page",
            required
        );

        let store = self.store.clone();
        let continuations = Continuations::new(on_succeed, move |err: GateError| {
            tracing::warn!(
                event = "gate_denied",
                required = %required,
                reason = %err,
                "Couldn't authorize for {} secure",
                required
            );
            on_fail(err);
        })
        .before_success(move || {
            let previous = store.promote(required);
            tracing::info!(
                event = "gate_promoted",
                from = %previous,
                to = %required,
                "Security level promoted"
            );
        });

        self.login.attempt(required, continuations);
    }

    /// Await the gate instead of passing continuations.
    ///
    /// Returns [`GateError::Abandoned`] if the login service drops the
    /// request without resolving it.
    pub async fn run_async(&self, required: SecurityLevel) -> Result<(), GateError> {
        let (tx, rx) = oneshot::channel();
        let ok_slot: OutcomeSlot = Arc::new(Mutex::new(Some(tx)));
        let fail_slot = Arc::clone(&ok_slot);

        self.run(
            required,
            move || send_once(&ok_slot, Ok(())),
            move |err| send_once(&fail_slot, Err(err)),
        );

        rx.await.unwrap_or(Err(GateError::Abandoned))
    }
}

type OutcomeSlot = Arc<Mutex<Option<oneshot::Sender<Result<(), GateError>>>>>;

fn send_once(slot: &OutcomeSlot, outcome: Result<(), GateError>) {
    let taken = slot.lock().unwrap_or_else(|e| e.into_inner()).take();
    if let Some(tx) = taken {
        let _ = tx.send(outcome);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::login::{LoginOutcomes, SimulatedLogin};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// Which continuation ran, and the store level it saw when it ran.
    #[derive(Debug, PartialEq)]
    enum Outcome {
        Succeeded(SecurityLevel),
        Failed(GateError),
    }

    /// Login fake with a fixed answer that counts attempts.
    struct ScriptedLogin {
        succeed: bool,
        attempts: AtomicUsize,
    }

    impl ScriptedLogin {
        fn new(succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                succeed,
                attempts: AtomicUsize::new(0),
            })
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    impl LoginService for ScriptedLogin {
        fn attempt(&self, required: SecurityLevel, continuations: Continuations) {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let succeed = self.succeed;
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                if succeed {
                    continuations.succeed();
                } else {
                    continuations.fail(GateError::authorization_failed(required));
                }
            });
        }
    }

    /// Login fake that loses every request.
    struct BlackHoleLogin;

    impl LoginService for BlackHoleLogin {
        fn attempt(&self, _required: SecurityLevel, continuations: Continuations) {
            drop(continuations);
        }
    }

    /// Run the gate and return a receiver that yields every continuation
    /// that fired, then closes once neither can fire any more.
    fn run_recorded(
        gate: &SecuredGate,
        required: SecurityLevel,
    ) -> mpsc::UnboundedReceiver<Outcome> {
        let (tx, rx) = mpsc::unbounded_channel();
        let fail_tx = tx.clone();
        let store = gate.store().clone();
        gate.run(
            required,
            move || {
                let _ = tx.send(Outcome::Succeeded(store.get()));
            },
            move |e| {
                let _ = fail_tx.send(Outcome::Failed(e));
            },
        );
        rx
    }

    async fn settle(mut rx: mpsc::UnboundedReceiver<Outcome>) -> Vec<Outcome> {
        let mut out = Vec::new();
        while let Some(o) = rx.recv().await {
            out.push(o);
        }
        out
    }

    fn gate_at(level: SecurityLevel, login: Arc<dyn LoginService>) -> SecuredGate {
        SecuredGate::new(LevelStore::new(level), login)
    }

    #[tokio::test]
    async fn exactly_one_continuation_for_every_pair() {
        for current in SecurityLevel::ALL {
            for required in SecurityLevel::ALL {
                for succeed in [true, false] {
                    let gate = gate_at(current, ScriptedLogin::new(succeed));
                    let outcomes = settle(run_recorded(&gate, required)).await;
                    assert_eq!(
                        outcomes.len(),
                        1,
                        "current={current} required={required} succeed={succeed}"
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn matching_level_succeeds_synchronously_without_login() {
        let login = ScriptedLogin::new(false);
        let gate = gate_at(SecurityLevel::Semi, login.clone());

        let mut rx = run_recorded(&gate, SecurityLevel::Semi);

        // Already delivered before any await point.
        assert_eq!(
            rx.try_recv().ok(),
            Some(Outcome::Succeeded(SecurityLevel::Semi))
        );
        assert_eq!(login.attempts(), 0);
        assert_eq!(gate.current_level(), SecurityLevel::Semi);
    }

    #[tokio::test]
    async fn successful_login_promotes_before_success_runs() {
        let login = ScriptedLogin::new(true);
        let gate = gate_at(SecurityLevel::None, login.clone());

        let outcomes = settle(run_recorded(&gate, SecurityLevel::Full)).await;

        assert_eq!(outcomes, vec![Outcome::Succeeded(SecurityLevel::Full)]);
        assert_eq!(gate.current_level(), SecurityLevel::Full);
        assert_eq!(login.attempts(), 1);
    }

    #[tokio::test]
    async fn failed_login_leaves_store_unchanged() {
        let gate = gate_at(SecurityLevel::None, ScriptedLogin::new(false));

        let outcomes = settle(run_recorded(&gate, SecurityLevel::Semi)).await;

        assert_eq!(
            outcomes,
            vec![Outcome::Failed(GateError::authorization_failed(
                SecurityLevel::Semi
            ))]
        );
        assert_eq!(gate.current_level(), SecurityLevel::None);
    }

    #[tokio::test]
    async fn second_run_after_success_takes_fast_path() {
        for required in SecurityLevel::ALL {
            let login = ScriptedLogin::new(true);
            let start = if required == SecurityLevel::None {
                SecurityLevel::Full
            } else {
                SecurityLevel::None
            };
            let gate = gate_at(start, login.clone());

            settle(run_recorded(&gate, required)).await;
            let mut rx = run_recorded(&gate, required);

            assert_eq!(rx.try_recv().ok(), Some(Outcome::Succeeded(required)));
            assert_eq!(login.attempts(), 1);
        }
    }

    #[tokio::test]
    async fn exact_policy_does_not_treat_full_as_semi() {
        let login = ScriptedLogin::new(true);
        let gate = gate_at(SecurityLevel::Full, login.clone());

        let outcomes = settle(run_recorded(&gate, SecurityLevel::Semi)).await;

        // A login happened and the level moved down to the one just granted.
        assert_eq!(login.attempts(), 1);
        assert_eq!(outcomes, vec![Outcome::Succeeded(SecurityLevel::Semi)]);
    }

    #[tokio::test]
    async fn at_least_policy_accepts_higher_level() {
        let login = ScriptedLogin::new(false);
        let gate =
            gate_at(SecurityLevel::Full, login.clone()).with_policy(LevelPolicy::AtLeast);

        let mut rx = run_recorded(&gate, SecurityLevel::Semi);

        assert_eq!(
            rx.try_recv().ok(),
            Some(Outcome::Succeeded(SecurityLevel::Full))
        );
        assert_eq!(login.attempts(), 0);
        assert_eq!(gate.current_level(), SecurityLevel::Full);
    }

    #[tokio::test]
    async fn run_async_reports_both_outcomes() {
        let gate = gate_at(SecurityLevel::Semi, ScriptedLogin::new(false));

        assert_eq!(gate.run_async(SecurityLevel::Semi).await, Ok(()));
        assert_eq!(
            gate.run_async(SecurityLevel::Full).await,
            Err(GateError::authorization_failed(SecurityLevel::Full))
        );
    }

    #[tokio::test]
    async fn run_async_dropped_request_is_abandoned() {
        let gate = gate_at(SecurityLevel::None, Arc::new(BlackHoleLogin));

        assert_eq!(
            gate.run_async(SecurityLevel::Semi).await,
            Err(GateError::Abandoned)
        );
        assert_eq!(gate.current_level(), SecurityLevel::None);
    }

    // -------------------------------------------------------------------------
    // Scenarios against the simulated login (2 s, full fails, semi succeeds)
    // -------------------------------------------------------------------------

    fn simulated_gate(level: SecurityLevel) -> SecuredGate {
        gate_at(level, Arc::new(SimulatedLogin::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_semi_store_semi_request() {
        let gate = simulated_gate(SecurityLevel::Semi);
        let mut rx = run_recorded(&gate, SecurityLevel::Semi);

        assert_eq!(
            rx.try_recv().ok(),
            Some(Outcome::Succeeded(SecurityLevel::Semi))
        );
        assert_eq!(gate.current_level(), SecurityLevel::Semi);
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_semi_store_full_request_fails() {
        let gate = simulated_gate(SecurityLevel::Semi);
        let started = tokio::time::Instant::now();

        let outcomes = settle(run_recorded(&gate, SecurityLevel::Full)).await;

        assert_eq!(
            outcomes,
            vec![Outcome::Failed(GateError::authorization_failed(
                SecurityLevel::Full
            ))]
        );
        assert_eq!(gate.current_level(), SecurityLevel::Semi);
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_none_store_semi_request_then_repeat() {
        let gate = simulated_gate(SecurityLevel::None);

        let mut rx = run_recorded(&gate, SecurityLevel::Semi);
        assert!(rx.try_recv().is_err());
        assert_eq!(
            settle(rx).await,
            vec![Outcome::Succeeded(SecurityLevel::Semi)]
        );
        assert_eq!(gate.current_level(), SecurityLevel::Semi);

        let mut again = run_recorded(&gate, SecurityLevel::Semi);
        assert_eq!(
            again.try_recv().ok(),
            Some(Outcome::Succeeded(SecurityLevel::Semi))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn configured_outcomes_flow_through_gate() {
        let login = SimulatedLogin::new(Duration::from_millis(10), LoginOutcomes::always_succeed());
        let gate = gate_at(SecurityLevel::Semi, Arc::new(login));

        assert_eq!(gate.run_async(SecurityLevel::Full).await, Ok(()));
        assert_eq!(gate.current_level(), SecurityLevel::Full);
    }
}
