//! # Card Screen
//!
//! The caller binding: one button that fetches the secret cards through the
//! gate. The presentation layer (CLI, HTTP, or anything else) binds to the
//! published [`ScreenState`] and never talks to the gate directly.
//!
//! ```text
//! press()
//!   └─ gate.run(required,
//!         on_succeed: data.fetch_protected_list(settle Ok(cards)),
//!         on_fail:    settle Err(reason))
//! ```
//!
//! Every press settles exactly once, through its own [`PendingPress`]. A
//! press whose continuations are dropped settles as
//! [`GateError::Abandoned`]. The published state shows the outcome of the
//! newest press that has settled; an older press settling later only
//! lowers the in-flight count.

use crate::data::DataService;
use crate::gate::SecuredGate;
use secgate_core::{Card, GateError, SecurityLevel};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, watch};

/// Outcome of a single press: the fetched cards, or why there are none.
pub type PressOutcome = Result<Vec<Card>, GateError>;

/// Observable state of the card screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenState {
    /// Cards shown on the screen. Kept from the last successful fetch.
    pub cards: Vec<Card>,
    /// Error text of the last failed press; empty when there is none.
    pub error: String,
    /// Number of presses that have not settled yet.
    pub in_flight: u32,
}

impl ScreenState {
    /// Check whether any press is still waiting on login or fetch.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    /// Check whether the screen currently shows an error.
    #[must_use]
    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }
}

/// A press that has been started but may not have settled yet.
#[derive(Debug)]
pub struct PendingPress {
    rx: oneshot::Receiver<PressOutcome>,
}

impl PendingPress {
    /// Wait for this press, and only this press, to settle.
    pub async fn wait(self) -> PressOutcome {
        self.rx.await.unwrap_or(Err(GateError::Abandoned))
    }
}

/// Settles one press. Dropping it unsettled settles the press as abandoned.
struct PressCompletion {
    seq: u64,
    state: Arc<watch::Sender<ScreenState>>,
    shown: Arc<AtomicU64>,
    tx: Mutex<Option<oneshot::Sender<PressOutcome>>>,
}

impl PressCompletion {
    fn settle(&self, outcome: PressOutcome) {
        let Some(tx) = self.tx.lock().unwrap_or_else(|e| e.into_inner()).take() else {
            return;
        };

        self.state.send_modify(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);
            // Runs under the watch lock, so the check and the store are one step.
            if self.seq < self.shown.load(Ordering::SeqCst) {
                return;
            }
            self.shown.store(self.seq, Ordering::SeqCst);
            match &outcome {
                Ok(cards) => {
                    s.cards = cards.clone();
                    s.error.clear();
                }
                Err(err) => s.error = error_text(err),
            }
        });

        let _ = tx.send(outcome);
    }
}

impl Drop for PressCompletion {
    fn drop(&mut self) {
        self.settle(Err(GateError::Abandoned));
    }
}

/// The card screen: a gate, a data source and the state they feed.
#[derive(Clone)]
pub struct CardScreen {
    gate: SecuredGate,
    data: Arc<dyn DataService>,
    required: SecurityLevel,
    state: Arc<watch::Sender<ScreenState>>,
    presses: Arc<AtomicU64>,
    shown: Arc<AtomicU64>,
}

impl std::fmt::Debug for CardScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardScreen")
            .field("gate", &self.gate)
            .field("required", &self.required)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl CardScreen {
    /// Create a screen that fetches from `data` once `required` is held.
    #[must_use]
    pub fn new(gate: SecuredGate, data: Arc<dyn DataService>, required: SecurityLevel) -> Self {
        let (state, _) = watch::channel(ScreenState::default());
        Self {
            gate,
            data,
            required,
            state: Arc::new(state),
            presses: Arc::new(AtomicU64::new(0)),
            shown: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get the gate guarding this screen.
    #[must_use]
    pub fn gate(&self) -> &SecuredGate {
        &self.gate
    }

    /// Get the level a press requires.
    #[must_use]
    pub fn required_level(&self) -> SecurityLevel {
        self.required
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> ScreenState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ScreenState> {
        self.state.subscribe()
    }

    /// The button action. Returns immediately; the outcome lands in the
    /// published state and in the returned [`PendingPress`], which may be
    /// dropped.
    pub fn press(&self) -> PendingPress {
        let seq = self.presses.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.state.send_modify(|s| {
            s.error.clear();
            s.in_flight = s.in_flight.saturating_add(1);
        });

        let (tx, rx) = oneshot::channel();
        let on_denied = Arc::new(PressCompletion {
            seq,
            state: Arc::clone(&self.state),
            shown: Arc::clone(&self.shown),
            tx: Mutex::new(Some(tx)),
        });
        let on_granted = Arc::clone(&on_denied);
        let data = Arc::clone(&self.data);

        self.gate.run(
            self.required,
            move || {
                tracing::info!(
                    event = "cards_requested",
                    press = seq,
                    "Getting secret cards"
                );
                data.fetch_protected_list(Box::new(move |cards: Vec<Card>| {
                    on_granted.settle(Ok(cards));
                }));
            },
            move |err| {
                tracing::warn!(
                    event = "cards_denied",
                    press = seq,
                    reason = %err,
                    "Couldn't request secret cards"
                );
                on_denied.settle(Err(err));
            },
        );

        PendingPress { rx }
    }

    /// Press and wait for that press to settle.
    pub async fn press_and_wait(&self) -> PressOutcome {
        self.press().wait().await
    }
}

/// Text shown to the user for a failed press.
#[must_use]
pub fn error_text(err: &GateError) -> String {
    match err {
        GateError::AuthorizationFailed { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
