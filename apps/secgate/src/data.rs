//! # Data Service
//!
//! The protected resource behind the gate: a list of card numbers.
//!
//! [`SimulatedCardService`] waits a fixed delay and then delivers the fixed
//! list from [`PROTECTED_CARDS`]. It has no failure path.

use secgate_core::{Card, DEFAULT_FETCH_DELAY_MS, GateError, PROTECTED_CARDS};
use std::time::Duration;
use tokio::sync::oneshot;

/// Receives the fetched cards.
pub type OnFetched = Box<dyn FnOnce(Vec<Card>) + Send + 'static>;

/// A source of the protected card list.
///
/// Implementations must return immediately and run `on_fetched` later,
/// exactly once.
pub trait DataService: Send + Sync {
    /// Fetch the protected list and hand it to `on_fetched`.
    fn fetch_protected_list(&self, on_fetched: OnFetched);
}

/// Await a fetch instead of passing a continuation.
///
/// Returns [`GateError::Abandoned`] if the service drops the continuation.
pub async fn fetch_async(service: &dyn DataService) -> Result<Vec<Card>, GateError> {
    let (tx, rx) = oneshot::channel();
    service.fetch_protected_list(Box::new(move |cards: Vec<Card>| {
        let _ = tx.send(cards);
    }));
    rx.await.map_err(|_| GateError::Abandoned)
}

/// Card service stand-in: fixed delay, fixed two-card payload.
#[derive(Debug, Clone)]
pub struct SimulatedCardService {
    delay: Duration,
}

impl Default for SimulatedCardService {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_FETCH_DELAY_MS))
    }
}

impl SimulatedCardService {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl DataService for SimulatedCardService {
    /// Must be called from within a Tokio runtime.
    fn fetch_protected_list(&self, on_fetched: OnFetched) {
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let cards: Vec<Card> = PROTECTED_CARDS.iter().map(|c| Card::new(*c)).collect();
            tracing::debug!(event = "cards_fetched", count = cards.len());
            on_fetched(cards);
        });
    }
}
