//! Debounced, cancellable suggestion fetches keyed by the selected juror.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use venire_types::JurorId;

use crate::{SuggestClient, SuggestionContext, Suggestions};

/// A finished fetch, tagged with the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionResult {
    pub generation: u64,
    pub juror: JurorId,
    pub suggestions: Suggestions,
}

/// Runs at most one suggestion fetch at a time.
///
/// Each [`request`](Self::request) bumps the generation and aborts the
/// previous task. Results travel over a channel and [`accept`](Self::accept)
/// discards any whose generation or juror is no longer current, so a slow
/// answer for an earlier selection cannot overwrite a newer one.
pub struct SuggestionScheduler {
    client: SuggestClient,
    debounce: Duration,
    generation: u64,
    current: Option<JurorId>,
    in_flight: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<SuggestionResult>,
    rx: mpsc::UnboundedReceiver<SuggestionResult>,
}

impl SuggestionScheduler {
    #[must_use]
    pub fn new(client: SuggestClient) -> Self {
        let debounce = client.settings().debounce;
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            debounce,
            generation: 0,
            current: None,
            in_flight: None,
            tx,
            rx,
        }
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn current_juror(&self) -> Option<JurorId> {
        self.current
    }

    /// Schedule a fetch for `juror` after the debounce interval, superseding
    /// anything pending. Must be called within a tokio runtime.
    pub fn request(&mut self, juror: JurorId, context: SuggestionContext) -> u64 {
        self.abort_in_flight();
        self.generation += 1;
        self.current = Some(juror);

        let generation = self.generation;
        let debounce = self.debounce;
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
            }
            let suggestions = client.suggest(&context).await;
            // Receiver dropped means the scheduler is gone.
            let _ = tx.send(SuggestionResult {
                generation,
                juror,
                suggestions,
            });
        }));
        tracing::debug!(juror = juror.value(), generation, "Scheduled suggestion fetch");
        generation
    }

    /// Drop any pending fetch; later results are ignored.
    pub fn cancel(&mut self) {
        self.abort_in_flight();
        self.generation += 1;
        self.current = None;
    }

    /// `Some` only for the result of the latest request.
    #[must_use]
    pub fn accept(&self, result: SuggestionResult) -> Option<Suggestions> {
        if result.generation != self.generation || Some(result.juror) != self.current {
            tracing::debug!(
                juror = result.juror.value(),
                generation = result.generation,
                current = self.generation,
                "Dropping superseded suggestions"
            );
            return None;
        }
        Some(result.suggestions)
    }

    /// Wait for the current request's suggestions. Returns `None` when
    /// nothing is pending.
    pub async fn next(&mut self) -> Option<Suggestions> {
        self.current?;
        loop {
            let result = self.rx.recv().await?;
            if let Some(suggestions) = self.accept(result) {
                self.in_flight = None;
                return Some(suggestions);
            }
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for SuggestionScheduler {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}
