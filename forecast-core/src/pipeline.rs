//! The forecast query pipeline: text input, debounced trigger, fetch,
//! classification.
//!
//! [`QueryState`] is the single owner of the current query and its outcome.
//! Every edit bumps a sequence number; timer firings and fetch completions
//! carry the sequence they were issued for and are ignored once a newer edit
//! has happened. [`Session`] wires the state to a [`Debouncer`] and a
//! [`ForecastSource`], all driven from one task.

use std::{sync::Arc, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;

use crate::{debounce::Debouncer, outcome::QueryOutcome, provider::ForecastSource};

/// What the caller must do after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// The query is blank; drop any pending work.
    Cleared,
    /// Arm the debounce timer for this sequence.
    Schedule(u64),
}

#[derive(Debug, Default)]
pub struct QueryState {
    query: String,
    outcome: QueryOutcome,
    latest: u64,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn outcome(&self) -> &QueryOutcome {
        &self.outcome
    }

    /// Sequence number of the most recent edit.
    pub fn latest(&self) -> u64 {
        self.latest
    }

    pub fn edit(&mut self, text: impl Into<String>) -> Edit {
        self.query = text.into();
        self.latest += 1;

        if self.query.trim().is_empty() {
            self.outcome = QueryOutcome::Empty;
            Edit::Cleared
        } else {
            self.outcome = QueryOutcome::Loading;
            Edit::Schedule(self.latest)
        }
    }

    /// The city to fetch once the timer for `seq` fires, if `seq` is still current.
    pub fn settle(&self, seq: u64) -> Option<String> {
        let city = self.query.trim();
        (seq == self.latest && !city.is_empty()).then(|| city.to_string())
    }

    /// Apply a finished fetch. Returns `false` when a newer edit superseded it.
    pub fn complete(&mut self, seq: u64, outcome: QueryOutcome) -> bool {
        if seq != self.latest {
            return false;
        }
        self.outcome = outcome;
        true
    }
}

#[derive(Debug)]
enum Event {
    Settled { seq: u64 },
    Completed { seq: u64, outcome: QueryOutcome },
}

/// Result of one [`Session::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A debounce window elapsed and a request was started.
    FetchStarted,
    /// A request finished and its outcome is now current.
    Updated,
    /// The event belonged to a superseded edit and was dropped.
    Stale,
}

#[derive(Debug)]
pub struct Session {
    state: QueryState,
    source: Arc<dyn ForecastSource>,
    debouncer: Debouncer,
    in_flight: Option<JoinHandle<()>>,
    fetches: u64,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
}

impl Session {
    pub fn new(source: Arc<dyn ForecastSource>, window: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            state: QueryState::new(),
            source,
            debouncer: Debouncer::new(window),
            in_flight: None,
            fetches: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn query(&self) -> &str {
        self.state.query()
    }

    pub fn outcome(&self) -> &QueryOutcome {
        self.state.outcome()
    }

    /// Number of requests started so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetches
    }

    pub fn is_debouncing(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Replace the query text. Must be called from within a tokio runtime.
    pub fn input(&mut self, text: impl Into<String>) {
        match self.state.edit(text) {
            Edit::Cleared => {
                let cancelled = self.debouncer.cancel();
                self.abort_in_flight();
                debug!(cancelled, "query cleared");
            }
            Edit::Schedule(seq) => {
                let tx = self.events_tx.clone();
                self.debouncer.schedule(async move {
                    let _ = tx.send(Event::Settled { seq });
                });
                debug!(seq, query = self.state.query(), "fetch scheduled");
            }
        }
    }

    /// Wait for the next timer firing or fetch completion and apply it.
    ///
    /// Cancel-safe: dropping the future before it resolves loses no event.
    pub async fn step(&mut self) -> Option<Step> {
        let event = self.events_rx.recv().await?;
        Some(self.apply(event))
    }

    /// Drive the session until the outcome is no longer `Loading`.
    pub async fn settle(&mut self) -> &QueryOutcome {
        while self.state.outcome().is_loading() {
            if self.step().await.is_none() {
                break;
            }
        }
        self.state.outcome()
    }

    fn apply(&mut self, event: Event) -> Step {
        match event {
            Event::Settled { seq } => match self.state.settle(seq) {
                Some(city) => {
                    self.start_fetch(seq, city);
                    Step::FetchStarted
                }
                None => {
                    debug!(seq, latest = self.state.latest(), "dropping stale timer");
                    Step::Stale
                }
            },
            Event::Completed { seq, outcome } => {
                if self.state.complete(seq, outcome) {
                    self.in_flight = None;
                    Step::Updated
                } else {
                    debug!(seq, latest = self.state.latest(), "dropping stale response");
                    Step::Stale
                }
            }
        }
    }

    fn start_fetch(&mut self, seq: u64, city: String) {
        self.abort_in_flight();
        self.fetches += 1;
        debug!(seq, city = %city, "fetch started");

        let source = Arc::clone(&self.source);
        let tx = self.events_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = QueryOutcome::from_fetch(source.fetch(&city).await);
            let _ = tx.send(Event::Completed { seq, outcome });
        }));
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}
