use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tokio::sync::{mpsc, watch};

use crate::api::SearchService;
use crate::sequence::{Event, Outcome, Sequence, Step};
use crate::state::{AppState, OrchestrationStatus, Phase};

pub const INDEX_FAILED_MESSAGE: &str = "Failed to index the site.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Index,
    Search,
    Unexpected,
}

/// A transient, user-facing failure report.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: FailureKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    fn new(kind: FailureKind) -> Self {
        let message = match kind {
            FailureKind::Index => INDEX_FAILED_MESSAGE,
            FailureKind::Search | FailureKind::Unexpected => GENERIC_FAILURE_MESSAGE,
        };
        Self {
            kind,
            message: message.to_string(),
            raised_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// URL or query blank after trimming.
    InvalidInput,
    /// Another run is in flight.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Skipped(SkipReason),
    Searched { results: usize },
    /// The search finished after a newer run started; its results were dropped.
    Superseded { results: usize },
    Failed(FailureKind),
}

/// Single owner of [`AppState`].
///
/// Every mutation (input fields, status, results, expansion) goes through
/// the watch sender, so subscribers always observe a consistent snapshot.
/// At most one index-and-search run is in flight; overlapping calls are
/// refused rather than queued.
pub struct Orchestrator<S> {
    service: S,
    state: watch::Sender<AppState>,
    notices: mpsc::UnboundedSender<Notification>,
}

impl<S: SearchService> Orchestrator<S> {
    pub fn new(service: S) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (state, _) = watch::channel(AppState::default());
        let (notices, notices_rx) = mpsc::unbounded_channel();
        let orchestrator = Self {
            service,
            state,
            notices,
        };
        (orchestrator, notices_rx)
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> OrchestrationStatus {
        self.state.borrow().status
    }

    pub fn set_url(&self, url: &str) {
        self.state.send_if_modified(|s| {
            if s.input.url() == url {
                return false;
            }
            s.input.set_url(url);
            true
        });
    }

    pub fn set_query(&self, query: &str) {
        self.state.send_if_modified(|s| {
            if s.input.query() == query {
                return false;
            }
            s.input.set_query(query);
            true
        });
    }

    /// Both fields filled in and nothing running.
    pub fn submit_enabled(&self) -> bool {
        let s = self.state.borrow();
        s.input.submit_enabled() && !s.status.is_running()
    }

    pub fn toggle_expansion(&self, index: usize) -> bool {
        self.state.send_if_modified(|s| s.store.toggle_expansion(index))
    }

    /// Runs index-and-search with the current input fields.
    pub async fn submit(&self) -> RunOutcome {
        let (url, query) = {
            let s = self.state.borrow();
            (s.input.url().to_string(), s.input.query().to_string())
        };
        self.run_index_and_search(&url, &query).await
    }

    pub async fn run_index_and_search(&self, url: &str, query: &str) -> RunOutcome {
        let Some((seq, step)) = Sequence::start(url, query) else {
            log::debug!("skipping run: url or query is blank");
            return RunOutcome::Skipped(SkipReason::InvalidInput);
        };
        let Some(generation) = self.claim() else {
            log::info!("skipping run for {url:?}: another run is in flight");
            return RunOutcome::Skipped(SkipReason::Busy);
        };
        log::info!("run {generation}: indexing {:?}, then searching {:?}", seq.url(), seq.query());

        // Settles the status even if this future is dropped mid-flight.
        let _guard = SettleGuard {
            state: &self.state,
            generation,
        };

        let outcome = match AssertUnwindSafe(self.drive(generation, seq, step))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => Outcome::Unexpected(panic_message(panic.as_ref())),
        };
        self.finish(generation, outcome)
    }

    /// Marks a new run as started, unless one is already running.
    fn claim(&self) -> Option<u64> {
        let mut claimed = None;
        self.state.send_if_modified(|s| {
            if s.status.is_running() {
                return false;
            }
            s.generation += 1;
            s.status = OrchestrationStatus::Running(Phase::Indexing);
            claimed = Some(s.generation);
            true
        });
        claimed
    }

    async fn drive(&self, generation: u64, mut seq: Sequence, mut step: Step) -> Outcome {
        loop {
            if let Some(phase) = seq.phase() {
                self.enter_phase(generation, phase);
            }
            let event = match step {
                Step::Index { url } => Event::Indexed(self.service.index(&url).await),
                Step::Search { query } => Event::Searched(self.service.search(&query).await),
                Step::Finish(outcome) => return outcome,
            };
            step = seq.advance(event);
        }
    }

    fn enter_phase(&self, generation: u64, phase: Phase) {
        self.state.send_if_modified(|s| {
            let next = OrchestrationStatus::Running(phase);
            if s.generation != generation || s.status == next {
                return false;
            }
            s.status = next;
            true
        });
    }

    fn finish(&self, generation: u64, outcome: Outcome) -> RunOutcome {
        match outcome {
            Outcome::Searched(results) => {
                let count = results.len();
                let applied = self.state.send_if_modified(|s| {
                    if s.generation != generation {
                        return false;
                    }
                    s.store.replace(results);
                    s.status = OrchestrationStatus::Idle;
                    true
                });
                if applied {
                    log::info!("run {generation}: showing {count} results");
                    RunOutcome::Searched { results: count }
                } else {
                    log::warn!("run {generation}: dropping {count} stale results");
                    RunOutcome::Superseded { results: count }
                }
            }
            Outcome::IndexFailed(e) => {
                log::error!("run {generation}: indexing failed: {e}");
                self.fail(generation, FailureKind::Index)
            }
            Outcome::SearchFailed(e) => {
                log::error!("run {generation}: search failed: {e}");
                self.fail(generation, FailureKind::Search)
            }
            Outcome::Unexpected(reason) => {
                log::error!("run {generation}: aborted: {reason}");
                self.fail(generation, FailureKind::Unexpected)
            }
        }
    }

    fn fail(&self, generation: u64, kind: FailureKind) -> RunOutcome {
        settle(&self.state, generation);
        let notification = Notification::new(kind);
        if let Err(e) = self.notices.send(notification) {
            log::warn!("nobody is listening for notifications: {:?}", e.0.message);
        }
        RunOutcome::Failed(kind)
    }
}

/// Returns `generation`'s run to `Idle`; a no-op once it already settled.
fn settle(state: &watch::Sender<AppState>, generation: u64) {
    state.send_if_modified(|s| {
        if s.generation != generation || !s.status.is_running() {
            return false;
        }
        s.status = OrchestrationStatus::Idle;
        true
    });
}

struct SettleGuard<'a> {
    state: &'a watch::Sender<AppState>,
    generation: u64,
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        settle(self.state, self.generation);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}
