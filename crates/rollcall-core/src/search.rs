// ── Search-as-you-type coordination ──
//
// Each submitted term gets a monotonically increasing sequence number and
// waits out the debounce window. A newer term cancels the pending wait, so
// superseded terms never reach the network. Once a call is in flight it
// runs to completion, but its result is only published if no call with a
// higher sequence number has been published already.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use rollcall_api::{DEFAULT_FALLBACK_MESSAGE, Outcome};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type SearchFn<T> = Arc<dyn Fn(String) -> BoxFuture<'static, Outcome<T>> + Send + Sync>;

/// Where the coordinator is in its Idle → Scheduled → InFlight cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    /// A term is waiting out the debounce window.
    Scheduled,
    /// At least one call is running and nothing newer is waiting.
    InFlight,
}

/// A published search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<T> {
    pub term: String,
    /// Issuance order of the call that produced this result.
    pub seq: u64,
    pub outcome: Outcome<T>,
}

/// Latest published result, or `None` before the first one lands.
pub type SearchSnapshot<T> = Option<Arc<SearchResult<T>>>;

#[derive(Default)]
struct State {
    issued: u64,
    applied: u64,
    pending: Option<CancellationToken>,
    in_flight: usize,
}

impl State {
    fn phase(&self) -> SearchPhase {
        if self.pending.is_some() {
            SearchPhase::Scheduled
        } else if self.in_flight > 0 {
            SearchPhase::InFlight
        } else {
            SearchPhase::Idle
        }
    }
}

struct Inner<T> {
    search: SearchFn<T>,
    debounce: Duration,
    state: Mutex<State>,
    results: watch::Sender<SearchSnapshot<T>>,
    phase: watch::Sender<SearchPhase>,
}

impl<T> Inner<T> {
    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Debounces search terms and keeps only the freshest result.
///
/// One coordinator serves one search field. [`submit`](Self::submit) must
/// be called from within a Tokio runtime. Dropping the coordinator cancels
/// any term still waiting out its debounce window.
pub struct QueryCoordinator<T> {
    inner: Arc<Inner<T>>,
    shutdown: CancellationToken,
}

impl<T: Send + Sync + 'static> QueryCoordinator<T> {
    pub fn new<F, Fut>(debounce: Duration, search: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome<T>> + Send + 'static,
    {
        let (results, _) = watch::channel(None);
        let (phase, _) = watch::channel(SearchPhase::Idle);
        Self {
            inner: Arc::new(Inner {
                search: Arc::new(move |term: String| search(term).boxed()),
                debounce,
                state: Mutex::new(State::default()),
                results,
                phase,
            }),
            shutdown: CancellationToken::new(),
        }
    }

    /// Record a new term. Cancels whatever term is still waiting and
    /// restarts the debounce window. Returns the term's sequence number.
    pub fn submit(&self, term: impl Into<String>) -> u64 {
        let term = term.into();
        let token = self.shutdown.child_token();
        let seq = {
            let mut state = self.inner.lock();
            if let Some(previous) = state.pending.replace(token.clone()) {
                previous.cancel();
            }
            state.issued += 1;
            self.inner.phase.send_replace(state.phase());
            state.issued
        };
        debug!(seq, %term, "search term scheduled");
        tokio::spawn(run(Arc::clone(&self.inner), term, seq, token));
        seq
    }

    /// Drop the waiting term, if any. Calls already in flight still finish.
    pub fn cancel(&self) {
        let mut state = self.inner.lock();
        if let Some(pending) = state.pending.take() {
            pending.cancel();
        }
        self.inner.phase.send_replace(state.phase());
    }

    pub fn phase(&self) -> SearchPhase {
        *self.inner.phase.borrow()
    }

    pub fn latest(&self) -> SearchSnapshot<T> {
        self.inner.results.borrow().clone()
    }

    /// Watch published results as they land.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot<T>> {
        self.inner.results.subscribe()
    }

    /// Wait until nothing is scheduled or in flight.
    pub async fn settled(&self) {
        let mut phase = self.inner.phase.subscribe();
        // The sender lives in `inner`, which `self` keeps alive.
        let _ = phase.wait_for(|p| *p == SearchPhase::Idle).await;
    }
}

impl<T> Drop for QueryCoordinator<T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl<T> fmt::Debug for QueryCoordinator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("QueryCoordinator")
            .field("debounce", &self.inner.debounce)
            .field("issued", &state.issued)
            .field("applied", &state.applied)
            .field("phase", &state.phase())
            .finish_non_exhaustive()
    }
}

async fn run<T: Send + Sync + 'static>(
    inner: Arc<Inner<T>>,
    term: String,
    seq: u64,
    token: CancellationToken,
) {
    tokio::select! {
        biased;
        () = token.cancelled() => {
            debug!(seq, "search term superseded before debounce elapsed");
            return;
        }
        () = tokio::time::sleep(inner.debounce) => {}
    }

    {
        let mut state = inner.lock();
        // `submit` cancels under this lock, so this check cannot race it.
        if token.is_cancelled() {
            return;
        }
        state.pending = None;
        state.in_flight += 1;
        inner.phase.send_replace(state.phase());
    }

    debug!(seq, %term, "search issued");
    let call = AssertUnwindSafe(async { (inner.search)(term.clone()).await });
    let outcome = call.catch_unwind().await.unwrap_or_else(|_| {
        warn!(seq, %term, "search call panicked");
        Outcome::error(DEFAULT_FALLBACK_MESSAGE)
    });

    let mut state = inner.lock();
    state.in_flight -= 1;
    if seq > state.applied {
        state.applied = seq;
        inner
            .results
            .send_replace(Some(Arc::new(SearchResult { term, seq, outcome })));
    } else {
        warn!(seq, applied = state.applied, "discarding stale search result");
    }
    inner.phase.send_replace(state.phase());
}
