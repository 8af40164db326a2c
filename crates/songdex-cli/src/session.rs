//! Caller side of the search worker: debouncing and stale-result filtering.
//!
//! The worker answers every request, in order, and never drops one. A fast
//! typist therefore produces a backlog of answers to queries that no longer
//! match the input box. The session numbers each request as it is sent and
//! counts responses as they arrive; since the queue is FIFO the n-th
//! response answers the n-th request, so only the answer to the most recent
//! filter is surfaced.

use std::time::{Duration, Instant};

use songdex_core::SongRecord;
use songdex_worker::{Request, Response, SearchWorker, WorkerResult};

use crate::view::ResultsView;

/// Something the screen should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The catalog is indexed; the initial search has been sent.
    Ready { total_songs: usize },

    /// Results for the latest search.
    Results(ResultsView),
}

#[derive(Debug)]
pub struct SearchSession {
    worker: SearchWorker,
    display_cap: usize,
    debounce: Duration,
    /// Filter sent as soon as the catalog is loaded.
    initial_term: String,
    /// Requests sent so far; the n-th request has sequence number n.
    sent: u64,
    /// Responses received so far.
    received: u64,
    /// Sequence number and term of the newest filter sent.
    latest_filter: Option<(u64, String)>,
    /// Input waiting out the debounce window.
    pending: Option<(String, Instant)>,
}

impl SearchSession {
    pub fn new(worker: SearchWorker, display_cap: usize, debounce: Duration) -> Self {
        Self {
            worker,
            display_cap,
            debounce,
            initial_term: String::new(),
            sent: 0,
            received: 0,
            latest_filter: None,
            pending: None,
        }
    }

    /// Search for `term` instead of everything once the catalog is loaded.
    #[must_use]
    pub fn with_initial_term(mut self, term: impl Into<String>) -> Self {
        self.initial_term = term.into();
        self
    }

    fn send(&mut self, request: Request) -> WorkerResult<u64> {
        self.worker.send(request)?;
        self.sent += 1;
        Ok(self.sent)
    }

    /// Send the raw catalog to the worker.
    pub fn load(&mut self, songs: Vec<SongRecord>) -> WorkerResult<()> {
        self.send(Request::Load { songs })?;
        Ok(())
    }

    /// Send a filter right away, discarding any debounced input.
    pub fn search_now(&mut self, term: impl Into<String>) -> WorkerResult<()> {
        let term = term.into();
        self.pending = None;
        let seq = self.send(Request::filter(term.clone()))?;
        self.latest_filter = Some((seq, term));
        Ok(())
    }

    /// Record a keystroke; the filter is sent by [`tick`](Self::tick) once
    /// the input has been quiet for the debounce window.
    pub fn input_changed(&mut self, term: impl Into<String>, now: Instant) {
        self.pending = Some((term.into(), now + self.debounce));
    }

    /// Send debounced input whose window has elapsed.
    ///
    /// Returns `true` if a filter was sent.
    pub fn tick(&mut self, now: Instant) -> WorkerResult<bool> {
        match self.pending.take() {
            Some((term, deadline)) if deadline <= now => {
                self.search_now(term)?;
                Ok(true)
            }
            not_due => {
                self.pending = not_due;
                Ok(false)
            }
        }
    }

    /// Term of the newest filter sent, if any.
    pub fn latest_term(&self) -> Option<&str> {
        self.latest_filter.as_ref().map(|(_, term)| term.as_str())
    }

    /// Account for a worker response.
    ///
    /// Returns `None` for results that a newer filter has superseded.
    pub fn on_response(&mut self, response: Response) -> WorkerResult<Option<SessionEvent>> {
        self.received += 1;
        let seq = self.received;

        match response {
            Response::Loaded { total_songs } => {
                log::info!("Catalog ready: {} songs", total_songs);
                let term = self.initial_term.clone();
                self.search_now(term)?;
                Ok(Some(SessionEvent::Ready { total_songs }))
            }
            Response::Results { songs } => match &self.latest_filter {
                Some((latest, term)) if *latest == seq => Ok(Some(SessionEvent::Results(
                    ResultsView::new(term.clone(), songs, self.display_cap),
                ))),
                _ => {
                    log::debug!("Dropping stale results for request {}", seq);
                    Ok(None)
                }
            },
        }
    }
}
