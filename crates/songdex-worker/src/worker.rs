//! The search worker task.
//!
//! One tokio task owns a [`WorkerState`] and drains a single request queue,
//! answering each request on the response queue before taking the next.
//! That gives in-order, exactly-once delivery. The worker does not drop or
//! merge stale requests: callers that only want the latest answer must
//! debounce before sending or discard superseded responses themselves.

use songdex_core::{build_index, query, CatalogIndex, SongRecord};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::error::{WorkerError, WorkerResult};
use crate::protocol::{Request, Response};

/// Everything the worker owns: the current catalog index.
///
/// Starts empty, so a filter before the first load answers with no songs.
/// A load replaces the index wholesale; nothing else writes to it.
#[derive(Debug, Default)]
pub struct WorkerState {
    index: CatalogIndex,
}

impl WorkerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of songs in the current index.
    pub fn total_songs(&self) -> usize {
        self.index.len()
    }

    /// Run one request to completion and produce its response.
    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::Load { songs } => {
                self.index = build_index(&songs);
                log::info!("Search index built: {} songs", self.index.len());
                Response::Loaded {
                    total_songs: self.index.len(),
                }
            }
            Request::Filter { term } => {
                let songs = query(&self.index, &term);
                log::debug!("Filter {:?} matched {} songs", term, songs.len());
                Response::Results { songs }
            }
        }
    }
}

/// Caller side of the request queue.
///
/// Sending never blocks or awaits. Dropping the handle closes the queue and
/// lets the worker task finish.
#[derive(Debug)]
pub struct SearchWorker {
    requests: UnboundedSender<Request>,
    task: JoinHandle<()>,
}

impl SearchWorker {
    /// Queue a request.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Disconnected`] if the worker has stopped.
    pub fn send(&self, request: Request) -> WorkerResult<()> {
        log::trace!("Sending {} request", request.kind());
        self.requests
            .send(request)
            .map_err(|_| WorkerError::Disconnected)
    }

    /// Queue a catalog load.
    pub fn load(&self, songs: Vec<SongRecord>) -> WorkerResult<()> {
        self.send(Request::Load { songs })
    }

    /// Queue a filter for `term`.
    pub fn filter(&self, term: impl Into<String>) -> WorkerResult<()> {
        self.send(Request::filter(term))
    }

    /// Close the request queue and wait for the worker to drain it.
    ///
    /// Requests already queued are still answered.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Failed`] if the task panicked or was aborted.
    pub async fn shutdown(self) -> WorkerResult<()> {
        let Self { requests, task } = self;
        drop(requests);
        task.await.map_err(|e| WorkerError::Failed(e.to_string()))
    }
}

/// Caller side of the response queue.
#[derive(Debug)]
pub struct ResponseStream {
    responses: UnboundedReceiver<Response>,
}

impl ResponseStream {
    /// Wait for the next response.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Disconnected`] once the worker has stopped and
    /// every queued response has been received.
    pub async fn recv(&mut self) -> WorkerResult<Response> {
        self.responses.recv().await.ok_or(WorkerError::Disconnected)
    }

    /// Take the next response if one is ready, without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Disconnected`] once the worker has stopped and
    /// the queue is drained.
    pub fn try_recv(&mut self) -> WorkerResult<Option<Response>> {
        match self.responses.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }
}

/// Start a search worker on the current tokio runtime.
///
/// # Errors
///
/// Returns [`WorkerError::Runtime`] when called outside a tokio runtime.
pub fn spawn() -> WorkerResult<(SearchWorker, ResponseStream)> {
    let runtime = Handle::try_current().map_err(|e| WorkerError::Runtime(e.to_string()))?;

    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (response_tx, response_rx) = mpsc::unbounded_channel();
    let task = runtime.spawn(run(WorkerState::new(), request_rx, response_tx));

    Ok((
        SearchWorker {
            requests: request_tx,
            task,
        },
        ResponseStream {
            responses: response_rx,
        },
    ))
}

async fn run(
    mut state: WorkerState,
    mut requests: UnboundedReceiver<Request>,
    responses: UnboundedSender<Response>,
) {
    log::debug!("Search worker started");

    while let Some(request) = requests.recv().await {
        let response = state.handle(request);
        if responses.send(response).is_err() {
            log::debug!("Response stream dropped, stopping search worker");
            break;
        }
    }

    log::debug!("Search worker stopped ({} songs indexed)", state.total_songs());
}
