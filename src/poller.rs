//! Background polling of `GET /api/search/status` while a search runs.
//!
//! [`SearchPoller::spawn`] starts a task that sleeps for the interval, asks
//! for the status, reports it, and reschedules itself until the backend says
//! the search is no longer running. The only other way to end it is
//! [`SearchPoller::stop`], which the user triggers by dismissing the
//! progress display. Leaving a view does not stop it.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{Backend, SearchStatus};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Something the poller observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    Progress(SearchStatus),
    /// A status request failed; polling continues.
    Failed(String),
}

/// How a poller ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEnd {
    /// The backend reported the search as finished.
    Finished(SearchStatus),
    /// Stopped by the user before the search finished.
    Stopped,
}

pub struct SearchPoller {
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<PollEnd>,
}

impl SearchPoller {
    pub fn spawn<B>(backend: B, interval: Duration) -> (Self, mpsc::UnboundedReceiver<PollEvent>)
    where
        B: Backend + Send + Sync + 'static,
    {
        let (stop_tx, stop_rx) = oneshot::channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(poll_loop(backend, interval, stop_rx, events_tx));
        (
            Self {
                stop: Some(stop_tx),
                handle,
            },
            events_rx,
        )
    }

    /// Cancel the pending tick and wait for the task to end.
    pub async fn stop(mut self) -> PollEnd {
        if let Some(stop) = self.stop.take() {
            // Already gone if the task finished on its own.
            let _ = stop.send(());
        }
        self.join().await
    }

    pub async fn join(self) -> PollEnd {
        self.handle.await.unwrap_or(PollEnd::Stopped)
    }
}

async fn poll_loop<B: Backend>(
    backend: B,
    interval: Duration,
    mut stop: oneshot::Receiver<()>,
    events: mpsc::UnboundedSender<PollEvent>,
) -> PollEnd {
    loop {
        tokio::select! {
            _ = &mut stop => {
                debug!("search polling stopped");
                return PollEnd::Stopped;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        match backend.search_status().await {
            Ok(status) => {
                let running = status.running;
                let _ = events.send(PollEvent::Progress(status.clone()));
                if !running {
                    debug!(found = status.found, added = status.added, "search finished");
                    return PollEnd::Finished(status);
                }
            }
            Err(err) => {
                warn!(error = %err, "search status poll failed");
                let _ = events.send(PollEvent::Failed(err.to_string()));
            }
        }
    }
}
