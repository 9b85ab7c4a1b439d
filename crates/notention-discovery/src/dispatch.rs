//! Network dispatcher: sends a query to the network layer and collects
//! asynchronous responses over a bounded window.
//!
//! The collection window is an explicit state machine with an owned
//! cancellation token, not ambient async cancellation: `Closed` is a real
//! transition, and anything the network delivers afterwards is dropped on
//! the floor because the subscription receiver no longer exists.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::DiscoveryError;
use crate::query::DiscoveryQuery;
use crate::rank::{self, MatchResult};
use notention_engine::{NoteRecord, PublisherId};

/// The network layer could not serve a request.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct NetworkError(pub String);

/// The publish/subscribe primitive the dispatcher runs against. Implemented
/// by the real relay transport in the application; tests use an in-memory
/// channel.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Opens a subscription for notes relevant to `query`. Each delivered
    /// record carries its publisher identity. Dropping the receiver
    /// releases the subscription.
    async fn subscribe(
        &self,
        query: &DiscoveryQuery,
    ) -> Result<mpsc::Receiver<NoteRecord>, NetworkError>;

    /// Publishes a note record to the network.
    async fn publish(&self, record: NoteRecord) -> Result<(), NetworkError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The collection window elapsed (or the network layer ended the
    /// stream). Normal termination, not an error.
    Timeout,
    /// The user abandoned the session before the window elapsed.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Subscription opened, collector not yet running.
    Idle,
    Searching,
    Closed(CloseReason),
}

/// Dispatches discovery queries against a [`NetworkClient`].
pub struct Dispatcher {
    network: Arc<dyn NetworkClient>,
}

impl Dispatcher {
    pub fn new(network: Arc<dyn NetworkClient>) -> Self {
        Self { network }
    }

    /// Opens the subscription and starts collecting responses for at most
    /// `window`. Fails with [`DiscoveryError::NetworkUnavailable`] when the
    /// network layer cannot be reached; no session exists in that case.
    pub async fn dispatch(
        &self,
        query: DiscoveryQuery,
        window: Duration,
    ) -> Result<DiscoverySession, DiscoveryError> {
        let rx = self.network.subscribe(&query).await?;
        let query = Arc::new(query);
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);
        let (count_tx, count_rx) = watch::channel(0usize);
        let cancel = CancellationToken::new();

        let collector = tokio::spawn(collect(
            Arc::clone(&query),
            rx,
            window,
            cancel.clone(),
            state_tx,
            count_tx,
        ));

        Ok(DiscoverySession {
            query,
            state_rx,
            count_rx,
            cancel,
            collector,
        })
    }
}

/// One in-flight discovery search. Exclusively owns its query and the
/// candidates accumulated so far; the ranked result list produced by
/// [`DiscoverySession::finish`] is final.
#[derive(Debug)]
pub struct DiscoverySession {
    query: Arc<DiscoveryQuery>,
    state_rx: watch::Receiver<SessionState>,
    count_rx: watch::Receiver<usize>,
    cancel: CancellationToken,
    collector: JoinHandle<Vec<NoteRecord>>,
}

impl DiscoverySession {
    pub fn query(&self) -> &DiscoveryQuery {
        &self.query
    }

    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Matches accepted so far. Observable while `Searching` for the
    /// "Found N matching note(s)" progressive display.
    pub fn match_count(&self) -> usize {
        *self.count_rx.borrow()
    }

    /// A watch handle that updates as matches arrive.
    pub fn count_watch(&self) -> watch::Receiver<usize> {
        self.count_rx.clone()
    }

    /// Requests an early close. The window transitions to
    /// `Closed(Cancelled)`; results accepted before the close survive.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Abandons the session: releases the pending subscription without
    /// waiting for the window. Mutates no note state.
    pub fn abandon(self) {
        self.cancel.cancel();
    }

    /// Waits for the window to close and returns the final ranked results.
    pub async fn finish(self) -> Vec<MatchResult> {
        let candidates = match self.collector.await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!("discovery collector task failed: {err}");
                Vec::new()
            }
        };
        rank::rank(&candidates, &self.query)
    }
}

async fn collect(
    query: Arc<DiscoveryQuery>,
    mut rx: mpsc::Receiver<NoteRecord>,
    window: Duration,
    cancel: CancellationToken,
    state_tx: watch::Sender<SessionState>,
    count_tx: watch::Sender<usize>,
) -> Vec<NoteRecord> {
    let _ = state_tx.send(SessionState::Searching);
    let deadline = tokio::time::sleep(window);
    tokio::pin!(deadline);

    let mut seen: HashSet<PublisherId> = HashSet::new();
    let mut collected: Vec<NoteRecord> = Vec::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = state_tx.send(SessionState::Closed(CloseReason::Cancelled));
                break;
            }
            _ = &mut deadline => {
                let _ = state_tx.send(SessionState::Closed(CloseReason::Timeout));
                break;
            }
            delivery = rx.recv() => match delivery {
                Some(record) => {
                    if record.note_id == query.source_note {
                        continue;
                    }
                    if query.satisfied(&record.properties).is_empty() {
                        continue;
                    }
                    if !seen.insert(record.publisher.clone()) {
                        debug!("dropping repeat response from publisher {}", record.publisher);
                        continue;
                    }
                    collected.push(record);
                    let _ = count_tx.send(collected.len());
                }
                None => {
                    let _ = state_tx.send(SessionState::Closed(CloseReason::Timeout));
                    break;
                }
            }
        }
    }

    // The receiver is dropped with this task: the subscription is released
    // and late deliveries go nowhere.
    collected
}
