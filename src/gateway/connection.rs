//! Per-connection protocol state.
//!
//! # Responsibilities
//! - Track protocol state (Unidentified → Identified → Closed)
//! - Generate unique connection IDs for tracing
//! - Hold the bound identity and last heartbeat time
//! - Bounded outbound queue with close-aware, time-limited enqueue
//!
//! # Design Decisions
//! - Close is idempotent: the first reason wins, later calls are no-ops
//! - Closing publishes on a watch channel, which wakes every pending send
//!   and the socket reader/writer for this connection
//! - Session fields sit behind one mutex; frames for a connection are
//!   handled by a single task, the reaper only reads

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};

use super::protocol::CloseReason;
use crate::store::Identity;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Protocol state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolState {
    /// Accepted, waiting for IDENTIFY.
    Unidentified,
    /// Bound to an identity.
    Identified,
    /// Terminal.
    Closed,
}

/// Why an outbound message was not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("connection closed")]
    Closed,
    #[error("outbound queue stayed full past the send timeout")]
    Timeout,
    #[error("socket writer is gone")]
    Disconnected,
}

#[derive(Debug)]
struct Session {
    state: ProtocolState,
    identity: Option<Identity>,
    token: Option<String>,
    last_heartbeat: Instant,
}

/// One live gateway socket.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    session: Mutex<Session>,
    outbound: mpsc::Sender<String>,
    closed: watch::Sender<Option<CloseReason>>,
}

impl Connection {
    /// Create a connection whose outbound frames are pushed into `outbound`.
    pub fn new(outbound: mpsc::Sender<String>) -> Self {
        let (closed, _) = watch::channel(None);
        Self {
            id: ConnectionId::new(),
            session: Mutex::new(Session {
                state: ProtocolState::Unidentified,
                identity: None,
                token: None,
                last_heartbeat: Instant::now(),
            }),
            outbound,
            closed,
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().expect("connection session mutex poisoned")
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ProtocolState {
        self.session().state
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session().identity.clone()
    }

    pub fn identity_id(&self) -> Option<String> {
        self.session().identity.as_ref().map(|i| i.id.clone())
    }

    /// The access token this connection identified with.
    pub fn token(&self) -> Option<String> {
        self.session().token.clone()
    }

    pub fn last_heartbeat(&self) -> Instant {
        self.session().last_heartbeat
    }

    /// Record the token an IDENTIFY is resolving, before the lookup runs, so
    /// a concurrent revoke can find this connection. False once closed.
    pub(crate) fn claim_token(&self, token: &str) -> bool {
        let mut session = self.session();
        if session.state != ProtocolState::Unidentified {
            return false;
        }
        session.token = Some(token.to_string());
        true
    }

    /// Transition Unidentified → Identified. Returns false if the connection
    /// is closed or already identified.
    pub(crate) fn bind_identity(&self, identity: Identity, token: String) -> bool {
        let mut session = self.session();
        if session.state != ProtocolState::Unidentified {
            return false;
        }
        session.state = ProtocolState::Identified;
        session.identity = Some(identity);
        session.token = Some(token);
        true
    }

    pub(crate) fn touch_heartbeat(&self, now: Instant) {
        let mut session = self.session();
        if session.state != ProtocolState::Closed {
            session.last_heartbeat = now;
        }
    }

    /// Close the connection. Returns true only for the call that closed it.
    pub fn close(&self, reason: CloseReason) -> bool {
        {
            let mut session = self.session();
            if session.state == ProtocolState::Closed {
                return false;
            }
            session.state = ProtocolState::Closed;
        }
        self.closed.send_replace(Some(reason));
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.borrow().is_some()
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        *self.closed.borrow()
    }

    /// Resolves once the connection is closed, yielding the reason.
    pub async fn closed(&self) -> CloseReason {
        let mut rx = self.closed.subscribe();
        let reason = match rx.wait_for(Option::is_some).await {
            Ok(current) => *current,
            Err(_) => None,
        };
        reason.unwrap_or(CloseReason::TransportError)
    }

    /// Queue a serialized frame, waiting at most `timeout` for capacity.
    ///
    /// Closing the connection aborts the wait. Nothing is left running
    /// after this returns on any path.
    pub async fn enqueue(&self, payload: String, timeout: Duration) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError::Closed);
        }

        tokio::select! {
            biased;
            _ = self.closed() => Err(SendError::Closed),
            res = time::timeout(timeout, self.outbound.send(payload)) => match res {
                Ok(Ok(())) => Ok(()),
                Ok(Err(_)) => Err(SendError::Disconnected),
                Err(_) => Err(SendError::Timeout),
            },
        }
    }
}
