//! Session registry and per-session transport for the HTTP/SSE relay.
//!
//! One logical MCP session is split across two physical HTTP flows: a
//! long-lived SSE stream carrying server-to-client frames, and short-lived
//! POSTs carrying client-to-server messages. The pieces here correlate the
//! two: [`SessionTransport`] owns the channel pair backing one session and
//! is what the protocol server is attached to, while [`SessionRegistry`]
//! maps session identifiers to the cloneable [`SessionHandle`] that the
//! message endpoint uses to deliver POSTed payloads.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::{PoisonError, RwLock};

use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};
use rmcp::transport::Transport;
use rmcp::RoleServer;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Client-to-server queue depth per session.
const INBOUND_BUFFER: usize = 16;

/// Server-to-client queue depth per session.
const OUTBOUND_BUFFER: usize = 64;

/// Generate a fresh opaque session identifier.
#[must_use]
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Registration failure returned by [`SessionRegistry::register`].
#[derive(Debug)]
pub enum SessionError {
    /// The identifier is already registered. Identifier generation is
    /// supposed to make this impossible; hitting it is an internal defect.
    Duplicate(String),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate(id) => write!(f, "duplicate session id: {id}"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Failure while delivering a POSTed message into a session.
#[derive(Debug)]
pub enum DeliveryError {
    /// The body was not a parseable JSON-RPC client message.
    Parse(serde_json::Error),
    /// The session's inbound queue is gone (teardown in flight).
    Closed,
}

impl Display for DeliveryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid message body: {err}"),
            Self::Closed => write!(f, "session channel closed"),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Cloneable delivery handle for one session, held by the registry.
///
/// Carries the inbound sender the message endpoint pushes POSTed messages
/// through, plus the session's cancellation token so shutdown paths can
/// end the session without reaching into the serve task.
#[derive(Clone)]
pub struct SessionHandle {
    to_server: mpsc::Sender<ClientJsonRpcMessage>,
    ct: CancellationToken,
}

impl SessionHandle {
    /// Parse `body` as one client JSON-RPC message and queue it for the
    /// protocol server attached to this session.
    ///
    /// Suspends while the inbound queue is full; never touches the registry.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Parse`] for an unparseable body and
    /// [`DeliveryError::Closed`] when the session is tearing down.
    pub async fn deliver(&self, body: &str) -> Result<(), DeliveryError> {
        let message: ClientJsonRpcMessage =
            serde_json::from_str(body).map_err(DeliveryError::Parse)?;
        self.to_server
            .send(message)
            .await
            .map_err(|_| DeliveryError::Closed)
    }

    /// Cancellation token scoped to this session.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.ct
    }
}

/// Duplex transport backing one session, attached to the protocol server.
///
/// Implements [`rmcp::transport::Transport`] over a pair of bounded
/// channels: inbound messages arrive from the message endpoint via the
/// session's [`SessionHandle`], outbound messages drain into the SSE
/// response stream through the receiver returned by [`SessionTransport::new`].
pub struct SessionTransport {
    session_id: String,
    outbound: mpsc::Sender<ServerJsonRpcMessage>,
    inbound: mpsc::Receiver<ClientJsonRpcMessage>,
}

impl SessionTransport {
    /// Build the channel pair backing one session.
    ///
    /// Returns the transport to attach to the protocol server, the handle
    /// to register, and the outbound receiver the SSE stream drains.
    #[must_use]
    pub fn new(
        session_id: String,
        ct: CancellationToken,
    ) -> (
        Self,
        SessionHandle,
        mpsc::Receiver<ServerJsonRpcMessage>,
    ) {
        let (to_server, inbound) = mpsc::channel(INBOUND_BUFFER);
        let (outbound, from_server) = mpsc::channel(OUTBOUND_BUFFER);
        let transport = Self {
            session_id,
            outbound,
            inbound,
        };
        let handle = SessionHandle { to_server, ct };
        (transport, handle, from_server)
    }

    /// Identifier of the session this transport belongs to.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Transport<RoleServer> for SessionTransport {
    type Error = std::io::Error;

    fn send(
        &mut self,
        item: ServerJsonRpcMessage,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        let outbound = self.outbound.clone();
        async move {
            outbound.send(item).await.map_err(|_| {
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sse stream closed")
            })
        }
    }

    fn receive(&mut self) -> impl Future<Output = Option<ClientJsonRpcMessage>> + Send {
        self.inbound.recv()
    }

    fn close(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send {
        self.inbound.close();
        std::future::ready(Ok(()))
    }
}

/// Process-wide map from session identifier to live [`SessionHandle`].
///
/// Constructed once at server startup and shared through the router state;
/// all mutation goes through [`register`](Self::register) and
/// [`remove`](Self::remove), everything else only reads via
/// [`lookup`](Self::lookup). No await happens while the lock is held.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Duplicate`] when `id` is already present;
    /// an existing entry is never overwritten.
    pub fn register(&self, id: &str, handle: SessionHandle) -> Result<(), SessionError> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match sessions.entry(id.to_owned()) {
            Entry::Occupied(_) => Err(SessionError::Duplicate(id.to_owned())),
            Entry::Vacant(slot) => {
                slot.insert(handle);
                Ok(())
            }
        }
    }

    /// Look up the delivery handle for `id`.
    ///
    /// A miss is an expected outcome (stale or bogus identifiers from
    /// clients), not a fault.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<SessionHandle> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Remove `id`, returning whether it was present.
    ///
    /// Idempotent: removing an absent identifier is a no-op, so racing
    /// cleanup paths are harmless.
    pub fn remove(&self, id: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    /// Number of currently open sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no sessions are open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
