//! HTTP/SSE transport for browser and HTTP-only MCP clients.
//!
//! One logical duplex session is split across two HTTP flows: `GET /sse`
//! opens the long-lived outbound stream, and `POST /messages` carries one
//! client message per request, correlated by the `sessionId` query
//! parameter the server hands out in the stream's first event.
//!
//! The connect handler registers a fresh session and spawns its serve
//! task; the message handler resolves the session and queues the payload.
//! Teardown is bound to the SSE response stream: dropping it (client
//! disconnect, network failure, shutdown) cancels the session and releases
//! its registry entry.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use futures_util::stream::{self, Stream, StreamExt};
use rmcp::service::ServiceExt;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::handler::{AppState, RelayServer};
use super::session::{new_session_id, DeliveryError, SessionRegistry, SessionTransport};
use crate::{AppError, Result};

/// Streaming-connect endpoint path.
const SSE_PATH: &str = "/sse";

/// Message endpoint path echoed to clients in the `endpoint` event.
const MESSAGE_PATH: &str = "/messages";

/// Shared state for the HTTP/SSE transport routes.
#[derive(Clone)]
struct RelayState {
    app: Arc<AppState>,
    registry: Arc<SessionRegistry>,
    ct: CancellationToken,
}

/// Handler for `GET /health` — returns 200 OK with a plain-text body.
///
/// Useful for probing liveness without initiating an SSE or MCP session.
async fn health() -> &'static str {
    "ok"
}

/// Query parameters accepted by the message endpoint.
#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Removes the session and cancels its serve task when the owning SSE
/// response stream is dropped, whichever exit path closed the connection.
struct SessionCleanup {
    registry: Arc<SessionRegistry>,
    session_id: String,
    ct: CancellationToken,
}

impl Drop for SessionCleanup {
    fn drop(&mut self) {
        self.ct.cancel();
        if self.registry.remove(&self.session_id) {
            info!(session_id = %self.session_id, "SSE connection closed");
        }
    }
}

/// SSE event stream for one session; owns the session's cleanup guard.
struct SessionStream<S> {
    inner: S,
    _cleanup: SessionCleanup,
}

impl<S> Stream for SessionStream<S>
where
    S: Stream + Unpin,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}

/// Handler for `GET /sse` — open a new session and its outbound stream.
///
/// Registers the session before the response starts streaming, so the
/// identifier a client reads from the `endpoint` event is always already
/// resolvable by the message endpoint.
async fn sse_connect(State(relay): State<RelayState>) -> Response {
    if relay.registry.len() >= relay.app.config.max_sessions {
        warn!(
            max_sessions = relay.app.config.max_sessions,
            "session capacity reached; refusing connect"
        );
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "maximum session count reached",
        )
            .into_response();
    }

    let session_id = new_session_id();
    let session_ct = relay.ct.child_token();
    let (transport, handle, from_server) =
        SessionTransport::new(session_id.clone(), session_ct.clone());

    if let Err(err) = relay.registry.register(&session_id, handle) {
        // Identifier generation guarantees uniqueness among live sessions;
        // a collision is an internal defect, not a client error.
        error!(%err, "session registration failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "session registration failed",
        )
            .into_response();
    }
    info!(%session_id, "SSE connection established");

    // One task per session: attaches the protocol server to the transport
    // and lives until the session ends, faults, or is cancelled.
    let server = RelayServer::new(Arc::clone(&relay.app));
    let registry = Arc::clone(&relay.registry);
    let serve_id = session_id.clone();
    let serve_ct = session_ct.clone();
    tokio::spawn(async move {
        match server.serve_with_ct(transport, serve_ct).await {
            Ok(running) => {
                if let Err(err) = running.waiting().await {
                    warn!(session_id = %serve_id, %err, "session ended with error");
                }
            }
            Err(err) => {
                warn!(session_id = %serve_id, %err, "session handshake failed");
            }
        }
        if registry.remove(&serve_id) {
            debug!(session_id = %serve_id, "session removed after serve task exit");
        }
    });

    let cleanup = SessionCleanup {
        registry: Arc::clone(&relay.registry),
        session_id: session_id.clone(),
        ct: session_ct,
    };

    // First frame tells the client where to POST; every subsequent frame
    // is one server-to-client JSON-RPC message.
    let endpoint = stream::once(std::future::ready(Ok::<_, axum::Error>(
        Event::default()
            .event("endpoint")
            .data(format!("{MESSAGE_PATH}?sessionId={session_id}")),
    )));
    let messages = ReceiverStream::new(from_server)
        .map(|message| Event::default().event("message").json_data(&message));

    let stream = SessionStream {
        inner: endpoint.chain(messages),
        _cleanup: cleanup,
    };

    Sse::new(stream)
        .keep_alive(
            KeepAlive::new().interval(Duration::from_secs(relay.app.config.keep_alive_seconds)),
        )
        .into_response()
}

/// Handler for `POST /messages` — route one client message to its session.
///
/// Never mutates the registry; a miss is an expected outcome for late,
/// retried, or expired requests.
async fn post_message(
    State(relay): State<RelayState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    // Missing or empty identifier: reject before touching the registry.
    let Some(session_id) = query.session_id.filter(|id| !id.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            "missing sessionId query parameter",
        )
            .into_response();
    };

    let Some(handle) = relay.registry.lookup(&session_id) else {
        debug!(%session_id, "no active session for posted message");
        return (
            StatusCode::BAD_REQUEST,
            "no active session for sessionId",
        )
            .into_response();
    };

    match handle.deliver(&body).await {
        // Processing happens asynchronously; replies arrive on the stream.
        Ok(()) => (StatusCode::ACCEPTED, "Accepted").into_response(),
        Err(err @ DeliveryError::Parse(_)) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Err(err @ DeliveryError::Closed) => {
            warn!(%session_id, %err, "message delivery failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Start the HTTP/SSE MCP transport on the configured address.
///
/// Each SSE connection creates a fresh [`RelayServer`] sharing the same
/// [`AppState`]. The session registry lives for the duration of this call
/// and is reachable only through the router state.
///
/// # Errors
///
/// Returns `AppError::Config` if the server fails to bind and
/// `AppError::Mcp` if serving fails.
pub async fn serve_sse(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let bind = state.config.socket_addr()?;
    let relay = RelayState {
        app: state,
        registry: Arc::new(SessionRegistry::new()),
        ct: ct.clone(),
    };

    let router = Router::new()
        .route(SSE_PATH, get(sse_connect))
        .route(MESSAGE_PATH, post(post_message))
        .route("/health", get(health))
        .with_state(relay);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind SSE on {bind}: {err}")))?;

    info!(%bind, "starting HTTP/SSE MCP transport");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            ct.cancelled().await;
        })
        .await
        .map_err(|err| AppError::Mcp(format!("SSE server error: {err}")))?;

    info!("HTTP/SSE MCP transport shut down");
    Ok(())
}
