//! WebSocket upgrade handler for real-time chat connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Resolve the bearer credential to an identity (401 before upgrade on failure)
//! 2. Upgrade and register the connection
//! 3. Writer task drains the connection's outbox into the socket
//! 4. Reader task dispatches inbound frames one at a time
//! 5. Unregister on disconnect, dropping every room membership

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::adapters::http::middleware::bearer_token;
use crate::application::handlers::messaging::{
    ConnectionHandler, JoinConversationCommand, JoinConversationHandler, SendMessageCommand,
    SendMessageHandler, TypingSignaler,
};
use crate::domain::foundation::{ConnectionId, Identity, Timestamp, UserId};
use crate::domain::messaging::MessagingError;
use crate::ports::{ConnectionRegistry, OutboundEvent};

use super::messages::{error_event, malformed_frame, ClientMessage, ControlMessage, ServerMessage};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub connections: Arc<ConnectionHandler>,
    pub registry: Arc<dyn ConnectionRegistry>,
    pub join: Arc<JoinConversationHandler>,
    pub send: Arc<SendMessageHandler>,
    pub typing: Arc<TypingSignaler>,
}

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    /// Fallback for browsers, which cannot set headers on a WebSocket.
    pub token: Option<String>,
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws`
///
/// The credential comes from `Authorization: Bearer` or `?token=`. Identity
/// resolution completes before the upgrade, so a refused client never
/// reaches the registry.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(params): Query<ConnectParams>,
    State(state): State<WebSocketState>,
) -> Response {
    let token = bearer_token(&headers)
        .map(str::to_string)
        .or(params.token);

    let Some(token) = token else {
        return unauthorized();
    };

    match state.connections.authenticate(&token).await {
        Ok(identity) => ws.on_upgrade(move |socket| handle_socket(socket, identity, state)),
        Err(_) => unauthorized(),
    }
}

fn unauthorized() -> Response {
    let error = MessagingError::AuthenticationFailed;
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": error.to_string(),
            "code": error.code()
        })),
    )
        .into_response()
}

/// Handle an established WebSocket connection.
///
/// Runs for the lifetime of the connection.
async fn handle_socket(socket: WebSocket, identity: Identity, state: WebSocketState) {
    let (mut sink, mut stream) = socket.split();
    let (outbox, mut events) = mpsc::unbounded_channel::<OutboundEvent>();
    let (control_tx, mut control) = mpsc::unbounded_channel::<ControlMessage>();

    let connection_id = match state.connections.attach(identity.clone(), outbox) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(user_id = %identity.id, error = %e, "Failed to register connection");
            return;
        }
    };

    let connected = ControlMessage::Connected {
        connection_id: connection_id.to_string(),
        user_id: identity.id.to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
    };
    if let Err(e) = send_frame(&mut sink, &connected.into()).await {
        tracing::debug!(connection_id = %connection_id, "Failed to send connected message: {}", e);
        state.connections.detach(&connection_id);
        return;
    }

    // Writer: outbox and control frames, in arrival order per channel.
    let mut send_task = tokio::spawn(async move {
        loop {
            let frame: ServerMessage = tokio::select! {
                Some(event) = events.recv() => event.into(),
                Some(ctrl) = control.recv() => ctrl.into(),
                else => break,
            };
            if let Err(e) = send_frame(&mut sink, &frame).await {
                tracing::debug!(connection_id = %connection_id, "Send error, closing connection: {}", e);
                break;
            }
        }
    });

    // Reader: one frame at a time, which keeps each sender's messages in order.
    let dispatcher = FrameDispatcher::new(connection_id, identity, state.clone(), control_tx);
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            match result {
                Ok(Message::Text(text)) => dispatcher.handle_text(&text).await,
                Ok(Message::Binary(_)) => {
                    tracing::warn!(
                        connection_id = %dispatcher.connection_id,
                        "Received unsupported binary message"
                    );
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %dispatcher.connection_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(connection_id = %dispatcher.connection_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.connections.detach(&connection_id);
}

/// Send a JSON frame over the WebSocket.
async fn send_frame(
    sink: &mut SplitSink<WebSocket, Message>,
    frame: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(frame).map_err(axum::Error::new)?;
    sink.send(Message::Text(json)).await
}

/// Maps inbound frames of one connection onto handler calls.
///
/// Replies to the caller go through the registry to this connection only.
pub struct FrameDispatcher {
    connection_id: ConnectionId,
    identity: Identity,
    state: WebSocketState,
    control: mpsc::UnboundedSender<ControlMessage>,
}

impl FrameDispatcher {
    pub fn new(
        connection_id: ConnectionId,
        identity: Identity,
        state: WebSocketState,
        control: mpsc::UnboundedSender<ControlMessage>,
    ) -> Self {
        Self {
            connection_id,
            identity,
            state,
            control,
        }
    }

    pub async fn handle_text(&self, text: &str) {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => self.dispatch(message).await,
            Err(e) => {
                tracing::debug!(connection_id = %self.connection_id, "Malformed frame: {}", e);
                self.reply(malformed_frame(e));
            }
        }
    }

    pub async fn dispatch(&self, message: ClientMessage) {
        match message {
            ClientMessage::JoinConversation { other_user_id } => {
                let other_id = match self.parse_user(other_user_id) {
                    Some(id) => id,
                    None => return,
                };
                let cmd = JoinConversationCommand {
                    connection_id: self.connection_id,
                    other_id,
                };
                match self.state.join.handle(cmd).await {
                    Ok(joined) => self.reply(OutboundEvent::JoinedConversation {
                        room_id: joined.room_id.key(),
                    }),
                    Err(e) => self.reply(error_event(&e)),
                }
            }
            ClientMessage::SendMessage {
                receiver_id,
                content,
                kind,
                attachments,
            } => {
                let receiver_id = match self.parse_user(receiver_id) {
                    Some(id) => id,
                    None => return,
                };
                let cmd = SendMessageCommand {
                    sender: self.identity.clone(),
                    receiver_id,
                    content,
                    kind,
                    attachments,
                };
                if let Err(e) = self.state.send.handle(cmd).await {
                    self.reply(error_event(&e));
                }
            }
            ClientMessage::TypingStart { receiver_id } => {
                if let Ok(target) = UserId::new(receiver_id) {
                    self.state.typing.start(&self.identity.id, &target);
                }
            }
            ClientMessage::TypingStop { receiver_id } => {
                if let Ok(target) = UserId::new(receiver_id) {
                    self.state.typing.stop(&self.identity.id, &target);
                }
            }
            ClientMessage::Ping => {
                let _ = self.control.send(ControlMessage::Pong {
                    timestamp: Timestamp::now().to_rfc3339(),
                });
            }
        }
    }

    /// Parses a client-supplied user id, replying with `messageError` if invalid.
    fn parse_user(&self, raw: String) -> Option<UserId> {
        match UserId::new(raw) {
            Ok(id) => Some(id),
            Err(e) => {
                self.reply(error_event(&MessagingError::InvalidMessage(e)));
                None
            }
        }
    }

    fn reply(&self, event: OutboundEvent) {
        if !self.state.registry.send_to_connection(&self.connection_id, &event) {
            tracing::debug!(connection_id = %self.connection_id, "Reply dropped, connection closing");
        }
    }
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws", get(ws_handler))
}
