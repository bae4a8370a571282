//! WebSocket adapters for real-time chat.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  frames   ┌─────────────────┐  handler calls  ┌──────────────────┐
//! │   Client     │ ────────▶ │ FrameDispatcher │ ──────────────▶ │ application      │
//! │  (browser)   │           │  (reader task)  │                 │ handlers         │
//! └──────────────┘           └─────────────────┘                 └──────────────────┘
//!        ▲                                                                │
//!        │ JSON                                                 send_to_room /
//!        │                                                      send_to_identity
//! ┌──────────────┐   outbox   ┌─────────────────────────────┐             │
//! │ writer task  │ ◀───────── │ InMemoryConnectionRegistry  │ ◀───────────┘
//! └──────────────┘            └─────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`registry`] - Connection, presence and room membership tracking
//! - [`handler`] - Axum WebSocket upgrade handler and frame dispatch

pub mod handler;
pub mod messages;
pub mod registry;

pub use handler::{websocket_router, ws_handler, ConnectParams, FrameDispatcher, WebSocketState};
pub use messages::{ClientMessage, ControlMessage, ServerMessage};
pub use registry::InMemoryConnectionRegistry;
