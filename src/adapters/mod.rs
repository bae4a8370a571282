//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the messaging core to external systems:
//! - `auth` - Bearer token verification (HS256 JWT) and test doubles
//! - `http` - REST endpoints and the auth middleware
//! - `memory` - In-memory stores for tests and local development
//! - `postgres` - PostgreSQL stores
//! - `websocket` - Client protocol, socket tasks and the connection registry

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod websocket;
