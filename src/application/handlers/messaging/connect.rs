//! Connection lifecycle: admit, register, and tear down client connections.

use std::sync::Arc;

use crate::domain::foundation::{ConnectionId, Identity};
use crate::domain::messaging::MessagingError;
use crate::ports::{ConnectionRegistry, ConnectionRegistryError, ConnectionSender, Disconnected};

use super::IdentityResolver;

/// Handles the implicit `connect` and `disconnect` client events.
///
/// Authentication happens before any registry state exists, so a refused
/// client never leaves an entry behind.
pub struct ConnectionHandler {
    resolver: Arc<IdentityResolver>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl ConnectionHandler {
    pub fn new(resolver: Arc<IdentityResolver>, registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { resolver, registry }
    }

    /// Verify the credential. No side effects.
    pub async fn authenticate(&self, token: &str) -> Result<Identity, MessagingError> {
        self.resolver.resolve(token).await
    }

    /// Register an authenticated connection. Its personal room is live from here on.
    pub fn attach(
        &self,
        identity: Identity,
        outbox: ConnectionSender,
    ) -> Result<ConnectionId, ConnectionRegistryError> {
        let connection_id = ConnectionId::new();
        let user_id = identity.id.clone();
        self.registry.register(connection_id, identity, outbox)?;

        tracing::info!(connection_id = %connection_id, user_id = %user_id, "Client connected");
        Ok(connection_id)
    }

    /// Drop the connection and every room membership it held.
    pub fn detach(&self, connection_id: &ConnectionId) -> Option<Disconnected> {
        let disconnected = self.registry.unregister(connection_id);

        match &disconnected {
            Some(d) => tracing::info!(
                connection_id = %connection_id,
                user_id = %d.identity.id,
                went_offline = d.went_offline,
                "Client disconnected"
            ),
            None => tracing::debug!(connection_id = %connection_id, "Disconnect for unknown connection"),
        }

        disconnected
    }
}
