//! In-memory connection registry for conversation room routing.
//!
//! Rooms are keyed by the sorted identity pair. Each identity also has an
//! implicit personal room made of all its live connections, used for
//! notifications that are not tied to a joined conversation.
//!
//! # Architecture
//!
//! ```text
//! Room: alice_bob          Personal: alice      Personal: bob
//! ├── conn-1 (alice)       ├── conn-1           ├── conn-3
//! └── conn-3 (bob)         └── conn-2           └── conn-4
//! ```
//!
//! Delivery pushes onto each connection's unbounded outbox; the socket
//! writer task drains it. Nothing here awaits.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::foundation::{ConnectionId, Identity, UserId};
use crate::domain::messaging::RoomId;
use crate::ports::{
    ConnectionRegistry, ConnectionRegistryError, ConnectionSender, DeliveryReport, Disconnected,
    OutboundEvent,
};

struct ConnectionEntry {
    identity: Identity,
    outbox: ConnectionSender,
    rooms: HashSet<RoomId>,
}

impl ConnectionEntry {
    fn deliver(&self, event: &OutboundEvent) -> bool {
        self.outbox.send(event.clone()).is_ok()
    }
}

#[derive(Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    by_identity: HashMap<UserId, HashSet<ConnectionId>>,
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
}

/// Registry of live connections, shared by every connection task.
///
/// # Thread Safety
///
/// One `RwLock` guards all three indexes so they can never disagree.
/// Broadcasts take the read lock; only register/unregister/join write.
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    state: RwLock<RegistryState>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Total live connections.
    pub fn connection_count(&self) -> usize {
        self.read().connections.len()
    }

    /// Identities with at least one live connection.
    pub fn online_count(&self) -> usize {
        self.read().by_identity.len()
    }

    /// Rooms with at least one joined connection.
    pub fn room_count(&self) -> usize {
        self.read().rooms.len()
    }

    /// Connections joined to a room.
    pub fn room_size(&self, room_id: &RoomId) -> usize {
        self.read().rooms.get(room_id).map(HashSet::len).unwrap_or(0)
    }
}

impl ConnectionRegistry for InMemoryConnectionRegistry {
    fn register(
        &self,
        connection_id: ConnectionId,
        identity: Identity,
        outbox: ConnectionSender,
    ) -> Result<(), ConnectionRegistryError> {
        let mut guard = self.write();
        let state = &mut *guard;
        if state.connections.contains_key(&connection_id) {
            return Err(ConnectionRegistryError::AlreadyRegistered(connection_id));
        }

        state
            .by_identity
            .entry(identity.id.clone())
            .or_default()
            .insert(connection_id);
        state.connections.insert(
            connection_id,
            ConnectionEntry {
                identity,
                outbox,
                rooms: HashSet::new(),
            },
        );
        Ok(())
    }

    fn unregister(&self, connection_id: &ConnectionId) -> Option<Disconnected> {
        let mut guard = self.write();
        let state = &mut *guard;
        let entry = state.connections.remove(connection_id)?;

        for room_id in &entry.rooms {
            if let Some(members) = state.rooms.get_mut(room_id) {
                members.remove(connection_id);
                if members.is_empty() {
                    state.rooms.remove(room_id);
                }
            }
        }

        let went_offline = match state.by_identity.get_mut(&entry.identity.id) {
            Some(connections) => {
                connections.remove(connection_id);
                connections.is_empty()
            }
            None => true,
        };
        if went_offline {
            state.by_identity.remove(&entry.identity.id);
        }

        Some(Disconnected {
            identity: entry.identity,
            went_offline,
        })
    }

    fn identity_of(&self, connection_id: &ConnectionId) -> Option<Identity> {
        self.read()
            .connections
            .get(connection_id)
            .map(|entry| entry.identity.clone())
    }

    fn join_room(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), ConnectionRegistryError> {
        let mut guard = self.write();
        let state = &mut *guard;
        let entry = state
            .connections
            .get_mut(connection_id)
            .ok_or(ConnectionRegistryError::NotFound(*connection_id))?;

        if entry.rooms.insert(room_id.clone()) {
            state
                .rooms
                .entry(room_id.clone())
                .or_default()
                .insert(*connection_id);
        }
        Ok(())
    }

    fn is_present_in_room(&self, user_id: &UserId, room_id: &RoomId) -> bool {
        let state = self.read();
        state.rooms.get(room_id).is_some_and(|members| {
            members.iter().any(|conn| {
                state
                    .connections
                    .get(conn)
                    .is_some_and(|entry| &entry.identity.id == user_id)
            })
        })
    }

    fn is_online(&self, user_id: &UserId) -> bool {
        self.read().by_identity.contains_key(user_id)
    }

    fn send_to_room(
        &self,
        room_id: &RoomId,
        event: &OutboundEvent,
        exclude: Option<&UserId>,
    ) -> DeliveryReport {
        let state = self.read();
        let mut report = DeliveryReport::default();

        let Some(members) = state.rooms.get(room_id) else {
            return report;
        };
        for entry in members.iter().filter_map(|conn| state.connections.get(conn)) {
            if exclude.is_some_and(|skip| &entry.identity.id == skip) {
                continue;
            }
            if entry.deliver(event) {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }

    fn send_to_identity(&self, user_id: &UserId, event: &OutboundEvent) -> DeliveryReport {
        let state = self.read();
        let mut report = DeliveryReport::default();

        let Some(connections) = state.by_identity.get(user_id) else {
            return report;
        };
        for entry in connections.iter().filter_map(|conn| state.connections.get(conn)) {
            if entry.deliver(event) {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }

    fn send_to_connection(&self, connection_id: &ConnectionId, event: &OutboundEvent) -> bool {
        self.read()
            .connections
            .get(connection_id)
            .is_some_and(|entry| entry.deliver(event))
    }
}
