//! Typing indicators. Ephemeral, unauthorized, fire-and-forget.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::messaging::RoomId;
use crate::ports::{ConnectionRegistry, DeliveryReport, OutboundEvent};

pub struct TypingSignaler {
    registry: Arc<dyn ConnectionRegistry>,
}

impl TypingSignaler {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Relay `userTyping` to the room shared with `target`, skipping every
    /// connection of `sender`.
    pub fn signal(&self, sender: &UserId, target: &UserId, is_typing: bool) -> DeliveryReport {
        let room_id = RoomId::for_pair(sender, target);
        let event = OutboundEvent::UserTyping {
            user_id: sender.clone(),
            is_typing,
        };
        self.registry.send_to_room(&room_id, &event, Some(sender))
    }

    pub fn start(&self, sender: &UserId, target: &UserId) -> DeliveryReport {
        self.signal(sender, target, true)
    }

    pub fn stop(&self, sender: &UserId, target: &UserId) -> DeliveryReport {
        self.signal(sender, target, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::InMemoryConnectionRegistry;
    use crate::domain::foundation::{ConnectionId, Identity, Role};
    use tokio::sync::mpsc;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[test]
    fn typing_reaches_joined_recipient_but_not_sender_devices() {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let room = RoomId::for_pair(&uid("cust"), &uid("vend"));

        let mut joined = Vec::new();
        for identity in [
            Identity::new(uid("cust"), Role::Customer),
            Identity::new(uid("cust"), Role::Customer),
            Identity::new(uid("vend"), Role::Vendor),
        ] {
            let conn = ConnectionId::new();
            let (tx, rx) = mpsc::unbounded_channel();
            registry.register(conn, identity, tx).unwrap();
            registry.join_room(&conn, &room).unwrap();
            joined.push(rx);
        }

        let signaler = TypingSignaler::new(registry);
        let report = signaler.start(&uid("cust"), &uid("vend"));

        assert_eq!(report.delivered, 1);
        assert!(joined[0].try_recv().is_err());
        assert!(joined[1].try_recv().is_err());
        assert_eq!(
            joined[2].try_recv().unwrap(),
            OutboundEvent::UserTyping {
                user_id: uid("cust"),
                is_typing: true
            }
        );
    }

    #[test]
    fn typing_to_absent_recipient_is_silently_dropped() {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry
            .register(ConnectionId::new(), Identity::new(uid("vend"), Role::Vendor), tx)
            .unwrap();

        let signaler = TypingSignaler::new(registry);
        let report = signaler.stop(&uid("cust"), &uid("vend"));

        assert_eq!(report, DeliveryReport::default());
        assert!(rx.try_recv().is_err());
    }
}
