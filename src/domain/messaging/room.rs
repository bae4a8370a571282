//! Conversation room identifiers.
//!
//! A room is the routing scope shared by exactly two identities. It has no
//! stored record of its own; it is computed from the pair:
//!
//! ```text
//! room(alice, bob) == room(bob, alice) == "alice_bob"
//! ```
//!
//! The pair is kept sorted inside the value, so equality and hashing work on
//! the participants rather than on the joined string.

use std::fmt;

use crate::domain::foundation::UserId;

/// Deterministic, order-independent identifier for a two-party conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId {
    low: UserId,
    high: UserId,
}

impl RoomId {
    /// Derives the room for a pair of identities, regardless of call order.
    pub fn for_pair(a: &UserId, b: &UserId) -> Self {
        if a <= b {
            Self {
                low: a.clone(),
                high: b.clone(),
            }
        } else {
            Self {
                low: b.clone(),
                high: a.clone(),
            }
        }
    }

    /// Both participants, lowest first.
    pub fn participants(&self) -> (&UserId, &UserId) {
        (&self.low, &self.high)
    }

    pub fn includes(&self, user_id: &UserId) -> bool {
        &self.low == user_id || &self.high == user_id
    }

    /// The other participant, or `None` if `user_id` is not in the room.
    pub fn counterpart(&self, user_id: &UserId) -> Option<&UserId> {
        if &self.low == user_id {
            Some(&self.high)
        } else if &self.high == user_id {
            Some(&self.low)
        } else {
            None
        }
    }

    /// The sorted-pair key (`"a_b"`), as sent to clients.
    pub fn key(&self) -> String {
        format!("{}_{}", self.low, self.high)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[test]
    fn room_key_is_sorted_pair() {
        let room = RoomId::for_pair(&uid("vendor-9"), &uid("customer-3"));
        assert_eq!(room.key(), "customer-3_vendor-9");
        assert_eq!(room.to_string(), room.key());
    }

    #[test]
    fn counterpart_returns_other_participant() {
        let room = RoomId::for_pair(&uid("a"), &uid("b"));
        assert_eq!(room.counterpart(&uid("a")), Some(&uid("b")));
        assert_eq!(room.counterpart(&uid("b")), Some(&uid("a")));
        assert_eq!(room.counterpart(&uid("c")), None);
    }

    #[test]
    fn includes_checks_membership() {
        let room = RoomId::for_pair(&uid("a"), &uid("b"));
        assert!(room.includes(&uid("a")));
        assert!(!room.includes(&uid("z")));
    }

    #[test]
    fn pairs_with_underscores_do_not_collide() {
        // "a_b" + "c" and "a" + "b_c" render the same key but are different rooms.
        let left = RoomId::for_pair(&uid("a_b"), &uid("c"));
        let right = RoomId::for_pair(&uid("a"), &uid("b_c"));
        assert_eq!(left.key(), right.key());
        assert_ne!(left, right);
    }

    proptest! {
        #[test]
        fn room_id_is_commutative(a in "[a-z0-9-]{1,16}", b in "[a-z0-9-]{1,16}") {
            let a = uid(&a);
            let b = uid(&b);
            prop_assert_eq!(RoomId::for_pair(&a, &b), RoomId::for_pair(&b, &a));
            prop_assert_eq!(RoomId::for_pair(&a, &b).key(), RoomId::for_pair(&b, &a).key());
        }

        #[test]
        fn room_id_contains_both_participants(a in "[a-z0-9]{1,12}", b in "[a-z0-9]{1,12}") {
            let a = uid(&a);
            let b = uid(&b);
            let room = RoomId::for_pair(&a, &b);
            prop_assert!(room.includes(&a));
            prop_assert!(room.includes(&b));
        }
    }
}
