//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, identity)
//! - `messaging` - Rooms, messages, conversation summaries and notifications

pub mod foundation;
pub mod messaging;
