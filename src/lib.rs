//! Booking Chat - booking-gated real-time messaging.
//!
//! Customers and vendors who share a booking can exchange messages over a
//! WebSocket. Messages are persisted before they are broadcast; recipients
//! who are not watching the conversation get a durable notification and,
//! when online, a live badge update.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
