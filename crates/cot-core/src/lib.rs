//! Broadcast engine for call-of-telegram.
//!
//! Resolves a public group, enumerates its members, filters them down to
//! reachable users and delivers one message to each, waiting for the delivery
//! outcome before moving on. The chat-protocol client lives behind the
//! [`ports::ChatService`] port, implemented in adapter crates.

pub mod broadcast;
pub mod config;
pub mod confirmation;
pub mod dispatch;
pub mod domain;
pub mod eligibility;
pub mod errors;
pub mod logging;
pub mod members;
pub mod pacing;
pub mod ports;
pub mod resolver;

#[cfg(test)]
pub(crate) mod fakes;

pub use broadcast::{Broadcaster, GroupOutcome};
pub use errors::{Error, Result};
