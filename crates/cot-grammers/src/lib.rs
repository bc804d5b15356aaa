//! MTProto adapter for `cot-core`, built on grammers.
//!
//! [`TelegramSession`] owns the connection and the signed-in session file.
//! [`GrammersApi`] speaks to Telegram through it, and [`TelegramChatService`]
//! turns that into the engine's [`cot_core::ports::ChatService`] port.

pub mod api;
mod grammers;
mod service;
mod session;

pub use api::{Participant, TelegramApi};
pub use grammers::GrammersApi;
pub use service::TelegramChatService;
pub use session::{SessionConfig, TelegramSession};
