use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{
    domain::{Chat, ChatId, MemberRecord, SentMessage, UpdateEvent, UserId, UserType},
    Result,
};

/// Hexagonal port for the chat-protocol client.
///
/// Every method is a single request/response round trip. Implementations must not
/// consume the update stream; updates are delivered through [`UpdateStream`].
#[async_trait]
pub trait ChatService: Send + Sync {
    /// The operating account's own user id.
    async fn get_me(&self) -> Result<UserId>;

    async fn search_public_chat(&self, username: &str) -> Result<Chat>;

    /// One page of supergroup members starting at `offset`.
    async fn supergroup_members(
        &self,
        supergroup_id: i64,
        offset: i32,
        limit: i32,
    ) -> Result<Vec<MemberRecord>>;

    /// The complete member list of a basic group.
    async fn basic_group_members(&self, basic_group_id: i64) -> Result<Vec<MemberRecord>>;

    async fn user_type(&self, user_id: UserId) -> Result<UserType>;

    async fn can_send_direct_message(&self, user_id: UserId) -> Result<bool>;

    async fn create_private_chat(&self, user_id: UserId, force: bool) -> Result<ChatId>;

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<SentMessage>;
}

/// The process-wide update stream.
///
/// There is exactly one consumer: whoever holds the `UpdateStream` by value.
/// Lending it out requires `&mut`, so two listeners can never race for events.
#[derive(Debug)]
pub struct UpdateStream {
    rx: mpsc::UnboundedReceiver<UpdateEvent>,
}

impl UpdateStream {
    pub fn new(rx: mpsc::UnboundedReceiver<UpdateEvent>) -> Self {
        Self { rx }
    }

    /// Create a connected sender/stream pair.
    pub fn channel() -> (mpsc::UnboundedSender<UpdateEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx))
    }

    /// Next update, or `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<UpdateEvent> {
        self.rx.recv().await
    }
}
