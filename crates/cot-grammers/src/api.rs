use async_trait::async_trait;

use cot_core::{
    domain::{Chat, ChatIdentity, MessageId, UserId, UserType},
    Result,
};

/// One group member as seen in a participant listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub user_id: UserId,
    pub user_type: UserType,
    /// The user only accepts messages from contacts or Premium accounts.
    pub requires_premium: bool,
}

/// The slice of the MTProto client the adapter relies on.
///
/// Server-side rejections come back as `Error::Protocol`; anything else
/// (connection loss, unknown peers) as `Error::External`.
#[async_trait]
pub trait TelegramApi: Send + Sync {
    async fn me(&self) -> Result<UserId>;

    /// `None` when no chat is registered under `username`.
    async fn resolve_username(&self, username: &str) -> Result<Option<Chat>>;

    /// Every participant of a group previously returned by `resolve_username`,
    /// in server order.
    async fn participants(&self, group: ChatIdentity) -> Result<Vec<Participant>>;

    /// Send `text` to a user seen in a participant listing. Returns the
    /// server-assigned message id.
    async fn send_message(&self, user_id: UserId, text: &str) -> Result<MessageId>;
}
