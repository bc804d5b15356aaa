//! [`ChatService`] on top of a [`TelegramApi`].

use std::{
    collections::HashMap,
    sync::atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use cot_core::{
    domain::{
        Chat, ChatCategory, ChatId, ChatIdentity, MemberRecord, MessageId, ProtocolError,
        SendingState, SentMessage, UpdateEvent, UserId, UserType,
    },
    ports::{ChatService, UpdateStream},
    Error, Result,
};

use crate::api::{Participant, TelegramApi};

/// Adapts a [`TelegramApi`] to the engine's [`ChatService`] port.
///
/// MTProto lists participants through its own iterator, so a supergroup's
/// member list is taken once per listing (at offset 0) and served page by page
/// from that snapshot. Users are only addressable after they appeared in a
/// listing; their type and privacy flags are remembered from it.
pub struct TelegramChatService<A> {
    api: A,
    snapshots: Mutex<HashMap<i64, Vec<MemberRecord>>>,
    users: Mutex<HashMap<UserId, Participant>>,
    updates: mpsc::UnboundedSender<UpdateEvent>,
    next_local_id: AtomicI64,
}

impl<A: TelegramApi> TelegramChatService<A> {
    /// Build the service together with the stream its delivery outcomes go to.
    ///
    /// Only send outcomes are ever queued; network updates are consumed by the
    /// session and never reach the stream.
    pub fn new(api: A) -> (Self, UpdateStream) {
        let (updates, stream) = UpdateStream::channel();
        let service = Self {
            api,
            snapshots: Mutex::new(HashMap::new()),
            users: Mutex::new(HashMap::new()),
            updates,
            next_local_id: AtomicI64::new(1),
        };
        (service, stream)
    }

    async fn load_members(&self, group: ChatIdentity) -> Result<Vec<MemberRecord>> {
        let participants = self.api.participants(group).await?;
        let members = participants
            .iter()
            .map(|p| MemberRecord::user(p.user_id.0))
            .collect();

        let mut users = self.users.lock().await;
        for participant in participants {
            users.insert(participant.user_id, participant);
        }
        Ok(members)
    }

    async fn participant(&self, user_id: UserId) -> Result<Participant> {
        self.users
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .ok_or_else(|| Error::External(format!("user {user_id} was not seen in any member list")))
    }

    fn local_message_id(&self) -> MessageId {
        MessageId(self.next_local_id.fetch_add(1, Ordering::Relaxed))
    }
}

fn page_of(members: &[MemberRecord], offset: usize, limit: usize) -> Vec<MemberRecord> {
    let start = offset.min(members.len());
    let end = start.saturating_add(limit).min(members.len());
    members[start..end].to_vec()
}

#[async_trait]
impl<A: TelegramApi> ChatService for TelegramChatService<A> {
    async fn get_me(&self) -> Result<UserId> {
        self.api.me().await
    }

    async fn search_public_chat(&self, username: &str) -> Result<Chat> {
        self.api
            .resolve_username(username)
            .await?
            .ok_or_else(|| Error::External(format!("no chat is registered as @{username}")))
    }

    async fn supergroup_members(
        &self,
        supergroup_id: i64,
        offset: i32,
        limit: i32,
    ) -> Result<Vec<MemberRecord>> {
        let (Ok(offset), Ok(limit)) = (usize::try_from(offset), usize::try_from(limit)) else {
            return Err(Error::Wire(format!(
                "invalid member page: offset {offset}, limit {limit}"
            )));
        };

        let mut snapshots = self.snapshots.lock().await;
        if offset == 0 || !snapshots.contains_key(&supergroup_id) {
            let group = ChatIdentity {
                id: supergroup_id,
                category: ChatCategory::Supergroup,
            };
            let members = self.load_members(group).await?;
            debug!(supergroup_id, members = members.len(), "member snapshot taken");
            snapshots.insert(supergroup_id, members);
        }

        let page = snapshots
            .get(&supergroup_id)
            .map(|members| page_of(members, offset, limit))
            .unwrap_or_default();
        if page.len() < limit {
            snapshots.remove(&supergroup_id);
        }
        Ok(page)
    }

    async fn basic_group_members(&self, basic_group_id: i64) -> Result<Vec<MemberRecord>> {
        self.load_members(ChatIdentity {
            id: basic_group_id,
            category: ChatCategory::BasicGroup,
        })
        .await
    }

    async fn user_type(&self, user_id: UserId) -> Result<UserType> {
        Ok(self.participant(user_id).await?.user_type)
    }

    async fn can_send_direct_message(&self, user_id: UserId) -> Result<bool> {
        Ok(!self.participant(user_id).await?.requires_premium)
    }

    /// A private chat is addressed by the peer's user id, so nothing is created;
    /// `force` has no effect.
    async fn create_private_chat(&self, user_id: UserId, _force: bool) -> Result<ChatId> {
        self.participant(user_id).await?;
        Ok(ChatId(user_id.0))
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<SentMessage> {
        let id = self.local_message_id();
        let sending_state = match self.api.send_message(UserId(chat_id.0), text).await {
            Ok(message_id) => {
                // The RPC reply is the server's acknowledgement.
                let event = UpdateEvent::SendSucceeded {
                    chat_id,
                    old_message_id: id,
                    message_id,
                };
                if self.updates.send(event).is_err() {
                    debug!(chat_id = chat_id.0, "update stream dropped; outcome discarded");
                }
                SendingState::Pending
            }
            Err(Error::Protocol { code, message }) => {
                SendingState::Failed(ProtocolError { code, message })
            }
            Err(e) => return Err(e),
        };

        Ok(SentMessage {
            id,
            chat_id,
            sending_state,
        })
    }
}
