//! [`TelegramApi`] backed by a grammers [`Client`].

use std::collections::HashMap;

use async_trait::async_trait;
use grammers_client::types::peer::Peer;
use grammers_client::{Client, InvocationError};
use grammers_tl_types as tl;
use tokio::sync::Mutex;

use cot_core::{
    domain::{Chat, ChatId, ChatIdentity, ChatKind, MessageId, UserId, UserType},
    Error, Result,
};

use crate::api::{Participant, TelegramApi};

/// Keeps the peers it has seen, since MTProto addresses a group or user only
/// through the access hash that came with it.
pub struct GrammersApi {
    client: Client,
    groups: Mutex<HashMap<ChatIdentity, Peer>>,
    users: Mutex<HashMap<i64, Peer>>,
}

impl GrammersApi {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            groups: Mutex::new(HashMap::new()),
            users: Mutex::new(HashMap::new()),
        }
    }
}

pub(crate) fn invocation_error(err: InvocationError) -> Error {
    match err {
        InvocationError::Rpc(rpc) => Error::Protocol {
            code: rpc.code,
            message: rpc.name,
        },
        other => Error::External(other.to_string()),
    }
}

fn chat_from_peer(peer: &Peer) -> Result<Chat> {
    match peer {
        Peer::User(user) => {
            let user_id = user.raw.id();
            Ok(Chat {
                id: ChatId(user_id),
                title: user.full_name(),
                kind: ChatKind::Private { user_id },
            })
        }
        Peer::Group(group) => {
            let title = group.title().unwrap_or_default().to_string();
            let (id, kind) = match &group.raw {
                tl::enums::Chat::Chat(c) => (c.id, ChatKind::BasicGroup { basic_group_id: c.id }),
                // Megagroups are channels on the wire.
                tl::enums::Chat::Channel(c) => (
                    c.id,
                    ChatKind::Supergroup {
                        supergroup_id: c.id,
                        is_channel: false,
                    },
                ),
                _ => return Err(Error::External(format!("group '{title}' is not accessible"))),
            };
            Ok(Chat {
                id: ChatId(id),
                title,
                kind,
            })
        }
        Peer::Channel(channel) => Ok(Chat {
            id: ChatId(channel.raw.id),
            title: channel.title().to_string(),
            kind: ChatKind::Supergroup {
                supergroup_id: channel.raw.id,
                is_channel: true,
            },
        }),
    }
}

fn identity_of(kind: &ChatKind) -> Option<ChatIdentity> {
    use cot_core::domain::ChatCategory;
    match kind {
        ChatKind::BasicGroup { basic_group_id } => Some(ChatIdentity {
            id: *basic_group_id,
            category: ChatCategory::BasicGroup,
        }),
        ChatKind::Supergroup { supergroup_id, .. } => Some(ChatIdentity {
            id: *supergroup_id,
            category: ChatCategory::Supergroup,
        }),
        ChatKind::Private { .. } | ChatKind::Secret { .. } => None,
    }
}

fn participant_of(raw: &tl::enums::User) -> Participant {
    match raw {
        tl::enums::User::User(user) => {
            let user_type = if user.deleted {
                UserType::Deleted
            } else if user.bot {
                UserType::Bot
            } else {
                UserType::Regular
            };
            Participant {
                user_id: UserId(user.id),
                user_type,
                requires_premium: user.contact_require_premium,
            }
        }
        tl::enums::User::Empty(user) => Participant {
            user_id: UserId(user.id),
            user_type: UserType::Unknown,
            requires_premium: false,
        },
    }
}

#[async_trait]
impl TelegramApi for GrammersApi {
    async fn me(&self) -> Result<UserId> {
        let me = self.client.get_me().await.map_err(invocation_error)?;
        Ok(UserId(me.raw.id()))
    }

    async fn resolve_username(&self, username: &str) -> Result<Option<Chat>> {
        let Some(peer) = self
            .client
            .resolve_username(username)
            .await
            .map_err(invocation_error)?
        else {
            return Ok(None);
        };

        let chat = chat_from_peer(&peer)?;
        if let Some(identity) = identity_of(&chat.kind) {
            self.groups.lock().await.insert(identity, peer);
        }
        Ok(Some(chat))
    }

    async fn participants(&self, group: ChatIdentity) -> Result<Vec<Participant>> {
        let peer = self.groups.lock().await.get(&group).cloned().ok_or_else(|| {
            Error::External(format!(
                "{} {} was not resolved in this session",
                group.category, group.id
            ))
        })?;

        let mut participants = Vec::new();
        let mut peers = Vec::new();
        let mut iter = self.client.iter_participants(&peer);
        while let Some(member) = iter.next().await.map_err(invocation_error)? {
            let participant = participant_of(&member.user.raw);
            peers.push((participant.user_id.0, Peer::User(member.user)));
            participants.push(participant);
        }

        self.users.lock().await.extend(peers);
        Ok(participants)
    }

    async fn send_message(&self, user_id: UserId, text: &str) -> Result<MessageId> {
        let peer = self
            .users
            .lock()
            .await
            .get(&user_id.0)
            .cloned()
            .ok_or_else(|| Error::External(format!("user {user_id} has no known access hash")))?;

        let message = self
            .client
            .send_message(&peer, text)
            .await
            .map_err(invocation_error)?;
        Ok(MessageId(i64::from(message.id())))
    }
}
