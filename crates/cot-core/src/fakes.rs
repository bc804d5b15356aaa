//! In-memory `ChatService` used by the engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    domain::{
        Chat, ChatId, MemberRecord, MessageId, ProtocolError, SendingState, SentMessage,
        UpdateEvent, UserId, UserType,
    },
    ports::{ChatService, UpdateStream},
    Error, Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    GetMe,
    Search(String),
    SupergroupPage { id: i64, offset: i32, limit: i32 },
    BasicGroup(i64),
    UserType(i64),
    CanSend(i64),
    CreatePrivateChat { user_id: i64, force: bool },
    Send { chat_id: i64, text: String },
}

/// How the fake reacts to a message sent to a given user.
#[derive(Clone, Debug)]
pub enum FakeSend {
    /// Pending, then `updateMessageSendSucceeded` on the stream.
    ConfirmOk,
    /// Pending, then `updateMessageSendFailed`.
    ConfirmFail(i32, String),
    /// Pending, then `updateDeleteMessages`.
    Deleted,
    /// Failed sending state in the immediate response.
    ImmediateFail(i32, String),
    Absent,
    OtherState(String),
    /// `createPrivateChat` itself fails.
    RpcError(i32, String),
}

pub struct FakeChatService {
    self_id: i64,
    chats: HashMap<String, Chat>,
    supergroups: HashMap<i64, Vec<MemberRecord>>,
    basic_groups: HashMap<i64, Vec<MemberRecord>>,
    user_types: HashMap<i64, UserType>,
    unreachable: HashSet<i64>,
    failing_lookups: HashSet<i64>,
    sends: HashMap<i64, FakeSend>,
    updates: Option<UnboundedSender<UpdateEvent>>,
    next_message_id: Mutex<i64>,
    calls: Mutex<Vec<Call>>,
}

impl FakeChatService {
    pub fn new(self_id: i64) -> Self {
        Self {
            self_id,
            chats: HashMap::new(),
            supergroups: HashMap::new(),
            basic_groups: HashMap::new(),
            user_types: HashMap::new(),
            unreachable: HashSet::new(),
            failing_lookups: HashSet::new(),
            sends: HashMap::new(),
            updates: None,
            next_message_id: Mutex::new(1_048_576),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A fake wired to an update stream that it feeds on every pending send.
    pub fn with_updates(self_id: i64) -> (Self, UpdateStream) {
        let (tx, stream) = UpdateStream::channel();
        let mut fake = Self::new(self_id);
        fake.updates = Some(tx);
        (fake, stream)
    }

    pub fn with_chat(mut self, username: &str, chat: Chat) -> Self {
        self.chats.insert(username.to_string(), chat);
        self
    }

    pub fn with_supergroup_members(mut self, id: i64, members: Vec<MemberRecord>) -> Self {
        self.supergroups.insert(id, members);
        self
    }

    pub fn with_basic_group_members(mut self, id: i64, members: Vec<MemberRecord>) -> Self {
        self.basic_groups.insert(id, members);
        self
    }

    pub fn with_user_type(mut self, user_id: i64, user_type: UserType) -> Self {
        self.user_types.insert(user_id, user_type);
        self
    }

    pub fn with_unreachable(mut self, user_id: i64) -> Self {
        self.unreachable.insert(user_id);
        self
    }

    pub fn with_failing_user_lookup(mut self, user_id: i64) -> Self {
        self.failing_lookups.insert(user_id);
        self
    }

    pub fn with_send(mut self, user_id: i64, behaviour: FakeSend) -> Self {
        self.sends.insert(user_id, behaviour);
        self
    }

    pub fn emit(&self, event: UpdateEvent) {
        if let Some(tx) = &self.updates {
            let _ = tx.send(event);
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn alloc_message_id(&self) -> MessageId {
        let mut guard = self.next_message_id.lock().unwrap();
        *guard += 1;
        MessageId(*guard)
    }

    fn behaviour(&self, user_id: i64) -> FakeSend {
        self.sends
            .get(&user_id)
            .cloned()
            .unwrap_or(FakeSend::ConfirmOk)
    }
}

fn not_found(what: &str) -> Error {
    Error::Protocol {
        code: 400,
        message: format!("{what} not found"),
    }
}

#[async_trait]
impl ChatService for FakeChatService {
    async fn get_me(&self) -> Result<UserId> {
        self.record(Call::GetMe);
        Ok(UserId(self.self_id))
    }

    async fn search_public_chat(&self, username: &str) -> Result<Chat> {
        self.record(Call::Search(username.to_string()));
        self.chats
            .get(username)
            .cloned()
            .ok_or_else(|| not_found("USERNAME"))
    }

    async fn supergroup_members(
        &self,
        supergroup_id: i64,
        offset: i32,
        limit: i32,
    ) -> Result<Vec<MemberRecord>> {
        self.record(Call::SupergroupPage {
            id: supergroup_id,
            offset,
            limit,
        });
        let all = self
            .supergroups
            .get(&supergroup_id)
            .ok_or_else(|| not_found("CHANNEL"))?;
        Ok(all
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn basic_group_members(&self, basic_group_id: i64) -> Result<Vec<MemberRecord>> {
        self.record(Call::BasicGroup(basic_group_id));
        self.basic_groups
            .get(&basic_group_id)
            .cloned()
            .ok_or_else(|| not_found("CHAT"))
    }

    async fn user_type(&self, user_id: UserId) -> Result<UserType> {
        self.record(Call::UserType(user_id.0));
        if self.failing_lookups.contains(&user_id.0) {
            return Err(not_found("USER"));
        }
        Ok(self
            .user_types
            .get(&user_id.0)
            .copied()
            .unwrap_or(UserType::Regular))
    }

    async fn can_send_direct_message(&self, user_id: UserId) -> Result<bool> {
        self.record(Call::CanSend(user_id.0));
        Ok(!self.unreachable.contains(&user_id.0))
    }

    async fn create_private_chat(&self, user_id: UserId, force: bool) -> Result<ChatId> {
        self.record(Call::CreatePrivateChat {
            user_id: user_id.0,
            force,
        });
        if let FakeSend::RpcError(code, message) = self.behaviour(user_id.0) {
            return Err(Error::Protocol { code, message });
        }
        Ok(ChatId(user_id.0))
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<SentMessage> {
        self.record(Call::Send {
            chat_id: chat_id.0,
            text: text.to_string(),
        });
        let id = self.alloc_message_id();
        let sending_state = match self.behaviour(chat_id.0) {
            FakeSend::ConfirmOk => {
                self.emit(UpdateEvent::SendSucceeded {
                    chat_id,
                    old_message_id: id,
                    message_id: MessageId(id.0 - 1_000_000),
                });
                SendingState::Pending
            }
            FakeSend::ConfirmFail(code, message) => {
                self.emit(UpdateEvent::SendFailed {
                    chat_id,
                    old_message_id: id,
                    error: ProtocolError { code, message },
                });
                SendingState::Pending
            }
            FakeSend::Deleted => {
                self.emit(UpdateEvent::MessagesDeleted {
                    chat_id,
                    message_ids: vec![id],
                });
                SendingState::Pending
            }
            FakeSend::ImmediateFail(code, message) => {
                SendingState::Failed(ProtocolError { code, message })
            }
            FakeSend::Absent => SendingState::Absent,
            FakeSend::OtherState(tag) => SendingState::Other(tag),
            FakeSend::RpcError(code, message) => return Err(Error::Protocol { code, message }),
        };
        Ok(SentMessage {
            id,
            chat_id,
            sending_state,
        })
    }
}
