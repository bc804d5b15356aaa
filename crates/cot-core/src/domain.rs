use std::fmt;

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric). Private chats opened for a recipient use this id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric). Pending messages get a temporary id that is
/// replaced once the server acknowledges them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group categories whose members can be enumerated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChatCategory {
    BasicGroup,
    Supergroup,
}

impl fmt::Display for ChatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatCategory::BasicGroup => f.write_str("BasicGroup"),
            ChatCategory::Supergroup => f.write_str("Supergroup"),
        }
    }
}

/// A resolved group. The id is the basic group / supergroup id, not the chat id,
/// and is only meaningful together with its category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatIdentity {
    pub id: i64,
    pub category: ChatCategory,
}

/// Type of a chat as returned by public chat search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatKind {
    BasicGroup { basic_group_id: i64 },
    Supergroup { supergroup_id: i64, is_channel: bool },
    Private { user_id: i64 },
    Secret { user_id: i64 },
}

impl ChatKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChatKind::BasicGroup { .. } => "basic group",
            ChatKind::Supergroup { .. } => "supergroup",
            ChatKind::Private { .. } => "private",
            ChatKind::Secret { .. } => "secret",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chat {
    pub id: ChatId,
    pub title: String,
    pub kind: ChatKind,
}

/// Who a membership entry belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sender {
    User(UserId),
    /// Anonymous admins, channels posting as themselves, etc.
    Chat(ChatId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRecord {
    pub sender: Sender,
}

impl MemberRecord {
    pub fn user(id: i64) -> Self {
        Self {
            sender: Sender::User(UserId(id)),
        }
    }

    pub fn chat(id: i64) -> Self {
        Self {
            sender: Sender::Chat(ChatId(id)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserType {
    Regular,
    Deleted,
    Bot,
    Unknown,
}

/// An error object carried inside protocol payloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolError {
    pub code: i32,
    pub message: String,
}

/// Immediate state of a just-submitted message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendingState {
    Pending,
    Failed(ProtocolError),
    /// No sending state at all (the message is already on the server).
    Absent,
    /// A state tag this engine does not act upon.
    Other(String),
}

impl SendingState {
    pub fn name(&self) -> &str {
        match self {
            SendingState::Pending => "messageSendingStatePending",
            SendingState::Failed(_) => "messageSendingStateFailed",
            SendingState::Absent => "none",
            SendingState::Other(tag) => tag,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMessage {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sending_state: SendingState,
}

/// Asynchronous updates relevant to delivery confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateEvent {
    SendSucceeded {
        chat_id: ChatId,
        old_message_id: MessageId,
        message_id: MessageId,
    },
    SendFailed {
        chat_id: ChatId,
        old_message_id: MessageId,
        error: ProtocolError,
    },
    MessagesDeleted {
        chat_id: ChatId,
        message_ids: Vec<MessageId>,
    },
    /// Any other update; carries its type tag for logging.
    Other(String),
}

impl UpdateEvent {
    pub fn kind(&self) -> &str {
        match self {
            UpdateEvent::SendSucceeded { .. } => "updateMessageSendSucceeded",
            UpdateEvent::SendFailed { .. } => "updateMessageSendFailed",
            UpdateEvent::MessagesDeleted { .. } => "updateDeleteMessages",
            UpdateEvent::Other(kind) => kind,
        }
    }
}

/// Per-recipient outcome of the dispatch loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchResult {
    Succeeded,
    Failed { code: i32, message: String },
    Unsupported(String),
    /// RPC error before a sending state was known, or the confirmation wait
    /// could not complete.
    Errored(String),
}

/// Summary of one group broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BroadcastReport {
    pub group: String,
    pub chat: ChatIdentity,
    pub members: usize,
    pub recipients: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub unsupported: usize,
    pub errored: usize,
}

impl BroadcastReport {
    pub fn new(group: &str, chat: ChatIdentity, members: usize, recipients: usize) -> Self {
        Self {
            group: group.to_string(),
            chat,
            members,
            recipients,
            succeeded: 0,
            failed: 0,
            unsupported: 0,
            errored: 0,
        }
    }

    pub fn record(&mut self, result: &DispatchResult) {
        match result {
            DispatchResult::Succeeded => self.succeeded += 1,
            DispatchResult::Failed { .. } => self.failed += 1,
            DispatchResult::Unsupported(_) => self.unsupported += 1,
            DispatchResult::Errored(_) => self.errored += 1,
        }
    }

    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed + self.unsupported + self.errored
    }
}
