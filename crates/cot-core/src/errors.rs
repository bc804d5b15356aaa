/// Core error type for the broadcast engine.
///
/// Adapter crates map server rejections into `Protocol` and everything else
/// (transport, session, cache misses) into `External`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("cannot resolve chat '{identifier}': {reason}")]
    Resolution { identifier: String, reason: String },

    #[error("chat '{identifier}' is a {kind} chat; only basic groups and supergroups are supported")]
    UnsupportedChat { identifier: String, kind: String },

    #[error("member list of chat {chat_id} could not be fetched: {reason}")]
    MembershipFetch { chat_id: i64, reason: String },

    #[error("send to user {user_id} failed: {reason}")]
    Send { user_id: i64, reason: String },

    #[error("delivery failed. ErrCode: {code} ErrMsg: {message}")]
    Confirmation { code: i32, message: String },

    #[error("update stream closed before delivery was confirmed")]
    StreamClosed,

    #[error("protocol error {code}: {message}")]
    Protocol { code: i32, message: String },

    #[error("unexpected payload: {0}")]
    Wire(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
