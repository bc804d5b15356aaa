//! Waits on the update stream for the outcome of a pending message.

use tracing::{debug, info};

use crate::{
    domain::{SentMessage, UpdateEvent},
    ports::UpdateStream,
    Error, Result,
};

/// Terminal outcome of a confirmation wait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Confirmation {
    /// The server accepted the message.
    Confirmed,
    /// The pending message was removed before it was sent.
    Deleted,
}

/// Consume updates until one settles `pending`.
///
/// Unrelated updates (other types, or terminal updates for a different message)
/// are discarded. There is no timeout; the wait ends on a terminal update or when
/// the stream closes, which is reported as [`Error::StreamClosed`].
pub async fn await_delivery(
    updates: &mut UpdateStream,
    pending: &SentMessage,
) -> Result<Confirmation> {
    while let Some(event) = updates.next().await {
        debug!(kind = event.kind(), "update received while awaiting delivery");
        match event {
            UpdateEvent::SendSucceeded {
                chat_id,
                old_message_id,
                message_id,
            } if chat_id == pending.chat_id && old_message_id == pending.id => {
                info!(
                    chat_id = chat_id.0,
                    message_id = message_id.0,
                    "message delivered"
                );
                return Ok(Confirmation::Confirmed);
            }
            UpdateEvent::SendFailed {
                chat_id,
                old_message_id,
                error,
            } if chat_id == pending.chat_id && old_message_id == pending.id => {
                return Err(Error::Confirmation {
                    code: error.code,
                    message: error.message,
                });
            }
            UpdateEvent::MessagesDeleted {
                chat_id,
                message_ids,
            } if chat_id == pending.chat_id && message_ids.contains(&pending.id) => {
                info!(chat_id = chat_id.0, ?message_ids, "pending message was deleted");
                return Ok(Confirmation::Deleted);
            }
            UpdateEvent::SendSucceeded { .. }
            | UpdateEvent::SendFailed { .. }
            | UpdateEvent::MessagesDeleted { .. } => {
                debug!(
                    chat_id = pending.chat_id.0,
                    message_id = pending.id.0,
                    "ignoring delivery update for another message"
                );
            }
            UpdateEvent::Other(_) => {}
        }
    }
    Err(Error::StreamClosed)
}
