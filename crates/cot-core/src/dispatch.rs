//! Sequential, paced delivery to each recipient.

use tracing::{info, warn};

use crate::{
    confirmation::{await_delivery, Confirmation},
    domain::{DispatchResult, SendingState, UserId},
    pacing::Pacer,
    ports::{ChatService, UpdateStream},
    Error,
};

/// Deliver `text` to one user and wait until its outcome is known.
///
/// Never fails: every error is folded into the returned [`DispatchResult`].
pub async fn send_to_recipient(
    service: &dyn ChatService,
    updates: &mut UpdateStream,
    user_id: UserId,
    text: &str,
) -> DispatchResult {
    let chat_id = match service.create_private_chat(user_id, true).await {
        Ok(id) => id,
        Err(e) => return errored(user_id, format!("creation of private chat failed: {e}")),
    };

    let message = match service.send_text(chat_id, text).await {
        Ok(m) => m,
        Err(e) => return errored(user_id, format!("send message failed: {e}")),
    };

    match &message.sending_state {
        SendingState::Failed(error) => DispatchResult::Failed {
            code: error.code,
            message: error.message.clone(),
        },
        SendingState::Pending => {
            info!(
                user_id = user_id.0,
                message_id = message.id.0,
                "message pending, awaiting confirmation"
            );
            match await_delivery(updates, &message).await {
                Ok(Confirmation::Confirmed) | Ok(Confirmation::Deleted) => {
                    DispatchResult::Succeeded
                }
                Err(Error::Confirmation { code, message }) => {
                    DispatchResult::Failed { code, message }
                }
                Err(e) => errored(user_id, e.to_string()),
            }
        }
        other @ (SendingState::Absent | SendingState::Other(_)) => {
            DispatchResult::Unsupported(other.name().to_string())
        }
    }
}

fn errored(user_id: UserId, reason: String) -> DispatchResult {
    let err = Error::Send {
        user_id: user_id.0,
        reason,
    };
    DispatchResult::Errored(err.to_string())
}

/// Attempt every recipient in order, pausing after each one.
///
/// `on_result` observes each outcome as soon as it is known, so long broadcasts
/// can report progress. The returned list is in recipient order.
pub async fn dispatch_all(
    service: &dyn ChatService,
    updates: &mut UpdateStream,
    pacer: &dyn Pacer,
    recipients: &[UserId],
    text: &str,
    mut on_result: impl FnMut(UserId, &DispatchResult),
) -> Vec<(UserId, DispatchResult)> {
    let total = recipients.len();
    let mut results = Vec::with_capacity(total);

    for (idx, &user_id) in recipients.iter().enumerate() {
        let result = send_to_recipient(service, updates, user_id, text).await;
        log_result(idx + 1, total, user_id, &result);
        on_result(user_id, &result);
        results.push((user_id, result));

        pacer.pause().await;
    }

    results
}

fn log_result(n: usize, total: usize, user_id: UserId, result: &DispatchResult) {
    match result {
        DispatchResult::Succeeded => {
            info!(user_id = user_id.0, "[{n}/{total}] message sent to {user_id}")
        }
        DispatchResult::Failed { code, message } => warn!(
            user_id = user_id.0,
            code, "[{n}/{total}] message to {user_id} FAILED: {message}"
        ),
        DispatchResult::Unsupported(state) => warn!(
            user_id = user_id.0,
            "[{n}/{total}] message to {user_id} has unsupported state: {state}"
        ),
        DispatchResult::Errored(reason) => warn!(
            user_id = user_id.0,
            "[{n}/{total}] message to {user_id} not delivered: {reason}"
        ),
    }
}
