//! The broadcast operation: resolve → enumerate → filter → dispatch.

use std::sync::Arc;

use tracing::{error, info};

use crate::{
    dispatch::dispatch_all,
    domain::{BroadcastReport, UserId},
    eligibility::{select_recipients, EligibilityPolicy},
    members::fetch_members,
    pacing::Pacer,
    ports::{ChatService, UpdateStream},
    resolver::{normalize_identifier, resolve_chat},
    Result,
};

/// Outcome of one line of a group list.
#[derive(Debug)]
pub struct GroupOutcome {
    pub group: String,
    pub result: Result<BroadcastReport>,
}

/// Owns the update stream and runs broadcasts one at a time.
///
/// `&mut self` on every entry point keeps sends strictly sequential, which is
/// what makes the update stream's single consumer sound.
pub struct Broadcaster {
    service: Arc<dyn ChatService>,
    updates: UpdateStream,
    pacer: Box<dyn Pacer>,
    policy: EligibilityPolicy,
    self_id: UserId,
}

impl Broadcaster {
    /// Fetch the operating account's id and build a broadcaster around it.
    pub async fn connect(
        service: Arc<dyn ChatService>,
        updates: UpdateStream,
        pacer: Box<dyn Pacer>,
        policy: EligibilityPolicy,
    ) -> Result<Self> {
        let self_id = service.get_me().await?;
        info!(self_id = self_id.0, "operating account identified");
        Ok(Self {
            service,
            updates,
            pacer,
            policy,
            self_id,
        })
    }

    /// Send `message` to every eligible member of `group`.
    ///
    /// Only resolution and enumeration failures are returned as errors;
    /// per-recipient problems are counted in the report.
    pub async fn broadcast(&mut self, group: &str, message: &str) -> Result<BroadcastReport> {
        let service = self.service.as_ref();

        let chat = resolve_chat(service, group).await?;
        info!(
            "ChatId of group `@{}` found: {}({})",
            normalize_identifier(group),
            chat.id,
            chat.category
        );

        let members = fetch_members(service, chat).await?;
        let recipients = select_recipients(service, &members, self.self_id, self.policy).await;
        info!(
            group,
            members = members.len(),
            recipients = recipients.len(),
            "recipient list built"
        );

        let mut report = BroadcastReport::new(group, chat, members.len(), recipients.len());
        dispatch_all(
            service,
            &mut self.updates,
            self.pacer.as_ref(),
            &recipients,
            message,
            |_, result| report.record(result),
        )
        .await;

        info!(
            group,
            attempted = report.attempted(),
            succeeded = report.succeeded,
            failed = report.failed,
            unsupported = report.unsupported,
            errored = report.errored,
            "broadcast finished"
        );
        Ok(report)
    }

    /// Broadcast to every group named in `lines`, one identifier per line.
    ///
    /// Blank lines and `#` comments are skipped. A failing group is logged and
    /// the remaining groups still run.
    pub async fn broadcast_group_list<'a>(
        &mut self,
        lines: impl IntoIterator<Item = &'a str>,
        message: &str,
    ) -> Vec<GroupOutcome> {
        let mut outcomes = Vec::new();
        for line in lines {
            let group = line.trim();
            if group.is_empty() || group.starts_with('#') {
                continue;
            }

            info!("Read group: {group} PROCESSING");
            let result = self.broadcast(group, message).await;
            if let Err(e) = &result {
                error!(group, "broadcast failed: {e}");
            }
            outcomes.push(GroupOutcome {
                group: group.to_string(),
                result,
            });
        }

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!(
            groups = outcomes.len(),
            succeeded = outcomes.len() - failed,
            failed,
            "group list finished"
        );
        outcomes
    }
}
