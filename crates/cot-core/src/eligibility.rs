//! Recipient selection: who in a member list can actually receive a direct message.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::{
    domain::{MemberRecord, Sender, UserId, UserType},
    ports::ChatService,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EligibilityPolicy {
    /// Look up every candidate's account type and DM capability.
    /// Costs one or two extra requests per member.
    pub check_reachability: bool,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            check_reachability: true,
        }
    }
}

/// Build the recipient list, preserving enumeration order.
pub async fn select_recipients(
    service: &dyn ChatService,
    members: &[MemberRecord],
    self_id: UserId,
    policy: EligibilityPolicy,
) -> Vec<UserId> {
    let mut seen = HashSet::new();
    let mut recipients = Vec::new();

    for member in members {
        let user_id = match &member.sender {
            Sender::User(id) => *id,
            Sender::Chat(chat_id) => {
                debug!(chat_id = chat_id.0, "skipping non-user member");
                continue;
            }
        };
        if user_id == self_id {
            continue;
        }
        if !seen.insert(user_id) {
            debug!(user_id = user_id.0, "skipping repeated member");
            continue;
        }
        if policy.check_reachability && !is_reachable(service, user_id).await {
            continue;
        }
        recipients.push(user_id);
    }

    recipients
}

async fn is_reachable(service: &dyn ChatService, user_id: UserId) -> bool {
    match service.user_type(user_id).await {
        Ok(UserType::Regular) => {}
        Ok(other) => {
            debug!(user_id = user_id.0, user_type = ?other, "skipping non-regular user");
            return false;
        }
        Err(e) => {
            warn!(user_id = user_id.0, "get user info failed: {e}");
            return false;
        }
    }

    match service.can_send_direct_message(user_id).await {
        Ok(true) => true,
        Ok(false) => {
            debug!(user_id = user_id.0, "user does not accept direct messages");
            false
        }
        Err(e) => {
            warn!(user_id = user_id.0, "direct message check failed: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{Call, FakeChatService};

    const SELF: UserId = UserId(1);

    fn ids(v: &[UserId]) -> Vec<i64> {
        v.iter().map(|u| u.0).collect()
    }

    #[tokio::test]
    async fn excludes_self_and_non_users() {
        let fake = FakeChatService::new(SELF.0);
        let members = vec![
            MemberRecord::user(10),
            MemberRecord::chat(-100200),
            MemberRecord::user(SELF.0),
            MemberRecord::user(11),
        ];
        let recipients =
            select_recipients(&fake, &members, SELF, EligibilityPolicy::default()).await;
        assert_eq!(ids(&recipients), vec![10, 11]);
    }

    #[tokio::test]
    async fn reachability_check_drops_deleted_bots_and_restricted() {
        let fake = FakeChatService::new(SELF.0)
            .with_user_type(20, UserType::Deleted)
            .with_user_type(21, UserType::Bot)
            .with_user_type(22, UserType::Unknown)
            .with_unreachable(23)
            .with_failing_user_lookup(24);
        let members: Vec<_> = (20..=25).map(MemberRecord::user).collect();

        let recipients =
            select_recipients(&fake, &members, SELF, EligibilityPolicy::default()).await;
        assert_eq!(ids(&recipients), vec![25]);
    }

    #[tokio::test]
    async fn dm_check_is_skipped_for_non_regular_users() {
        let fake = FakeChatService::new(SELF.0).with_user_type(30, UserType::Bot);
        select_recipients(
            &fake,
            &[MemberRecord::user(30)],
            SELF,
            EligibilityPolicy::default(),
        )
        .await;
        assert_eq!(fake.calls(), vec![Call::UserType(30)]);
    }

    #[tokio::test]
    async fn disabled_check_issues_no_lookups() {
        let fake = FakeChatService::new(SELF.0).with_user_type(20, UserType::Deleted);
        let members = vec![MemberRecord::user(20), MemberRecord::user(21)];
        let policy = EligibilityPolicy {
            check_reachability: false,
        };
        let recipients = select_recipients(&fake, &members, SELF, policy).await;
        assert_eq!(ids(&recipients), vec![20, 21]);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn repeated_members_keep_first_position() {
        let fake = FakeChatService::new(SELF.0);
        let members = vec![
            MemberRecord::user(5),
            MemberRecord::user(6),
            MemberRecord::user(5),
            MemberRecord::user(7),
        ];
        let recipients =
            select_recipients(&fake, &members, SELF, EligibilityPolicy::default()).await;
        assert_eq!(ids(&recipients), vec![5, 6, 7]);
    }

    #[tokio::test]
    async fn self_is_never_a_recipient() {
        let fake = FakeChatService::new(SELF.0);
        for len in 0..5 {
            let members: Vec<_> = std::iter::repeat(MemberRecord::user(SELF.0))
                .take(len)
                .chain([MemberRecord::user(2)])
                .collect();
            let recipients =
                select_recipients(&fake, &members, SELF, EligibilityPolicy::default()).await;
            assert!(!recipients.contains(&SELF));
        }
    }
}
