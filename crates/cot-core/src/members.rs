//! Member enumeration, one strategy per chat category.

use tracing::debug;

use crate::{
    domain::{ChatCategory, ChatIdentity, MemberRecord},
    ports::ChatService,
    Error, Result,
};

/// Largest page the protocol serves for supergroup member lists.
pub const SUPERGROUP_PAGE_SIZE: i32 = 200;

/// Fetch the complete member list of a resolved chat.
pub async fn fetch_members(
    service: &dyn ChatService,
    chat: ChatIdentity,
) -> Result<Vec<MemberRecord>> {
    let members = match chat.category {
        ChatCategory::Supergroup => supergroup_members(service, chat.id).await,
        ChatCategory::BasicGroup => service.basic_group_members(chat.id).await,
    };

    members.map_err(|e| Error::MembershipFetch {
        chat_id: chat.id,
        reason: e.to_string(),
    })
}

/// Sequential offset pagination. A page shorter than [`SUPERGROUP_PAGE_SIZE`]
/// ends the listing.
async fn supergroup_members(
    service: &dyn ChatService,
    supergroup_id: i64,
) -> Result<Vec<MemberRecord>> {
    let mut members = Vec::new();
    let mut offset = 0i32;
    loop {
        let page = service
            .supergroup_members(supergroup_id, offset, SUPERGROUP_PAGE_SIZE)
            .await?;
        let page_len = page.len();
        debug!(supergroup_id, offset, page_len, "fetched member page");

        if page_len > SUPERGROUP_PAGE_SIZE as usize {
            return Err(Error::Wire(format!(
                "member page at offset {offset} has {page_len} entries (limit {SUPERGROUP_PAGE_SIZE})"
            )));
        }

        members.extend(page);
        if page_len < SUPERGROUP_PAGE_SIZE as usize {
            break;
        }
        offset += SUPERGROUP_PAGE_SIZE;
    }
    Ok(members)
}
