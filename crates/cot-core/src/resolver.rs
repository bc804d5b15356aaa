//! Group identifier → [`ChatIdentity`].

use tracing::info;

use crate::{
    domain::{ChatCategory, ChatIdentity, ChatKind},
    ports::ChatService,
    Error, Result,
};

const LINK_PREFIXES: [&str; 4] = ["https://t.me/", "http://t.me/", "t.me/", "@"];

/// Strip whitespace, `@` and `t.me/` link prefixes from a group identifier.
pub fn normalize_identifier(raw: &str) -> &str {
    let mut s = raw.trim();
    for prefix in LINK_PREFIXES {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest;
        }
    }
    s.trim_end_matches('/')
}

/// Resolve a public group by username.
pub async fn resolve_chat(service: &dyn ChatService, identifier: &str) -> Result<ChatIdentity> {
    let username = normalize_identifier(identifier);
    if username.is_empty() {
        return Err(Error::Resolution {
            identifier: identifier.to_string(),
            reason: "empty identifier".to_string(),
        });
    }

    let chat = service
        .search_public_chat(username)
        .await
        .map_err(|e| Error::Resolution {
            identifier: username.to_string(),
            reason: e.to_string(),
        })?;

    let identity = match chat.kind {
        ChatKind::Supergroup { supergroup_id, .. } => ChatIdentity {
            id: supergroup_id,
            category: ChatCategory::Supergroup,
        },
        ChatKind::BasicGroup { basic_group_id } => ChatIdentity {
            id: basic_group_id,
            category: ChatCategory::BasicGroup,
        },
        other @ (ChatKind::Private { .. } | ChatKind::Secret { .. }) => {
            return Err(Error::UnsupportedChat {
                identifier: username.to_string(),
                kind: other.name().to_string(),
            })
        }
    };

    info!(
        group = username,
        chat_id = chat.id.0,
        id = identity.id,
        category = %identity.category,
        "resolved chat '{}'",
        chat.title
    );
    Ok(identity)
}
