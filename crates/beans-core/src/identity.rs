use beans_db::Data;
use beans_types::models::{Container, UserId};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Hash stored for a session token. Raw tokens never reach the store.
pub fn hash_token(token: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

pub(crate) fn new_token() -> String {
    Uuid::new_v4().to_string()
}

/// Resolve a session hash to its live user.
pub(crate) fn authenticate(data: &Data, token_hash: &str) -> CoreResult<UserId> {
    data.user_by_session(token_hash)
        .filter(|u| !u.removed)
        .map(|u| u.id)
        .ok_or_else(|| CoreError::denied("invalid token"))
}

pub(crate) fn handle_of(data: &Data, user_id: UserId) -> String {
    data.user(user_id).map(|u| u.handle.clone()).unwrap_or_default()
}

pub(crate) fn is_global_owner(data: &Data, user_id: UserId) -> bool {
    data.user(user_id).is_some_and(|u| u.is_global_owner())
}

/// Whether `user_id` may moderate messages in `container`: a channel owner,
/// a global Owner who is a member, or the DM owner.
pub(crate) fn has_owner_rights(data: &Data, container: Container, user_id: UserId) -> bool {
    match container {
        Container::Channel(id) => data.channel(id).is_some_and(|c| {
            c.is_owner(user_id) || (c.is_member(user_id) && is_global_owner(data, user_id))
        }),
        Container::Dm(id) => data.dm(id).is_some_and(|d| d.is_owner(user_id)),
    }
}

impl crate::Workspace {
    pub(crate) fn session_hash(&self, token: &str) -> String {
        hash_token(token, &self.config().token_secret)
    }

    /// The user id behind a session token.
    pub fn session_user(&self, token: &str) -> CoreResult<UserId> {
        let hash = self.session_hash(token);
        self.read(|data, _| authenticate(data, &hash))
    }
}
