use beans_db::Data;
use beans_types::models::{Message, Permission, Standup, UserId};
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::identity::authenticate;
use crate::Workspace;

const REMOVED_BODY: &str = "Removed user";

fn require_global_owner(data: &Data, user_id: UserId) -> CoreResult<()> {
    if !data.user(user_id).is_some_and(|u| u.is_global_owner()) {
        return Err(CoreError::denied("only a global owner can do this"));
    }
    Ok(())
}

fn global_owner_count(data: &Data) -> usize {
    data.users.iter().filter(|u| u.is_global_owner()).count()
}

/// Strip a removed user out of the workspace. Their id stays retired and
/// their messages stay in place with a placeholder body.
fn scrub(data: &mut Data, target: UserId) {
    let handle = data.user(target).map(|u| u.handle.clone()).unwrap_or_default();
    if let Some(user) = data.user_mut(target) {
        user.email.clear();
        user.handle.clear();
        user.name_first = "Removed".into();
        user.name_last = "user".into();
        user.sessions.clear();
        user.reset_code = None;
        user.removed = true;
        user.permission = Permission::Member;
    }

    for channel in &mut data.channels {
        channel.all_members.retain(|&id| id != target);
        channel.owner_members.retain(|&id| id != target);
        for msg in channel.messages.iter_mut().filter(|m| m.u_id == target) {
            msg.message = REMOVED_BODY.into();
        }
        if let Standup::Running {
            buffer: Some(msg), ..
        } = &mut channel.standup
        {
            scrub_standup_lines(msg, &handle);
        }
    }
    for dm in &mut data.dms {
        dm.members.retain(|&id| id != target);
        dm.owners.retain(|&id| id != target);
        for msg in dm.messages.iter_mut().filter(|m| m.u_id == target) {
            msg.message = REMOVED_BODY.into();
        }
    }
}

/// A pending standup message mixes several authors, one `handle: text`
/// line each. Only the removed user's lines are replaced.
fn scrub_standup_lines(msg: &mut Message, handle: &str) {
    if handle.is_empty() {
        return;
    }
    let prefix = format!("{}: ", handle);
    msg.message = msg
        .message
        .split('\n')
        .map(|line| {
            if line.starts_with(&prefix) {
                REMOVED_BODY
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
}

impl Workspace {
    pub fn admin_user_remove(&self, token: &str, target: UserId) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, _| {
            let uid = authenticate(data, &hash)?;
            require_global_owner(data, uid)?;
            let user = data
                .user(target)
                .filter(|u| !u.removed)
                .ok_or_else(|| CoreError::invalid("user does not exist"))?;
            if user.is_global_owner() && global_owner_count(data) == 1 {
                return Err(CoreError::invalid("cannot remove the only global owner"));
            }

            scrub(data, target);
            info!("User {} removed by {}", target, uid);
            Ok(())
        })
    }

    pub fn admin_permission_change(&self, token: &str, target: UserId, permission_id: i64) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, _| {
            let uid = authenticate(data, &hash)?;
            require_global_owner(data, uid)?;
            let user = data
                .user(target)
                .filter(|u| !u.removed)
                .ok_or_else(|| CoreError::invalid("user does not exist"))?;
            let permission = u8::try_from(permission_id)
                .ok()
                .and_then(|p| Permission::try_from(p).ok())
                .ok_or_else(|| CoreError::invalid("permission id must be 1 or 2"))?;
            if user.is_global_owner() && permission == Permission::Member && global_owner_count(data) == 1 {
                return Err(CoreError::invalid("cannot demote the only global owner"));
            }
            if user.permission == permission {
                return Err(CoreError::invalid("user already has that permission"));
            }

            if let Some(user) = data.user_mut(target) {
                user.permission = permission;
            }
            info!("User {} set to {:?} by {}", target, permission, uid);
            Ok(())
        })
    }
}
