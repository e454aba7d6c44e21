use std::collections::{HashSet, VecDeque};

use beans_db::Data;
use beans_types::api::{DmCreateResponse, DmDetailsResponse, DmSummary, DmsResponse};
use beans_types::models::{Container, Dm, DmId, UserId};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::identity::authenticate;
use crate::{Workspace, notifications, stats, views};

fn existing(data: &Data, dm_id: DmId) -> CoreResult<&Dm> {
    data.dm(dm_id).ok_or_else(|| CoreError::invalid("dm does not exist"))
}

/// Participant handles, sorted, joined with ", ".
fn dm_name(data: &Data, members: &[UserId]) -> String {
    let mut handles: Vec<&str> = members
        .iter()
        .filter_map(|&id| data.user(id))
        .map(|u| u.handle.as_str())
        .collect();
    handles.sort_unstable();
    handles.join(", ")
}

impl Workspace {
    /// Open a DM between the caller and `targets`. The caller owns it.
    pub fn dm_create(&self, token: &str, targets: &[UserId]) -> CoreResult<DmCreateResponse> {
        let hash = self.session_hash(token);
        self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            let mut seen = HashSet::new();
            for &target in targets {
                if !data.user(target).is_some_and(|u| !u.removed) {
                    return Err(CoreError::invalid("user does not exist"));
                }
                if target == uid {
                    return Err(CoreError::invalid("cannot add yourself to a dm"));
                }
                if !seen.insert(target) {
                    return Err(CoreError::invalid("duplicate user in dm"));
                }
            }

            let members: Vec<UserId> = std::iter::once(uid).chain(targets.iter().copied()).collect();
            let name = dm_name(data, &members);
            let dm_id = data.allocate_dm_id();
            let creator = data.user(uid).map(|u| u.handle.clone()).unwrap_or_default();

            for &target in targets {
                let text = format!("{} added you to {}", creator, name);
                notifications::push(data, target, Container::Dm(dm_id), text);
            }
            for &member in &members {
                stats::dms_joined(data, member, 1, now);
            }
            stats::dms_exist(data, 1, now);

            debug!("User {} created dm {} ({})", uid, dm_id, name);
            data.dms.push(Dm {
                dm_id,
                name,
                members,
                owners: vec![uid],
                messages: VecDeque::new(),
            });
            Ok(DmCreateResponse { dm_id })
        })
    }

    pub fn dm_list(&self, token: &str) -> CoreResult<DmsResponse> {
        let hash = self.session_hash(token);
        self.read(|data, _| {
            let uid = authenticate(data, &hash)?;
            let dms = data
                .dms
                .iter()
                .filter(|d| d.is_member(uid))
                .map(|d| DmSummary {
                    dm_id: d.dm_id,
                    name: d.name.clone(),
                })
                .collect();
            Ok(DmsResponse { dms })
        })
    }

    pub fn dm_details(&self, token: &str, dm_id: DmId) -> CoreResult<DmDetailsResponse> {
        let hash = self.session_hash(token);
        self.read(|data, _| {
            let uid = authenticate(data, &hash)?;
            let dm = existing(data, dm_id)?;
            if !dm.is_member(uid) {
                return Err(CoreError::denied("not a member of this dm"));
            }
            Ok(DmDetailsResponse {
                name: dm.name.clone(),
                members: dm
                    .members
                    .iter()
                    .filter_map(|&id| data.user(id))
                    .map(views::profile)
                    .collect(),
            })
        })
    }

    pub fn dm_leave(&self, token: &str, dm_id: DmId) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            let dm = data
                .dm_mut(dm_id)
                .ok_or_else(|| CoreError::invalid("dm does not exist"))?;
            if !dm.is_member(uid) {
                return Err(CoreError::denied("not a member of this dm"));
            }
            dm.members.retain(|&id| id != uid);
            dm.owners.retain(|&id| id != uid);
            stats::dms_joined(data, uid, -1, now);
            Ok(())
        })
    }

    /// Delete a DM and its messages. Only its owner may do this.
    pub fn dm_remove(&self, token: &str, dm_id: DmId) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            if !existing(data, dm_id)?.is_owner(uid) {
                return Err(CoreError::denied("only the dm owner can remove it"));
            }
            let Some(idx) = data.dms.iter().position(|d| d.dm_id == dm_id) else {
                return Err(CoreError::invalid("dm does not exist"));
            };
            let dm = data.dms.remove(idx);

            for &member in &dm.members {
                stats::dms_joined(data, member, -1, now);
            }
            stats::dms_exist(data, -1, now);
            stats::messages_exist(data, -(dm.messages.len() as i64), now);
            debug!("Dm {} removed with {} messages", dm_id, dm.messages.len());
            Ok(())
        })
    }
}
