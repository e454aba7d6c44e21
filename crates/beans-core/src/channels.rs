use std::collections::VecDeque;

use beans_db::Data;
use beans_types::api::{
    ChannelCreateResponse, ChannelDetailsResponse, ChannelSummary, ChannelsResponse, UserProfile,
};
use beans_types::models::{Channel, ChannelId, Container, Standup, UserId};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::identity::{authenticate, handle_of, is_global_owner};
use crate::{Workspace, notifications, stats, views};

const MAX_NAME_CHARS: usize = 20;

fn existing(data: &Data, channel_id: ChannelId) -> CoreResult<&Channel> {
    data.channel(channel_id)
        .ok_or_else(|| CoreError::invalid("channel does not exist"))
}

fn existing_mut(data: &mut Data, channel_id: ChannelId) -> CoreResult<&mut Channel> {
    data.channel_mut(channel_id)
        .ok_or_else(|| CoreError::invalid("channel does not exist"))
}

fn live_user(data: &Data, user_id: UserId) -> CoreResult<()> {
    match data.user(user_id) {
        Some(u) if !u.removed => Ok(()),
        _ => Err(CoreError::invalid("user does not exist")),
    }
}

fn summary(channel: &Channel) -> ChannelSummary {
    ChannelSummary {
        channel_id: channel.channel_id,
        name: channel.name.clone(),
    }
}

impl Workspace {
    pub fn channels_create(&self, token: &str, name: &str, is_public: bool) -> CoreResult<ChannelCreateResponse> {
        let hash = self.session_hash(token);
        self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            let len = name.chars().count();
            if len == 0 || len > MAX_NAME_CHARS {
                return Err(CoreError::invalid("channel name must be 1 to 20 characters"));
            }

            // Channels are never deleted, so the count is always a fresh id.
            let channel_id = data.channels.len() as ChannelId;
            data.channels.push(Channel {
                channel_id,
                name: name.to_owned(),
                is_public,
                owner_members: vec![uid],
                all_members: vec![uid],
                messages: VecDeque::new(),
                standup: Standup::Idle,
            });
            stats::channels_joined(data, uid, 1, now);
            stats::channels_exist(data, now);
            debug!("User {} created channel {} ({})", uid, channel_id, name);
            Ok(ChannelCreateResponse { channel_id })
        })
    }

    /// Channels the caller belongs to.
    pub fn channels_list(&self, token: &str) -> CoreResult<ChannelsResponse> {
        let hash = self.session_hash(token);
        self.read(|data, _| {
            let uid = authenticate(data, &hash)?;
            let channels = data
                .channels
                .iter()
                .filter(|c| c.is_member(uid))
                .map(summary)
                .collect();
            Ok(ChannelsResponse { channels })
        })
    }

    /// Every channel, public or private.
    pub fn channels_list_all(&self, token: &str) -> CoreResult<ChannelsResponse> {
        let hash = self.session_hash(token);
        self.read(|data, _| {
            authenticate(data, &hash)?;
            Ok(ChannelsResponse {
                channels: data.channels.iter().map(summary).collect(),
            })
        })
    }

    pub fn channel_details(&self, token: &str, channel_id: ChannelId) -> CoreResult<ChannelDetailsResponse> {
        let hash = self.session_hash(token);
        self.read(|data, _| {
            let uid = authenticate(data, &hash)?;
            let channel = existing(data, channel_id)?;
            if !channel.is_member(uid) {
                return Err(CoreError::denied("not a member of this channel"));
            }
            let profiles = |ids: &[UserId]| -> Vec<UserProfile> {
                ids.iter().filter_map(|&id| data.user(id)).map(views::profile).collect()
            };
            Ok(ChannelDetailsResponse {
                name: channel.name.clone(),
                is_public: channel.is_public,
                owner_members: profiles(&channel.owner_members),
                all_members: profiles(&channel.all_members),
            })
        })
    }

    pub fn channel_join(&self, token: &str, channel_id: ChannelId) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            let global_owner = is_global_owner(data, uid);
            let channel = existing_mut(data, channel_id)?;
            if channel.is_member(uid) {
                return Err(CoreError::invalid("already a member"));
            }
            if !channel.is_public && !global_owner {
                return Err(CoreError::denied("channel is private"));
            }
            channel.all_members.push(uid);
            stats::channels_joined(data, uid, 1, now);
            Ok(())
        })
    }

    pub fn channel_invite(&self, token: &str, channel_id: ChannelId, invitee: UserId) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            let channel = existing(data, channel_id)?;
            live_user(data, invitee)?;
            if channel.is_member(invitee) {
                return Err(CoreError::invalid("user is already a member"));
            }
            if !channel.is_member(uid) {
                return Err(CoreError::denied("not a member of this channel"));
            }

            let text = format!("{} added you to {}", handle_of(data, uid), channel.name);
            existing_mut(data, channel_id)?.all_members.push(invitee);
            notifications::push(data, invitee, Container::Channel(channel_id), text);
            stats::channels_joined(data, invitee, 1, now);
            Ok(())
        })
    }

    pub fn channel_leave(&self, token: &str, channel_id: ChannelId) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            let channel = existing_mut(data, channel_id)?;
            if !channel.is_member(uid) {
                return Err(CoreError::denied("not a member of this channel"));
            }
            if matches!(channel.standup, Standup::Running { starter, .. } if starter == uid) {
                return Err(CoreError::invalid("cannot leave during your own standup"));
            }
            channel.owner_members.retain(|&id| id != uid);
            channel.all_members.retain(|&id| id != uid);
            stats::channels_joined(data, uid, -1, now);
            Ok(())
        })
    }

    pub fn channel_add_owner(&self, token: &str, channel_id: ChannelId, target: UserId) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, _| {
            let uid = authenticate(data, &hash)?;
            let global_owner = is_global_owner(data, uid);
            live_user(data, target)?;
            let channel = existing_mut(data, channel_id)?;
            if !channel.is_member(target) {
                return Err(CoreError::invalid("user is not a member"));
            }
            if channel.is_owner(target) {
                return Err(CoreError::invalid("user is already an owner"));
            }
            if !channel.is_owner(uid) && !global_owner {
                return Err(CoreError::denied("only an owner can add owners"));
            }
            channel.owner_members.push(target);
            Ok(())
        })
    }

    pub fn channel_remove_owner(&self, token: &str, channel_id: ChannelId, target: UserId) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, _| {
            let uid = authenticate(data, &hash)?;
            let global_owner = is_global_owner(data, uid);
            live_user(data, target)?;
            let channel = existing_mut(data, channel_id)?;
            if !channel.is_owner(target) {
                return Err(CoreError::invalid("user is not an owner"));
            }
            if channel.owner_members.len() == 1 && channel.owner_members[0] == target {
                return Err(CoreError::invalid("cannot remove the only owner"));
            }
            if !channel.is_owner(uid) && !global_owner {
                return Err(CoreError::denied("only an owner can remove owners"));
            }
            channel.owner_members.retain(|&id| id != target);
            Ok(())
        })
    }
}
