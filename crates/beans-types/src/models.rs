use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub type UserId = u32;
pub type ChannelId = u32;
pub type DmId = u32;
pub type MessageId = u32;

/// The only reaction kind the workspace supports.
pub const REACT_LIKE: u32 = 1;

/// Workspace-wide permission level. Serialized as its numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Permission {
    Owner = 1,
    Member = 2,
}

impl From<Permission> for u8 {
    fn from(p: Permission) -> Self {
        p as u8
    }
}

impl TryFrom<u8> for Permission {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Self::Owner),
            2 => Ok(Self::Member),
            other => Err(format!("unknown permission id {}", other)),
        }
    }
}

/// Where a message or notification lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Container {
    Channel(ChannelId),
    Dm(DmId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub container: Container,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatPoint {
    pub count: u32,
    pub time_stamp: i64,
}

/// Append-only count history. Each change pushes a new point; `current`
/// is the base for the next change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSeries {
    current: u32,
    points: Vec<StatPoint>,
}

impl StatSeries {
    pub fn starting_at(now: i64) -> Self {
        Self {
            current: 0,
            points: vec![StatPoint { count: 0, time_stamp: now }],
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn points(&self) -> &[StatPoint] {
        &self.points
    }

    /// Apply a signed change and record the resulting count. Never drops below zero.
    pub fn record(&mut self, delta: i64, now: i64) {
        let next = (i64::from(self.current) + delta).clamp(0, i64::from(u32::MAX));
        self.current = next as u32;
        self.points.push(StatPoint {
            count: self.current,
            time_stamp: now,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub channels_joined: StatSeries,
    pub dms_joined: StatSeries,
    pub messages_sent: StatSeries,
}

impl UserStats {
    pub fn new(now: i64) -> Self {
        Self {
            channels_joined: StatSeries::starting_at(now),
            dms_joined: StatSeries::starting_at(now),
            messages_sent: StatSeries::starting_at(now),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub handle: String,
    pub email: String,
    pub name_first: String,
    pub name_last: String,
    pub password_hash: String,
    pub permission: Permission,
    pub removed: bool,
    /// Hashes of the live session tokens.
    pub sessions: Vec<String>,
    /// Newest first.
    pub notifications: Vec<Notification>,
    pub stats: UserStats,
    pub profile_img_url: String,
    pub reset_code: Option<String>,
    pub time_created: i64,
}

impl User {
    pub fn is_global_owner(&self) -> bool {
        !self.removed && self.permission == Permission::Owner
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct React {
    pub react_id: u32,
    pub u_ids: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub u_id: UserId,
    pub message: String,
    pub time_sent: i64,
    pub reacts: Vec<React>,
    pub is_pinned: bool,
}

impl Message {
    pub fn new(message_id: MessageId, u_id: UserId, message: String, time_sent: i64) -> Self {
        Self {
            message_id,
            u_id,
            message,
            time_sent,
            reacts: vec![React {
                react_id: REACT_LIKE,
                u_ids: Vec::new(),
            }],
            is_pinned: false,
        }
    }

    pub fn has_reacted(&self, user_id: UserId) -> bool {
        self.reacts.iter().any(|r| r.u_ids.contains(&user_id))
    }
}

/// Per-channel standup window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Standup {
    #[default]
    Idle,
    Running {
        time_finish: i64,
        starter: UserId,
        /// Combined message being assembled, created by the first line sent.
        buffer: Option<Message>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub channel_id: ChannelId,
    pub name: String,
    pub is_public: bool,
    pub owner_members: Vec<UserId>,
    pub all_members: Vec<UserId>,
    /// Newest first.
    pub messages: VecDeque<Message>,
    pub standup: Standup,
}

impl Channel {
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.all_members.contains(&user_id)
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_members.contains(&user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dm {
    pub dm_id: DmId,
    pub name: String,
    pub members: Vec<UserId>,
    pub owners: Vec<UserId>,
    /// Newest first.
    pub messages: VecDeque<Message>,
}

impl Dm {
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owners.contains(&user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceStats {
    pub channels_exist: StatSeries,
    pub dms_exist: StatSeries,
    pub messages_exist: StatSeries,
}

impl WorkspaceStats {
    pub fn new(now: i64) -> Self {
        Self {
            channels_exist: StatSeries::starting_at(now),
            dms_exist: StatSeries::starting_at(now),
            messages_exist: StatSeries::starting_at(now),
        }
    }
}
