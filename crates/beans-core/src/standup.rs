//! Standup windows. A channel is either idle or collecting lines into one
//! buffered message until `time_finish`; expiry is applied lazily by
//! [`settle_all`] at the start of every workspace transaction.

use beans_db::Data;
use beans_types::api::{StandupActiveResponse, StandupStartResponse};
use beans_types::models::{ChannelId, Message, Standup};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::identity::{authenticate, handle_of};
use crate::messages::MAX_MESSAGE_CHARS;
use crate::stats;

/// Close a standup whose window has passed, yielding its buffer.
fn settle(standup: &mut Standup, now: i64) -> Option<Option<Message>> {
    let expired = matches!(standup, Standup::Running { time_finish, .. } if now >= *time_finish);
    if !expired {
        return None;
    }
    match std::mem::take(standup) {
        Standup::Running { buffer, .. } => Some(buffer),
        Standup::Idle => None,
    }
}

/// Close every expired standup, prepending their buffered messages to the
/// channel. Returns how many standups closed.
pub(crate) fn settle_all(data: &mut Data, now: i64) -> usize {
    let mut closed = 0;
    let mut authors = Vec::new();
    for channel in &mut data.channels {
        let Some(buffer) = settle(&mut channel.standup, now) else {
            continue;
        };
        closed += 1;
        if let Some(msg) = buffer {
            debug!(
                "Standup in channel {} flushed as message {}",
                channel.channel_id, msg.message_id
            );
            authors.push(msg.u_id);
            channel.messages.push_front(msg);
        }
    }
    // The combined message counts as sent by whoever opened the buffer.
    for author in authors {
        stats::messages_sent(data, author, now);
        stats::messages_exist(data, 1, now);
    }
    closed
}

impl crate::Workspace {
    pub fn standup_start(
        &self,
        token: &str,
        channel_id: ChannelId,
        length: i64,
    ) -> CoreResult<StandupStartResponse> {
        let hash = self.session_hash(token);
        self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            let channel = data
                .channel_mut(channel_id)
                .ok_or_else(|| CoreError::invalid("channel does not exist"))?;
            if length < 0 {
                return Err(CoreError::invalid("standup length cannot be negative"));
            }
            if !channel.is_member(uid) {
                return Err(CoreError::denied("not a member of this channel"));
            }
            if matches!(channel.standup, Standup::Running { .. }) {
                return Err(CoreError::invalid("a standup is already running"));
            }

            let time_finish = now
                .checked_add(length)
                .ok_or_else(|| CoreError::invalid("standup length is too large"))?;
            channel.standup = Standup::Running {
                time_finish,
                starter: uid,
                buffer: None,
            };
            debug!("Standup started in channel {} until {}", channel_id, time_finish);
            Ok(StandupStartResponse { time_finish })
        })
    }

    pub fn standup_active(
        &self,
        token: &str,
        channel_id: ChannelId,
    ) -> CoreResult<StandupActiveResponse> {
        let hash = self.session_hash(token);
        self.read(|data, _| {
            let uid = authenticate(data, &hash)?;
            let channel = data
                .channel(channel_id)
                .ok_or_else(|| CoreError::invalid("channel does not exist"))?;
            if !channel.is_member(uid) {
                return Err(CoreError::denied("not a member of this channel"));
            }
            Ok(match channel.standup {
                Standup::Running { time_finish, .. } => StandupActiveResponse {
                    is_active: true,
                    time_finish: Some(time_finish),
                },
                Standup::Idle => StandupActiveResponse {
                    is_active: false,
                    time_finish: None,
                },
            })
        })
    }

    pub fn standup_send(&self, token: &str, channel_id: ChannelId, message: &str) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            let channel = data
                .channel(channel_id)
                .ok_or_else(|| CoreError::invalid("channel does not exist"))?;
            if message.chars().count() > MAX_MESSAGE_CHARS {
                return Err(CoreError::invalid("message is too long"));
            }
            if !channel.is_member(uid) {
                return Err(CoreError::denied("not a member of this channel"));
            }
            let first_line = match &channel.standup {
                Standup::Running { buffer, .. } => buffer.is_none(),
                Standup::Idle => return Err(CoreError::invalid("no standup is running")),
            };

            let line = format!("{}: {}", handle_of(data, uid), message);
            let fresh_id = first_line.then(|| data.allocate_message_id());
            let channel = data
                .channel_mut(channel_id)
                .ok_or_else(|| CoreError::invalid("channel does not exist"))?;
            if let Standup::Running { buffer, .. } = &mut channel.standup {
                match buffer {
                    Some(msg) => {
                        msg.message.push('\n');
                        msg.message.push_str(&line);
                    }
                    None => *buffer = fresh_id.map(|id| Message::new(id, uid, line, now)),
                }
            }
            Ok(())
        })
    }
}
