use std::collections::VecDeque;
use std::time::Duration;

use beans_db::Data;
use beans_types::api::{MessageIdResponse, MessagesPage, SearchResponse, ShareResponse};
use beans_types::models::{
    ChannelId, Container, DmId, Message, MessageId, REACT_LIKE, React, UserId,
};
use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult};
use crate::identity::{authenticate, handle_of, has_owner_rights};
use crate::notifications::{self, notify_mentions};
use crate::scheduler::Scheduler;
use crate::{Workspace, stats, views};

pub const MAX_MESSAGE_CHARS: usize = 1000;
pub const PAGE_SIZE: usize = 50;

/// One page of `messages` (newest first) starting at `start`.
pub(crate) fn page(
    messages: &VecDeque<Message>,
    start: u32,
    reader: UserId,
) -> CoreResult<MessagesPage> {
    let len = messages.len();
    let from = start as usize;
    if from > len {
        return Err(CoreError::invalid("start is past the oldest message"));
    }
    let to = (from + PAGE_SIZE).min(len);
    let end = if from + PAGE_SIZE >= len {
        -1
    } else {
        (from + PAGE_SIZE) as i64
    };

    Ok(MessagesPage {
        messages: messages
            .range(from..to)
            .map(|m| views::message(m, reader))
            .collect(),
        start,
        end,
    })
}

/// Checks shared by every way of posting a new message.
fn check_postable(data: &Data, container: Container, author: UserId, body: &str) -> CoreResult<()> {
    if !data.container_exists(container) {
        return Err(CoreError::invalid("channel or dm does not exist"));
    }
    let len = body.chars().count();
    if len == 0 || len > MAX_MESSAGE_CHARS {
        return Err(CoreError::invalid("message must be 1 to 1000 characters"));
    }
    if !data.is_member(container, author) {
        return Err(CoreError::denied("not a member of this channel or dm"));
    }
    Ok(())
}

/// Prepend a message and record it in the statistics. Mentions are left to
/// the caller.
fn post(data: &mut Data, container: Container, msg: Message, now: i64) -> CoreResult<()> {
    let author = msg.u_id;
    let id = msg.message_id;
    data.messages_mut(container)
        .ok_or_else(|| CoreError::invalid("channel or dm does not exist"))?
        .push_front(msg);
    stats::messages_sent(data, author, now);
    stats::messages_exist(data, 1, now);
    debug!("Message {} posted to {:?}", id, container);
    Ok(())
}

/// A message found in a container the reader belongs to.
fn visible(data: &Data, message_id: MessageId, reader: UserId) -> CoreResult<(Container, &Message)> {
    data.message(message_id)
        .filter(|(c, _)| data.is_member(*c, reader))
        .ok_or_else(|| CoreError::invalid("message does not exist"))
}

/// A send that has been validated and given an id but not yet posted.
struct DeferredSend {
    container: Container,
    author: UserId,
    body: String,
    message_id: MessageId,
    time_sent: i64,
}

impl Workspace {
    pub fn message_send(
        &self,
        token: &str,
        channel_id: ChannelId,
        body: &str,
    ) -> CoreResult<MessageIdResponse> {
        self.send_now(token, Container::Channel(channel_id), body)
    }

    pub fn message_send_dm(&self, token: &str, dm_id: DmId, body: &str) -> CoreResult<MessageIdResponse> {
        self.send_now(token, Container::Dm(dm_id), body)
    }

    fn send_now(&self, token: &str, container: Container, body: &str) -> CoreResult<MessageIdResponse> {
        let hash = self.session_hash(token);
        self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            check_postable(data, container, uid, body)?;

            let message_id = data.allocate_message_id();
            post(data, container, Message::new(message_id, uid, body.to_owned(), now), now)?;
            let sender = handle_of(data, uid);
            notify_mentions(data, container, &sender, body);
            Ok(MessageIdResponse { message_id })
        })
    }

    pub fn channel_messages(&self, token: &str, channel_id: ChannelId, start: u32) -> CoreResult<MessagesPage> {
        self.container_messages(token, Container::Channel(channel_id), start)
    }

    pub fn dm_messages(&self, token: &str, dm_id: DmId, start: u32) -> CoreResult<MessagesPage> {
        self.container_messages(token, Container::Dm(dm_id), start)
    }

    fn container_messages(&self, token: &str, container: Container, start: u32) -> CoreResult<MessagesPage> {
        let hash = self.session_hash(token);
        self.read(|data, _| {
            let uid = authenticate(data, &hash)?;
            let messages = data
                .messages(container)
                .ok_or_else(|| CoreError::invalid("channel or dm does not exist"))?;
            if !data.is_member(container, uid) {
                return Err(CoreError::denied("not a member of this channel or dm"));
            }
            page(messages, start, uid)
        })
    }

    /// Replace a message body. An empty body deletes the message.
    pub fn message_edit(&self, token: &str, message_id: MessageId, body: &str) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            if body.chars().count() > MAX_MESSAGE_CHARS {
                return Err(CoreError::invalid("message is too long"));
            }
            let (container, msg) = visible(data, message_id, uid)?;
            if msg.u_id != uid && !has_owner_rights(data, container, uid) {
                return Err(CoreError::denied("only the author or an owner can edit"));
            }

            if body.is_empty() {
                data.take_message(message_id);
                stats::messages_exist(data, -1, now);
                debug!("Message {} deleted by empty edit", message_id);
                return Ok(());
            }
            if let Some(msg) = data.message_mut(message_id) {
                msg.message = body.to_owned();
            }
            let sender = handle_of(data, uid);
            notify_mentions(data, container, &sender, body);
            Ok(())
        })
    }

    pub fn message_remove(&self, token: &str, message_id: MessageId) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            let (container, msg) = visible(data, message_id, uid)?;
            if msg.u_id != uid && !has_owner_rights(data, container, uid) {
                return Err(CoreError::denied("only the author or an owner can remove"));
            }
            data.take_message(message_id);
            stats::messages_exist(data, -1, now);
            Ok(())
        })
    }

    pub fn message_react(&self, token: &str, message_id: MessageId, react_id: u32) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, _| {
            let uid = authenticate(data, &hash)?;
            if react_id != REACT_LIKE {
                return Err(CoreError::invalid("unknown react id"));
            }
            let (container, msg) = visible(data, message_id, uid)?;
            if msg.has_reacted(uid) {
                return Err(CoreError::invalid("already reacted"));
            }
            let author = msg.u_id;

            if let Some(msg) = data.message_mut(message_id) {
                match msg.reacts.iter_mut().find(|r| r.react_id == react_id) {
                    Some(react) => react.u_ids.push(uid),
                    None => msg.reacts.push(React {
                        react_id,
                        u_ids: vec![uid],
                    }),
                }
            }

            let name = data.container_name(container).unwrap_or_default().to_owned();
            let text = format!("{} reacted to your message in {}", handle_of(data, uid), name);
            notifications::push(data, author, container, text);
            Ok(())
        })
    }

    pub fn message_unreact(&self, token: &str, message_id: MessageId, react_id: u32) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, _| {
            let uid = authenticate(data, &hash)?;
            if react_id != REACT_LIKE {
                return Err(CoreError::invalid("unknown react id"));
            }
            let (_, msg) = visible(data, message_id, uid)?;
            if !msg.has_reacted(uid) {
                return Err(CoreError::invalid("not reacted"));
            }
            if let Some(msg) = data.message_mut(message_id) {
                for react in &mut msg.reacts {
                    react.u_ids.retain(|&id| id != uid);
                }
            }
            Ok(())
        })
    }

    pub fn message_pin(&self, token: &str, message_id: MessageId) -> CoreResult<()> {
        self.set_pinned(token, message_id, true)
    }

    pub fn message_unpin(&self, token: &str, message_id: MessageId) -> CoreResult<()> {
        self.set_pinned(token, message_id, false)
    }

    fn set_pinned(&self, token: &str, message_id: MessageId, pinned: bool) -> CoreResult<()> {
        let hash = self.session_hash(token);
        self.write(|data, _| {
            let uid = authenticate(data, &hash)?;
            let (container, msg) = visible(data, message_id, uid)?;
            if !has_owner_rights(data, container, uid) {
                return Err(CoreError::denied("only an owner can pin messages"));
            }
            if msg.is_pinned == pinned {
                let state = if pinned { "pinned" } else { "unpinned" };
                return Err(CoreError::invalid(format!("message is already {}", state)));
            }
            if let Some(msg) = data.message_mut(message_id) {
                msg.is_pinned = pinned;
            }
            Ok(())
        })
    }

    /// Post a quoted copy of a visible message, with an optional prefix,
    /// into a channel or DM. Exactly one of the two ids must be `-1`.
    pub fn message_share(
        &self,
        token: &str,
        og_message_id: MessageId,
        prefix: &str,
        channel_id: i64,
        dm_id: i64,
    ) -> CoreResult<ShareResponse> {
        let hash = self.session_hash(token);
        self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            let target = match (channel_id, dm_id) {
                (-1, id) if id >= 0 => u32::try_from(id).ok().map(Container::Dm),
                (id, -1) if id >= 0 => u32::try_from(id).ok().map(Container::Channel),
                _ => None,
            }
            .ok_or_else(|| CoreError::invalid("exactly one of channelId and dmId must be -1"))?;
            if !data.container_exists(target) {
                return Err(CoreError::invalid("channel or dm does not exist"));
            }
            if prefix.chars().count() > MAX_MESSAGE_CHARS {
                return Err(CoreError::invalid("message is too long"));
            }
            let (_, original) = visible(data, og_message_id, uid)?;
            if !data.is_member(target, uid) {
                return Err(CoreError::denied("not a member of the destination"));
            }

            let body = format!("{}\r\n\"\"\"\r\n{}\r\n\"\"\"", prefix, original.message);
            let shared_message_id = data.allocate_message_id();
            post(data, target, Message::new(shared_message_id, uid, body, now), now)?;
            let sender = handle_of(data, uid);
            notify_mentions(data, target, &sender, prefix);
            Ok(ShareResponse { shared_message_id })
        })
    }

    /// Messages containing `query` across the caller's channels and DMs.
    pub fn search(&self, token: &str, query: &str) -> CoreResult<SearchResponse> {
        let hash = self.session_hash(token);
        self.read(|data, _| {
            let uid = authenticate(data, &hash)?;
            let len = query.chars().count();
            if len == 0 || len > MAX_MESSAGE_CHARS {
                return Err(CoreError::invalid("query must be 1 to 1000 characters"));
            }
            let messages = data
                .containers()
                .filter(|&c| data.is_member(c, uid))
                .filter_map(|c| data.messages(c))
                .flatten()
                .filter(|m| m.message.contains(query))
                .map(|m| views::message(m, uid))
                .collect();
            Ok(SearchResponse { messages })
        })
    }

    pub fn message_send_later(
        &self,
        token: &str,
        channel_id: ChannelId,
        body: &str,
        time_sent: i64,
    ) -> CoreResult<MessageIdResponse> {
        self.send_later(token, Container::Channel(channel_id), body, time_sent)
    }

    pub fn message_send_later_dm(
        &self,
        token: &str,
        dm_id: DmId,
        body: &str,
        time_sent: i64,
    ) -> CoreResult<MessageIdResponse> {
        self.send_later(token, Container::Dm(dm_id), body, time_sent)
    }

    /// Validate now, reserve the id, and post at `time_sent`.
    fn send_later(
        &self,
        token: &str,
        container: Container,
        body: &str,
        time_sent: i64,
    ) -> CoreResult<MessageIdResponse> {
        let runtime = Scheduler::runtime()?;
        let hash = self.session_hash(token);
        let (job, delay) = self.write(|data, now| {
            let uid = authenticate(data, &hash)?;
            check_postable(data, container, uid, body)?;
            if time_sent < now {
                return Err(CoreError::invalid("timeSent is in the past"));
            }
            let job = DeferredSend {
                container,
                author: uid,
                body: body.to_owned(),
                message_id: data.allocate_message_id(),
                time_sent,
            };
            Ok((job, time_sent - now))
        })?;

        let message_id = job.message_id;
        let delay = Duration::from_secs(u64::try_from(delay).unwrap_or_default());
        let workspace = self.clone();
        self.scheduler()
            .schedule(&runtime, delay, move || workspace.deliver(job))?;
        info!("Message {} scheduled for {}", message_id, time_sent);
        Ok(MessageIdResponse { message_id })
    }

    fn deliver(&self, job: DeferredSend) {
        let delivered = self.write(|data, now| {
            if !data.user(job.author).is_some_and(|u| !u.removed) {
                return Err(CoreError::invalid("sender was removed"));
            }
            check_postable(data, job.container, job.author, &job.body)?;
            let msg = Message::new(job.message_id, job.author, job.body.clone(), job.time_sent);
            post(data, job.container, msg, now)?;
            let sender = handle_of(data, job.author);
            notify_mentions(data, job.container, &sender, &job.body);
            Ok(())
        });

        match delivered {
            Ok(()) => info!("Scheduled message {} delivered", job.message_id),
            Err(e) => warn!("Dropped scheduled message {}: {}", job.message_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(n: u32) -> VecDeque<Message> {
        (0..n).rev().map(|i| Message::new(i, 0, format!("m{}", i), i64::from(i))).collect()
    }

    #[test]
    fn short_history_ends_at_minus_one() {
        let page = page(&messages(3), 0, 0).unwrap();
        assert_eq!(page.end, -1);
        let ids: Vec<_> = page.messages.iter().map(|m| m.message_id).collect();
        assert_eq!(ids, vec![2, 1, 0]);
    }

    #[test]
    fn long_history_pages_by_fifty() {
        let msgs = messages(120);
        let first = page(&msgs, 0, 0).unwrap();
        assert_eq!(first.messages.len(), 50);
        assert_eq!(first.end, 50);
        assert_eq!(first.messages[0].message_id, 119);

        let last = page(&msgs, 100, 0).unwrap();
        assert_eq!(last.messages.len(), 20);
        assert_eq!(last.end, -1);
    }

    #[test]
    fn exactly_fifty_has_no_next_page() {
        assert_eq!(page(&messages(50), 0, 0).unwrap().end, -1);
    }

    #[test]
    fn start_at_len_is_empty_but_past_it_fails() {
        let msgs = messages(4);
        let at_end = page(&msgs, 4, 0).unwrap();
        assert!(at_end.messages.is_empty());
        assert_eq!(at_end.end, -1);
        assert!(matches!(page(&msgs, 5, 0), Err(CoreError::InvalidRequest(_))));
    }
}
