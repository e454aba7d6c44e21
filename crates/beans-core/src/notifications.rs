use std::collections::HashSet;

use beans_db::Data;
use beans_types::api::{NotificationView, NotificationsResponse};
use beans_types::models::{Container, Notification, UserId};

use crate::error::CoreResult;
use crate::identity::authenticate;

/// Characters of the message quoted in a tag notification.
const TAG_PREVIEW_CHARS: usize = 20;

pub(crate) fn push(data: &mut Data, user_id: UserId, container: Container, message: String) {
    if let Some(user) = data.user_mut(user_id).filter(|u| !u.removed) {
        user.notifications.insert(0, Notification { container, message });
    }
}

/// Handles written as `@handle` in a message body, in order of appearance.
pub(crate) fn mentioned_handles(body: &str) -> Vec<&str> {
    let mut handles = Vec::new();
    let mut rest = body;
    while let Some(at) = rest.find('@') {
        rest = &rest[at + 1..];
        let len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        if len > 0 {
            handles.push(&rest[..len]);
        }
        rest = &rest[len..];
    }
    handles
}

/// Notify every current member of `container` tagged in `body`, once each.
pub(crate) fn notify_mentions(data: &mut Data, container: Container, sender: &str, body: &str) {
    let Some(name) = data.container_name(container).map(str::to_owned) else {
        return;
    };
    let preview: String = body.chars().take(TAG_PREVIEW_CHARS).collect();

    let mut tagged = HashSet::new();
    let targets: Vec<UserId> = mentioned_handles(body)
        .into_iter()
        .filter_map(|handle| data.users.iter().find(|u| !u.removed && u.handle == handle))
        .map(|u| u.id)
        .filter(|&id| data.is_member(container, id) && tagged.insert(id))
        .collect();

    for id in targets {
        push(
            data,
            id,
            container,
            format!("{} tagged you in {}: {}", sender, name, preview),
        );
    }
}

pub(crate) fn view(n: &Notification) -> NotificationView {
    let (channel_id, dm_id) = match n.container {
        Container::Channel(id) => (i64::from(id), -1),
        Container::Dm(id) => (-1, i64::from(id)),
    };
    NotificationView {
        channel_id,
        dm_id,
        notification_message: n.message.clone(),
    }
}

impl crate::Workspace {
    /// The caller's notifications, newest first.
    pub fn notifications(&self, token: &str) -> CoreResult<NotificationsResponse> {
        let hash = self.session_hash(token);
        self.read(|data, _| {
            let uid = authenticate(data, &hash)?;
            let notifications = data
                .user(uid)
                .map(|u| u.notifications.iter().map(view).collect())
                .unwrap_or_default();
            Ok(NotificationsResponse { notifications })
        })
    }
}
