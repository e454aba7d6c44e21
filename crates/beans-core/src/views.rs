//! Store records rendered for a particular reader.

use beans_types::api::{MessageView, ReactView, UserProfile};
use beans_types::models::{Message, User, UserId};

pub fn profile(user: &User) -> UserProfile {
    UserProfile {
        u_id: user.id,
        email: user.email.clone(),
        name_first: user.name_first.clone(),
        name_last: user.name_last.clone(),
        handle_str: user.handle.clone(),
        profile_img_url: user.profile_img_url.clone(),
    }
}

pub fn message(msg: &Message, reader: UserId) -> MessageView {
    MessageView {
        message_id: msg.message_id,
        u_id: msg.u_id,
        message: msg.message.clone(),
        time_sent: msg.time_sent,
        reacts: msg
            .reacts
            .iter()
            .map(|r| ReactView {
                react_id: r.react_id,
                u_ids: r.u_ids.clone(),
                is_this_user_reacted: r.u_ids.contains(&reader),
            })
            .collect(),
        is_pinned: msg.is_pinned,
    }
}
