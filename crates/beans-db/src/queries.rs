use std::collections::VecDeque;

use beans_types::models::{
    Channel, ChannelId, Container, Dm, DmId, Message, MessageId, User, UserId,
};

use crate::models::Data;

impl Data {
    // -- Users --

    /// The user holding a session whose hash is `token_hash`.
    pub fn user_by_session(&self, token_hash: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.sessions.iter().any(|s| s == token_hash))
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(id as usize).filter(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.get_mut(id as usize).filter(|u| u.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| !u.removed && u.email == email)
    }

    pub fn handle_taken(&self, handle: &str) -> bool {
        self.users.iter().any(|u| !u.removed && u.handle == handle)
    }

    // -- Channels & DMs --

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.channel_id == id)
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.channel_id == id)
    }

    pub fn dm(&self, id: DmId) -> Option<&Dm> {
        self.dms.iter().find(|d| d.dm_id == id)
    }

    pub fn dm_mut(&mut self, id: DmId) -> Option<&mut Dm> {
        self.dms.iter_mut().find(|d| d.dm_id == id)
    }

    pub fn container_exists(&self, container: Container) -> bool {
        match container {
            Container::Channel(id) => self.channel(id).is_some(),
            Container::Dm(id) => self.dm(id).is_some(),
        }
    }

    pub fn container_name(&self, container: Container) -> Option<&str> {
        match container {
            Container::Channel(id) => self.channel(id).map(|c| c.name.as_str()),
            Container::Dm(id) => self.dm(id).map(|d| d.name.as_str()),
        }
    }

    pub fn container_members(&self, container: Container) -> Option<&[UserId]> {
        match container {
            Container::Channel(id) => self.channel(id).map(|c| c.all_members.as_slice()),
            Container::Dm(id) => self.dm(id).map(|d| d.members.as_slice()),
        }
    }

    pub fn is_member(&self, container: Container, user_id: UserId) -> bool {
        self.container_members(container)
            .is_some_and(|m| m.contains(&user_id))
    }

    // -- Messages --

    pub fn messages(&self, container: Container) -> Option<&VecDeque<Message>> {
        match container {
            Container::Channel(id) => self.channel(id).map(|c| &c.messages),
            Container::Dm(id) => self.dm(id).map(|d| &d.messages),
        }
    }

    pub fn messages_mut(&mut self, container: Container) -> Option<&mut VecDeque<Message>> {
        match container {
            Container::Channel(id) => self.channel_mut(id).map(|c| &mut c.messages),
            Container::Dm(id) => self.dm_mut(id).map(|d| &mut d.messages),
        }
    }

    /// Every channel and DM, channels first.
    pub fn containers(&self) -> impl Iterator<Item = Container> + '_ {
        let channels = self.channels.iter().map(|c| Container::Channel(c.channel_id));
        let dms = self.dms.iter().map(|d| Container::Dm(d.dm_id));
        channels.chain(dms)
    }

    /// Find which container holds a message.
    pub fn locate_message(&self, id: MessageId) -> Option<Container> {
        self.containers().find(|&c| {
            self.messages(c)
                .is_some_and(|msgs| msgs.iter().any(|m| m.message_id == id))
        })
    }

    pub fn message(&self, id: MessageId) -> Option<(Container, &Message)> {
        let container = self.locate_message(id)?;
        let message = self.messages(container)?.iter().find(|m| m.message_id == id)?;
        Some((container, message))
    }

    pub fn message_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        let container = self.locate_message(id)?;
        self.messages_mut(container)?
            .iter_mut()
            .find(|m| m.message_id == id)
    }

    /// Delete a message, returning it and where it was.
    pub fn take_message(&mut self, id: MessageId) -> Option<(Container, Message)> {
        let container = self.locate_message(id)?;
        let messages = self.messages_mut(container)?;
        let idx = messages.iter().position(|m| m.message_id == id)?;
        messages.remove(idx).map(|m| (container, m))
    }

    /// Number of messages currently visible in channels and DMs.
    pub fn message_count(&self) -> usize {
        let in_channels: usize = self.channels.iter().map(|c| c.messages.len()).sum();
        let in_dms: usize = self.dms.iter().map(|d| d.messages.len()).sum();
        in_channels + in_dms
    }
}
