use serde::{Deserialize, Serialize};

use beans_types::models::{Channel, Dm, DmId, MessageId, User, WorkspaceStats};

/// Everything the workspace knows. This is also the on-disk snapshot format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Data {
    pub users: Vec<User>,
    pub channels: Vec<Channel>,
    pub dms: Vec<Dm>,
    pub workspace_stats: WorkspaceStats,
    next_message_id: MessageId,
    next_dm_id: DmId,
}

impl Data {
    pub fn empty(now: i64) -> Self {
        Self {
            users: Vec::new(),
            channels: Vec::new(),
            dms: Vec::new(),
            workspace_stats: WorkspaceStats::new(now),
            next_message_id: 0,
            next_dm_id: 0,
        }
    }

    /// Hand out a message id. Ids are never reused, even after deletion.
    pub fn allocate_message_id(&mut self) -> MessageId {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id
    }

    pub fn allocate_dm_id(&mut self) -> DmId {
        let id = self.next_dm_id;
        self.next_dm_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let mut data = Data::empty(0);
        assert_eq!(data.allocate_message_id(), 0);
        assert_eq!(data.allocate_message_id(), 1);
        assert_eq!(data.allocate_dm_id(), 0);
        assert_eq!(data.allocate_dm_id(), 1);
        assert_eq!(data.allocate_message_id(), 2);
    }
}
