use beans_db::Data;
use beans_types::api::{
    ChannelsExistPoint, ChannelsJoinedPoint, DmsExistPoint, DmsJoinedPoint, MessagesExistPoint,
    MessagesSentPoint, UserStatsResponse, UserStatsView, WorkspaceStatsResponse,
    WorkspaceStatsView,
};
use beans_types::models::{StatSeries, User, UserId};

use crate::error::{CoreError, CoreResult};
use crate::identity::authenticate;

// -- Recorders --

pub(crate) fn channels_joined(data: &mut Data, user_id: UserId, delta: i64, now: i64) {
    if let Some(user) = data.user_mut(user_id) {
        user.stats.channels_joined.record(delta, now);
    }
}

pub(crate) fn dms_joined(data: &mut Data, user_id: UserId, delta: i64, now: i64) {
    if let Some(user) = data.user_mut(user_id) {
        user.stats.dms_joined.record(delta, now);
    }
}

pub(crate) fn messages_sent(data: &mut Data, user_id: UserId, now: i64) {
    if let Some(user) = data.user_mut(user_id) {
        user.stats.messages_sent.record(1, now);
    }
}

pub(crate) fn channels_exist(data: &mut Data, now: i64) {
    data.workspace_stats.channels_exist.record(1, now);
}

pub(crate) fn dms_exist(data: &mut Data, delta: i64, now: i64) {
    data.workspace_stats.dms_exist.record(delta, now);
}

pub(crate) fn messages_exist(data: &mut Data, delta: i64, now: i64) {
    data.workspace_stats.messages_exist.record(delta, now);
}

// -- Rates --

pub fn involvement_rate(data: &Data, user: &User) -> f64 {
    let ws = &data.workspace_stats;
    let denominator = f64::from(ws.channels_exist.current())
        + f64::from(ws.dms_exist.current())
        + f64::from(ws.messages_exist.current());
    if denominator == 0.0 {
        return 0.0;
    }
    let numerator = f64::from(user.stats.channels_joined.current())
        + f64::from(user.stats.dms_joined.current())
        + f64::from(user.stats.messages_sent.current());
    (numerator / denominator).clamp(0.0, 1.0)
}

pub fn utilization_rate(data: &Data) -> f64 {
    let active: Vec<&User> = data.users.iter().filter(|u| !u.removed).collect();
    if active.is_empty() {
        return 0.0;
    }
    let involved = active
        .iter()
        .filter(|u| u.stats.channels_joined.current() > 0 || u.stats.dms_joined.current() > 0)
        .count();
    involved as f64 / active.len() as f64
}

fn points<T>(series: &StatSeries, f: impl Fn(u32, i64) -> T) -> Vec<T> {
    series.points().iter().map(|p| f(p.count, p.time_stamp)).collect()
}

impl crate::Workspace {
    pub fn user_stats(&self, token: &str) -> CoreResult<UserStatsResponse> {
        let hash = self.session_hash(token);
        self.read(|data, _| {
            let uid = authenticate(data, &hash)?;
            let Some(user) = data.user(uid) else {
                return Err(CoreError::denied("invalid token"));
            };
            let stats = &user.stats;
            Ok(UserStatsResponse {
                user_stats: UserStatsView {
                    channels_joined: points(&stats.channels_joined, |n, t| ChannelsJoinedPoint {
                        num_channels_joined: n,
                        time_stamp: t,
                    }),
                    dms_joined: points(&stats.dms_joined, |n, t| DmsJoinedPoint {
                        num_dms_joined: n,
                        time_stamp: t,
                    }),
                    messages_sent: points(&stats.messages_sent, |n, t| MessagesSentPoint {
                        num_messages_sent: n,
                        time_stamp: t,
                    }),
                    involvement_rate: involvement_rate(data, user),
                },
            })
        })
    }

    pub fn workspace_stats(&self, token: &str) -> CoreResult<WorkspaceStatsResponse> {
        let hash = self.session_hash(token);
        self.read(|data, _| {
            authenticate(data, &hash)?;
            let ws = &data.workspace_stats;
            Ok(WorkspaceStatsResponse {
                workspace_stats: WorkspaceStatsView {
                    channels_exist: points(&ws.channels_exist, |n, t| ChannelsExistPoint {
                        num_channels_exist: n,
                        time_stamp: t,
                    }),
                    dms_exist: points(&ws.dms_exist, |n, t| DmsExistPoint {
                        num_dms_exist: n,
                        time_stamp: t,
                    }),
                    messages_exist: points(&ws.messages_exist, |n, t| MessagesExistPoint {
                        num_messages_exist: n,
                        time_stamp: t,
                    }),
                    utilization_rate: utilization_rate(data),
                },
            })
        })
    }
}
