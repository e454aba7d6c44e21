mod common;

use beans_core::CoreError;
use beans_types::api::StandupActiveResponse;
use common::harness;

#[test]
fn two_contributors_make_one_message() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let bob = h.user("Bob", "Ray");
    let c = h.channel(&ann, "general");
    h.ws.channel_join(&bob.token, c).unwrap();

    let finish = h.ws.standup_start(&ann.token, c, 2).unwrap().time_finish;
    assert_eq!(finish, common::START + 2);
    h.ws.standup_send(&ann.token, c, "did a thing").unwrap();
    h.clock.advance(1);
    h.ws.standup_send(&bob.token, c, "did another").unwrap();

    // Nothing is visible until the window closes.
    assert!(h.bodies(&ann, c).is_empty());
    assert_eq!(
        h.ws.standup_active(&bob.token, c).unwrap(),
        StandupActiveResponse {
            is_active: true,
            time_finish: Some(finish),
        }
    );

    h.clock.advance(1);
    let page = h.ws.channel_messages(&ann.token, c, 0).unwrap();
    assert_eq!(page.messages.len(), 1);
    let msg = &page.messages[0];
    assert_eq!(msg.message, "annlee: did a thing\nbobray: did another");
    assert_eq!(msg.u_id, ann.auth_user_id);
    assert_eq!(msg.time_sent, common::START);

    let active = h.ws.standup_active(&ann.token, c).unwrap();
    assert!(!active.is_active);
    assert_eq!(active.time_finish, None);

    let ws = h.ws.workspace_stats(&ann.token).unwrap().workspace_stats;
    assert_eq!(ws.messages_exist.last().unwrap().num_messages_exist, 1);

    // The combined message is credited to the first contributor.
    let ann_stats = h.ws.user_stats(&ann.token).unwrap().user_stats;
    assert_eq!(ann_stats.messages_sent.last().unwrap().num_messages_sent, 1);
    assert_eq!(ann_stats.involvement_rate, 1.0);
    let bob_stats = h.ws.user_stats(&bob.token).unwrap().user_stats;
    assert_eq!(bob_stats.messages_sent.last().unwrap().num_messages_sent, 0);
}

#[test]
fn empty_standup_leaves_no_message() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let c = h.channel(&ann, "general");
    h.ws.standup_start(&ann.token, c, 5).unwrap();
    h.clock.advance(10);
    assert!(h.bodies(&ann, c).is_empty());
    assert!(!h.ws.standup_active(&ann.token, c).unwrap().is_active);
}

#[test]
fn start_and_send_preconditions() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let bob = h.user("Bob", "Ray");
    let c = h.channel(&ann, "general");

    assert!(matches!(
        h.ws.standup_send(&ann.token, c, "early"),
        Err(CoreError::InvalidRequest(_))
    ));
    assert!(h.ws.standup_start(&ann.token, c, -1).is_err());
    assert!(h.ws.standup_start(&ann.token, 3, 5).is_err());
    assert!(matches!(
        h.ws.standup_start(&bob.token, c, 5),
        Err(CoreError::AccessDenied(_))
    ));

    h.ws.standup_start(&ann.token, c, 5).unwrap();
    assert!(matches!(
        h.ws.standup_start(&ann.token, c, 5),
        Err(CoreError::InvalidRequest(_))
    ));
    assert!(h.ws.standup_send(&ann.token, c, &"x".repeat(1001)).is_err());
    assert!(matches!(
        h.ws.standup_send(&bob.token, c, "hi"),
        Err(CoreError::AccessDenied(_))
    ));

    // Once expired a new one may start.
    h.clock.advance(5);
    h.ws.standup_start(&ann.token, c, 5).unwrap();
}

#[test]
fn flushed_message_keeps_its_reserved_id() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let c = h.channel(&ann, "general");
    h.ws.standup_start(&ann.token, c, 3).unwrap();
    h.ws.standup_send(&ann.token, c, "line").unwrap();
    let later = h.ws.message_send(&ann.token, c, "normal").unwrap().message_id;

    h.clock.advance(3);
    let page = h.ws.channel_messages(&ann.token, c, 0).unwrap();
    assert_eq!(page.messages.len(), 2);
    // The flush is prepended when the window closes.
    assert_eq!(page.messages[0].message, "annlee: line");
    assert!(page.messages[0].message_id < later);
}

#[test]
fn oversized_length_is_rejected_and_store_stays_usable() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let c = h.channel(&ann, "general");

    assert!(matches!(
        h.ws.standup_start(&ann.token, c, i64::MAX),
        Err(CoreError::InvalidRequest(_))
    ));
    assert_eq!(h.ws.channels_list(&ann.token).unwrap().channels.len(), 1);
    assert!(!h.ws.standup_active(&ann.token, c).unwrap().is_active);
    h.ws.standup_start(&ann.token, c, 5).unwrap();
}

#[test]
fn window_closes_at_its_finish_time() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let c = h.channel(&ann, "general");

    // A zero-length standup is already over.
    h.ws.standup_start(&ann.token, c, 0).unwrap();
    assert!(!h.ws.standup_active(&ann.token, c).unwrap().is_active);

    h.ws.standup_start(&ann.token, c, 3).unwrap();
    h.clock.advance(2);
    assert!(h.ws.standup_active(&ann.token, c).unwrap().is_active);
    h.clock.advance(1);
    assert!(!h.ws.standup_active(&ann.token, c).unwrap().is_active);
}
