mod common;

use std::time::Duration;

use beans_core::CoreError;
use common::harness;

#[tokio::test(start_paused = true)]
async fn fires_at_time_sent_with_reserved_id() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let c = h.channel(&ann, "general");

    let at = common::START + 10;
    let id = h.ws.message_send_later(&ann.token, c, "later", at).unwrap().message_id;
    assert_eq!(h.ws.scheduler().pending(), 1);
    assert!(h.bodies(&ann, c).is_empty());

    h.clock.advance(10);
    tokio::time::sleep(Duration::from_secs(11)).await;

    let page = h.ws.channel_messages(&ann.token, c, 0).unwrap();
    assert_eq!(page.messages.len(), 1);
    assert_eq!(page.messages[0].message_id, id);
    assert_eq!(page.messages[0].time_sent, at);
    assert_eq!(h.ws.scheduler().pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn validates_before_scheduling() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let bob = h.user("Bob", "Ray");
    let c = h.channel(&ann, "general");
    let now = common::START;

    assert!(matches!(
        h.ws.message_send_later(&ann.token, c, "late", now - 1),
        Err(CoreError::InvalidRequest(_))
    ));
    assert!(h.ws.message_send_later(&ann.token, c, "", now + 5).is_err());
    assert!(h.ws.message_send_later(&ann.token, 4, "x", now + 5).is_err());
    assert!(matches!(
        h.ws.message_send_later(&bob.token, c, "x", now + 5),
        Err(CoreError::AccessDenied(_))
    ));
    assert_eq!(h.ws.scheduler().pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn dm_send_is_dropped_if_sender_left() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let bob = h.user("Bob", "Ray");
    let dm = h.ws.dm_create(&ann.token, &[bob.auth_user_id]).unwrap().dm_id;

    h.ws.message_send_later_dm(&bob.token, dm, "bye", common::START + 5).unwrap();
    h.ws.dm_leave(&bob.token, dm).unwrap();

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(h.ws.dm_messages(&ann.token, dm, 0).unwrap().messages.is_empty());
    assert_eq!(h.ws.scheduler().pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn clear_cancels_outstanding_sends() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let c = h.channel(&ann, "general");
    h.ws.message_send_later(&ann.token, c, "ghost", common::START + 5).unwrap();

    h.ws.clear().unwrap();
    let ann = h.user("Ann", "Lee");
    let c = h.channel(&ann, "general");

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(h.bodies(&ann, c).is_empty());
    assert_eq!(h.ws.scheduler().pending(), 0);
}

#[test]
fn needs_a_runtime() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let c = h.channel(&ann, "general");
    assert!(matches!(
        h.ws.message_send_later(&ann.token, c, "x", common::START + 1),
        Err(CoreError::Internal(_))
    ));
}
