mod common;

use beans_core::CoreError;
use common::harness;

#[test]
fn only_owner_cannot_be_demoted() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let bob = h.user("Bob", "Ray");
    let _carl = h.user("Carl", "Day");

    assert!(matches!(
        h.ws.admin_permission_change(&ann.token, ann.auth_user_id, 2),
        Err(CoreError::InvalidRequest(_))
    ));
    h.ws.admin_permission_change(&ann.token, bob.auth_user_id, 1).unwrap();
    h.ws.admin_permission_change(&ann.token, ann.auth_user_id, 2).unwrap();

    // Ann is a member now.
    assert!(matches!(
        h.ws.admin_permission_change(&ann.token, bob.auth_user_id, 2),
        Err(CoreError::AccessDenied(_))
    ));
}

#[test]
fn permission_change_validates_arguments() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let bob = h.user("Bob", "Ray");

    assert!(h.ws.admin_permission_change(&ann.token, bob.auth_user_id, 3).is_err());
    assert!(h.ws.admin_permission_change(&ann.token, bob.auth_user_id, -1).is_err());
    assert!(h.ws.admin_permission_change(&ann.token, 9, 1).is_err());
    assert!(matches!(
        h.ws.admin_permission_change(&ann.token, bob.auth_user_id, 2),
        Err(CoreError::InvalidRequest(_))
    ));
    assert!(matches!(
        h.ws.admin_permission_change(&bob.token, ann.auth_user_id, 2),
        Err(CoreError::AccessDenied(_))
    ));
}

#[test]
fn removed_user_is_scrubbed_everywhere() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let bob = h.user("Bob", "Ray");
    let c = h.channel(&ann, "general");
    h.ws.channel_join(&bob.token, c).unwrap();
    let dm = h.ws.dm_create(&ann.token, &[bob.auth_user_id]).unwrap().dm_id;
    let in_channel = h.ws.message_send(&bob.token, c, "channel words").unwrap().message_id;
    let in_dm = h.ws.message_send_dm(&bob.token, dm, "dm words").unwrap().message_id;

    h.ws.admin_user_remove(&ann.token, bob.auth_user_id).unwrap();

    let msg = &h.ws.channel_messages(&ann.token, c, 0).unwrap().messages[0];
    assert_eq!((msg.message_id, msg.u_id), (in_channel, bob.auth_user_id));
    assert_eq!(msg.message, "Removed user");
    let msg = &h.ws.dm_messages(&ann.token, dm, 0).unwrap().messages[0];
    assert_eq!((msg.message_id, msg.message.as_str()), (in_dm, "Removed user"));

    assert_eq!(h.ws.channel_details(&ann.token, c).unwrap().all_members.len(), 1);
    assert_eq!(h.ws.dm_details(&ann.token, dm).unwrap().members.len(), 1);

    let profile = h.ws.user_profile(&ann.token, bob.auth_user_id).unwrap().user;
    assert_eq!((profile.name_first.as_str(), profile.name_last.as_str()), ("Removed", "user"));
    assert!(profile.email.is_empty() && profile.handle_str.is_empty());
    assert_eq!(h.ws.users_all(&ann.token).unwrap().users.len(), 1);

    // Sessions are gone, and the id is never handed out again.
    assert!(matches!(h.ws.channels_list(&bob.token), Err(CoreError::AccessDenied(_))));
    let carl = h.user("Carl", "Day");
    assert_ne!(carl.auth_user_id, bob.auth_user_id);
    assert!(h.ws.admin_user_remove(&ann.token, bob.auth_user_id).is_err());
}

#[test]
fn last_owner_cannot_be_removed() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let bob = h.user("Bob", "Ray");

    assert!(matches!(
        h.ws.admin_user_remove(&ann.token, ann.auth_user_id),
        Err(CoreError::InvalidRequest(_))
    ));
    assert!(matches!(
        h.ws.admin_user_remove(&bob.token, ann.auth_user_id),
        Err(CoreError::AccessDenied(_))
    ));
    h.ws.admin_permission_change(&ann.token, bob.auth_user_id, 1).unwrap();
    h.ws.admin_user_remove(&bob.token, ann.auth_user_id).unwrap();
}

#[test]
fn removed_email_can_register_again() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let bob = h.user("Bob", "Ray");
    h.ws.admin_user_remove(&ann.token, bob.auth_user_id).unwrap();

    let again = h.user("Bob", "Ray");
    assert_ne!(again.auth_user_id, bob.auth_user_id);
    let profile = h.ws.user_profile(&again.token, again.auth_user_id).unwrap().user;
    // The removed record released its handle.
    assert_eq!(profile.handle_str, "bobray");
}

#[test]
fn removal_keeps_other_standup_lines() {
    let h = harness();
    let ann = h.user("Ann", "Lee");
    let bob = h.user("Bob", "Ray");
    let c = h.channel(&ann, "general");
    h.ws.channel_join(&bob.token, c).unwrap();

    h.ws.standup_start(&ann.token, c, 5).unwrap();
    h.ws.standup_send(&bob.token, c, "bob line").unwrap();
    h.ws.standup_send(&ann.token, c, "ann line").unwrap();
    h.ws.standup_send(&bob.token, c, "bob again").unwrap();
    h.ws.admin_user_remove(&ann.token, bob.auth_user_id).unwrap();

    h.clock.advance(5);
    assert_eq!(
        h.bodies(&ann, c),
        vec!["Removed user\nannlee: ann line\nRemoved user".to_owned()]
    );
}
