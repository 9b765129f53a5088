use vigencia::{RequestRegistry, RequestState, SpaceError, SpaceId, UserId};

const TEACHER: UserId = UserId(10);
const STAFF: UserId = UserId(20);

#[test]
fn request_conversation_round_trip() {
    let mut registry = RequestRegistry::new();
    let campus = Some(SpaceId(1));
    let id = registry
        .open_request(TEACHER, "Book the auditorium", "Conference on the 12th", campus, 1_000)
        .unwrap();

    // Staff picks it up, asks a question, teacher answers, staff resolves.
    registry.get_mut(id).unwrap().open(2_000, STAFF);
    registry
        .get_mut(id)
        .unwrap()
        .add_comment("Which hours?", STAFF, 3_000);
    registry
        .get_mut(id)
        .unwrap()
        .add_comment("From 9 to 13.", TEACHER, 4_000);
    registry
        .get_mut(id)
        .unwrap()
        .add_comment_and_close("Booked.", STAFF, 5_000);

    let request = registry.get(id).unwrap();
    assert_eq!(request.current_state(), RequestState::Resolved);
    assert_eq!(request.owner(), Some(STAFF));
    assert_eq!(request.comments().len(), 4);
    assert_eq!(request.unread_comments(STAFF), 0);
    assert_eq!(request.unread_comments(TEACHER), 1);
    assert_eq!(request.follow_up_subject(), "Re: Book the auditorium");
    assert_eq!(request.most_recent_comment_instant(), 5_000);
    assert_eq!(
        request.states().iter().map(|s| s.state).collect::<Vec<_>>(),
        vec![RequestState::New, RequestState::Open, RequestState::Resolved]
    );
}

#[test]
fn reopened_requests_move_between_queues() {
    let mut registry = RequestRegistry::new();
    let id = registry
        .open_request(TEACHER, "Chairs", "Need 20 more", None, 1_000)
        .unwrap();
    registry
        .get_mut(id)
        .unwrap()
        .add_comment_and_close("Delivered.", STAFF, 2_000);
    assert_eq!(registry.in_state(RequestState::New, None).len(), 0);
    assert_eq!(registry.resolved_by_recent_comment(None).len(), 1);

    registry
        .get_mut(id)
        .unwrap()
        .add_comment_and_open("Only 10 arrived.", TEACHER, 3_000);
    assert!(registry.resolved_by_recent_comment(None).is_empty());
    let open: Vec<_> = registry
        .in_state(RequestState::Open, None)
        .iter()
        .map(|r| r.id())
        .collect();
    assert_eq!(open, vec![id]);
}

#[test]
fn campus_scoping_follows_the_request() {
    let campus_a = SpaceId(1);
    let campus_b = SpaceId(2);
    let mut registry = RequestRegistry::new();
    let on_a = registry
        .open_request(TEACHER, "a", "a", Some(campus_a), 1_000)
        .unwrap();
    let _on_b = registry
        .open_request(TEACHER, "b", "b", Some(campus_b), 2_000)
        .unwrap();
    let anywhere = registry
        .open_request(TEACHER, "c", "c", None, 3_000)
        .unwrap();

    let ids: Vec<_> = registry
        .in_state(RequestState::New, Some(campus_a))
        .iter()
        .map(|r| r.id())
        .collect();
    assert_eq!(ids, vec![anywhere, on_a]);
    assert_eq!(registry.in_state(RequestState::New, None).len(), 3);
}

#[test]
fn unknown_request_lookups_fail() {
    let mut registry = RequestRegistry::new();
    assert!(matches!(
        registry.get(vigencia::RequestId(9)),
        Err(SpaceError::NotFound("request"))
    ));
    assert!(registry.by_identification(1).is_none());
    let id = registry
        .open_request(TEACHER, "a", "a", None, 1_000)
        .unwrap();
    assert_eq!(registry.by_identification(1).unwrap().id(), id);
    assert!(registry.get_mut(id).is_ok());
}
