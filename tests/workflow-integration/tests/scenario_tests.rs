use sendix_common::{ProposalStatus, Role, ShipStage, ThreadId};
use sendix_engine::{HomeBadges, WorkflowError, WorkflowRequest, WorkflowResponse};
use sendix_workflow_integration::harness::TestHarness;

/// Acme posts L1, Bob and Carl bid, Sendix filters Bob, Acme picks Bob, Bob
/// delivers and Acme sees the system message until reading the thread.
#[test]
fn load_to_delivery_end_to_end() {
    let mut h = TestHarness::setup();
    let (bob, carl) = (h.bob.clone(), h.carl.clone());

    let l1 = h.publish("A", "B");
    assert_eq!(l1.id.as_str(), "L1");
    assert_eq!(l1.owner, "Acme");

    let p1 = h.bid(&bob, &l1.id, 1000.0);
    assert_eq!(p1.id.as_str(), "P1");
    assert_eq!(p1.status, ProposalStatus::Pending);
    let p2 = h.bid(&carl, &l1.id, 950.0);
    assert_eq!(p2.id.as_str(), "P2");

    assert_eq!(h.filter(&p1.id).status, ProposalStatus::Filtered);

    let approval = h.workflow.approve(&h.acme, &p1.id).unwrap();
    assert_eq!(approval.approved.status, ProposalStatus::Approved);
    assert_eq!(approval.approved.ship_stage, Some(ShipStage::Pending));
    assert_eq!(approval.rejected, vec![p2.id.clone()]);
    assert_eq!(
        h.workflow.snapshot().proposal(&p2.id).unwrap().status,
        ProposalStatus::Rejected
    );

    let thread: ThreadId = "L1__Bob".parse().unwrap();
    assert_eq!(h.workflow.threads_visible_to(&h.acme), vec![thread.clone()]);
    assert!(h.workflow.threads_visible_to(&carl).is_empty());

    let stages: Vec<_> = (0..3).map(|_| h.advance(&bob, &p1.id)).collect();
    assert_eq!(stages[0].to, ShipStage::Loading);
    assert_eq!(stages[1].to, ShipStage::InTransit);
    assert_eq!(stages[2].to, ShipStage::Delivered);
    assert!(stages[..2].iter().all(|c| c.notification.is_none()));

    let notice = stages[2].notification.clone().expect("delivery announced");
    assert_eq!(notice.thread_id, thread);
    assert!(notice.is_system());

    assert!(h.unread(&thread, &h.acme) >= 1);
    assert!(h.unread(&thread, &h.acme) >= 1, "unread persists until marked");
    h.workflow.mark_read(&h.acme, &thread).unwrap();
    assert_eq!(h.unread(&thread, &h.acme), 0);
}

#[test]
fn chat_between_the_three_parties() {
    let mut h = TestHarness::setup();
    let (_, p1) = h.shipment_for_bob();
    let thread = ThreadId::new(p1.load_id.clone(), "Bob");
    let (acme, bob, sendix) = (h.acme.clone(), h.bob.clone(), h.sendix.clone());

    let hello = h.post(&bob, &thread, "Loading at 9");
    h.post(&acme, &thread, "Dock 3");
    h.post(&sendix, &thread, "Noted");

    assert_eq!(h.unread(&thread, &bob), 2);
    assert_eq!(h.workflow.unread_total(&bob), 2);

    let rows = h.workflow.thread_summaries(&bob, None);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "A → B");
    assert_eq!(rows[0].unread, 2);
    assert_eq!(rows[0].last_message.as_ref().unwrap().text, "Noted");

    let texts: Vec<_> = h
        .workflow
        .read_thread(&bob, &thread)
        .unwrap()
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(texts, ["Loading at 9", "Dock 3", "Noted"]);
    assert_eq!(h.workflow.unread_total(&bob), 0);

    h.workflow
        .delete_message(&sendix, &thread, hello.timestamp)
        .unwrap();
    assert_eq!(h.workflow.snapshot().thread_messages(&thread).len(), 2);

    let carl = h.carl.clone();
    assert!(matches!(
        h.workflow.read_thread(&carl, &thread),
        Err(WorkflowError::Forbidden { .. })
    ));
}

#[test]
fn chat_is_closed_before_approval() {
    let mut h = TestHarness::setup();
    let bob = h.bob.clone();
    let l1 = h.publish("A", "B");
    let p1 = h.bid(&bob, &l1.id, 1000.0);
    h.filter(&p1.id);

    let thread = ThreadId::new(l1.id.clone(), "Bob");
    let err = h
        .workflow
        .post_message(&bob, &thread, sendix_engine::Draft::new("hi"))
        .unwrap_err();
    assert!(matches!(err, WorkflowError::ThreadNotActive(_)));
}

#[test]
fn home_badges_track_the_workflow() {
    let mut h = TestHarness::setup();
    let carl = h.carl.clone();
    let (_, p1) = h.shipment_for_bob();
    h.publish("C", "D");

    assert_eq!(
        h.workflow.home_badges(&h.acme),
        HomeBadges::Shipper {
            my_loads: 2,
            active_tracking: 1
        }
    );
    assert_eq!(
        h.workflow.home_badges(&carl),
        HomeBadges::Carrier {
            open_offers: 1,
            my_proposals: 0,
            my_shipments: 0,
            active_tracking: 0
        }
    );

    let bob = h.bob.clone();
    h.workflow
        .set_stage(&bob, &p1.id, ShipStage::Delivered)
        .unwrap();
    assert_eq!(
        h.workflow.home_badges(&bob),
        HomeBadges::Carrier {
            open_offers: 1,
            my_proposals: 1,
            my_shipments: 1,
            active_tracking: 0
        }
    );
    assert_eq!(
        h.workflow.home_badges(&h.sendix),
        HomeBadges::Intermediary {
            pending_moderation: 0,
            unread: 1
        }
    );

    let summary = h.workflow.summary();
    assert_eq!((summary.loads, summary.proposals, summary.approved), (2, 1, 1));
    assert_eq!(summary.in_flight, 0);
}

/// Delivery notices stay recognisable: nobody can sign in as their sender.
#[test]
fn the_system_sender_is_not_a_login() {
    let mut h = TestHarness::setup();
    let (_, p1) = h.shipment_for_bob();
    let thread = ThreadId::new(p1.load_id.clone(), "Bob");

    let rs = h.workflow.handle_request(WorkflowRequest::Login {
        name: "System".into(),
        role: Role::Intermediary,
    });
    assert!(matches!(rs, WorkflowResponse::Error(_)), "unexpected {rs:?}");
    assert!(h.workflow.session().is_none());

    let bob = h.bob.clone();
    h.workflow
        .set_stage(&bob, &p1.id, ShipStage::Delivered)
        .unwrap();
    let system: Vec<_> = h
        .workflow
        .snapshot()
        .thread_messages(&thread)
        .into_iter()
        .filter(|m| m.is_system())
        .collect();
    assert_eq!(system.len(), 1);
    assert_eq!(h.unread(&thread, &h.sendix), 1);
}
