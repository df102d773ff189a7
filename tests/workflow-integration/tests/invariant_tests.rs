use std::collections::BTreeSet;

use sendix_common::{thread_id_for, ProposalStatus, ShipStage, Snapshot, ThreadId};
use sendix_engine::{MemoryStore, StoreError, WorkflowError};
use sendix_workflow_integration::harness::TestHarness;

fn approved_per_load(snap: &Snapshot) -> bool {
    snap.loads.iter().all(|l| {
        snap.proposals
            .iter()
            .filter(|p| p.load_id == l.id && p.status == ProposalStatus::Approved)
            .count()
            <= 1
    })
}

/// No sequence of approvals yields two winners on one load.
#[test]
fn at_most_one_approved_proposal_per_load() {
    let mut h = TestHarness::setup();
    let (bob, carl) = (h.bob.clone(), h.carl.clone());
    let l1 = h.publish("A", "B");
    let p1 = h.bid(&bob, &l1.id, 1000.0);
    let p2 = h.bid(&carl, &l1.id, 900.0);
    h.filter(&p1.id);
    h.filter(&p2.id);

    h.workflow.approve(&h.acme, &p1.id).unwrap();
    assert!(approved_per_load(h.workflow.snapshot()));

    // P2 was rejected by the approval, and the listing is closed anyway.
    let err = h.workflow.approve(&h.acme, &p2.id).unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    assert!(approved_per_load(h.workflow.snapshot()));
    assert!(h.workflow.snapshot().validate());
}

#[test]
fn one_bid_per_carrier_per_load() {
    let mut h = TestHarness::setup();
    let bob = h.bob.clone();
    let l1 = h.publish("A", "B");
    h.bid(&bob, &l1.id, 1000.0);

    let err = h
        .workflow
        .submit_proposal(&bob, &l1.id, "Van", 500.0)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::DuplicateSubmission { .. }));

    // A rejected bid still counts.
    let p1 = h.workflow.snapshot().proposals[0].id.clone();
    h.workflow.reject(&h.sendix, &p1).unwrap();
    assert!(h.workflow.submit_proposal(&bob, &l1.id, "Van", 500.0).is_err());
    assert_eq!(h.workflow.proposals_by("Bob").len(), 1);
}

#[test]
fn closed_listings_refuse_bids() {
    let mut h = TestHarness::setup();
    let carl = h.carl.clone();
    let (l1, _) = h.shipment_for_bob();
    let err = h
        .workflow
        .submit_proposal(&carl, &l1.id, "Van", 800.0)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::ListingClosed(_)));
    assert!(h.workflow.open_loads_for(&carl).is_empty());
}

#[test]
fn thread_ids_are_pure_and_distinct() {
    let mut h = TestHarness::setup();
    let (bob, carl) = (h.bob.clone(), h.carl.clone());
    let l1 = h.publish("A", "B");
    let l2 = h.publish("B", "C");
    let bids = [
        h.bid(&bob, &l1.id, 1.0),
        h.bid(&carl, &l1.id, 1.0),
        h.bid(&bob, &l2.id, 1.0),
        h.bid(&carl, &l2.id, 1.0),
    ];

    let ids: BTreeSet<ThreadId> = bids.iter().map(thread_id_for).collect();
    assert_eq!(ids.len(), bids.len());
    for p in &bids {
        assert_eq!(thread_id_for(p), thread_id_for(&p.clone()));
        let round: ThreadId = thread_id_for(p).to_string().parse().unwrap();
        assert_eq!(round, thread_id_for(p));
    }
}

#[test]
fn unread_never_drops_until_marked() {
    let mut h = TestHarness::setup();
    let (_, p1) = h.shipment_for_bob();
    let thread = thread_id_for(&p1);
    let (bob, sendix) = (h.bob.clone(), h.sendix.clone());

    let mut last = h.unread(&thread, &h.acme);
    for i in 0..4 {
        let sender = if i % 2 == 0 { &bob } else { &sendix };
        h.post(sender, &thread, "update");
        let now = h.unread(&thread, &h.acme);
        assert!(now >= last);
        last = now;
    }
    assert_eq!(last, 4);

    h.workflow.mark_read(&h.acme, &thread).unwrap();
    assert_eq!(h.unread(&thread, &h.acme), 0);
    h.workflow.mark_read(&h.acme, &thread).unwrap();
    assert_eq!(h.unread(&thread, &h.acme), 0);
}

#[test]
fn stepwise_advance_never_regresses() {
    let mut h = TestHarness::setup();
    let (_, p1) = h.shipment_for_bob();
    let bob = h.bob.clone();

    let mut prev = ShipStage::Pending;
    for _ in 0..6 {
        let change = h.advance(&bob, &p1.id);
        assert!(change.to >= prev);
        assert!(change.to >= change.from);
        prev = change.to;
    }
    assert_eq!(prev, ShipStage::Delivered);

    for stage in [ShipStage::InTransit, ShipStage::Pending, ShipStage::Loading] {
        let change = h.workflow.set_stage(&bob, &p1.id, stage).unwrap();
        assert_eq!(change.to, stage);
    }
    let change = h.workflow.reset_stage(&bob, &p1.id).unwrap();
    assert_eq!(change.to, ShipStage::Pending);
    assert_eq!(h.workflow.snapshot().last_ship_stage, ShipStage::Pending);
}

#[test]
fn delivery_is_announced_once_per_transition() {
    let mut h = TestHarness::setup();
    let (_, p1) = h.shipment_for_bob();
    let bob = h.bob.clone();
    let system = |h: &TestHarness| {
        h.workflow
            .snapshot()
            .messages
            .iter()
            .filter(|m| m.is_system())
            .count()
    };

    for _ in 0..3 {
        h.workflow
            .set_stage(&bob, &p1.id, ShipStage::Delivered)
            .unwrap();
    }
    assert_eq!(system(&h), 1);

    h.advance(&bob, &p1.id);
    assert_eq!(system(&h), 1);

    h.workflow.reset_stage(&bob, &p1.id).unwrap();
    for _ in 0..3 {
        h.advance(&bob, &p1.id);
    }
    assert_eq!(system(&h), 2);
}

#[test]
fn shipments_belong_to_their_carrier() {
    let mut h = TestHarness::setup();
    let (_, p1) = h.shipment_for_bob();
    let carl = h.carl.clone();
    let acme = h.acme.clone();

    assert!(matches!(
        h.workflow.advance(&carl, &p1.id),
        Err(WorkflowError::Forbidden { .. })
    ));
    assert!(matches!(
        h.workflow.set_stage(&acme, &p1.id, ShipStage::Delivered),
        Err(WorkflowError::Forbidden { .. })
    ));
    assert!(h.workflow.shipments_for(&carl, false, None).is_empty());
    assert_eq!(h.workflow.shipments_for(&acme, true, None).len(), 1);
}

/// A store that refuses the write leaves no trace of the approval anywhere.
#[test]
fn approval_is_all_or_nothing() {
    let mut h = TestHarness::with_store(MemoryStore::new());
    let (bob, carl) = (h.bob.clone(), h.carl.clone());
    let l1 = h.publish("A", "B");
    let p1 = h.bid(&bob, &l1.id, 1000.0);
    let p2 = h.bid(&carl, &l1.id, 900.0);
    h.filter(&p1.id);

    let before = h.workflow.snapshot().clone();
    let saves = h.store().save_count();
    h.workflow.store_mut().set_read_only(true);

    let err = h.workflow.approve(&h.acme, &p1.id).unwrap_err();
    assert!(matches!(err, WorkflowError::Store(StoreError::ReadOnly)));
    assert_eq!(h.workflow.snapshot(), &before);
    assert_eq!(h.store().saved(), &before);
    assert_eq!(h.store().save_count(), saves);
    assert_eq!(
        h.workflow.snapshot().proposal(&p2.id).unwrap().status,
        ProposalStatus::Pending
    );
}
