use sendix_common::{ProposalStatus, Role, Session, ShipStage, ThreadId};
use sendix_engine::{
    Draft, JsonFileStore, ManualClock, SequentialIds, Store, Workflow, WorkflowRequest,
    WorkflowResponse,
};
use sendix_workflow_integration::make_new_load;

fn open(path: &std::path::Path) -> Workflow<JsonFileStore, ManualClock, SequentialIds> {
    Workflow::open(
        JsonFileStore::new(path),
        ManualClock::starting_at(1_700_000_000_000),
        SequentialIds::default(),
    )
    .unwrap()
}

/// Work done in one process is visible after reopening the file.
#[test]
fn snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sendix").join("snapshot.json");
    let acme = Session::shipper("Acme");
    let bob = Session::carrier("Bob");

    {
        let mut wf = open(&path);
        let l1 = wf.create_load(&acme, make_new_load("A", "B")).unwrap();
        let p1 = wf.submit_proposal(&bob, &l1.id, "Truck", 1000.0).unwrap();
        wf.mark_filtered(&Session::intermediary("Sendix"), &p1.id)
            .unwrap();
        wf.approve(&acme, &p1.id).unwrap();
        wf.post_message(&bob, &ThreadId::new(l1.id, "Bob"), Draft::new("hola"))
            .unwrap();
    }

    let wf = open(&path);
    let snap = wf.snapshot();
    assert_eq!(snap.loads.len(), 1);
    assert_eq!(snap.proposals[0].status, ProposalStatus::Approved);
    assert_eq!(snap.messages.len(), 1);
    assert_eq!(wf.unread_total(&acme), 1);
    assert!(snap.validate());

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let mut keys: Vec<_> = raw.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        ["lastShipStage", "loads", "messages", "proposals", "readLedger", "session"]
    );
    assert_eq!(raw["readLedger"]["L1__Bob"]["Bob"]["at"], snap.messages[0].timestamp);
    assert_eq!(raw["readLedger"]["L1__Bob"]["Bob"]["seq"], snap.messages[0].seq);
}

/// Documents written by the first web client load and are rewritten with
/// the current names.
#[test]
fn legacy_documents_are_upgraded_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(
        &path,
        r#"{
            "user": {"name": "Bob", "role": "transportista"},
            "loads": [{
                "id": "k3j9x0ab", "owner": "Acme", "origen": "Rosario", "destino": "Córdoba",
                "tipo": "Granos", "tamano": "20 t", "fecha": "2025-05-01",
                "createdAt": "2025-04-01T10:00:00Z"
            }],
            "proposals": [{
                "id": "q8w7e6r5", "loadId": "k3j9x0ab", "carrier": "Bob", "vehicle": "Semi",
                "price": 1500, "status": "approved", "shipStatus": "en-carga",
                "createdAt": "2025-04-02T10:00:00Z"
            }],
            "messages": [{
                "threadId": "k3j9x0ab__Bob", "from": "Acme", "role": "empresa",
                "text": "hola", "ts": 1743588000000
            }],
            "step": "en-carga",
            "reads": {}
        }"#,
    )
    .unwrap();

    let mut wf = open(&path);
    assert_eq!(wf.session(), Some(&Session::carrier("Bob")));

    let rs = wf.handle_request(WorkflowRequest::Advance("q8w7e6r5".into()));
    let WorkflowResponse::StageChange(change) = rs else {
        panic!("unexpected response {rs:?}");
    };
    assert_eq!(change.from, ShipStage::Loading);
    assert_eq!(change.to, ShipStage::InTransit);

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("\"in-transit\""));
    assert!(written.contains("\"carrier\""));
    assert!(!written.contains("transportista"));
    assert!(!written.contains("\"ts\""));

    let reloaded = JsonFileStore::new(&path).load().unwrap();
    assert_eq!(reloaded.session.unwrap().role, Role::Carrier);
    assert_eq!(reloaded.loads[0].origin, "Rosario");
}
