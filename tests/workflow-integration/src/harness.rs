use sendix_common::{Load, LoadId, Message, Proposal, ProposalId, Session, ThreadId};
use sendix_engine::{Draft, ManualClock, MemoryStore, SequentialIds, StageChange, Workflow};

use crate::make_new_load;

/// Milliseconds on the manual clock when a harness starts.
pub const EPOCH: i64 = 1_700_000_000_000;

pub type TestWorkflow = Workflow<MemoryStore, ManualClock, SequentialIds>;

/// Test fixture with named participants sharing one engine.
///
/// Acme ships, Bob and Carl carry, Sendix moderates.
pub struct TestHarness {
    pub workflow: TestWorkflow,
    pub acme: Session,
    pub bob: Session,
    pub carl: Session,
    pub sendix: Session,
}

impl TestHarness {
    pub fn setup() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        tracing_subscriber::fmt::try_init().ok();
        let workflow = Workflow::open(store, ManualClock::starting_at(EPOCH), SequentialIds::default())
            .expect("memory store always loads");
        TestHarness {
            workflow,
            acme: Session::shipper("Acme"),
            bob: Session::carrier("Bob"),
            carl: Session::carrier("Carl"),
            sendix: Session::intermediary("Sendix"),
        }
    }

    /// Acme publishes a load from `origin` to `destination`.
    pub fn publish(&mut self, origin: &str, destination: &str) -> Load {
        self.workflow
            .create_load(&self.acme, make_new_load(origin, destination))
            .expect("Acme can publish")
    }

    /// `carrier` bids `price` on `load`.
    pub fn bid(&mut self, carrier: &Session, load: &LoadId, price: f64) -> Proposal {
        self.workflow
            .submit_proposal(carrier, load, "Semi-trailer", price)
            .expect("bid accepted")
    }

    pub fn filter(&mut self, proposal: &ProposalId) -> Proposal {
        self.workflow
            .mark_filtered(&self.sendix, proposal)
            .expect("Sendix can filter")
    }

    /// Sendix filters `proposal` and Acme picks it.
    pub fn award(&mut self, proposal: &ProposalId) -> Proposal {
        self.filter(proposal);
        self.workflow
            .approve(&self.acme, proposal)
            .expect("Acme can approve")
            .approved
    }

    /// Publish A → B, take a bid from Bob and award it.
    pub fn shipment_for_bob(&mut self) -> (Load, Proposal) {
        let load = self.publish("A", "B");
        let bob = self.bob.clone();
        let bid = self.bid(&bob, &load.id, 1000.0);
        let approved = self.award(&bid.id);
        (load, approved)
    }

    pub fn advance(&mut self, carrier: &Session, proposal: &ProposalId) -> StageChange {
        self.workflow
            .advance(carrier, proposal)
            .expect("owning carrier can advance")
    }

    pub fn post(&mut self, sender: &Session, thread: &ThreadId, text: &str) -> Message {
        self.workflow
            .post_message(sender, thread, Draft::new(text))
            .expect("participant can post")
    }

    pub fn unread(&self, thread: &ThreadId, user: &Session) -> usize {
        self.workflow.compute_unread(thread, &user.name)
    }

    pub fn store(&self) -> &MemoryStore {
        self.workflow.store()
    }
}
