//! The engine facade: one snapshot, one store, every operation.

use sendix_common::{
    is_reserved_sender, Load, LoadId, Message, Millis, NewLoad, Proposal, ProposalId, Role,
    Session, ShipStage, Snapshot, ThreadId,
};
use tracing::{info, warn};

use crate::board::{self, Candidate, ModerationQueue, OpenLoad};
use crate::chat::{self, Draft, ThreadSummary};
use crate::clock::{Clock, SystemClock};
use crate::dashboard::{self, HomeBadges, Summary};
use crate::error::{Result, WorkflowError};
use crate::ids::{IdGenerator, RandomIds};
use crate::ledger;
use crate::lifecycle::{self, Approval};
use crate::store::Store;
use crate::tracker::{self, Shipment, StageChange};

/// Owns the in-memory snapshot and commits every mutation to the store.
///
/// Mutations run against a copy of the snapshot. The copy replaces the live
/// snapshot only after the store accepted it, so a failed guard or a failed
/// save leaves memory and store exactly as they were.
pub struct Workflow<S, C = SystemClock, I = RandomIds> {
    store: S,
    clock: C,
    ids: I,
    snapshot: Snapshot,
}

impl<S: Store> Workflow<S> {
    pub fn with_store(store: S) -> Result<Self> {
        Self::open(store, SystemClock, RandomIds)
    }
}

impl<S: Store, C: Clock, I: IdGenerator> Workflow<S, C, I> {
    pub fn open(store: S, clock: C, ids: I) -> Result<Self> {
        let snapshot = store.load()?;
        if !snapshot.validate() {
            warn!(
                loads = snapshot.loads.len(),
                proposals = snapshot.proposals.len(),
                "stored snapshot breaks workflow invariants"
            );
        }
        Ok(Self {
            store,
            clock,
            ids,
            snapshot,
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn session(&self) -> Option<&Session> {
        self.snapshot.session.as_ref()
    }

    /// The persisted session, or `NoSession`.
    pub fn current_session(&self) -> Result<Session> {
        self.session().cloned().ok_or(WorkflowError::NoSession)
    }

    fn transact<T>(&mut self, op: impl FnOnce(&mut Snapshot) -> Result<T>) -> Result<T> {
        self.transact_with_ids(|snap, _| op(snap))
    }

    /// Like `transact`, for operations that mint ids. Ids are only drawn
    /// once the operation's guards have passed.
    fn transact_with_ids<T>(
        &mut self,
        op: impl FnOnce(&mut Snapshot, &mut I) -> Result<T>,
    ) -> Result<T> {
        let mut working = self.snapshot.clone();
        let out = op(&mut working, &mut self.ids)?;
        self.store.save(&working)?;
        self.snapshot = working;
        Ok(out)
    }

    fn now_millis(&self) -> Millis {
        self.clock.now_millis()
    }

    // session

    pub fn login(&mut self, name: &str, role: Role) -> Result<Session> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkflowError::MissingField("name"));
        }
        if is_reserved_sender(name) {
            return Err(WorkflowError::ReservedName(name.to_string()));
        }
        let session = Session::new(name, role);
        let stored = session.clone();
        self.transact(|snap| {
            snap.session = Some(stored);
            Ok(())
        })?;
        info!(user = %session.name, role = %session.role, "logged in");
        Ok(session)
    }

    pub fn logout(&mut self) -> Result<Option<Session>> {
        let previous = self.transact(|snap| Ok(snap.session.take()))?;
        if let Some(session) = &previous {
            info!(user = %session.name, "logged out");
        }
        Ok(previous)
    }

    // load board

    pub fn create_load(&mut self, actor: &Session, input: NewLoad) -> Result<Load> {
        let now = self.clock.now();
        self.transact_with_ids(|snap, ids| {
            board::create_load(snap, actor, input, |snap| fresh_load_id(ids, snap), now)
        })
    }

    pub fn loads_owned_by(&self, session: &Session) -> Vec<Load> {
        board::loads_owned_by(&self.snapshot, session)
    }

    pub fn open_loads_for(&self, session: &Session) -> Vec<OpenLoad> {
        board::open_loads_for(&self.snapshot, session)
    }

    pub fn proposals_by(&self, carrier: &str) -> Vec<Proposal> {
        board::proposals_by(&self.snapshot, carrier)
    }

    pub fn selectable_proposals(&self, session: &Session, load: &LoadId) -> Result<Vec<Candidate>> {
        board::selectable_proposals(&self.snapshot, session, load)
    }

    pub fn moderation_queue(&self) -> ModerationQueue {
        board::moderation_queue(&self.snapshot)
    }

    // proposal lifecycle

    pub fn submit_proposal(
        &mut self,
        actor: &Session,
        load: &LoadId,
        vehicle: &str,
        price: f64,
    ) -> Result<Proposal> {
        let now = self.clock.now();
        self.transact_with_ids(|snap, ids| {
            let issue = |snap: &Snapshot| fresh_proposal_id(ids, snap);
            lifecycle::submit_proposal(snap, actor, load, vehicle, price, issue, now)
        })
    }

    pub fn mark_filtered(&mut self, actor: &Session, id: &ProposalId) -> Result<Proposal> {
        self.transact(|snap| lifecycle::mark_filtered(snap, actor, id))
    }

    pub fn unfilter(&mut self, actor: &Session, id: &ProposalId) -> Result<Proposal> {
        self.transact(|snap| lifecycle::unfilter(snap, actor, id))
    }

    pub fn reject(&mut self, actor: &Session, id: &ProposalId) -> Result<Proposal> {
        self.transact(|snap| lifecycle::reject(snap, actor, id))
    }

    pub fn approve(&mut self, actor: &Session, id: &ProposalId) -> Result<Approval> {
        self.transact(|snap| lifecycle::approve(snap, actor, id))
    }

    // chat

    pub fn threads_visible_to(&self, session: &Session) -> Vec<ThreadId> {
        chat::threads_visible_to(&self.snapshot, session)
    }

    pub fn thread_summaries(&self, session: &Session, query: Option<&str>) -> Vec<ThreadSummary> {
        chat::thread_summaries(&self.snapshot, session, query)
    }

    pub fn post_message(&mut self, sender: &Session, thread: &ThreadId, draft: Draft) -> Result<Message> {
        let now = self.now_millis();
        self.transact(|snap| chat::post_message(snap, sender, thread, draft, now))
    }

    pub fn delete_message(
        &mut self,
        requester: &Session,
        thread: &ThreadId,
        timestamp: Millis,
    ) -> Result<Message> {
        self.transact(|snap| chat::delete_message(snap, requester, thread, timestamp))
    }

    pub fn read_thread(&mut self, session: &Session, thread: &ThreadId) -> Result<Vec<Message>> {
        let now = self.now_millis();
        self.transact(|snap| chat::read_thread(snap, session, thread, now))
    }

    // read ledger

    pub fn compute_unread(&self, thread: &ThreadId, user: &str) -> usize {
        ledger::compute_unread(&self.snapshot, thread, user)
    }

    pub fn mark_read(&mut self, session: &Session, thread: &ThreadId) -> Result<()> {
        let now = self.now_millis();
        self.transact(|snap| ledger::mark_read(snap, session, thread, now))
    }

    pub fn mark_all_read(&mut self, session: &Session) -> Result<usize> {
        let now = self.now_millis();
        self.transact(|snap| Ok(ledger::mark_all_read(snap, session, now)))
    }

    pub fn unread_total(&self, session: &Session) -> usize {
        ledger::unread_total(&self.snapshot, session)
    }

    // tracking

    pub fn shipments_for(
        &self,
        session: &Session,
        only_active: bool,
        query: Option<&str>,
    ) -> Vec<Shipment> {
        tracker::shipments_for(&self.snapshot, session, only_active, query)
    }

    pub fn advance(&mut self, actor: &Session, id: &ProposalId) -> Result<StageChange> {
        let now = self.now_millis();
        self.transact(|snap| tracker::advance(snap, actor, id, now))
    }

    pub fn set_stage(&mut self, actor: &Session, id: &ProposalId, stage: ShipStage) -> Result<StageChange> {
        let now = self.now_millis();
        self.transact(|snap| tracker::set_stage(snap, actor, id, stage, now))
    }

    pub fn reset_stage(&mut self, actor: &Session, id: &ProposalId) -> Result<StageChange> {
        let now = self.now_millis();
        self.transact(|snap| tracker::reset_stage(snap, actor, id, now))
    }

    // dashboards

    pub fn summary(&self) -> Summary {
        dashboard::summary(&self.snapshot)
    }

    pub fn home_badges(&self, session: &Session) -> HomeBadges {
        dashboard::home_badges(&self.snapshot, session)
    }
}

fn fresh_load_id(ids: &mut impl IdGenerator, snapshot: &Snapshot) -> LoadId {
    loop {
        let id = ids.next_load_id();
        if snapshot.load(&id).is_none() {
            return id;
        }
    }
}

fn fresh_proposal_id(ids: &mut impl IdGenerator, snapshot: &Snapshot) -> ProposalId {
    loop {
        let id = ids.next_proposal_id();
        if snapshot.proposal(&id).is_none() {
            return id;
        }
    }
}
