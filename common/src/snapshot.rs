use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::identity::Session;
use crate::ledger::{ReadLedger, ReadMark};
use crate::load::{Load, LoadId};
use crate::message::{Message, Millis};
use crate::proposal::{Proposal, ProposalId, ProposalStatus, ShipStage};
use crate::thread::ThreadId;

/// Everything the workflow persists, one field per store key.
///
/// `loads` and `proposals` are kept newest first. `messages` are stored in
/// arrival order and sorted on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, alias = "user")]
    pub session: Option<Session>,
    #[serde(default)]
    pub loads: Vec<Load>,
    #[serde(default)]
    pub proposals: Vec<Proposal>,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Mirror of the stage most recently written by the tracker.
    #[serde(default, alias = "step")]
    pub last_ship_stage: ShipStage,
    #[serde(default, alias = "reads")]
    pub read_ledger: ReadLedger,
}

impl Snapshot {
    pub fn load(&self, id: &LoadId) -> Option<&Load> {
        self.loads.iter().find(|l| &l.id == id)
    }

    pub fn proposal(&self, id: &ProposalId) -> Option<&Proposal> {
        self.proposals.iter().find(|p| &p.id == id)
    }

    pub fn proposal_mut(&mut self, id: &ProposalId) -> Option<&mut Proposal> {
        self.proposals.iter_mut().find(|p| &p.id == id)
    }

    pub fn proposals_on<'a, 'k>(
        &'a self,
        load: &'k LoadId,
    ) -> impl Iterator<Item = &'a Proposal> + 'k
    where
        'a: 'k,
    {
        self.proposals.iter().filter(move |p| &p.load_id == load)
    }

    /// The winning proposal on a load, if one has been approved.
    pub fn approved_on(&self, load: &LoadId) -> Option<&Proposal> {
        self.proposals
            .iter()
            .find(|p| &p.load_id == load && p.is_approved())
    }

    pub fn has_applied(&self, load: &LoadId, carrier: &str) -> bool {
        self.proposals_on(load).any(|p| p.carrier == carrier)
    }

    /// The approved proposal a thread belongs to. Threads of unapproved
    /// proposals are not chat-addressable.
    pub fn active_proposal(&self, thread: &ThreadId) -> Option<&Proposal> {
        self.proposals
            .iter()
            .find(|p| p.is_approved() && thread.is_for(p))
    }

    /// Messages of one thread in `(timestamp, seq)` order.
    pub fn thread_messages(&self, thread: &ThreadId) -> Vec<&Message> {
        let mut msgs: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| &m.thread_id == thread)
            .collect();
        msgs.sort_by_key(|m| m.order_key());
        msgs
    }

    pub fn last_message(&self, thread: &ThreadId) -> Option<&Message> {
        self.messages
            .iter()
            .filter(|m| &m.thread_id == thread)
            .max_by_key(|m| m.order_key())
    }

    /// Highest `Message::seq` handed out so far, including ones whose
    /// message was since deleted but is still referenced by a read mark.
    pub fn last_seq(&self) -> u64 {
        self.messages
            .iter()
            .map(|m| m.seq)
            .max()
            .unwrap_or(0)
            .max(self.read_ledger.max_seq())
    }

    /// Next value for `Message::seq`.
    pub fn next_seq(&self) -> u64 {
        self.last_seq() + 1
    }

    /// A read mark covering every message that exists now.
    pub fn read_mark(&self, now: Millis) -> ReadMark {
        ReadMark::new(now, self.last_seq())
    }

    pub fn count_with_status(&self, status: ProposalStatus) -> usize {
        self.proposals.iter().filter(|p| p.status == status).count()
    }

    /// Check the cross-role invariants:
    ///
    /// - at most one approved proposal per load
    /// - at most one proposal per (load, carrier)
    /// - every proposal points at a known load
    pub fn validate(&self) -> bool {
        let mut approved: BTreeMap<&LoadId, usize> = BTreeMap::new();
        let mut pairs: BTreeSet<(&LoadId, &str)> = BTreeSet::new();

        for p in &self.proposals {
            if self.load(&p.load_id).is_none() {
                return false;
            }
            if !pairs.insert((&p.load_id, p.carrier.as_str())) {
                return false;
            }
            if p.is_approved() {
                let n = approved.entry(&p.load_id).or_default();
                *n += 1;
                if *n > 1 {
                    return false;
                }
            }
        }
        true
    }
}
