//! Shipment tracking on approved proposals.
//!
//! Three entry points share one guard: [`advance`] steps forward and never
//! regresses, [`set_stage`] assigns any stage, [`reset_stage`] goes back to
//! the start. Whichever of them moves a shipment into `delivered` emits the
//! delivery notification.

use sendix_common::{
    thread_id_for, Load, Message, Millis, Proposal, ProposalId, Role, Session, ShipStage,
    Snapshot, ThreadId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chat::visible_proposals;
use crate::error::{Result, WorkflowError};
use crate::ledger::compute_unread;
use crate::notify::notify_delivered;

/// Result of a tracker call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageChange {
    pub proposal: ProposalId,
    pub from: ShipStage,
    pub to: ShipStage,
    /// The system message emitted when this call delivered the shipment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<Message>,
}

impl StageChange {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// One row of the tracking list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub proposal: Proposal,
    pub load: Load,
    pub thread_id: ThreadId,
    pub unread: usize,
}

/// Approved proposals `session` may follow, with the same visibility as
/// their chat threads. `only_active` drops delivered shipments; `query`
/// matches route, carrier and shipper case-insensitively.
pub fn shipments_for(
    snapshot: &Snapshot,
    session: &Session,
    only_active: bool,
    query: Option<&str>,
) -> Vec<Shipment> {
    let needle = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    visible_proposals(snapshot, session)
        .filter(|p| !only_active || !p.stage().is_delivered())
        .filter_map(|p| {
            let load = snapshot.load(&p.load_id)?;
            if let Some(needle) = &needle {
                let haystack = format!(
                    "{} {} {} {}",
                    load.origin, load.destination, p.carrier, load.owner
                )
                .to_lowercase();
                if !haystack.contains(needle.as_str()) {
                    return None;
                }
            }
            let thread_id = thread_id_for(p);
            Some(Shipment {
                unread: compute_unread(snapshot, &thread_id, &session.name),
                thread_id,
                proposal: p.clone(),
                load: load.clone(),
            })
        })
        .collect()
}

/// Move one stage forward, clamped at `delivered`.
pub fn advance(
    snapshot: &mut Snapshot,
    actor: &Session,
    id: &ProposalId,
    now: Millis,
) -> Result<StageChange> {
    apply(snapshot, actor, id, now, ShipStage::next)
}

/// Assign `stage` directly, forwards, backwards or skipping.
pub fn set_stage(
    snapshot: &mut Snapshot,
    actor: &Session,
    id: &ProposalId,
    stage: ShipStage,
    now: Millis,
) -> Result<StageChange> {
    apply(snapshot, actor, id, now, |_| stage)
}

pub fn reset_stage(
    snapshot: &mut Snapshot,
    actor: &Session,
    id: &ProposalId,
    now: Millis,
) -> Result<StageChange> {
    apply(snapshot, actor, id, now, |_| ShipStage::Pending)
}

fn apply(
    snapshot: &mut Snapshot,
    actor: &Session,
    id: &ProposalId,
    now: Millis,
    step: impl FnOnce(ShipStage) -> ShipStage,
) -> Result<StageChange> {
    let proposal = snapshot
        .proposal_mut(id)
        .ok_or_else(|| WorkflowError::proposal_not_found(id))?;
    let owns = match actor.role {
        Role::Carrier => proposal.carrier == actor.name,
        Role::Shipper | Role::Intermediary => false,
    };
    if !owns {
        return Err(WorkflowError::forbidden(actor, "move a shipment they do not carry"));
    }
    if !proposal.is_approved() {
        return Err(WorkflowError::NotShippable(id.clone()));
    }

    let from = proposal.stage();
    let to = step(from);
    proposal.ship_stage = Some(to);
    let proposal = proposal.clone();
    snapshot.last_ship_stage = to;

    let notification = (to.is_delivered() && !from.is_delivered())
        .then(|| notify_delivered(snapshot, &proposal, now));

    if from != to {
        info!(proposal = %id, %from, %to, carrier = %actor.name, "shipment stage changed");
    }
    Ok(StageChange {
        proposal: id.clone(),
        from,
        to,
        notification,
    })
}
