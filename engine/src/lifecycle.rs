//! Proposal lifecycle: submission, moderation and selection.
//!
//! Every function validates all of its guards before touching the snapshot,
//! so a returned error always means nothing changed.

use chrono::{DateTime, Utc};
use sendix_common::{
    LoadId, Proposal, ProposalId, ProposalStatus, Role, Session, ShipStage, Snapshot,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{require_role, Result, WorkflowError};

/// Outcome of a shipper selecting a proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub approved: Proposal,
    /// Sibling proposals that this approval moved to `rejected`.
    pub rejected: Vec<ProposalId>,
}

/// Create a pending bid by `actor` on `load_id`.
pub fn submit_proposal(
    snapshot: &mut Snapshot,
    actor: &Session,
    load_id: &LoadId,
    vehicle: &str,
    price: f64,
    issue_id: impl FnOnce(&Snapshot) -> ProposalId,
    now: DateTime<Utc>,
) -> Result<Proposal> {
    require_role(actor, Role::Carrier, "submit proposals")?;
    if snapshot.load(load_id).is_none() {
        return Err(WorkflowError::load_not_found(load_id));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(WorkflowError::InvalidPrice(price));
    }
    let vehicle = vehicle.trim();
    if vehicle.is_empty() {
        return Err(WorkflowError::MissingField("vehicle"));
    }
    if snapshot.approved_on(load_id).is_some() {
        return Err(WorkflowError::ListingClosed(load_id.clone()));
    }
    if snapshot.has_applied(load_id, &actor.name) {
        return Err(WorkflowError::DuplicateSubmission {
            load: load_id.clone(),
            carrier: actor.name.clone(),
        });
    }

    let proposal = Proposal {
        id: issue_id(snapshot),
        load_id: load_id.clone(),
        carrier: actor.name.clone(),
        vehicle: vehicle.to_string(),
        price,
        status: ProposalStatus::Pending,
        ship_stage: Some(ShipStage::Pending),
        created_at: now,
    };
    snapshot.proposals.insert(0, proposal.clone());
    info!(proposal = %proposal.id, load = %load_id, carrier = %actor.name, price, "proposal submitted");
    Ok(proposal)
}

fn moderate(
    snapshot: &mut Snapshot,
    actor: &Session,
    id: &ProposalId,
    to: ProposalStatus,
    action: &'static str,
) -> Result<Proposal> {
    require_role(actor, Role::Intermediary, action)?;
    let proposal = snapshot
        .proposal_mut(id)
        .ok_or_else(|| WorkflowError::proposal_not_found(id))?;
    let from = proposal.status;
    if !from.can_transition_to(&to) {
        return Err(WorkflowError::InvalidTransition { from, to });
    }
    proposal.status = to;
    info!(proposal = %id, %from, %to, moderator = %actor.name, "proposal moderated");
    Ok(proposal.clone())
}

/// `pending → filtered`: the proposal becomes selectable by the shipper.
pub fn mark_filtered(snapshot: &mut Snapshot, actor: &Session, id: &ProposalId) -> Result<Proposal> {
    moderate(snapshot, actor, id, ProposalStatus::Filtered, "filter proposals")
}

/// `filtered → pending`.
pub fn unfilter(snapshot: &mut Snapshot, actor: &Session, id: &ProposalId) -> Result<Proposal> {
    moderate(snapshot, actor, id, ProposalStatus::Pending, "unfilter proposals")
}

/// `pending | filtered → rejected`.
pub fn reject(snapshot: &mut Snapshot, actor: &Session, id: &ProposalId) -> Result<Proposal> {
    moderate(snapshot, actor, id, ProposalStatus::Rejected, "reject proposals")
}

/// Select a filtered proposal as the load's winner.
///
/// The winner becomes `approved` with its stage seeded to `pending`, and
/// every other non-approved proposal on the same load becomes `rejected`,
/// in one step.
pub fn approve(snapshot: &mut Snapshot, actor: &Session, id: &ProposalId) -> Result<Approval> {
    require_role(actor, Role::Shipper, "approve proposals")?;
    let winner = snapshot
        .proposal(id)
        .ok_or_else(|| WorkflowError::proposal_not_found(id))?;
    let load_id = winner.load_id.clone();
    let from = winner.status;

    let load = snapshot
        .load(&load_id)
        .ok_or_else(|| WorkflowError::load_not_found(&load_id))?;
    if !load.is_owned_by(&actor.name) {
        return Err(WorkflowError::forbidden(actor, "approve proposals on another shipper's load"));
    }
    if !from.can_transition_to(&ProposalStatus::Approved) {
        return Err(WorkflowError::InvalidTransition {
            from,
            to: ProposalStatus::Approved,
        });
    }
    if snapshot.approved_on(&load_id).is_some() {
        return Err(WorkflowError::ListingClosed(load_id));
    }

    let mut approved = None;
    let mut rejected = Vec::new();
    for p in snapshot.proposals.iter_mut().filter(|p| p.load_id == load_id) {
        if &p.id == id {
            p.status = ProposalStatus::Approved;
            p.ship_stage.get_or_insert(ShipStage::Pending);
            approved = Some(p.clone());
        } else if !p.is_approved() {
            if p.status != ProposalStatus::Rejected {
                rejected.push(p.id.clone());
            }
            p.status = ProposalStatus::Rejected;
        }
    }
    let approved = approved.ok_or_else(|| WorkflowError::proposal_not_found(id))?;

    info!(
        proposal = %id,
        load = %load_id,
        carrier = %approved.carrier,
        rejected = rejected.len(),
        "proposal approved"
    );
    Ok(Approval { approved, rejected })
}
