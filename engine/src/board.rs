//! The load board: publishing loads and the per-role listings built on
//! loads and proposals.

use chrono::{DateTime, Utc};
use sendix_common::{
    thread_id_for, Load, LoadId, Message, NewLoad, Proposal, ProposalStatus, Role, Session,
    Snapshot, ThreadId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{require_role, Result, WorkflowError};

/// A load a carrier may still bid on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenLoad {
    pub load: Load,
    pub already_applied: bool,
}

/// A filtered proposal the shipper can pick, with its chat preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub proposal: Proposal,
    pub thread_id: ThreadId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub proposal: Proposal,
    pub load: Load,
}

/// The intermediary's inbox.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationQueue {
    pub pending: Vec<QueueEntry>,
    pub filtered: Vec<QueueEntry>,
}

fn required(value: &str, field: &'static str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WorkflowError::MissingField(field));
    }
    Ok(value.to_string())
}

/// Publish a load owned by `actor`.
pub fn create_load(
    snapshot: &mut Snapshot,
    actor: &Session,
    input: NewLoad,
    issue_id: impl FnOnce(&Snapshot) -> LoadId,
    now: DateTime<Utc>,
) -> Result<Load> {
    require_role(actor, Role::Shipper, "publish loads")?;
    let origin = required(&input.origin, "origin")?;
    let destination = required(&input.destination, "destination")?;
    let cargo_type = required(&input.cargo_type, "cargo type")?;
    let date = required(&input.date, "date")?;
    let load = Load {
        id: issue_id(snapshot),
        origin,
        destination,
        cargo_type,
        date,
        size: input
            .size
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        owner: actor.name.clone(),
        created_at: now,
    };
    snapshot.loads.insert(0, load.clone());
    info!(load = %load.id, owner = %actor.name, route = %load.route(), "load published");
    Ok(load)
}

pub fn loads_owned_by(snapshot: &Snapshot, session: &Session) -> Vec<Load> {
    snapshot
        .loads
        .iter()
        .filter(|l| l.is_owned_by(&session.name))
        .cloned()
        .collect()
}

/// Loads the caller does not own and that have no winner yet.
pub fn open_loads_for(snapshot: &Snapshot, session: &Session) -> Vec<OpenLoad> {
    snapshot
        .loads
        .iter()
        .filter(|l| !l.is_owned_by(&session.name) && snapshot.approved_on(&l.id).is_none())
        .map(|l| OpenLoad {
            load: l.clone(),
            already_applied: snapshot.has_applied(&l.id, &session.name),
        })
        .collect()
}

/// Every proposal `carrier` submitted, newest first.
pub fn proposals_by(snapshot: &Snapshot, carrier: &str) -> Vec<Proposal> {
    snapshot
        .proposals
        .iter()
        .filter(|p| p.carrier == carrier)
        .cloned()
        .collect()
}

/// Filtered proposals on a load `session` owns.
pub fn selectable_proposals(
    snapshot: &Snapshot,
    session: &Session,
    load_id: &LoadId,
) -> Result<Vec<Candidate>> {
    require_role(session, Role::Shipper, "review proposals")?;
    let load = snapshot
        .load(load_id)
        .ok_or_else(|| WorkflowError::load_not_found(load_id))?;
    if !load.is_owned_by(&session.name) {
        return Err(WorkflowError::forbidden(session, "review proposals on another shipper's load"));
    }
    Ok(snapshot
        .proposals_on(load_id)
        .filter(|p| p.status == ProposalStatus::Filtered)
        .map(|p| {
            let thread_id = thread_id_for(p);
            Candidate {
                last_message: snapshot.last_message(&thread_id).cloned(),
                thread_id,
                proposal: p.clone(),
            }
        })
        .collect())
}

pub fn moderation_queue(snapshot: &Snapshot) -> ModerationQueue {
    let entries = |status: ProposalStatus| -> Vec<QueueEntry> {
        snapshot
            .proposals
            .iter()
            .filter(|p| p.status == status)
            .filter_map(|p| {
                Some(QueueEntry {
                    load: snapshot.load(&p.load_id)?.clone(),
                    proposal: p.clone(),
                })
            })
            .collect()
    };
    ModerationQueue {
        pending: entries(ProposalStatus::Pending),
        filtered: entries(ProposalStatus::Filtered),
    }
}
