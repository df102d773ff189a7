//! Error types for the workflow engine.

use sendix_common::{LoadId, Millis, ProposalId, ProposalStatus, Role, Session, ThreadId};
use thiserror::Error;

use crate::store::StoreError;

/// Failures an engine operation can report. All of them are local and
/// recoverable by the caller; none leaves the snapshot half-written.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("proposal cannot move from {from} to {to}")]
    InvalidTransition {
        from: ProposalStatus,
        to: ProposalStatus,
    },

    #[error("carrier {carrier} already has a proposal on load {load}")]
    DuplicateSubmission { load: LoadId, carrier: String },

    #[error("load {0} already has an approved proposal")]
    ListingClosed(LoadId),

    #[error("{actor} ({role}) may not {action}")]
    Forbidden {
        actor: String,
        role: Role,
        action: &'static str,
    },

    #[error("proposal {0} is not approved and has no shipment")]
    NotShippable(ProposalId),

    #[error("thread {0} has no approved proposal")]
    ThreadNotActive(ThreadId),

    #[error("message text is empty")]
    EmptyMessage,

    #[error("reply target {timestamp} does not exist in thread {thread}")]
    ReplyNotFound { thread: ThreadId, timestamp: Millis },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("price must be a finite, non-negative number (got {0})")]
    InvalidPrice(f64),

    #[error("{0} must not be blank")]
    MissingField(&'static str),

    #[error("no active session")]
    NoSession,

    #[error("`{0}` is reserved for messages written by the engine")]
    ReservedName(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    pub(crate) fn forbidden(actor: &Session, action: &'static str) -> Self {
        WorkflowError::Forbidden {
            actor: actor.name.clone(),
            role: actor.role,
            action,
        }
    }

    pub(crate) fn load_not_found(id: &LoadId) -> Self {
        WorkflowError::NotFound {
            kind: "load",
            id: id.to_string(),
        }
    }

    pub(crate) fn proposal_not_found(id: &ProposalId) -> Self {
        WorkflowError::NotFound {
            kind: "proposal",
            id: id.to_string(),
        }
    }
}

pub type Result<T, E = WorkflowError> = std::result::Result<T, E>;

/// Fail with `Forbidden` unless `actor` plays `role`.
pub(crate) fn require_role(actor: &Session, role: Role, action: &'static str) -> Result<()> {
    if actor.is(role) {
        Ok(())
    } else {
        Err(WorkflowError::forbidden(actor, action))
    }
}
