//! Three-party chat between a load's shipper, the winning carrier and the
//! intermediary.
//!
//! A thread exists for every approved proposal and is addressed by
//! [`ThreadId`], derived from the proposal alone.

use sendix_common::{
    is_reserved_sender, thread_id_for, Message, Millis, Proposal, ProposalId, Role, Session, ShipStage, Snapshot,
    ThreadId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, WorkflowError};
use crate::ledger;

/// What a participant types into the composer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub text: String,
    /// Timestamp of the message being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Millis>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

impl Draft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn replying_to(mut self, timestamp: Millis) -> Self {
        self.reply_to = Some(timestamp);
        self
    }

    pub fn with_attachment(mut self, attachment: impl Into<String>) -> Self {
        self.attachments.push(attachment.into());
        self
    }
}

/// One row of the chat list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    pub thread_id: ThreadId,
    pub proposal_id: ProposalId,
    /// "origin → destination" of the load.
    pub title: String,
    pub shipper: String,
    pub carrier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub stage: ShipStage,
    pub unread: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
}

/// Whether `session` takes part in the chat of `proposal`.
pub fn can_see(snapshot: &Snapshot, session: &Session, proposal: &Proposal) -> bool {
    if !proposal.is_approved() {
        return false;
    }
    match session.role {
        Role::Intermediary => true,
        Role::Shipper => snapshot
            .load(&proposal.load_id)
            .is_some_and(|load| load.is_owned_by(&session.name)),
        Role::Carrier => proposal.carrier == session.name,
    }
}

/// Approved proposals whose thread `session` can see, newest first.
pub fn visible_proposals<'a>(
    snapshot: &'a Snapshot,
    session: &'a Session,
) -> impl Iterator<Item = &'a Proposal> + 'a {
    snapshot
        .proposals
        .iter()
        .filter(move |p| can_see(snapshot, session, p))
}

pub fn threads_visible_to(snapshot: &Snapshot, session: &Session) -> Vec<ThreadId> {
    visible_proposals(snapshot, session).map(thread_id_for).collect()
}

/// Find the approved proposal behind `thread` and check that `session` is
/// one of its participants.
pub(crate) fn open_thread<'a>(
    snapshot: &'a Snapshot,
    session: &Session,
    thread: &ThreadId,
) -> Result<&'a Proposal> {
    let proposal = snapshot
        .active_proposal(thread)
        .ok_or_else(|| WorkflowError::ThreadNotActive(thread.clone()))?;
    if !can_see(snapshot, session, proposal) {
        return Err(WorkflowError::forbidden(session, "use a chat they are not part of"));
    }
    Ok(proposal)
}

/// Append a message from `sender` to `thread`, stamped `now`.
pub fn post_message(
    snapshot: &mut Snapshot,
    sender: &Session,
    thread: &ThreadId,
    draft: Draft,
    now: Millis,
) -> Result<Message> {
    let text = draft.text.trim();
    if text.is_empty() {
        return Err(WorkflowError::EmptyMessage);
    }
    if is_reserved_sender(&sender.name) {
        return Err(WorkflowError::ReservedName(sender.name.clone()));
    }
    open_thread(snapshot, sender, thread)?;
    if let Some(cited) = draft.reply_to {
        let resolves = snapshot
            .messages
            .iter()
            .any(|m| &m.thread_id == thread && m.timestamp == cited);
        if !resolves {
            return Err(WorkflowError::ReplyNotFound {
                thread: thread.clone(),
                timestamp: cited,
            });
        }
    }

    let message = Message {
        thread_id: thread.clone(),
        from: sender.name.clone(),
        role: sender.role,
        text: text.to_string(),
        timestamp: now,
        seq: snapshot.next_seq(),
        reply_to: draft.reply_to,
        attachments: draft.attachments,
    };
    snapshot.messages.push(message.clone());
    let mark = snapshot.read_mark(now);
    snapshot.read_ledger.mark(thread, &sender.name, mark);
    info!(thread = %thread, from = %sender.name, seq = message.seq, "message posted");
    Ok(message)
}

/// Remove the message of `thread` stamped `timestamp`. Any participant may
/// remove any message; if several share the timestamp the earliest goes.
pub fn delete_message(
    snapshot: &mut Snapshot,
    requester: &Session,
    thread: &ThreadId,
    timestamp: Millis,
) -> Result<Message> {
    open_thread(snapshot, requester, thread)?;
    let index = snapshot
        .messages
        .iter()
        .enumerate()
        .filter(|(_, m)| &m.thread_id == thread && m.timestamp == timestamp)
        .min_by_key(|(_, m)| m.order_key())
        .map(|(i, _)| i)
        .ok_or_else(|| WorkflowError::NotFound {
            kind: "message",
            id: format!("{thread}@{timestamp}"),
        })?;
    let removed = snapshot.messages.remove(index);
    info!(thread = %thread, by = %requester.name, seq = removed.seq, "message deleted");
    Ok(removed)
}

/// The thread's messages in order. Viewing counts as reading.
pub fn read_thread(
    snapshot: &mut Snapshot,
    session: &Session,
    thread: &ThreadId,
    now: Millis,
) -> Result<Vec<Message>> {
    open_thread(snapshot, session, thread)?;
    let messages = snapshot
        .thread_messages(thread)
        .into_iter()
        .cloned()
        .collect();
    let mark = snapshot.read_mark(now);
    snapshot.read_ledger.mark(thread, &session.name, mark);
    debug!(thread = %thread, reader = %session.name, "thread read");
    Ok(messages)
}

/// The chat list for `session`, optionally narrowed by a case-insensitive
/// search over title, participants and size.
pub fn thread_summaries(
    snapshot: &Snapshot,
    session: &Session,
    query: Option<&str>,
) -> Vec<ThreadSummary> {
    let needle = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    visible_proposals(snapshot, session)
        .filter_map(|p| {
            let load = snapshot.load(&p.load_id)?;
            let thread = thread_id_for(p);
            let summary = ThreadSummary {
                unread: ledger::compute_unread(snapshot, &thread, &session.name),
                last_message: snapshot.last_message(&thread).cloned(),
                thread_id: thread,
                proposal_id: p.id.clone(),
                title: load.route(),
                shipper: load.owner.clone(),
                carrier: p.carrier.clone(),
                size: load.size.clone(),
                stage: p.stage(),
            };
            match &needle {
                Some(needle) if !summary.haystack().contains(needle.as_str()) => None,
                _ => Some(summary),
            }
        })
        .collect()
}

impl ThreadSummary {
    fn haystack(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title,
            self.shipper,
            self.carrier,
            self.size.as_deref().unwrap_or("-")
        )
        .to_lowercase()
    }
}
