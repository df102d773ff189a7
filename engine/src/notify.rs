//! System messages emitted into a shipment's chat thread.

use sendix_common::{thread_id_for, Message, Millis, Proposal, Role, Snapshot, SYSTEM_SENDER};
use tracing::info;

/// Append the delivery announcement for `proposal` to its thread.
///
/// The message counts as unread for every participant, including the
/// carrier who triggered it.
pub fn notify_delivered(snapshot: &mut Snapshot, proposal: &Proposal, now: Millis) -> Message {
    let route = snapshot
        .load(&proposal.load_id)
        .map(|load| load.route())
        .unwrap_or_else(|| proposal.load_id.to_string());
    let message = Message {
        thread_id: thread_id_for(proposal),
        from: SYSTEM_SENDER.to_string(),
        role: Role::Intermediary,
        text: format!("Delivery confirmed: {route} by {}.", proposal.carrier),
        timestamp: now,
        seq: snapshot.next_seq(),
        reply_to: None,
        attachments: Vec::new(),
    };
    snapshot.messages.push(message.clone());
    info!(thread = %message.thread_id, proposal = %proposal.id, "delivery notified");
    message
}
