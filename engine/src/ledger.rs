//! Unread accounting over the read ledger.

use sendix_common::{Millis, Session, Snapshot, ThreadId};
use tracing::debug;

use crate::chat::{open_thread, threads_visible_to};
use crate::error::Result;

/// Messages in `thread` newer than `user`'s last read and not sent by them.
pub fn compute_unread(snapshot: &Snapshot, thread: &ThreadId, user: &str) -> usize {
    snapshot
        .read_ledger
        .unread(thread, user, snapshot.messages.iter())
}

/// Record that `session` has seen `thread` as of `now`.
pub fn mark_read(
    snapshot: &mut Snapshot,
    session: &Session,
    thread: &ThreadId,
    now: Millis,
) -> Result<()> {
    open_thread(snapshot, session, thread)?;
    let mark = snapshot.read_mark(now);
    snapshot.read_ledger.mark(thread, &session.name, mark);
    debug!(thread = %thread, reader = %session.name, at = now, "marked read");
    Ok(())
}

/// Aggregate badge: unread messages across every thread `session` can see.
pub fn unread_total(snapshot: &Snapshot, session: &Session) -> usize {
    threads_visible_to(snapshot, session)
        .iter()
        .map(|thread| compute_unread(snapshot, thread, &session.name))
        .sum()
}

/// Mark every visible thread read. Returns how many threads were touched.
pub fn mark_all_read(snapshot: &mut Snapshot, session: &Session, now: Millis) -> usize {
    let threads = threads_visible_to(snapshot, session);
    let mark = snapshot.read_mark(now);
    for thread in &threads {
        snapshot.read_ledger.mark(thread, &session.name, mark);
    }
    debug!(reader = %session.name, threads = threads.len(), "marked all read");
    threads.len()
}
