use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::message::{Message, Millis};
use crate::thread::ThreadId;

/// How far a reader has seen into a thread: when they looked and the last
/// message sequence number that existed at that moment.
///
/// Documents written before sequence numbers existed store a bare
/// timestamp; those load with `seq = 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredMark")]
pub struct ReadMark {
    pub at: Millis,
    pub seq: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredMark {
    Timestamp(Millis),
    Full {
        at: Millis,
        #[serde(default)]
        seq: u64,
    },
}

impl From<StoredMark> for ReadMark {
    fn from(stored: StoredMark) -> Self {
        match stored {
            StoredMark::Timestamp(at) => ReadMark { at, seq: 0 },
            StoredMark::Full { at, seq } => ReadMark { at, seq },
        }
    }
}

impl ReadMark {
    pub fn new(at: Millis, seq: u64) -> Self {
        Self { at, seq }
    }

    /// True when `message` arrived after this mark: a later timestamp, or a
    /// sequence number assigned after the read in the same millisecond.
    pub fn is_before(&self, message: &Message) -> bool {
        message.timestamp > self.at || message.seq > self.seq
    }

    fn merge(&mut self, other: ReadMark) {
        self.at = self.at.max(other.at);
        self.seq = self.seq.max(other.seq);
    }
}

/// Per-thread, per-user read marks.
///
/// Only used for unread counts, never for access control. A user with no
/// entry has never read the thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadLedger {
    threads: BTreeMap<ThreadId, BTreeMap<String, ReadMark>>,
}

impl ReadLedger {
    pub fn last_read(&self, thread: &ThreadId, user: &str) -> ReadMark {
        self.threads
            .get(thread)
            .and_then(|readers| readers.get(user))
            .copied()
            .unwrap_or_default()
    }

    /// Record that `user` saw `thread` up to `mark`. Marks never move backwards.
    pub fn mark(&mut self, thread: &ThreadId, user: &str, mark: ReadMark) {
        self.threads
            .entry(thread.clone())
            .or_default()
            .entry(user.to_string())
            .or_default()
            .merge(mark);
    }

    /// Messages in `thread` past the user's mark and not written by them.
    pub fn unread<'a>(
        &self,
        thread: &ThreadId,
        user: &str,
        messages: impl IntoIterator<Item = &'a Message>,
    ) -> usize {
        let last = self.last_read(thread, user);
        messages
            .into_iter()
            .filter(|m| &m.thread_id == thread && last.is_before(m) && !m.is_from(user))
            .count()
    }

    /// Highest sequence number any mark refers to.
    pub fn max_seq(&self) -> u64 {
        self.threads
            .values()
            .flat_map(|readers| readers.values())
            .map(|mark| mark.seq)
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}
