use serde::{Deserialize, Serialize};

use crate::identity::Role;
use crate::thread::ThreadId;

/// Sender label of messages written by the engine itself.
pub const SYSTEM_SENDER: &str = "System";

/// Sender label the first web client used for its delivery notices.
const LEGACY_SYSTEM_SENDER: &str = "Sistema";

/// True when `name` is one of the engine's own sender labels, ignoring case
/// and surrounding whitespace. No person may act under such a name.
pub fn is_reserved_sender(name: &str) -> bool {
    let name = name.trim();
    name.eq_ignore_ascii_case(SYSTEM_SENDER) || name.eq_ignore_ascii_case(LEGACY_SYSTEM_SENDER)
}

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// A chat message inside one thread.
///
/// Messages are append-only apart from explicit deletion. `seq` is a
/// store-wide counter that breaks ties between equal timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub thread_id: ThreadId,
    pub from: String,
    pub role: Role,
    pub text: String,
    #[serde(alias = "ts")]
    pub timestamp: Millis,
    #[serde(default)]
    pub seq: u64,
    /// Timestamp of the cited message in the same thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Millis>,
    /// Opaque attachment references (URLs or data URIs).
    #[serde(default, alias = "attach", skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

impl Message {
    pub fn is_system(&self) -> bool {
        self.from == SYSTEM_SENDER || self.from == LEGACY_SYSTEM_SENDER
    }

    pub fn is_from(&self, name: &str) -> bool {
        self.from == name
    }

    /// Total order within a thread: timestamp, then sequence number.
    pub fn order_key(&self) -> (Millis, u64) {
        (self.timestamp, self.seq)
    }
}
