use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::load::LoadId;
use crate::proposal::Proposal;

/// Joins the load id and the carrier name in the string form of a thread id.
pub const THREAD_SEPARATOR: &str = "__";

/// Identity of the chat between a load's shipper, one carrier and the
/// intermediary.
///
/// Derived from `(load_id, carrier)` and never stored on the proposal. The
/// string form is `"<load_id>__<carrier>"`; since load ids never contain the
/// separator, the first `__` always splits it back.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId {
    load_id: LoadId,
    carrier: String,
}

impl ThreadId {
    pub fn new(load_id: LoadId, carrier: impl Into<String>) -> Self {
        Self {
            load_id,
            carrier: carrier.into(),
        }
    }

    pub fn load_id(&self) -> &LoadId {
        &self.load_id
    }

    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    /// True when this thread belongs to `proposal`.
    pub fn is_for(&self, proposal: &Proposal) -> bool {
        self.load_id == proposal.load_id && self.carrier == proposal.carrier
    }
}

/// Thread id of the chat attached to `proposal`.
pub fn thread_id_for(proposal: &Proposal) -> ThreadId {
    ThreadId::new(proposal.load_id.clone(), proposal.carrier.clone())
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.load_id, THREAD_SEPARATOR, self.carrier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed thread id `{0}` (expected <load>__<carrier>)")]
pub struct ParseThreadIdError(pub String);

impl FromStr for ThreadId {
    type Err = ParseThreadIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(THREAD_SEPARATOR) {
            Some((load, carrier)) if !carrier.is_empty() => {
                let load_id = LoadId::from(load);
                if !load_id.is_well_formed() {
                    return Err(ParseThreadIdError(s.to_string()));
                }
                Ok(ThreadId::new(load_id, carrier))
            }
            _ => Err(ParseThreadIdError(s.to_string())),
        }
    }
}

// Serialized as the joined string so it also works as a JSON map key.
impl Serialize for ThreadId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ThreadId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
