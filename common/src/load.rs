use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique load identifier.
///
/// Generated ids are ASCII alphanumeric. Thread ids rely on this: a load id
/// never contains the `__` separator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadId(pub String);

impl LoadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id can take part in a thread id without ambiguity.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty() && self.0.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LoadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A freight listing posted by a shipper. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Load {
    pub id: LoadId,
    /// Name of the shipper who posted the load.
    pub owner: String,
    #[serde(alias = "origen")]
    pub origin: String,
    #[serde(alias = "destino")]
    pub destination: String,
    #[serde(alias = "tipo")]
    pub cargo_type: String,
    #[serde(default, alias = "tamano", skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Pickup date as entered by the shipper.
    #[serde(alias = "fecha")]
    pub date: String,
    pub created_at: DateTime<Utc>,
}

impl Load {
    /// "origin → destination", used as the chat title.
    pub fn route(&self) -> String {
        format!("{} → {}", self.origin, self.destination)
    }

    pub fn is_owned_by(&self, name: &str) -> bool {
        self.owner == name
    }
}

/// Shipper input for a new load. Id, owner and creation time are assigned
/// by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoad {
    pub origin: String,
    pub destination: String,
    pub cargo_type: String,
    #[serde(default)]
    pub size: Option<String>,
    pub date: String,
}
