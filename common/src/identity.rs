use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role a participant plays in the freight workflow.
///
/// The legacy Spanish names written by the first web client are accepted on
/// input and normalised to the English names on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Publishes loads and picks the winning proposal.
    #[serde(alias = "empresa")]
    Shipper,
    /// Bids on loads and moves the shipment forward.
    #[serde(alias = "transportista")]
    Carrier,
    /// Moderates proposals and sits in every chat.
    #[serde(alias = "sendix", alias = "admin")]
    Intermediary,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Shipper => "shipper",
            Role::Carrier => "carrier",
            Role::Intermediary => "intermediary",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role `{0}` (expected shipper, carrier or intermediary)")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shipper" | "empresa" => Ok(Role::Shipper),
            "carrier" | "transportista" => Ok(Role::Carrier),
            "intermediary" | "sendix" | "admin" => Ok(Role::Intermediary),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// The acting party on this device.
///
/// The role comes from the identity provider's claim and is trusted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub role: Role,
}

impl Session {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    pub fn shipper(name: impl Into<String>) -> Self {
        Self::new(name, Role::Shipper)
    }

    pub fn carrier(name: impl Into<String>) -> Self {
        Self::new(name, Role::Carrier)
    }

    pub fn intermediary(name: impl Into<String>) -> Self {
        Self::new(name, Role::Intermediary)
    }

    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.role)
    }
}
