use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::load::LoadId;

/// Unique proposal identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub String);

impl ProposalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProposalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Moderation status of a proposal.
///
/// `pending → {filtered, rejected}`, `filtered → {pending, approved, rejected}`.
/// `approved` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Submitted, waiting for the intermediary.
    Pending,
    /// Passed moderation; the shipper may select it.
    Filtered,
    /// Selected by the shipper. At most one per load.
    Approved,
    /// Turned down by the intermediary or displaced by another approval.
    Rejected,
}

impl ProposalStatus {
    /// Returns true if transitioning from self to `next` is valid.
    pub fn can_transition_to(&self, next: &ProposalStatus) -> bool {
        matches!(
            (self, next),
            (ProposalStatus::Pending, ProposalStatus::Filtered)
                | (ProposalStatus::Pending, ProposalStatus::Rejected)
                | (ProposalStatus::Filtered, ProposalStatus::Pending)
                | (ProposalStatus::Filtered, ProposalStatus::Approved)
                | (ProposalStatus::Filtered, ProposalStatus::Rejected)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Filtered => "filtered",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery progress of an approved proposal. Strictly linear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShipStage {
    #[default]
    #[serde(alias = "pendiente")]
    Pending,
    #[serde(alias = "en-carga")]
    Loading,
    #[serde(alias = "en-camino")]
    InTransit,
    #[serde(alias = "entregado")]
    Delivered,
}

impl ShipStage {
    pub const ALL: [ShipStage; 4] = [
        ShipStage::Pending,
        ShipStage::Loading,
        ShipStage::InTransit,
        ShipStage::Delivered,
    ];

    /// The following stage, clamped at `Delivered`.
    pub fn next(self) -> ShipStage {
        match self {
            ShipStage::Pending => ShipStage::Loading,
            ShipStage::Loading => ShipStage::InTransit,
            ShipStage::InTransit | ShipStage::Delivered => ShipStage::Delivered,
        }
    }

    pub fn is_delivered(self) -> bool {
        self == ShipStage::Delivered
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShipStage::Pending => "pending",
            ShipStage::Loading => "loading",
            ShipStage::InTransit => "in-transit",
            ShipStage::Delivered => "delivered",
        }
    }
}

impl fmt::Display for ShipStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shipment stage `{0}`")]
pub struct ParseStageError(pub String);

impl FromStr for ShipStage {
    type Err = ParseStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "pendiente" => Ok(ShipStage::Pending),
            "loading" | "en-carga" => Ok(ShipStage::Loading),
            "in-transit" | "en-camino" => Ok(ShipStage::InTransit),
            "delivered" | "entregado" => Ok(ShipStage::Delivered),
            _ => Err(ParseStageError(s.to_string())),
        }
    }
}

/// A carrier's bid on a load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub load_id: LoadId,
    /// Name of the carrier who submitted the bid.
    pub carrier: String,
    pub vehicle: String,
    pub price: f64,
    pub status: ProposalStatus,
    /// Only meaningful once `status` is `Approved`.
    #[serde(default, alias = "shipStatus", skip_serializing_if = "Option::is_none")]
    pub ship_stage: Option<ShipStage>,
    pub created_at: DateTime<Utc>,
}

impl Proposal {
    /// Current shipment stage, `Pending` when never set.
    pub fn stage(&self) -> ShipStage {
        self.ship_stage.unwrap_or_default()
    }

    pub fn is_approved(&self) -> bool {
        self.status == ProposalStatus::Approved
    }

    /// Approved and not yet delivered.
    pub fn is_in_flight(&self) -> bool {
        self.is_approved() && !self.stage().is_delivered()
    }
}
