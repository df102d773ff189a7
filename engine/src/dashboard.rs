//! Counters for the summary screen and the per-role home cards.

use sendix_common::{ProposalStatus, Role, Session, Snapshot};
use serde::{Deserialize, Serialize};

use crate::board::open_loads_for;
use crate::chat::can_see;
use crate::ledger::unread_total;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub loads: usize,
    pub proposals: usize,
    pub pending: usize,
    pub filtered: usize,
    pub approved: usize,
    pub rejected: usize,
    /// Approved proposals not yet delivered.
    pub in_flight: usize,
}

pub fn summary(snapshot: &Snapshot) -> Summary {
    Summary {
        loads: snapshot.loads.len(),
        proposals: snapshot.proposals.len(),
        pending: snapshot.count_with_status(ProposalStatus::Pending),
        filtered: snapshot.count_with_status(ProposalStatus::Filtered),
        approved: snapshot.count_with_status(ProposalStatus::Approved),
        rejected: snapshot.count_with_status(ProposalStatus::Rejected),
        in_flight: snapshot.proposals.iter().filter(|p| p.is_in_flight()).count(),
    }
}

/// Badge counts shown on the home screen, one shape per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum HomeBadges {
    #[serde(rename_all = "camelCase")]
    Shipper { my_loads: usize, active_tracking: usize },
    #[serde(rename_all = "camelCase")]
    Carrier {
        open_offers: usize,
        my_proposals: usize,
        my_shipments: usize,
        active_tracking: usize,
    },
    #[serde(rename_all = "camelCase")]
    Intermediary {
        pending_moderation: usize,
        unread: usize,
    },
}

pub fn home_badges(snapshot: &Snapshot, session: &Session) -> HomeBadges {
    let active_tracking = || {
        snapshot
            .proposals
            .iter()
            .filter(|p| p.is_in_flight() && can_see(snapshot, session, p))
            .count()
    };
    match session.role {
        Role::Shipper => HomeBadges::Shipper {
            my_loads: snapshot
                .loads
                .iter()
                .filter(|l| l.is_owned_by(&session.name))
                .count(),
            active_tracking: active_tracking(),
        },
        Role::Carrier => {
            let mine = || snapshot.proposals.iter().filter(|p| p.carrier == session.name);
            HomeBadges::Carrier {
                open_offers: open_loads_for(snapshot, session).len(),
                my_proposals: mine().count(),
                my_shipments: mine().filter(|p| p.is_approved()).count(),
                active_tracking: active_tracking(),
            }
        }
        Role::Intermediary => HomeBadges::Intermediary {
            pending_moderation: snapshot.count_with_status(ProposalStatus::Pending),
            unread: unread_total(snapshot, session),
        },
    }
}
