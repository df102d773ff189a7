//! Shared data model for the Sendix freight workflow: who is acting, what
//! is being shipped, who bid on it, and what was said about it.

pub mod identity;
pub mod ledger;
pub mod load;
pub mod message;
pub mod proposal;
pub mod snapshot;
pub mod thread;

pub use identity::{Role, Session};
pub use ledger::{ReadLedger, ReadMark};
pub use load::{Load, LoadId, NewLoad};
pub use message::{is_reserved_sender, Message, Millis, SYSTEM_SENDER};
pub use proposal::{Proposal, ProposalId, ProposalStatus, ShipStage};
pub use snapshot::Snapshot;
pub use thread::{thread_id_for, ThreadId, THREAD_SEPARATOR};
