//! Sendix workflow engine.
//!
//! Shippers publish loads, carriers bid on them, the intermediary filters
//! the bids and the shipper picks a winner. The winning pairing gets a
//! three-party chat and a tracked shipment.
//!
//! The managers ([`lifecycle`], [`chat`], [`tracker`], [`ledger`],
//! [`board`]) are plain functions over a [`Snapshot`](sendix_common::Snapshot).
//! [`Workflow`] owns the snapshot, supplies time and ids, and commits each
//! mutation to a [`Store`] as one transaction.

pub mod board;
pub mod chat;
pub mod clock;
pub mod dashboard;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod lifecycle;
pub mod notify;
pub mod request;
pub mod store;
pub mod tracker;
pub mod workflow;

pub use board::{Candidate, ModerationQueue, OpenLoad, QueueEntry};
pub use chat::{Draft, ThreadSummary};
pub use clock::{Clock, ManualClock, SystemClock};
pub use dashboard::{HomeBadges, Summary};
pub use error::{Result, WorkflowError};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use lifecycle::Approval;
pub use request::{WorkflowRequest, WorkflowResponse};
pub use store::{JsonFileStore, MemoryStore, Store, StoreError};
pub use tracker::{Shipment, StageChange};
pub use workflow::Workflow;
