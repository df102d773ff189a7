//! Cross-role tests for the Sendix workflow engine.
//!
//! [`harness::TestHarness`] wires a [`Workflow`](sendix_engine::Workflow) to an
//! in-memory store, a manual clock and sequential ids, and names the
//! participants every test uses.

use sendix_common::NewLoad;

pub mod harness;

/// A load form as a shipper would fill it in.
pub fn make_new_load(origin: &str, destination: &str) -> NewLoad {
    NewLoad {
        origin: origin.to_string(),
        destination: destination.to_string(),
        cargo_type: "Pallets".to_string(),
        size: Some("12 t".to_string()),
        date: "2025-03-01".to_string(),
    }
}
