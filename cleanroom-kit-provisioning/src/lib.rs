//! This crate provides the provisioning engine for the clean-room kit:
//! - analysis-rule derivation from a table's declared role
//! - policy-view materialization with the rule attached
//! - idempotent publication of exchange, listing, and grant resources
//!
//! Every run converges: existing resources with matching definitions are
//! adopted, missing ones are created, and mismatches surface as typed
//! conflicts instead of mutations.

pub mod commands;

mod ensure;
mod error;
mod rules;
mod types;
mod view;

// Re-exports for a small, focused public API
pub use commands::SharingService;
pub use error::{PublishError, PublishResult};
pub use rules::{rule_for, AnalysisRule, DEFAULT_AGGREGATION_THRESHOLD};
pub use types::{
    EnsureOutcome, PublishOutcome, PublishRequest, ResourceKind, ShareTarget, TableProfile,
    TableRole,
};
