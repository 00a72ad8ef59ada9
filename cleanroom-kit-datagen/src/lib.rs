//! This crate produces the datasets the clean-room simulation runs on:
//! - a merchant snapshot: date-filtered orders, their line items, and a
//!   de-duplicated user table
//! - salted join keys, `base64(SHA-256(email || salt))`, added to both
//!   parties' user tables
//! - synthetic wallet-provider records derived from a sampled share of the
//!   snapshot
//!
//! Everything is a pure function of the source rows, the salt, and the
//! configuration; re-running a generation reproduces the outputs exactly.

pub mod api;
pub mod tables;

mod error;
mod hashing;
mod snapshot;
mod source;
mod synthetic;

// Re-exports for a small, focused public API
pub use error::{GenerateError, GenerateResult};
pub use hashing::join_key;
