//! Commands module - service layer for clean-room provisioning operations

mod publish;
pub(crate) mod service;

pub use service::SharingService;
