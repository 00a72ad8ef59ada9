//! Platform contract for the clean-room kit:
//! - validated resource identifiers and table schemas
//! - the exchange / listing / grant wire model, including privacy policies
//! - `Warehouse` and `ExchangeCatalog`, the traits the engines program against
//! - an in-memory platform backed by a JSON state file
//!

pub mod ids;
pub mod memory;
pub mod schema;
pub mod sharing;

mod error;
mod traits;

// Re-exports for a small, focused public API
pub use error::{PlatformError, PlatformResult};
pub use traits::{ExchangeCatalog, Warehouse};
