//! Generator entry points: seed the source corpus, generate both parties'
//! datasets, and verify linkage of what was written.

mod common;
mod generate;
mod seed;
mod verify;

pub use generate::generate;
pub use seed::seed;
pub use verify::verify;

pub mod model;
