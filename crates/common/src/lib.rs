//! Shared types for the blockfield workspace.

mod rng;
mod types;

pub use rng::{DEFAULT_SEED, SessionRng};
pub use types::Transform;
