//! Session composition: wires the regeneration timer, heightfield generator,
//! texture bridge and scene graph together.
//!
//! # Invariants
//! - The instance layout is built once in `Session::new` and never mutated.
//! - Every regeneration publishes a new texture and rebinds the scene in the
//!   same call, so the scene never points at a superseded texture.
//! - After `teardown` the timer is deregistered and no further work runs.

mod config;
mod session;

pub use config::{ConfigError, SessionConfig};
pub use session::{Session, SessionState};

pub fn crate_info() -> &'static str {
    "blockfield-session v0.1.0"
}
