//! Configuration, settings, and per-command context assembly.

pub mod context;
pub(crate) mod file;
pub mod settings;

pub use settings::*;
