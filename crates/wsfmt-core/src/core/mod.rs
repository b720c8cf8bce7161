pub(crate) mod config;
pub(crate) mod format;
pub(crate) mod tooling;
