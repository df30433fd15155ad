//! phone-scout CLI: collect, merge, and export phone listings.

pub mod commands;
pub mod config;

pub use config::{load_config, resolve_config_path};
