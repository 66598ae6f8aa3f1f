//! Configuration management
//!
//! This module handles the node settings: bind address, network identity
//! and protocol versions, peers, data directory and the work threshold.
//! Settings come from an optional TOML file and the environment.

pub mod settings;

pub use settings::{Config, Settings, GLOBAL_CONFIG};
