//! Manages process-level configuration for extsync.
//!
//! This crate provides utilities for:
//! - Resolving the user's home directory and the config file location.
//! - Reading environment overrides for output format and editor roots.
//! - Loading editor overrides and custom editors from `config.toml`.

pub mod config;
pub mod env;

pub use config::{load_config, load_config_from, Config, EditorOverride};
pub use env::{config_file, editor_dir_env_key, editor_dir_override, env_format, home_dir};
