//! # TuneVault Common Library
//!
//! Shared code for the TuneVault catalog service:
//! - Error type used during startup
//! - TOML configuration and root folder resolution
//! - Catalog database initialization

pub mod config;
pub mod db;
pub mod error;

pub use config::TomlConfig;
pub use error::{Error, Result};
