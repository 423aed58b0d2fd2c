//! Harvest Core - Foundation crate for the listing-harvest pipeline.
//!
//! This crate provides the shared data model, error handling, configuration
//! management and artifact I/O that the browser and pipeline crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Pipeline data model (`UrlIndex`, `ItemRecord`)
//! - [`artifact`] - Reading and atomically writing stage artifacts
//!
//! # Example
//!
//! ```rust
//! use harvest_core::{AppConfig, UrlIndex};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert!(config.target.url.starts_with("https://"));
//!
//! let mut index = UrlIndex::new();
//! index.push("https://example.com/a");
//! assert_eq!(index.get(1), Some("https://example.com/a"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod artifact;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, HttpConfig, OutputConfig, PacingConfig, RenderConfig,
    SelectorConfig, TargetConfig,
};
pub use error::{ConfigError, ConfigResult, HarvestError, Result};
pub use types::{ItemRecord, UrlIndex};
