//! Harvest Pipeline - three-stage listing extraction.
//!
//! This crate turns a dynamically rendered directory search page into a JSON
//! file of listing records. Stages only talk through artifacts on disk, so
//! each one can be re-run on its own given its predecessor's output.
//!
//! # Stages
//!
//! - [`RenderCapture`] - scroll the results page in a browser until the
//!   sentinel element appears, then save the markup
//! - [`LinkExtraction`] - turn the saved markup into an ordinal -> URL index
//! - [`ItemEnrichment`] - fetch each item page over HTTP with pacing and
//!   bounded retry, extract fields independently, save all records at once
//!
//! # Example
//!
//! ```rust,ignore
//! use harvest_core::AppConfig;
//! use harvest_pipeline::{ItemEnrichment, LinkExtraction, PipelineRunner, RenderCapture};
//!
//! let config = AppConfig::load_with_env()?;
//! let mut runner = PipelineRunner::new();
//! runner
//!     .add_stage(Box::new(RenderCapture::new(&config)))
//!     .add_stage(Box::new(LinkExtraction::new(&config)))
//!     .add_stage(Box::new(ItemEnrichment::new(&config)?));
//! runner.run().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod enrich;
#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod links;
#[allow(missing_docs)]
pub mod pacing;
#[allow(missing_docs)]
pub mod parser;
#[allow(missing_docs)]
pub mod render;
pub mod runner;
pub mod stage;

// Re-export commonly used types
pub use enrich::ItemEnrichment;
pub use error::{Result, StageError};
pub use links::{extract_links, LinkExtraction};
pub use pacing::Pacer;
pub use parser::ItemPageParser;
pub use render::{scroll_until_sentinel, RenderCapture};
pub use runner::PipelineRunner;
pub use stage::Stage;
