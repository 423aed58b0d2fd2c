//! Browser automation for JavaScript-heavy listing pages.
//!
//! Provides a headless Chromium session that is released on every exit path,
//! and the narrow [`BrowserActions`] capability the capture stage drives.

pub mod actions;
pub mod engine;
pub mod error;

pub use actions::BrowserActions;
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
