//! # Dominion Development Tools
//!
//! Command-line tools for development:
//! - Headless simulation and batch balance runs
//! - Config validators
//! - Save-file inspection and ASCII map rendering

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod render;
pub mod report;
pub mod saves;
pub mod simulate;
pub mod validate;

pub use error::{Result, ToolError};
