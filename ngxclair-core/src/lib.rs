//! ngxclair Core Library
//!
//! This crate provides the pieces shared by the configuration front end and
//! the command-line tool: the error type, tool settings, and the compiled
//! proxy model handed to the serving engine.

pub mod config;
pub mod error;
pub mod settings;

pub use error::{Error, Result};
pub use settings::Settings;

/// ngxclair version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
