//! Compiled configuration model

mod types;

pub use types::*;
