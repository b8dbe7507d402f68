//! Utility module

mod config;
mod error;
mod location;
pub mod wire;

pub use config::{Limits, DEFAULT_MAX_DEPTH};
pub use error::{Error, Result};
pub use location::Location;
