//! Settings
//!
//! Typed settings plus a parser for the small TOML subset the firmware
//! embeds at build time.

pub mod parser;
pub mod types;

pub use parser::{parse_settings, ConfigError};
pub use types::*;
