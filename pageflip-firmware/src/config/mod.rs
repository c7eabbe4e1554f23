//! Configuration loading
//!
//! The display configuration is compiled in from `display.toml` and parsed
//! at boot by a small no_std parser.

pub mod toml;

pub use toml::{parse_config, FirmwareConfig, ParseError};
