//! Panel sink implementations
//!
//! Concrete implementations of the `PageSink` trait from pageflip-core:
//!
//! - SH1106 OLED over SPI (native page addressing)
//! - Upscaling sink for any `embedded-graphics` draw target (TFT panels)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod scaled;
pub mod sh1106;

pub use scaled::ScaledSink;
pub use sh1106::Sh1106Sink;
