//! Double-buffered frame handoff and paged display transfer
//!
//! This crate contains the device-agnostic half of a page-addressed display
//! pipeline:
//!
//! - Frame slot pool shared by renderer and transfer
//! - Paged transfer engine (one page per call)
//! - Scoped frame composer with wait policies
//! - Packed 1-bit drawing surface
//! - Sink trait implemented by panel drivers
//! - Configuration and stall monitoring
//!
//! # Data flow
//!
//! ```text
//! begin_frame ─► Surface (draw) ─► commit ─► pool ─► pump_transfer ─► PageSink
//! ```
//!
//! A renderer draws into one slot while the transfer streams an older one, so
//! the panel never shows a half-drawn frame and neither side waits on the
//! other for longer than one page.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod compose;
pub mod config;
pub mod display;
pub mod pool;
pub mod surface;
pub mod transfer;
pub mod traits;

#[cfg(test)]
mod testing;

pub use compose::{Frame, FrameComposer, FrameDropped, WaitPolicy};
pub use config::{ConfigError, DisplayConfig, PageLayout, PanelGeometry, SinkSettings};
pub use display::Display;
pub use pool::FrameSlotPool;
pub use surface::Surface;
pub use traits::{PageSink, SinkError};
pub use transfer::{PagedTransferEngine, TransferHealth, TransferStatus};
