//! Frame slot pool
//!
//! Owns the frame buffers shared between rendering and transfer.

pub mod slots;

pub use slots::FrameSlotPool;
