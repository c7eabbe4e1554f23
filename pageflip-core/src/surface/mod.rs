//! Drawing surface
//!
//! What rendering code receives between beginning and ending a frame.

pub mod graphics;
pub mod packed;

pub use packed::Surface;
