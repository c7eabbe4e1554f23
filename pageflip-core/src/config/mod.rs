//! Configuration types
//!
//! Panel geometry, page layout and sink settings, fixed at init time.

pub mod geometry;
pub mod types;

pub use geometry::*;
pub use types::*;
