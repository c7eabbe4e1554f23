//! Hardware abstraction traits
//!
//! The interface between the device-agnostic pipeline and panel drivers.

pub mod sink;

pub use sink::{PageSink, SinkError};
