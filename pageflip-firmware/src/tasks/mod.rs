//! Embassy async tasks
//!
//! The render task is the producer and the transfer task the consumer of the
//! shared display's frame slots.

pub mod render;
pub mod transfer;

pub use render::render_task;
pub use transfer::transfer_task;
