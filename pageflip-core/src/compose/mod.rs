//! Frame composition
//!
//! Begin/draw/end access to the slot pool for rendering code.

pub mod composer;

pub use composer::{ComposerState, Frame, FrameComposer, FrameDropped, WaitPolicy};
