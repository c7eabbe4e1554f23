//! Paged frame transfer
//!
//! Streams published frames to the sink page by page and watches for stalls.

pub mod engine;
pub mod monitor;

pub use engine::{PagedTransferEngine, TransferStats, TransferStatus};
pub use monitor::{StallMonitor, TransferHealth};
