//! Transfer stall monitor
//!
//! Tells a frozen panel apart from an idle one. Time only accumulates while
//! a frame is queued or in flight, and a drained frame resets it.

use super::engine::TransferStatus;

/// Transfer health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferHealth {
    /// Frames are draining, or there is nothing to drain
    Ok,
    /// No frame drained for at least the configured timeout
    Stalled { elapsed_ms: u32 },
}

/// Stall detector fed by the transfer loop
#[derive(Debug, Clone)]
pub struct StallMonitor {
    /// Threshold in ms, 0 disables detection
    timeout_ms: u32,
    /// Time since the last drained frame while work was pending
    elapsed_ms: u32,
    /// A frame is queued or in flight
    pending: bool,
}

impl StallMonitor {
    /// Create a monitor; a timeout of 0 never reports a stall
    pub const fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            elapsed_ms: 0,
            pending: false,
        }
    }

    /// Record the outcome of a transfer step
    ///
    /// # Arguments
    /// - `status`: result of the step
    /// - `backlog`: frames still readable after the step
    pub fn record(&mut self, status: TransferStatus, backlog: bool) {
        match status {
            TransferStatus::Idle => {
                self.pending = false;
                self.elapsed_ms = 0;
            }
            TransferStatus::InProgress => {
                self.pending = true;
            }
            TransferStatus::Drained => {
                self.pending = backlog;
                self.elapsed_ms = 0;
            }
        }
    }

    /// Advance time
    ///
    /// # Arguments
    /// - `delta_ms`: time elapsed since last update
    pub fn update_time(&mut self, delta_ms: u32) {
        if self.pending {
            self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        }
    }

    /// Check for a stall
    pub fn check(&self) -> TransferHealth {
        if self.timeout_ms > 0 && self.elapsed_ms >= self.timeout_ms {
            TransferHealth::Stalled {
                elapsed_ms: self.elapsed_ms,
            }
        } else {
            TransferHealth::Ok
        }
    }

    /// Time since the last drained frame while work was pending
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Forget pending work, e.g. after the pool was reset
    pub fn reset(&mut self) {
        self.pending = false;
        self.elapsed_ms = 0;
    }
}
