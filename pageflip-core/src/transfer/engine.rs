//! Paged transfer engine
//!
//! Drains published frames from the pool to a sink one page per call, so the
//! caller's loop is never blocked for longer than a single page transfer.

use crate::config::{ConfigError, PageLayout};
use crate::pool::FrameSlotPool;
use crate::traits::{PageSink, SinkError};

/// Outcome of one transfer step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferStatus {
    /// Nothing to transfer
    Idle,
    /// A frame is partially transferred (or its page was rejected)
    InProgress,
    /// The last page of a frame was accepted and its slot released
    Drained,
}

/// Transfer counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferStats {
    /// Frames fully transferred
    pub frames_drained: u32,
    /// Pages accepted by the sink
    pub pages_sent: u32,
    /// Pages rejected by the sink
    pub rejections: u32,
    /// Rejections of the current page since it was last accepted
    pub consecutive_rejections: u32,
    /// Most recent sink error
    pub last_error: Option<SinkError>,
}

/// Page-at-a-time frame drain
#[derive(Debug, Clone)]
pub struct PagedTransferEngine {
    layout: PageLayout,
    /// Next page of the active frame; `None` when no frame is active
    cursor: Option<usize>,
    stats: TransferStats,
}

impl PagedTransferEngine {
    fn new(layout: PageLayout) -> Self {
        Self {
            layout,
            cursor: None,
            stats: TransferStats::default(),
        }
    }

    /// Create an engine after checking the layout against the pool's slot size
    pub fn for_pool<const N: usize, const FRAME_SIZE: usize>(
        layout: PageLayout,
        _pool: &FrameSlotPool<N, FRAME_SIZE>,
    ) -> Result<Self, ConfigError> {
        if layout.frame_size() != FRAME_SIZE {
            return Err(ConfigError::FrameSizeMismatch {
                expected: FRAME_SIZE,
                actual: layout.frame_size(),
            });
        }
        Ok(Self::new(layout))
    }

    /// Transfer at most one page
    ///
    /// Starts on the oldest readable frame if none is active. A rejected page
    /// is retried unchanged on the next call. After the last page is accepted
    /// the slot goes back to the pool.
    pub fn step<S, const N: usize, const FRAME_SIZE: usize>(
        &mut self,
        pool: &mut FrameSlotPool<N, FRAME_SIZE>,
        sink: &mut S,
    ) -> TransferStatus
    where
        S: PageSink + ?Sized,
    {
        let page = match self.cursor {
            Some(page) => page,
            None if pool.readable() => 0,
            None => return TransferStatus::Idle,
        };

        let frame = match pool.peek_readable() {
            Some(frame) => frame,
            None => {
                // Pool was reset underneath an active frame
                self.cursor = None;
                return TransferStatus::Idle;
            }
        };
        self.cursor = Some(page);

        let result = sink.send_page(page, self.layout.page(frame, page));

        match result {
            Ok(()) => {
                self.stats.pages_sent = self.stats.pages_sent.wrapping_add(1);
                self.stats.consecutive_rejections = 0;

                let next = page + 1;
                if next >= self.layout.num_pages() {
                    pool.release();
                    self.cursor = None;
                    self.stats.frames_drained = self.stats.frames_drained.wrapping_add(1);
                    TransferStatus::Drained
                } else {
                    self.cursor = Some(next);
                    TransferStatus::InProgress
                }
            }
            Err(e) => {
                self.stats.rejections = self.stats.rejections.wrapping_add(1);
                self.stats.consecutive_rejections =
                    self.stats.consecutive_rejections.saturating_add(1);
                self.stats.last_error = Some(e);
                TransferStatus::InProgress
            }
        }
    }

    /// True while a frame is being transferred
    pub fn is_active(&self) -> bool {
        self.cursor.is_some()
    }

    /// Next page of the active frame
    pub fn current_page(&self) -> Option<usize> {
        self.cursor
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn stats(&self) -> &TransferStats {
        &self.stats
    }

    /// Abandon the active frame; it restarts from page 0 on the next step
    pub fn reset(&mut self) {
        self.cursor = None;
        self.stats.consecutive_rejections = 0;
    }
}
