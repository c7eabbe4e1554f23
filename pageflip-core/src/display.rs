//! Display control surface
//!
//! Owns the slot pool, transfer engine, composer, stall monitor and sink for
//! one panel. The outer loop calls [`Display::pump_transfer`] every iteration
//! and [`Display::begin_frame`] whenever it wants to draw.

use crate::compose::{Frame, FrameComposer, FrameDropped, WaitPolicy};
use crate::config::{ConfigError, DisplayConfig, SinkSettings};
use crate::pool::FrameSlotPool;
use crate::traits::{PageSink, SinkError};
use crate::transfer::{
    PagedTransferEngine, StallMonitor, TransferHealth, TransferStats, TransferStatus,
};

/// Double-buffered paged display
///
/// - `S`: panel sink
/// - `N`: number of frame slots
/// - `FRAME_SIZE`: bytes per frame
pub struct Display<S, const N: usize, const FRAME_SIZE: usize> {
    pool: FrameSlotPool<N, FRAME_SIZE>,
    engine: PagedTransferEngine,
    composer: FrameComposer,
    monitor: StallMonitor,
    settings: SinkSettings,
    sink: S,
    initialized: bool,
}

impl<S: PageSink, const N: usize, const FRAME_SIZE: usize> Display<S, N, FRAME_SIZE> {
    /// Create a display, checking the configuration against `FRAME_SIZE`
    pub fn new(sink: S, config: &DisplayConfig) -> Result<Self, ConfigError> {
        let layout = config.validate(FRAME_SIZE)?;
        let pool = FrameSlotPool::new();
        let engine = PagedTransferEngine::for_pool(layout, &pool)?;
        let composer = FrameComposer::from_config(config, &pool)?;

        Ok(Self {
            pool,
            engine,
            composer,
            monitor: StallMonitor::new(config.stall_timeout_ms),
            settings: config.sink,
            sink,
            initialized: false,
        })
    }

    /// Reset the pipeline, bring the sink up and apply its settings
    ///
    /// Calling it again after a successful init does nothing.
    pub fn init(&mut self) -> Result<(), SinkError> {
        if self.initialized {
            return Ok(());
        }
        self.pool.reset();
        self.engine.reset();
        self.monitor.reset();

        self.sink.init()?;
        self.sink.set_flip_mode(self.settings.flip180)?;
        self.sink.set_contrast(self.settings.contrast)?;
        self.sink.adjust_offset(self.settings.column_offset)?;
        self.initialized = true;
        Ok(())
    }

    /// Shut the sink down; a no-op if never initialized
    pub fn shutdown(&mut self) -> Result<(), SinkError> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;
        self.sink.shutdown()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Start drawing a frame
    ///
    /// With [`WaitPolicy::Block`] or [`WaitPolicy::Bounded`] the transfer is
    /// pumped while the pool is full.
    pub fn begin_frame(
        &mut self,
        policy: WaitPolicy,
    ) -> Result<Frame<'_, N, FRAME_SIZE>, FrameDropped> {
        let Self {
            pool,
            engine,
            composer,
            monitor,
            sink,
            ..
        } = self;
        composer.begin_frame(pool, policy, |pool| pump(engine, monitor, pool, sink))
    }

    /// Transfer at most one page of the oldest published frame
    pub fn pump_transfer(&mut self) -> TransferStatus {
        pump(
            &mut self.engine,
            &mut self.monitor,
            &mut self.pool,
            &mut self.sink,
        )
    }

    /// Feed elapsed time to the stall monitor
    pub fn update_time(&mut self, delta_ms: u32) {
        self.monitor.update_time(delta_ms);
    }

    /// Stalled if no frame drained for the configured timeout while work was pending
    pub fn health(&self) -> TransferHealth {
        self.monitor.check()
    }

    pub fn stats(&self) -> &TransferStats {
        self.engine.stats()
    }

    /// Published frames not yet fully transferred
    pub fn readable_count(&self) -> usize {
        self.pool.readable_count()
    }

    /// True while a frame is partially transferred
    pub fn is_transferring(&self) -> bool {
        self.engine.is_active()
    }

    pub fn composer(&self) -> &FrameComposer {
        &self.composer
    }

    pub fn settings(&self) -> &SinkSettings {
        &self.settings
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Rotate the panel output by 180 degrees
    pub fn set_flip_mode(&mut self, flip180: bool) -> Result<(), SinkError> {
        self.settings.flip180 = flip180;
        self.sink.set_flip_mode(flip180)
    }

    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), SinkError> {
        self.settings.contrast = contrast;
        self.sink.set_contrast(contrast)
    }

    pub fn adjust_offset(&mut self, offset: u8) -> Result<(), SinkError> {
        self.settings.column_offset = offset;
        self.sink.adjust_offset(offset)
    }

    /// Take the sink back
    pub fn into_sink(self) -> S {
        self.sink
    }
}

fn pump<S, const N: usize, const FRAME_SIZE: usize>(
    engine: &mut PagedTransferEngine,
    monitor: &mut StallMonitor,
    pool: &mut FrameSlotPool<N, FRAME_SIZE>,
    sink: &mut S,
) -> TransferStatus
where
    S: PageSink + ?Sized,
{
    let status = engine.step(pool, sink);
    monitor.record(status, pool.readable());
    status
}
