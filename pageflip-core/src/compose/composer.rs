//! Scoped frame acquisition
//!
//! Rendering code gets a [`Frame`] guard for the next writable slot. The slot
//! is published when the guard goes out of scope, on every exit path, so a
//! begun frame is always committed exactly once.

use crate::config::{ConfigError, DisplayConfig, PanelGeometry};
use crate::pool::FrameSlotPool;
use crate::surface::Surface;
use crate::transfer::TransferStatus;

/// What to do when every slot holds an undrained frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitPolicy {
    /// Pump the transfer until a slot frees up
    Block,
    /// Drop the frame immediately
    NoWait,
    /// Pump the transfer at most this many times, then drop the frame
    Bounded(u32),
}

/// No slot was available; the frame was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameDropped;

/// Composer states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ComposerState {
    Idle,
    /// Waiting for a writable slot
    Acquiring,
    /// A frame guard is live
    Drawing,
    /// Publishing the slot
    Committing,
}

/// Hands writable slots to rendering code
#[derive(Debug, Clone)]
pub struct FrameComposer {
    geometry: PanelGeometry,
    clear_on_begin: bool,
    background: u8,
    state: ComposerState,
    frames_committed: u32,
    frames_dropped: u32,
}

impl FrameComposer {
    /// Create a composer for the slots of `pool`
    ///
    /// # Arguments
    /// - `geometry`: panel dimensions handed to the drawing surface
    /// - `clear_on_begin`: fill each new frame with `background` first
    /// - `background`: fill byte
    ///
    /// Fails if a frame of `geometry` does not fill exactly one slot.
    pub fn for_pool<const N: usize, const FRAME_SIZE: usize>(
        geometry: PanelGeometry,
        clear_on_begin: bool,
        background: u8,
        _pool: &FrameSlotPool<N, FRAME_SIZE>,
    ) -> Result<Self, ConfigError> {
        if geometry.frame_size() != FRAME_SIZE {
            return Err(ConfigError::FrameSizeMismatch {
                expected: FRAME_SIZE,
                actual: geometry.frame_size(),
            });
        }
        Ok(Self {
            geometry,
            clear_on_begin,
            background,
            state: ComposerState::Idle,
            frames_committed: 0,
            frames_dropped: 0,
        })
    }

    pub fn from_config<const N: usize, const FRAME_SIZE: usize>(
        config: &DisplayConfig,
        pool: &FrameSlotPool<N, FRAME_SIZE>,
    ) -> Result<Self, ConfigError> {
        Self::for_pool(
            config.geometry,
            config.clear_on_begin,
            config.background,
            pool,
        )
    }

    /// Acquire the next writable slot
    ///
    /// While the pool is full, `pump` is called to let the consumer drain a
    /// frame, as often as `policy` allows. Spinning without pumping would
    /// never free a slot.
    ///
    /// # Panics
    /// If `pool` has a different slot size than the one the composer was
    /// built for. Nothing is claimed in that case.
    pub fn begin_frame<'a, const N: usize, const FRAME_SIZE: usize, P>(
        &'a mut self,
        pool: &'a mut FrameSlotPool<N, FRAME_SIZE>,
        policy: WaitPolicy,
        mut pump: P,
    ) -> Result<Frame<'a, N, FRAME_SIZE>, FrameDropped>
    where
        P: FnMut(&mut FrameSlotPool<N, FRAME_SIZE>) -> TransferStatus,
    {
        assert_eq!(
            self.geometry.frame_size(),
            FRAME_SIZE,
            "pool slot size does not match composer geometry"
        );
        debug_assert_eq!(self.state, ComposerState::Idle);
        self.state = ComposerState::Acquiring;

        let mut pumps: u32 = 0;
        while !pool.writable() {
            match policy {
                WaitPolicy::NoWait => return Err(self.drop_frame()),
                WaitPolicy::Bounded(max) if pumps >= max => return Err(self.drop_frame()),
                _ => {}
            }
            pump(pool);
            pumps = pumps.saturating_add(1);
        }

        let clear = self.clear_on_begin.then_some(self.background);
        match pool.acquire_writable() {
            Some(slot) => {
                if let Some(background) = clear {
                    slot.fill(background);
                }
            }
            None => return Err(self.drop_frame()),
        }

        self.state = ComposerState::Drawing;
        Ok(Frame {
            pool,
            composer: self,
        })
    }

    fn drop_frame(&mut self) -> FrameDropped {
        self.frames_dropped = self.frames_dropped.wrapping_add(1);
        self.state = ComposerState::Idle;
        FrameDropped
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }

    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    /// Frames published so far
    pub fn frames_committed(&self) -> u32 {
        self.frames_committed
    }

    /// Frames skipped because no slot was free
    pub fn frames_dropped(&self) -> u32 {
        self.frames_dropped
    }
}

/// A frame being drawn
///
/// Dropping the guard (or calling [`Frame::end`]) commits the slot.
pub struct Frame<'a, const N: usize, const FRAME_SIZE: usize> {
    pool: &'a mut FrameSlotPool<N, FRAME_SIZE>,
    composer: &'a mut FrameComposer,
}

impl<const N: usize, const FRAME_SIZE: usize> Frame<'_, N, FRAME_SIZE> {
    /// Drawing surface over the frame's slot
    pub fn surface(&mut self) -> Surface<'_> {
        let geometry = self.composer.geometry;
        Surface::new(self.pool.claimed_slot_mut(), geometry)
    }

    /// Raw frame bytes
    pub fn bytes_mut(&mut self) -> &mut [u8; FRAME_SIZE] {
        self.pool.claimed_slot_mut()
    }

    /// Commit the frame now
    pub fn end(self) {}
}

impl<const N: usize, const FRAME_SIZE: usize> Drop for Frame<'_, N, FRAME_SIZE> {
    fn drop(&mut self) {
        self.composer.state = ComposerState::Committing;
        self.pool.commit();
        self.composer.frames_committed = self.composer.frames_committed.wrapping_add(1);
        self.composer.state = ComposerState::Idle;
    }
}
