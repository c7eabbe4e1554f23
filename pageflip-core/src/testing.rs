//! Test sinks shared by the unit tests

use crate::traits::{PageSink, SinkError};

/// Sink that records every page and rejects a scripted number of calls
#[derive(Debug, Default)]
pub struct ScriptedSink {
    /// Accepted pages in arrival order
    pub sent: Vec<(usize, Vec<u8>)>,
    /// Every `send_page` call, accepted or not
    pub attempts: Vec<(usize, Vec<u8>)>,
    /// Number of `send_page` calls
    pub calls: usize,
    /// Calls left to reject with `Busy`
    pub reject_remaining: usize,
    /// Reject every call from now on
    pub hung: bool,
    pub init_calls: usize,
    pub shutdown_calls: usize,
    pub flip: Option<bool>,
    pub contrast: Option<u8>,
    pub offset: Option<u8>,
}

impl ScriptedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(count: usize) -> Self {
        Self {
            reject_remaining: count,
            ..Self::default()
        }
    }

    pub fn hung() -> Self {
        Self {
            hung: true,
            ..Self::default()
        }
    }

    /// Page indices of accepted pages
    pub fn pages(&self) -> Vec<usize> {
        self.sent.iter().map(|(page, _)| *page).collect()
    }
}

impl PageSink for ScriptedSink {
    fn init(&mut self) -> Result<(), SinkError> {
        self.init_calls += 1;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), SinkError> {
        self.shutdown_calls += 1;
        Ok(())
    }

    fn send_page(&mut self, page: usize, data: &[u8]) -> Result<(), SinkError> {
        self.calls += 1;
        self.attempts.push((page, data.to_vec()));
        if self.hung {
            return Err(SinkError::Busy);
        }
        if self.reject_remaining > 0 {
            self.reject_remaining -= 1;
            return Err(SinkError::Busy);
        }
        self.sent.push((page, data.to_vec()));
        Ok(())
    }

    fn set_flip_mode(&mut self, flip180: bool) -> Result<(), SinkError> {
        self.flip = Some(flip180);
        Ok(())
    }

    fn set_contrast(&mut self, contrast: u8) -> Result<(), SinkError> {
        self.contrast = Some(contrast);
        Ok(())
    }

    fn adjust_offset(&mut self, offset: u8) -> Result<(), SinkError> {
        self.offset = Some(offset);
        Ok(())
    }
}
