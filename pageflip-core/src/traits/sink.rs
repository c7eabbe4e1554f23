//! Page sink trait
//!
//! The device side of the pipeline: whatever turns page bytes into pixels on
//! glass. The engine only ever hands it one page at a time.

/// Errors a sink can report for a page or lifecycle call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// Transport busy, page not accepted yet
    Busy,
    /// Bus or pin error while talking to the panel
    Communication,
    /// Sink used before `init`
    NotInitialized,
    /// Page index beyond what the panel addresses
    InvalidPage,
}

/// Consumer of frame pages
///
/// `send_page` must tolerate being called again with the same page and bytes
/// after it returned an error; the transfer engine retries rejected pages
/// unchanged on its next step.
pub trait PageSink {
    /// Bring the panel up. Called once before any page is sent.
    fn init(&mut self) -> Result<(), SinkError>;

    /// Power the panel down. Called once at shutdown.
    fn shutdown(&mut self) -> Result<(), SinkError>;

    /// Transfer page `page` of the current frame
    fn send_page(&mut self, page: usize, data: &[u8]) -> Result<(), SinkError>;

    /// Rotate output by 180 degrees
    fn set_flip_mode(&mut self, _flip180: bool) -> Result<(), SinkError> {
        Ok(())
    }

    /// Set panel contrast
    fn set_contrast(&mut self, _contrast: u8) -> Result<(), SinkError> {
        Ok(())
    }

    /// Set the controller's RAM column offset
    fn adjust_offset(&mut self, _offset: u8) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: PageSink + ?Sized> PageSink for &mut S {
    fn init(&mut self) -> Result<(), SinkError> {
        (**self).init()
    }

    fn shutdown(&mut self) -> Result<(), SinkError> {
        (**self).shutdown()
    }

    fn send_page(&mut self, page: usize, data: &[u8]) -> Result<(), SinkError> {
        (**self).send_page(page, data)
    }

    fn set_flip_mode(&mut self, flip180: bool) -> Result<(), SinkError> {
        (**self).set_flip_mode(flip180)
    }

    fn set_contrast(&mut self, contrast: u8) -> Result<(), SinkError> {
        (**self).set_contrast(contrast)
    }

    fn adjust_offset(&mut self, offset: u8) -> Result<(), SinkError> {
        (**self).adjust_offset(offset)
    }
}
