//! Panel geometry and page layout
//!
//! Frames use the packed 1-bit layout of page-addressed controllers: rows are
//! grouped into pages of 8, each page holds one byte per column and bit 0 of a
//! byte is the topmost row of that page.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rows covered by one byte of the packed layout
pub const ROWS_PER_BYTE: u16 = 8;

/// Configuration errors caught at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Width or height is zero
    ZeroDimension,
    /// Height is not a multiple of 8 rows
    UnalignedHeight,
    /// Page count is zero
    ZeroPages,
    /// Page count does not evenly divide the frame size
    PagesDoNotDivideFrame { frame_size: usize, num_pages: usize },
    /// Geometry does not match the slot size of the pool
    FrameSizeMismatch { expected: usize, actual: usize },
}

/// Pixel dimensions of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelGeometry {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels (multiple of 8)
    pub height: u16,
}

impl PanelGeometry {
    /// 128x64 monochrome panel (SH1106/SSD1306 class)
    pub const MONO_128X64: Self = Self::new(128, 64);

    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Bytes needed for one packed frame
    pub const fn frame_size(&self) -> usize {
        self.width as usize * self.height as usize / ROWS_PER_BYTE as usize
    }

    /// Number of 8-row pages the controller addresses
    pub const fn native_pages(&self) -> usize {
        (self.height / ROWS_PER_BYTE) as usize
    }

    /// Check that the geometry is usable with the packed layout
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if self.height % ROWS_PER_BYTE != 0 {
            return Err(ConfigError::UnalignedHeight);
        }
        Ok(())
    }
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self::MONO_128X64
    }
}

/// Split of a frame into equal transfer pages
///
/// Only constructible through [`PageLayout::new`], so a layout in hand always
/// divides its frame evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PageLayout {
    frame_size: usize,
    num_pages: usize,
}

impl PageLayout {
    /// Create a layout, rejecting page counts that don't divide the frame
    pub fn new(frame_size: usize, num_pages: usize) -> Result<Self, ConfigError> {
        if num_pages == 0 {
            return Err(ConfigError::ZeroPages);
        }
        if frame_size == 0 || frame_size % num_pages != 0 {
            return Err(ConfigError::PagesDoNotDivideFrame {
                frame_size,
                num_pages,
            });
        }
        Ok(Self {
            frame_size,
            num_pages,
        })
    }

    /// Layout matching the controller's native 8-row pages
    pub fn native(geometry: &PanelGeometry) -> Result<Self, ConfigError> {
        geometry.validate()?;
        Self::new(geometry.frame_size(), geometry.native_pages())
    }

    pub const fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub const fn num_pages(&self) -> usize {
        self.num_pages
    }

    pub const fn page_size(&self) -> usize {
        self.frame_size / self.num_pages
    }

    /// Bytes of page `index` within `frame`
    ///
    /// # Panics
    /// If `index` is out of range or `frame` is not `frame_size` long.
    pub fn page<'a>(&self, frame: &'a [u8], index: usize) -> &'a [u8] {
        assert_eq!(frame.len(), self.frame_size, "frame does not match layout");
        assert!(index < self.num_pages, "page {} out of range", index);
        let start = index * self.page_size();
        &frame[start..start + self.page_size()]
    }
}
