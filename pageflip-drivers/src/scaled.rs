//! Upscaling page sink
//!
//! Renders packed 1-bit pages onto any `embedded-graphics` draw target, each
//! source pixel becoming a `scale` x `scale` block. Used to show the
//! monochrome frame on larger colour TFT panels.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use pageflip_core::config::{PanelGeometry, ROWS_PER_BYTE};
use pageflip_core::traits::{PageSink, SinkError};

/// Sink drawing scaled pages onto a [`DrawTarget`]
pub struct ScaledSink<D: DrawTarget> {
    target: D,
    on: D::Color,
    off: D::Color,
    border: Option<D::Color>,
    /// Source panel
    geometry: PanelGeometry,
    scale: u32,
    /// Top-left corner of the scaled image on the target
    origin: Point,
    flip180: bool,
    initialized: bool,
}

impl<D: DrawTarget> ScaledSink<D> {
    /// Create a sink centred on the target
    pub fn new(target: D, geometry: PanelGeometry, scale: u32, on: D::Color, off: D::Color) -> Self {
        let scale = scale.max(1);
        let area = target.bounding_box();
        let image = Size::new(
            geometry.width as u32 * scale,
            geometry.height as u32 * scale,
        );
        let margin = area.size.saturating_sub(image) / 2;
        let origin = area.top_left + Point::new(margin.width as i32, margin.height as i32);

        Self {
            target,
            on,
            off,
            border: None,
            geometry,
            scale,
            origin,
            flip180: false,
            initialized: false,
        }
    }

    /// Outline the image in `color` on init
    pub fn with_border(mut self, color: D::Color) -> Self {
        self.border = Some(color);
        self
    }

    /// Place the image at `origin` instead of centring it
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }

    /// Target area covered by source pixel `(x, y)`
    fn block(&self, x: i32, y: i32) -> Rectangle {
        let (x, y) = if self.flip180 {
            (
                self.geometry.width as i32 - 1 - x,
                self.geometry.height as i32 - 1 - y,
            )
        } else {
            (x, y)
        };
        let scale = self.scale as i32;
        Rectangle::new(
            self.origin + Point::new(x * scale, y * scale),
            Size::new_equal(self.scale),
        )
    }

    fn image_area(&self) -> Rectangle {
        Rectangle::new(
            self.origin,
            Size::new(
                self.geometry.width as u32 * self.scale,
                self.geometry.height as u32 * self.scale,
            ),
        )
    }
}

impl<D: DrawTarget> PageSink for ScaledSink<D> {
    fn init(&mut self) -> Result<(), SinkError> {
        self.target
            .clear(self.off)
            .map_err(|_| SinkError::Communication)?;

        if let Some(color) = self.border {
            let area = self.image_area();
            Rectangle::new(
                area.top_left - Point::new(1, 1),
                area.size + Size::new(2, 2),
            )
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(&mut self.target)
            .map_err(|_| SinkError::Communication)?;
        }

        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), SinkError> {
        self.initialized = false;
        Ok(())
    }

    fn send_page(&mut self, page: usize, data: &[u8]) -> Result<(), SinkError> {
        if !self.initialized {
            return Err(SinkError::NotInitialized);
        }
        let start = page * data.len();
        if data.is_empty() || start + data.len() > self.geometry.frame_size() {
            return Err(SinkError::InvalidPage);
        }

        let width = self.geometry.width as usize;
        for (offset, &bits) in (start..).zip(data) {
            let x = (offset % width) as i32;
            let row = (offset / width * ROWS_PER_BYTE as usize) as i32;
            for bit in 0..ROWS_PER_BYTE as i32 {
                let color = if bits & (1 << bit) != 0 {
                    self.on
                } else {
                    self.off
                };
                let block = self.block(x, row + bit);
                self.target
                    .fill_solid(&block, color)
                    .map_err(|_| SinkError::Communication)?;
            }
        }
        Ok(())
    }

    fn set_flip_mode(&mut self, flip180: bool) -> Result<(), SinkError> {
        self.flip180 = flip180;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_graphics::pixelcolor::BinaryColor;

    /// 20x20 target recording every pixel write
    struct Canvas {
        pixels: [[Option<BinaryColor>; 20]; 20],
    }

    impl Canvas {
        fn new() -> Self {
            Self {
                pixels: [[None; 20]; 20],
            }
        }

        fn at(&self, x: usize, y: usize) -> Option<BinaryColor> {
            self.pixels[y][x]
        }
    }

    impl OriginDimensions for Canvas {
        fn size(&self) -> Size {
            Size::new(20, 20)
        }
    }

    impl DrawTarget for Canvas {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if (0..20).contains(&point.x) && (0..20).contains(&point.y) {
                    self.pixels[point.y as usize][point.x as usize] = Some(color);
                }
            }
            Ok(())
        }
    }

    /// 8x8 source, one page of 8 bytes, scaled 2x
    fn sink() -> ScaledSink<Canvas> {
        ScaledSink::new(
            Canvas::new(),
            PanelGeometry::new(8, 8),
            2,
            BinaryColor::On,
            BinaryColor::Off,
        )
    }

    #[test]
    fn test_centred_origin() {
        assert_eq!(sink().origin(), Point::new(2, 2));
    }

    #[test]
    fn test_requires_init() {
        let mut sink = sink();
        assert_eq!(sink.send_page(0, &[0; 8]), Err(SinkError::NotInitialized));
    }

    #[test]
    fn test_pixel_becomes_block() {
        let mut sink = sink();
        sink.init().unwrap();
        let mut page = [0u8; 8];
        page[0] = 0b0000_0001;
        sink.send_page(0, &page).unwrap();

        let canvas = sink.target();
        for (x, y) in [(2, 2), (3, 2), (2, 3), (3, 3)] {
            assert_eq!(canvas.at(x, y), Some(BinaryColor::On));
        }
        assert_eq!(canvas.at(4, 2), Some(BinaryColor::Off));
        assert_eq!(canvas.at(17, 17), Some(BinaryColor::Off));
    }

    #[test]
    fn test_flip_mirrors_both_axes() {
        let mut sink = sink();
        sink.init().unwrap();
        sink.set_flip_mode(true).unwrap();
        let mut page = [0u8; 8];
        page[0] = 0b0000_0001;
        sink.send_page(0, &page).unwrap();

        assert_eq!(sink.target().at(16, 16), Some(BinaryColor::On));
        assert_eq!(sink.target().at(2, 2), Some(BinaryColor::Off));
    }

    #[test]
    fn test_border_drawn_on_init() {
        let mut sink = sink().with_border(BinaryColor::On);
        sink.init().unwrap();
        assert_eq!(sink.target().at(1, 1), Some(BinaryColor::On));
        assert_eq!(sink.target().at(18, 18), Some(BinaryColor::On));
        assert_eq!(sink.target().at(2, 2), Some(BinaryColor::Off));
    }

    #[test]
    fn test_split_pages() {
        let mut sink = sink();
        sink.init().unwrap();
        // second half of the only row of bytes: columns 4..8
        sink.send_page(1, &[0xFF; 4]).unwrap();
        assert_eq!(sink.target().at(10, 2), Some(BinaryColor::On));
        assert_eq!(sink.target().at(10, 17), Some(BinaryColor::On));
        assert_eq!(sink.send_page(2, &[0xFF; 4]), Err(SinkError::InvalidPage));
    }
}
