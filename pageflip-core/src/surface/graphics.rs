//! embedded-graphics support
//!
//! Lets text, fonts and styled primitives from `embedded-graphics` render
//! straight into a frame slot.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use super::packed::Surface;

impl DrawTarget for Surface<'_> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            match color {
                BinaryColor::On => self.set_pixel(point.x, point.y),
                BinaryColor::Off => self.clear_pixel(point.x, point.y),
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(if color.is_on() { 0xFF } else { 0x00 });
        Ok(())
    }
}

impl OriginDimensions for Surface<'_> {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanelGeometry;
    use embedded_graphics::mono_font::{ascii::FONT_6X10, MonoTextStyle};
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
    use embedded_graphics::text::{Baseline, Text};

    #[test]
    fn test_filled_rectangle_matches_native_rect() {
        let geometry = PanelGeometry::new(32, 16);
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];

        let mut surface = Surface::new(&mut a, geometry);
        Rectangle::new(Point::new(3, 2), Size::new(10, 9))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut surface)
            .unwrap();

        Surface::new(&mut b, geometry).draw_rect(3, 2, 10, 9);
        assert_eq!(a, b);
    }

    #[test]
    fn test_text_renders_inside_bounds() {
        let mut buf = [0u8; 1024];
        let mut surface = Surface::new(&mut buf, PanelGeometry::MONO_128X64);
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        Text::with_baseline("Frame", Point::new(0, 0), style, Baseline::Top)
            .draw(&mut surface)
            .unwrap();

        assert!(surface.as_bytes().iter().any(|&b| b != 0));
        // Five glyphs of 6px never reach past column 30
        for y in 0..64 {
            assert!(!surface.pixel(40, y));
        }
    }

    #[test]
    fn test_clear_and_size() {
        let mut buf = [0u8; 32];
        let mut surface = Surface::new(&mut buf, PanelGeometry::new(16, 16));
        DrawTarget::clear(&mut surface, BinaryColor::On).unwrap();
        assert!(surface.as_bytes().iter().all(|&b| b == 0xFF));
        assert_eq!(surface.size(), Size::new(16, 16));
    }
}
