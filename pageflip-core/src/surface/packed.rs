//! Packed 1-bit drawing surface
//!
//! Wraps the writable slot of a frame. Byte `page * width + x` holds column
//! `x` of rows `page * 8 ..= page * 8 + 7`, bit 0 being the top row.
//! Every primitive clips to the panel; writes outside it are dropped.

use crate::config::{PanelGeometry, ROWS_PER_BYTE};

/// Drawing surface over one frame slot
pub struct Surface<'a> {
    buf: &'a mut [u8],
    width: i32,
    height: i32,
}

impl<'a> Surface<'a> {
    /// Wrap `buf` as a surface of the given geometry
    ///
    /// # Panics
    /// If `buf` is not exactly one frame long.
    pub fn new(buf: &'a mut [u8], geometry: PanelGeometry) -> Self {
        assert_eq!(
            buf.len(),
            geometry.frame_size(),
            "buffer does not match panel geometry"
        );
        Self {
            buf,
            width: geometry.width as i32,
            height: geometry.height as i32,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Raw frame bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.buf
    }

    /// Fill every byte of the frame with `value`
    pub fn fill(&mut self, value: u8) {
        self.buf.fill(value);
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Byte index and bit mask of an in-bounds pixel
    fn locate(&self, x: i32, y: i32) -> (usize, u8) {
        let page = (y / ROWS_PER_BYTE as i32) as usize;
        let index = page * self.width as usize + x as usize;
        (index, 1 << (y % ROWS_PER_BYTE as i32))
    }

    pub fn set_pixel(&mut self, x: i32, y: i32) {
        if self.in_bounds(x, y) {
            let (index, mask) = self.locate(x, y);
            self.buf[index] |= mask;
        }
    }

    pub fn clear_pixel(&mut self, x: i32, y: i32) {
        if self.in_bounds(x, y) {
            let (index, mask) = self.locate(x, y);
            self.buf[index] &= !mask;
        }
    }

    pub fn invert_pixel(&mut self, x: i32, y: i32) {
        if self.in_bounds(x, y) {
            let (index, mask) = self.locate(x, y);
            self.buf[index] ^= mask;
        }
    }

    /// True if the pixel is lit; out-of-bounds pixels read as unlit
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let (index, mask) = self.locate(x, y);
        self.buf[index] & mask != 0
    }

    /// Clip the span `start..start + len` to `0..limit`
    fn clip(start: i32, len: i32, limit: i32) -> Option<(i32, i32)> {
        if len <= 0 {
            return None;
        }
        let lo = start.max(0);
        let hi = start.saturating_add(len).min(limit);
        (lo < hi).then_some((lo, hi))
    }

    pub fn draw_hline(&mut self, x: i32, y: i32, w: i32) {
        if y < 0 || y >= self.height {
            return;
        }
        if let Some((x0, x1)) = Self::clip(x, w, self.width) {
            for px in x0..x1 {
                self.set_pixel(px, y);
            }
        }
    }

    pub fn draw_vline(&mut self, x: i32, y: i32, h: i32) {
        if x < 0 || x >= self.width {
            return;
        }
        if let Some((y0, y1)) = Self::clip(y, h, self.height) {
            for py in y0..y1 {
                self.set_pixel(x, py);
            }
        }
    }

    /// Filled rectangle
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.for_each_in_rect(x, y, w, h, |s, px, py| s.set_pixel(px, py));
    }

    /// Rectangle outline
    pub fn draw_frame(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.draw_hline(x, y, w);
        self.draw_hline(x, y.saturating_add(h - 1), w);
        self.draw_vline(x, y.saturating_add(1), h - 2);
        self.draw_vline(x.saturating_add(w - 1), y.saturating_add(1), h - 2);
    }

    /// Invert every pixel of a rectangle (selection highlight)
    pub fn invert_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.for_each_in_rect(x, y, w, h, |s, px, py| s.invert_pixel(px, py));
    }

    fn for_each_in_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        mut f: impl FnMut(&mut Self, i32, i32),
    ) {
        let (Some((x0, x1)), Some((y0, y1))) = (
            Self::clip(x, w, self.width),
            Self::clip(y, h, self.height),
        ) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                f(self, px, py);
            }
        }
    }

    /// Line between two points, endpoints included
    ///
    /// The segment is clipped to the panel before it is walked, so far-off
    /// endpoints cost no more than an on-panel line.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let Some([(x0, y0), (x1, y1)]) = self.clip_line(x0, y0, x1, y1) else {
            return;
        };
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.set_pixel(x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Liang-Barsky clip of a segment to the panel
    ///
    /// Entry and exit points are kept as exact fractions of the segment and
    /// rounded to the nearest pixel. A segment fully on the panel comes back
    /// unchanged; one that misses it yields `None`.
    fn clip_line(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<[(i32, i32); 2]> {
        let (x0, y0) = (i128::from(x0), i128::from(y0));
        let (dx, dy) = (i128::from(x1) - x0, i128::from(y1) - y0);
        let x_max = i128::from(self.width) - 1;
        let y_max = i128::from(self.height) - 1;

        // (numerator, positive denominator)
        let mut enter: (i128, i128) = (0, 1);
        let mut exit: (i128, i128) = (1, 1);
        for (p, q) in [(-dx, x0), (dx, x_max - x0), (-dy, y0), (dy, y_max - y0)] {
            if p == 0 {
                if q < 0 {
                    return None;
                }
            } else if p < 0 {
                let t = (-q, -p);
                if t.0 * enter.1 > enter.0 * t.1 {
                    enter = t;
                }
            } else {
                let t = (q, p);
                if t.0 * exit.1 < exit.0 * t.1 {
                    exit = t;
                }
            }
        }
        if enter.0 * exit.1 > exit.0 * enter.1 {
            return None;
        }

        let at = |(num, den): (i128, i128)| {
            let round = |origin: i128, delta: i128, max: i128| {
                let scaled = 2 * (origin * den + delta * num) + den;
                scaled.div_euclid(2 * den).clamp(0, max) as i32
            };
            (round(x0, dx, x_max), round(y0, dy, y_max))
        };
        Some([at(enter), at(exit)])
    }

    /// Circle outline centred on `(cx, cy)`
    pub fn draw_circle(&mut self, cx: i32, cy: i32, r: i32) {
        if r < 0 || !self.circle_touches_panel(cx, cy, r) {
            return;
        }
        let mut x = r;
        let mut y = 0;
        let mut err = 1 - i64::from(r);

        while x >= y {
            for (dx, dy) in [
                (x, y),
                (y, x),
                (-y, x),
                (-x, y),
                (-x, -y),
                (-y, -x),
                (y, -x),
                (x, -y),
            ] {
                self.set_pixel(cx.saturating_add(dx), cy.saturating_add(dy));
            }
            y += 1;
            if err < 0 {
                err += 2 * i64::from(y) + 1;
            } else {
                x -= 1;
                err += 2 * (i64::from(y) - i64::from(x)) + 1;
            }
        }
    }

    /// False if the outline lies wholly outside the panel or wholly around it
    fn circle_touches_panel(&self, cx: i32, cy: i32, r: i32) -> bool {
        let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(r));
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        if cx + r < 0 || cy + r < 0 || cx - r >= w || cy - r >= h {
            return false;
        }

        // Outline pixels sit within half a pixel of the radius
        let far_x = i128::from(cx.abs().max((cx - (w - 1)).abs()));
        let far_y = i128::from(cy.abs().max((cy - (h - 1)).abs()));
        let inner = i128::from(r - 1);
        far_x * far_x + far_y * far_y >= inner * inner || r <= 1
    }

    /// OR an 8-row bitmap onto the surface
    ///
    /// Each byte of `data` is one column, bit 0 at row `y`. At most `w`
    /// columns are drawn.
    pub fn draw_bitmap8(&mut self, x: i32, y: i32, w: i32, data: &[u8]) {
        let columns = data.iter().take(w.max(0) as usize);
        for (col, &bits) in (0..).zip(columns) {
            for bit in 0..ROWS_PER_BYTE as i32 {
                if bits & (1 << bit) != 0 {
                    self.set_pixel(x.saturating_add(col), y.saturating_add(bit));
                }
            }
        }
    }
}
