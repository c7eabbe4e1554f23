//! Render task
//!
//! Draws a small animation at a fixed tick. Frames are composed with
//! `WaitPolicy::NoWait`, so a slow panel costs dropped frames rather than a
//! stalled renderer.

use core::fmt::Write;

use defmt::*;
use embassy_time::{Duration, Ticker};
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use heapless::String;

use pageflip_core::{Surface, WaitPolicy};

use crate::SharedDisplay;

/// Log a summary every this many ticks
const REPORT_EVERY: u32 = 300;

/// Ball radius in pixels
const BALL_RADIUS: i32 = 5;

/// Bouncing ball with a frame counter
struct Scene {
    tick: u32,
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
}

impl Scene {
    const fn new() -> Self {
        Self {
            tick: 0,
            x: 20,
            y: 30,
            dx: 2,
            dy: 1,
        }
    }

    fn draw(&self, surface: &mut Surface<'_>) {
        let (width, height) = (surface.width(), surface.height());
        surface.draw_frame(0, 0, width, height);
        surface.draw_hline(0, 14, width);

        let mut label: String<24> = String::new();
        let _ = write!(label, "frame {}", self.tick);
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let _ = Text::new(&label, Point::new(4, 10), style).draw(surface);

        surface.draw_circle(self.x, self.y, BALL_RADIUS);
        surface.draw_rect(self.x - 1, self.y - 1, 3, 3);
    }

    /// Move the ball, bouncing inside the area below the header
    fn advance(&mut self, width: i32, height: i32) {
        self.tick = self.tick.wrapping_add(1);

        let (min_x, max_x) = (BALL_RADIUS + 1, width - BALL_RADIUS - 2);
        let (min_y, max_y) = (15 + BALL_RADIUS + 1, height - BALL_RADIUS - 2);

        self.x += self.dx;
        self.y += self.dy;
        if self.x <= min_x || self.x >= max_x {
            self.dx = -self.dx;
            self.x = self.x.clamp(min_x, max_x);
        }
        if self.y <= min_y || self.y >= max_y {
            self.dy = -self.dy;
            self.y = self.y.clamp(min_y, max_y);
        }
    }
}

/// Render task - composes one frame per tick
#[embassy_executor::task]
pub async fn render_task(display: &'static SharedDisplay, interval_ms: u32) {
    info!("Render task started, {} ms per frame", interval_ms);

    let mut ticker = Ticker::every(Duration::from_millis(interval_ms.max(1) as u64));
    let mut scene = Scene::new();

    loop {
        let (width, height) = {
            let mut display = display.lock().await;
            let geometry = display.composer().geometry();

            match display.begin_frame(WaitPolicy::NoWait) {
                Ok(mut frame) => scene.draw(&mut frame.surface()),
                Err(_) => trace!("Frame {} dropped, no free slot", scene.tick),
            }

            if scene.tick % REPORT_EVERY == 0 {
                let composer = display.composer();
                info!(
                    "Render: {} committed, {} dropped",
                    composer.frames_committed(),
                    composer.frames_dropped()
                );
            }

            (geometry.width as i32, geometry.height as i32)
        };

        scene.advance(width, height);
        ticker.next().await;
    }
}
