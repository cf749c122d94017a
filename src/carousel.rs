use log::debug;
use piet::kurbo::Circle;
use piet::{Color, RenderContext};
use time::{Duration, OffsetDateTime};

use crate::display::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::font::FontCache;
use crate::pages::Screen;

const DOT_RADIUS: f64 = 3.;
const DOT_SPACING: f64 = 14.;
const DOT_ACTIVE: Color = Color::rgb8(0xEE, 0xEE, 0xEE);
const DOT_INACTIVE: Color = Color::rgb8(0x55, 0x5A, 0x66);

#[derive(Clone, Copy, Debug)]
pub struct Timing {
    /// How long a page stays up before the carousel moves on by itself.
    pub page_switch: Duration,
    /// Minimum time between two honoured clicks.
    pub click_throttle: Duration,
}

/// Rotates through a fixed list of pages. Every page is ticked each frame so that its
/// data keeps refreshing while off-screen; only the current page is drawn.
pub struct Carousel<P> {
    pages: Vec<P>,
    timing: Timing,
    current: usize,
    page_started: OffsetDateTime,
    last_click: OffsetDateTime,
}

impl<P: Screen> Carousel<P> {
    /// Returns `None` if `pages` is empty.
    pub fn new(pages: Vec<P>, timing: Timing, now: OffsetDateTime) -> Option<Self> {
        if pages.is_empty() {
            return None;
        }

        Some(Self {
            pages,
            timing,
            current: 0,
            page_started: now,
            last_click: OffsetDateTime::UNIX_EPOCH,
        })
    }

    pub fn on_tick(&mut self, now: OffsetDateTime, clicked: bool) {
        if now - self.page_started > self.timing.page_switch {
            self.advance(now);
        } else if clicked && now - self.last_click >= self.timing.click_throttle {
            self.last_click = now;
            self.advance(now);
        }

        for page in self.pages.iter_mut() {
            page.on_tick(now);
        }
    }

    pub fn draw<R: RenderContext>(&mut self, ctx: &mut R, fonts: &mut FontCache, now: OffsetDateTime) {
        self.pages[self.current].draw(ctx, fonts, now);
        self.draw_indicator(ctx);
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn pages(&self) -> &[P] {
        &self.pages
    }

    fn advance(&mut self, now: OffsetDateTime) {
        self.current = (self.current + 1) % self.pages.len();
        self.page_started = now;
        debug!("Switched to page {}", self.current);
    }

    fn draw_indicator<R: RenderContext>(&self, ctx: &mut R) {
        let count = self.pages.len() as f64;
        let left = (DISPLAY_WIDTH as f64 - (count - 1.) * DOT_SPACING) / 2.;
        let y = DISPLAY_HEIGHT as f64 - 8.;

        for i in 0..self.pages.len() {
            let color = if i == self.current {
                &DOT_ACTIVE
            } else {
                &DOT_INACTIVE
            };
            ctx.fill(
                Circle::new((left + i as f64 * DOT_SPACING, y), DOT_RADIUS),
                color,
            );
        }
    }
}
