use std::path::PathBuf;

use log::warn;
use piet::kurbo::{Point, Size};
use piet::{Color, RenderContext, Text, TextLayout, TextLayoutBuilder};
use time::OffsetDateTime;

use crate::cell::{RefreshCell, Status};
use crate::display::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::font::FontCache;

mod clock;
mod current;
mod forecast;

pub use clock::ClockPage;
pub use current::CurrentPage;
pub use forecast::{plot, ForecastPage};

pub const FOREGROUND: Color = Color::rgb8(0xF2, 0xF2, 0xF2);
pub const MUTED: Color = Color::rgb8(0x9A, 0xA0, 0xAC);
pub const WARNING: Color = Color::rgb8(0xF0, 0xA0, 0x40);
pub const ACCENT: Color = Color::rgb8(0x5A, 0xB4, 0xF0);

/// What every screen in the rotation can do.
pub trait Screen {
    /// Advance any owned data cells. Called every frame, whether or not the page is
    /// visible.
    fn on_tick(&mut self, now: OffsetDateTime);

    fn draw<R: RenderContext>(&mut self, ctx: &mut R, fonts: &mut FontCache, now: OffsetDateTime);
}

pub enum Page {
    Clock(ClockPage),
    Current(CurrentPage),
    Forecast(ForecastPage),
}

impl Screen for Page {
    fn on_tick(&mut self, now: OffsetDateTime) {
        match self {
            Page::Clock(page) => page.on_tick(now),
            Page::Current(page) => page.on_tick(now),
            Page::Forecast(page) => page.on_tick(now),
        }
    }

    fn draw<R: RenderContext>(&mut self, ctx: &mut R, fonts: &mut FontCache, now: OffsetDateTime) {
        match self {
            Page::Clock(page) => page.draw(ctx, fonts, now),
            Page::Current(page) => page.draw(ctx, fonts, now),
            Page::Forecast(page) => page.draw(ctx, fonts, now),
        }
    }
}

/// Assets shared by all pages.
#[derive(Clone, Debug)]
pub struct Theme {
    pub font_family: String,
    pub icon_dir: PathBuf,
}

impl Theme {
    /// Icons are named after the provider's icon codes, e.g. `icons/10d.svg`.
    pub fn icon_path(&self, icon: &str) -> PathBuf {
        self.icon_dir.join(format!("{}.svg", icon))
    }
}

/// The three mutually exclusive ways a data-backed page can look.
#[derive(Debug, PartialEq)]
pub enum View<'a, T> {
    Loading,
    Fresh {
        data: &'a T,
        refreshed: OffsetDateTime,
    },
    Stale(&'a T),
}

pub fn view<T: Send + 'static>(cell: &RefreshCell<T>) -> View<'_, T> {
    match (cell.data(), cell.status()) {
        (None, _) => View::Loading,
        (Some(data), Status::Error) => View::Stale(data),
        (Some(data), Status::Loaded | Status::Loading) => View::Fresh {
            data,
            refreshed: cell.last_refresh(),
        },
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Align {
    Left,
    Center,
    Right,
}

pub struct TextStyle<'a> {
    pub family: &'a str,
    pub size: u32,
    pub color: Color,
}

/// Draw a single line of text with its top edge at `anchor.y`, returning its size.
pub fn draw_text<R: RenderContext>(
    ctx: &mut R,
    fonts: &mut FontCache,
    style: &TextStyle,
    content: &str,
    anchor: Point,
    align: Align,
) -> Size {
    let font = fonts.get(ctx.text(), style.family, style.size);
    let layout = match ctx
        .text()
        .new_text_layout(content.to_string())
        .font(font.family, font.size)
        .text_color(style.color)
        .build()
    {
        Ok(layout) => layout,
        Err(e) => {
            warn!("Unable to lay out {:?}: {}", content, e);
            return Size::ZERO;
        }
    };

    let size = layout.size();
    let x = match align {
        Align::Left => anchor.x,
        Align::Center => anchor.x - size.width / 2.,
        Align::Right => anchor.x - size.width,
    };
    ctx.draw_text(&layout, (x, anchor.y));
    size
}

pub fn draw_loading<R: RenderContext>(ctx: &mut R, fonts: &mut FontCache, family: &str) {
    draw_text(
        ctx,
        fonts,
        &TextStyle {
            family,
            size: 32,
            color: MUTED,
        },
        "Loading…",
        Point::new(DISPLAY_WIDTH as f64 / 2., DISPLAY_HEIGHT as f64 / 2. - 20.),
        Align::Center,
    );
}

/// Footer line under data-backed pages. Nothing is drawn while loading.
pub fn draw_footer<R: RenderContext, T>(
    ctx: &mut R,
    fonts: &mut FontCache,
    family: &str,
    view: &View<'_, T>,
) {
    let (text, color) = match view {
        View::Loading => return,
        View::Fresh { refreshed, .. } => (
            format!("Last refreshed at {}", hour_minute(*refreshed)),
            MUTED,
        ),
        View::Stale(_) => ("Last refresh failed".to_string(), WARNING),
    };

    draw_text(
        ctx,
        fonts,
        &TextStyle {
            family,
            size: 14,
            color,
        },
        &text,
        Point::new(DISPLAY_WIDTH as f64 - 12., DISPLAY_HEIGHT as f64 - 38.),
        Align::Right,
    );
}

pub fn hour_minute(time: OffsetDateTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    use time::Duration;

    use crate::weather::FetchError;

    fn at(seconds: i64) -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + Duration::seconds(seconds)
    }

    fn settle(cell: &mut RefreshCell<u32>, now: OffsetDateTime) {
        cell.on_tick(now);
        for _ in 0..1000 {
            cell.on_tick(now);
            if !cell.is_refreshing() {
                return;
            }
            thread::sleep(std::time::Duration::from_millis(2));
        }
        panic!("refresh did not complete");
    }

    #[test]
    fn views_follow_cell_state() {
        let failing = Arc::new(AtomicBool::new(true));
        let switch = Arc::clone(&failing);
        let mut cell = RefreshCell::new("view", Duration::seconds(60), move || {
            if switch.load(Ordering::SeqCst) {
                Err(FetchError::HttpStatus(502))
            } else {
                Ok(21)
            }
        });

        assert_eq!(view(&cell), View::Loading);

        settle(&mut cell, at(100));
        assert_eq!(view(&cell), View::Loading);

        failing.store(false, Ordering::SeqCst);
        settle(&mut cell, at(200));
        assert_eq!(
            view(&cell),
            View::Fresh {
                data: &21,
                refreshed: at(200)
            }
        );

        failing.store(true, Ordering::SeqCst);
        settle(&mut cell, at(300));
        assert_eq!(view(&cell), View::Stale(&21));
    }

    #[test]
    fn icon_paths_use_provider_codes() {
        let theme = Theme {
            font_family: "DejaVu Sans".to_string(),
            icon_dir: PathBuf::from("/usr/share/weatherdeck/icons"),
        };

        assert_eq!(
            theme.icon_path("10d"),
            PathBuf::from("/usr/share/weatherdeck/icons/10d.svg")
        );
    }

    #[test]
    fn formats_hour_and_minute() {
        assert_eq!(hour_minute(at(9 * 3600 + 5 * 60 + 59)), "09:05");
    }
}
