use piet::kurbo::Point;
use piet::RenderContext;
use time::OffsetDateTime;

use super::{draw_text, Align, Screen, TextStyle, Theme, FOREGROUND, MUTED};
use crate::display::DISPLAY_WIDTH;
use crate::font::FontCache;

pub struct ClockPage {
    theme: Theme,
}

impl ClockPage {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

impl Screen for ClockPage {
    fn on_tick(&mut self, _now: OffsetDateTime) {}

    fn draw<R: RenderContext>(&mut self, ctx: &mut R, fonts: &mut FontCache, now: OffsetDateTime) {
        let center = DISPLAY_WIDTH as f64 / 2.;

        draw_text(
            ctx,
            fonts,
            &TextStyle {
                family: &self.theme.font_family,
                size: 88,
                color: FOREGROUND,
            },
            &time_of_day(now),
            Point::new(center, 70.),
            Align::Center,
        );
        draw_text(
            ctx,
            fonts,
            &TextStyle {
                family: &self.theme.font_family,
                size: 28,
                color: MUTED,
            },
            &date(now),
            Point::new(center, 190.),
            Align::Center,
        );
    }
}

fn time_of_day(now: OffsetDateTime) -> String {
    format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second())
}

fn date(now: OffsetDateTime) -> String {
    format!("{} {} {}", now.weekday(), now.day(), now.month())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month, Time};

    #[test]
    fn formats_time_and_date() {
        let now = Date::from_calendar_date(2024, Month::March, 5)
            .unwrap()
            .with_time(Time::from_hms(7, 4, 9).unwrap())
            .assume_utc();

        assert_eq!(time_of_day(now), "07:04:09");
        assert_eq!(date(now), "Tuesday 5 March");
    }
}
