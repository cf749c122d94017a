use piet::kurbo::{Point, Rect};
use piet::RenderContext;
use time::OffsetDateTime;

use super::{
    draw_footer, draw_loading, draw_text, view, Align, Screen, TextStyle, Theme, View,
    FOREGROUND, MUTED,
};
use crate::cell::RefreshCell;
use crate::font::FontCache;
use crate::image::ImageCache;
use crate::weather::Conditions;

const ICON_AREA: Rect = Rect::new(24., 40., 204., 220.);
const TEXT_CENTER: f64 = 345.;

pub struct CurrentPage {
    conditions: RefreshCell<Conditions>,
    icons: ImageCache,
    theme: Theme,
}

impl CurrentPage {
    pub fn new(conditions: RefreshCell<Conditions>, theme: Theme) -> Self {
        Self {
            conditions,
            icons: ImageCache::new(),
            theme,
        }
    }
}

impl Screen for CurrentPage {
    fn on_tick(&mut self, now: OffsetDateTime) {
        self.conditions.on_tick(now);
    }

    fn draw<R: RenderContext>(&mut self, ctx: &mut R, fonts: &mut FontCache, _now: OffsetDateTime) {
        let family = self.theme.font_family.as_str();
        let view = view(&self.conditions);

        let conditions = match &view {
            View::Loading => return draw_loading(ctx, fonts, family),
            View::Fresh { data, .. } | View::Stale(data) => *data,
        };

        if let Some(icon) = self.icons.get(&self.theme.icon_path(&conditions.icon)) {
            icon.draw(ctx, ICON_AREA);
        }

        draw_text(
            ctx,
            fonts,
            &TextStyle {
                family,
                size: 96,
                color: FOREGROUND,
            },
            &conditions.temperature.to_string(),
            Point::new(TEXT_CENTER, 45.),
            Align::Center,
        );
        draw_text(
            ctx,
            fonts,
            &TextStyle {
                family,
                size: 26,
                color: MUTED,
            },
            &capitalize(&conditions.description),
            Point::new(TEXT_CENTER, 170.),
            Align::Center,
        );

        draw_footer(ctx, fonts, family, &view);
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
