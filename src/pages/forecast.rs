use piet::kurbo::{Circle, Line, Point, Rect};
use piet::RenderContext;
use time::OffsetDateTime;

use super::{
    draw_footer, draw_loading, draw_text, view, Align, Screen, TextStyle, Theme, View, ACCENT,
    FOREGROUND, MUTED,
};
use crate::cell::RefreshCell;
use crate::font::FontCache;
use crate::image::ImageCache;
use crate::weather::{Forecast, FORECAST_POINTS};

const CHART_LEFT: f64 = 20.;
const CHART_WIDTH: f64 = 440.;
/// y of the warmest point.
const CHART_TOP: f64 = 125.;
/// y of the coldest point.
const CHART_BOTTOM: f64 = 205.;
/// y of every point when the temperatures are all the same.
const CHART_FLAT: f64 = 165.;

const ICON_TOP: f64 = 20.;
const ICON_SIZE: f64 = 44.;
const HOUR_TOP: f64 = 232.;
const MARKER_RADIUS: f64 = 5.;

pub struct ForecastPage {
    forecast: RefreshCell<Forecast>,
    icons: ImageCache,
    theme: Theme,
}

impl ForecastPage {
    pub fn new(forecast: RefreshCell<Forecast>, theme: Theme) -> Self {
        Self {
            forecast,
            icons: ImageCache::new(),
            theme,
        }
    }
}

impl Screen for ForecastPage {
    fn on_tick(&mut self, now: OffsetDateTime) {
        self.forecast.on_tick(now);
    }

    fn draw<R: RenderContext>(&mut self, ctx: &mut R, fonts: &mut FontCache, _now: OffsetDateTime) {
        let family = self.theme.font_family.as_str();
        let view = view(&self.forecast);

        let Forecast(predictions) = match &view {
            View::Loading => return draw_loading(ctx, fonts, family),
            View::Fresh { data, .. } | View::Stale(data) => *data,
        };
        let predictions = &predictions[..predictions.len().min(FORECAST_POINTS)];

        let temperatures: Vec<i32> = predictions
            .iter()
            .map(|e| e.temperature.celsius())
            .collect();
        let points = plot(&temperatures);

        for segment in points.windows(2) {
            ctx.stroke(Line::new(segment[0], segment[1]), &ACCENT, 3.);
        }

        let label = |size, color| TextStyle {
            family,
            size,
            color,
        };

        for (prediction, &point) in predictions.iter().zip(points.iter()) {
            ctx.fill(Circle::new(point, MARKER_RADIUS), &FOREGROUND);

            draw_text(
                ctx,
                fonts,
                &label(18, FOREGROUND),
                &prediction.temperature.to_string(),
                Point::new(point.x, point.y - MARKER_RADIUS - 26.),
                Align::Center,
            );
            draw_text(
                ctx,
                fonts,
                &label(16, MUTED),
                &format!("{}h", prediction.time.hour()),
                Point::new(point.x, HOUR_TOP),
                Align::Center,
            );

            if let Some(icon) = self.icons.get(&self.theme.icon_path(&prediction.icon)) {
                icon.draw(
                    ctx,
                    Rect::from_origin_size(
                        (point.x - ICON_SIZE / 2., ICON_TOP),
                        (ICON_SIZE, ICON_SIZE),
                    ),
                );
            }
        }

        draw_footer(ctx, fonts, family, &view);
    }
}

/// Place one point per temperature: evenly spaced slot centres across the chart, with
/// the warmest at `CHART_TOP` and the coldest at `CHART_BOTTOM`.
pub fn plot(temperatures: &[i32]) -> Vec<Point> {
    let (min, max) = match (temperatures.iter().min(), temperatures.iter().max()) {
        (Some(&min), Some(&max)) => (i64::from(min), i64::from(max)),
        _ => return Vec::new(),
    };
    let slot = CHART_WIDTH / temperatures.len() as f64;

    temperatures
        .iter()
        .enumerate()
        .map(|(i, &temperature)| {
            let x = CHART_LEFT + slot * (i as f64 + 0.5);
            let y = if max - min < 1 {
                CHART_FLAT
            } else {
                let ratio = (i64::from(temperature) - min) as f64 / (max - min) as f64;
                CHART_BOTTOM - ratio * (CHART_BOTTOM - CHART_TOP)
            };
            Point::new(x, y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_temperatures_share_the_fallback_height() {
        let points = plot(&[10, 10, 10, 10]);

        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|p| p.y == CHART_FLAT));
    }

    #[test]
    fn extremes_land_on_the_bounds() {
        let points = plot(&[0, 10]);

        assert_eq!(points[0].y, CHART_BOTTOM);
        assert_eq!(points[1].y, CHART_TOP);
    }

    #[test]
    fn points_are_evenly_spaced() {
        let points = plot(&[-3, 4, 1, 8]);
        let gaps: Vec<f64> = points.windows(2).map(|w| w[1].x - w[0].x).collect();

        assert_eq!(gaps, vec![CHART_WIDTH / 4.; 3]);
        assert_eq!(points[0].x, CHART_LEFT + CHART_WIDTH / 8.);
    }

    #[test]
    fn intermediate_values_are_interpolated() {
        let points = plot(&[0, 5, 10]);

        assert_eq!(points[1].y, (CHART_TOP + CHART_BOTTOM) / 2.);
    }

    #[test]
    fn no_temperatures_no_points() {
        assert!(plot(&[]).is_empty());
    }

    #[test]
    fn extreme_range_does_not_overflow() {
        let points = plot(&[i32::MIN, i32::MAX]);

        assert_eq!(points[0].y, CHART_BOTTOM);
        assert_eq!(points[1].y, CHART_TOP);
    }
}
