use std::error::Error;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use time::{OffsetDateTime, UtcOffset};

use weatherdeck::carousel::{Carousel, Timing};
use weatherdeck::cell::RefreshCell;
use weatherdeck::config::Config;
use weatherdeck::display::{Display, Framebuffer, Headless};
use weatherdeck::font::FontCache;
use weatherdeck::input::{Button, InputSource, NoInput};
use weatherdeck::pages::{ClockPage, CurrentPage, ForecastPage, Page, Theme};
use weatherdeck::weather::OpenWeather;

fn main() {
    // Loaded here as well as in `Config::from_env` so `RUST_LOG` can live in `.env`.
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    // The local offset can only be determined while the process is single-threaded.
    let offset = UtcOffset::current_local_offset().unwrap_or_else(|_| {
        warn!("Unable to determine the local UTC offset, using UTC.");
        UtcOffset::UTC
    });

    let config = Config::from_env()?;
    info!(
        "Showing weather for {}, {}; refreshing every {} / {} minutes",
        config.latitude,
        config.longitude,
        config.current_refresh.whole_minutes(),
        config.forecast_refresh.whole_minutes(),
    );

    let provider = Arc::new(OpenWeather::new(
        &config.api_url,
        &config.api_key,
        (config.latitude, config.longitude),
        offset,
    )?);
    let theme = Theme {
        font_family: config.font_family.clone(),
        icon_dir: config.icon_dir.clone(),
    };

    let current = {
        let provider = Arc::clone(&provider);
        RefreshCell::new("current conditions", config.current_refresh, move || {
            provider.current()
        })
    };
    let forecast = RefreshCell::new("forecast", config.forecast_refresh, move || {
        provider.forecast()
    });

    let carousel = Carousel::new(
        vec![
            Page::Clock(ClockPage::new(theme.clone())),
            Page::Current(CurrentPage::new(current, theme.clone())),
            Page::Forecast(ForecastPage::new(forecast, theme)),
        ],
        Timing {
            page_switch: config.page_switch,
            click_throttle: config.click_throttle,
        },
        OffsetDateTime::now_utc().to_offset(offset),
    )
    .ok_or("no pages to show")?;

    let input: Box<dyn InputSource> = match config.button_pin {
        Some(pin) => {
            info!("Advancing pages with the button on GPIO {}", pin);
            Box::new(Button::new(pin)?)
        }
        None => Box::new(NoInput),
    };

    match &config.framebuffer {
        Some(device) => run_loop(Framebuffer::open(device)?, input, carousel, &config, offset),
        None => {
            info!("No framebuffer configured, running headless");
            run_loop(Headless::default(), input, carousel, &config, offset)
        }
    }
}

fn run_loop<D: Display>(
    mut display: D,
    mut input: Box<dyn InputSource>,
    mut carousel: Carousel<Page>,
    config: &Config,
    offset: UtcOffset,
) -> Result<(), Box<dyn Error>> {
    let mut device = piet_common::Device::new()?;
    let mut fonts = FontCache::new();
    let frame = Duration::from_secs_f64(1. / config.frame_rate as f64);

    loop {
        let started = Instant::now();
        let now = OffsetDateTime::now_utc().to_offset(offset);

        carousel.on_tick(now, input.clicked());

        if let Err(e) =
            display.draw_context(&mut device, |ctx| carousel.draw(ctx, &mut fonts, now))
        {
            error!("Unable to draw frame: {}", e);
        }

        thread::sleep(frame.saturating_sub(started.elapsed()));
    }
}
