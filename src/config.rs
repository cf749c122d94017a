use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub icon_dir: PathBuf,
    pub font_family: String,
    pub frame_rate: u32,
    pub page_switch: Duration,
    pub click_throttle: Duration,
    pub current_refresh: Duration,
    pub forecast_refresh: Duration,
    /// `None` runs without a panel.
    pub framebuffer: Option<PathBuf>,
    pub button_pin: Option<u8>,
}

impl Config {
    /// Read the configuration from the environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let frame_rate = parse_or(&lookup, "WEATHERDECK_FPS", 10)?;
        if !(1..=60).contains(&frame_rate) {
            return Err(ConfigError::Invalid {
                key: "WEATHERDECK_FPS",
                value: frame_rate.to_string(),
            });
        }

        Ok(Self {
            api_key: required("OPENWEATHER_API_KEY")?,
            api_url: lookup("WEATHERDECK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            latitude: parse(
                "WEATHERDECK_LATITUDE",
                &required("WEATHERDECK_LATITUDE")?,
            )?,
            longitude: parse(
                "WEATHERDECK_LONGITUDE",
                &required("WEATHERDECK_LONGITUDE")?,
            )?,
            icon_dir: lookup("WEATHERDECK_ICON_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("icons")),
            font_family: lookup("WEATHERDECK_FONT").unwrap_or_else(|| "DejaVu Sans".to_string()),
            frame_rate,
            page_switch: Duration::seconds(at_least(&lookup, "WEATHERDECK_PAGE_SECONDS", 15, 1)?),
            click_throttle: Duration::milliseconds(at_least(
                &lookup,
                "WEATHERDECK_CLICK_THROTTLE_MS",
                500,
                0,
            )?),
            current_refresh: Duration::seconds(at_least(
                &lookup,
                "WEATHERDECK_CURRENT_REFRESH_SECONDS",
                600,
                1,
            )?),
            forecast_refresh: Duration::seconds(at_least(
                &lookup,
                "WEATHERDECK_FORECAST_REFRESH_SECONDS",
                1800,
                1,
            )?),
            framebuffer: match lookup("WEATHERDECK_FRAMEBUFFER") {
                Some(value) if value.eq_ignore_ascii_case("none") => None,
                Some(value) => Some(PathBuf::from(value)),
                None => Some(PathBuf::from("/dev/fb0")),
            },
            button_pin: lookup("WEATHERDECK_BUTTON_PIN")
                .map(|value| parse("WEATHERDECK_BUTTON_PIN", &value))
                .transpose()?,
        })
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_or<T: FromStr, F: Fn(&str) -> Option<String>>(
    lookup: &F,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => parse(key, &value),
        None => Ok(default),
    }
}

/// Like [`parse_or`], rejecting values below `min`.
fn at_least<F: Fn(&str) -> Option<String>>(
    lookup: &F,
    key: &'static str,
    default: i64,
    min: i64,
) -> Result<i64, ConfigError> {
    let value = parse_or(lookup, key, default)?;
    if value < min {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("OPENWEATHER_API_KEY", "secret"),
        ("WEATHERDECK_LATITUDE", "45.42"),
        ("WEATHERDECK_LONGITUDE", "-75.69"),
    ];

    #[test]
    fn defaults() {
        let config = config(&REQUIRED).unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!((config.latitude, config.longitude), (45.42, -75.69));
        assert_eq!(config.frame_rate, 10);
        assert_eq!(config.page_switch, Duration::seconds(15));
        assert_eq!(config.click_throttle, Duration::milliseconds(500));
        assert_eq!(config.current_refresh, Duration::minutes(10));
        assert_eq!(config.forecast_refresh, Duration::minutes(30));
        assert_eq!(config.framebuffer, Some(PathBuf::from("/dev/fb0")));
        assert_eq!(config.button_pin, None);
    }

    #[test]
    fn missing_api_key_is_fatal() {
        assert_eq!(
            config(&REQUIRED[1..]),
            Err(ConfigError::Missing("OPENWEATHER_API_KEY"))
        );
        assert_eq!(
            config(&[
                ("OPENWEATHER_API_KEY", "  "),
                REQUIRED[1],
                REQUIRED[2],
            ]),
            Err(ConfigError::Missing("OPENWEATHER_API_KEY"))
        );
    }

    #[test]
    fn overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend_from_slice(&[
            ("WEATHERDECK_FRAMEBUFFER", "none"),
            ("WEATHERDECK_BUTTON_PIN", "26"),
            ("WEATHERDECK_PAGE_SECONDS", "30"),
            ("WEATHERDECK_FPS", "30"),
        ]);
        let config = config(&vars).unwrap();

        assert_eq!(config.framebuffer, None);
        assert_eq!(config.button_pin, Some(26));
        assert_eq!(config.page_switch, Duration::seconds(30));
        assert_eq!(config.frame_rate, 30);
    }

    #[test]
    fn rejects_bad_numbers() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("WEATHERDECK_FPS", "0"));
        assert!(matches!(
            config(&vars),
            Err(ConfigError::Invalid {
                key: "WEATHERDECK_FPS",
                ..
            })
        ));

        let mut vars = REQUIRED.to_vec();
        vars.push(("WEATHERDECK_BUTTON_PIN", "pin 4"));
        assert!(matches!(
            config(&vars),
            Err(ConfigError::Invalid {
                key: "WEATHERDECK_BUTTON_PIN",
                ..
            })
        ));
    }

    #[test]
    fn rejects_out_of_range_durations() {
        for (key, value) in [
            ("WEATHERDECK_PAGE_SECONDS", "-5"),
            ("WEATHERDECK_PAGE_SECONDS", "0"),
            ("WEATHERDECK_CLICK_THROTTLE_MS", "-1"),
            ("WEATHERDECK_CURRENT_REFRESH_SECONDS", "0"),
            ("WEATHERDECK_FORECAST_REFRESH_SECONDS", "-1800"),
        ] {
            let mut vars = REQUIRED.to_vec();
            vars.push((key, value));
            assert_eq!(
                config(&vars),
                Err(ConfigError::Invalid {
                    key,
                    value: value.to_string(),
                })
            );
        }

        let mut vars = REQUIRED.to_vec();
        vars.push(("WEATHERDECK_CLICK_THROTTLE_MS", "0"));
        assert_eq!(config(&vars).unwrap().click_throttle, Duration::ZERO);
    }
}
