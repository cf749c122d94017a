use std::fmt;
use std::time::Duration;

use thiserror::Error;
use time::{OffsetDateTime, UtcOffset};

/// Number of forecast entries requested from the provider. OpenWeatherMap forecasts
/// are spaced three hours apart, so this covers the next day.
pub const FORECAST_POINTS: usize = 8;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider responded with HTTP {0}")]
    HttpStatus(u16),

    #[error("malformed response: {0}")]
    Parse(#[from] json::Error),

    #[error("invalid response: {0}")]
    Validation(&'static str),
}

/// Weather at a single point in time, as shown on the current and forecast pages.
#[derive(Clone, Debug, PartialEq)]
pub struct Conditions {
    pub time: OffsetDateTime,
    pub icon: String,
    pub temperature: Temperature,
    pub description: String,
}

/// ```json
/// {
///     "dt": 1595243443,
///     "main": { "temp": 274.75, "feels_like": 270.4, "humidity": 96 },
///     "weather": [{
///         "id": 701,
///         "main": "Mist",
///         "description": "mist",
///         "icon": "50n"
///     }]
/// }
/// ```
///
/// The current conditions endpoint and every entry of the forecast's `list` share this
/// shape.
impl TryFrom<json::JsonValue> for Conditions {
    type Error = FetchError;

    fn try_from(mut json: json::JsonValue) -> Result<Self, Self::Error> {
        let mut weather = json
            .remove("weather")
            .members_mut()
            .next()
            .map(json::JsonValue::take)
            .ok_or(FetchError::Validation("Empty \"weather\" value."))?;

        Ok(Self {
            time: OffsetDateTime::from_unix_timestamp(
                json.remove("dt")
                    .as_i64()
                    .ok_or(FetchError::Validation("Missing or invalid \"dt\" value."))?,
            )
            .map_err(|_| FetchError::Validation("Out of range \"dt\" value."))?,
            icon: weather
                .remove("icon")
                .take_string()
                .ok_or(FetchError::Validation("Missing or invalid \"weather.icon\" value."))?,
            temperature: json
                .remove("main")
                .remove("temp")
                .as_f32()
                .ok_or(FetchError::Validation("Missing or invalid \"main.temp\" value."))?
                .into(),
            description: weather
                .remove("description")
                .take_string()
                .ok_or(FetchError::Validation(
                    "Missing or invalid \"weather.description\" value.",
                ))?,
        })
    }
}

impl Conditions {
    fn in_offset(mut self, offset: UtcOffset) -> Self {
        self.time = self.time.to_offset(offset);
        self
    }
}

/// A chronologically sorted, non-empty list of predictions.
#[derive(Clone, Debug, PartialEq)]
pub struct Forecast(pub Vec<Conditions>);

impl TryFrom<json::JsonValue> for Forecast {
    type Error = FetchError;

    fn try_from(mut json: json::JsonValue) -> Result<Self, Self::Error> {
        let mut list = json
            .remove("list")
            .members_mut()
            .map(|e| Conditions::try_from(e.take()))
            .collect::<Result<Vec<_>, _>>()?;

        if list.is_empty() {
            return Err(FetchError::Validation("Empty \"list\" value."));
        }

        list.sort_by_key(|e| e.time);
        Ok(Self(list))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Temperature(f32);

impl Temperature {
    pub const fn kelvin(kelvin: f32) -> Self {
        Self(kelvin)
    }

    /// Whole degrees Celsius.
    pub fn celsius(&self) -> i32 {
        (self.0 - 273.15).round() as i32
    }
}

impl From<f32> for Temperature {
    fn from(input: f32) -> Self {
        Self::kelvin(input)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.celsius())
    }
}

/// Blocking OpenWeatherMap client. Calls are made from background task threads only.
pub struct OpenWeather {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    latitude: f64,
    longitude: f64,
    offset: UtcOffset,
}

impl OpenWeather {
    pub fn new(
        base_url: &str,
        api_key: &str,
        (latitude, longitude): (f64, f64),
        offset: UtcOffset,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            latitude,
            longitude,
            offset,
        })
    }

    pub fn current(&self) -> Result<Conditions, FetchError> {
        let conditions = Conditions::try_from(self.query("weather", &[])?)?;
        Ok(conditions.in_offset(self.offset))
    }

    pub fn forecast(&self) -> Result<Forecast, FetchError> {
        let Forecast(list) =
            Forecast::try_from(self.query("forecast", &[("cnt", FORECAST_POINTS.to_string())])?)?;
        Ok(Forecast(
            list.into_iter()
                .map(|e| e.in_offset(self.offset))
                .collect(),
        ))
    }

    fn query(
        &self,
        endpoint: &str,
        extra: &[(&str, String)],
    ) -> Result<json::JsonValue, FetchError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(&[
                ("lat", self.latitude.to_string()),
                ("lon", self.longitude.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .query(extra)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        Ok(json::parse(&response.text()?)?)
    }
}
