//! Open-Meteo adapter: request URLs and response decoding for the public
//! forecast and air-quality endpoints.
//!
//! The HTTP client itself is injected as an `HttpTransport`, which receives
//! the per-request timeout and reports expiry as `UpstreamError::Timeout`.
//! The aggregator applies its own deadline on top, so a transport that
//! ignores the timeout still cannot stall a sync.

use std::time::Duration;

use serde::Deserialize;

use super::{AirQualityReading, EnvironmentalSource, FetchFuture, WeatherReading};
use crate::config::DEFAULT_FETCH_TIMEOUT_MS;
use crate::error::UpstreamError;
use crate::types::Coordinates;

pub const WEATHER_API: &str = "https://api.open-meteo.com/v1/forecast";
pub const AIR_QUALITY_API: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

const WEATHER_FIELDS: &str = "temperature_2m,relative_humidity_2m,rain,wind_speed_10m";
const AIR_QUALITY_FIELDS: &str = "us_aqi,pm2_5,pm10";

pub trait HttpTransport: Send + Sync {
    /// GET `url` and return the body. Non-2xx is `Status`, expiry of
    /// `timeout` is `Timeout`.
    fn get<'a>(&'a self, url: &'a str, timeout: Duration) -> FetchFuture<'a, String>;
}

pub fn weather_url(at: Coordinates) -> String {
    format!(
        "{WEATHER_API}?latitude={}&longitude={}&current={WEATHER_FIELDS}",
        at.lat, at.lon
    )
}

pub fn air_quality_url(at: Coordinates) -> String {
    format!(
        "{AIR_QUALITY_API}?latitude={}&longitude={}&current={AIR_QUALITY_FIELDS}",
        at.lat, at.lon
    )
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Envelope<T> {
    current: T,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    rain: f64,
    wind_speed_10m: f64,
}

#[derive(Deserialize)]
struct CurrentAirQuality {
    us_aqi: f64,
    pm2_5: f64,
    pm10: f64,
}

pub fn decode_weather(body: &str) -> Result<WeatherReading, UpstreamError> {
    let envelope: Envelope<CurrentWeather> = serde_json::from_str(body)?;
    let c = envelope.current;
    Ok(WeatherReading {
        temperature_c: c.temperature_2m,
        rainfall_mm: c.rain,
        humidity_pct: c.relative_humidity_2m,
        wind_speed_kmh: c.wind_speed_10m,
    })
}

pub fn decode_air_quality(body: &str) -> Result<AirQualityReading, UpstreamError> {
    let envelope: Envelope<CurrentAirQuality> = serde_json::from_str(body)?;
    let c = envelope.current;
    Ok(AirQualityReading {
        aqi: c.us_aqi,
        pm2_5: c.pm2_5,
        pm10: c.pm10,
    })
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

pub struct OpenMeteoSource<T> {
    transport: T,
    timeout: Duration,
}

impl<T: HttpTransport> OpenMeteoSource<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl<T: HttpTransport> EnvironmentalSource for OpenMeteoSource<T> {
    fn fetch_weather(&self, at: Coordinates) -> FetchFuture<'_, WeatherReading> {
        let url = weather_url(at);
        Box::pin(async move {
            let body = self.transport.get(&url, self.timeout).await?;
            decode_weather(&body)
        })
    }

    fn fetch_air_quality(&self, at: Coordinates) -> FetchFuture<'_, AirQualityReading> {
        let url = air_quality_url(at);
        Box::pin(async move {
            let body = self.transport.get(&url, self.timeout).await?;
            decode_air_quality(&body)
        })
    }
}
