//! Environmental data sources: current weather and air quality for a
//! coordinate.
//!
//! The aggregator talks to an `EnvironmentalSource` trait object. Fetches are
//! async and may fail; failures are mapped to the fallback readings by the
//! caller, never propagated.

pub mod open_meteo;
pub mod sources;

pub use open_meteo::{HttpTransport, OpenMeteoSource};
pub use sources::{SimulatedSource, StaticSource, UnavailableSource};

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;
use crate::types::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    pub temperature_c: f64,
    pub rainfall_mm: f64,
    pub humidity_pct: f64,
    pub wind_speed_kmh: f64,
}

impl WeatherReading {
    /// Conservative reading used when the weather provider is unavailable.
    pub const FALLBACK: WeatherReading = WeatherReading {
        temperature_c: 30.0,
        rainfall_mm: 0.0,
        humidity_pct: 70.0,
        wind_speed_kmh: 10.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    pub aqi: f64,
    pub pm2_5: f64,
    pub pm10: f64,
}

impl AirQualityReading {
    /// Conservative reading used when the air-quality provider is unavailable.
    pub const FALLBACK: AirQualityReading = AirQualityReading {
        aqi: 150.0,
        pm2_5: 50.0,
        pm10: 100.0,
    };
}

/// Boxed future returned by source fetches. Boxed so the trait stays
/// object-safe and the aggregator can hold `Arc<dyn EnvironmentalSource>`.
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, UpstreamError>> + Send + 'a>>;

pub trait EnvironmentalSource: Send + Sync {
    fn fetch_weather(&self, at: Coordinates) -> FetchFuture<'_, WeatherReading>;

    fn fetch_air_quality(&self, at: Coordinates) -> FetchFuture<'_, AirQualityReading>;
}
