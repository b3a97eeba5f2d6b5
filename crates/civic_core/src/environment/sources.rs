use std::sync::{Mutex, PoisonError};

use futures_lite::future;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{AirQualityReading, EnvironmentalSource, FetchFuture, WeatherReading};
use crate::error::UpstreamError;
use crate::types::Coordinates;

// ---------------------------------------------------------------------------
// StaticSource
// ---------------------------------------------------------------------------

/// Returns the same readings for every coordinate.
#[derive(Debug, Clone, Copy)]
pub struct StaticSource {
    pub weather: WeatherReading,
    pub air: AirQualityReading,
}

impl StaticSource {
    pub fn new(weather: WeatherReading, air: AirQualityReading) -> Self {
        Self { weather, air }
    }
}

impl EnvironmentalSource for StaticSource {
    fn fetch_weather(&self, _at: Coordinates) -> FetchFuture<'_, WeatherReading> {
        Box::pin(future::ready(Ok(self.weather)))
    }

    fn fetch_air_quality(&self, _at: Coordinates) -> FetchFuture<'_, AirQualityReading> {
        Box::pin(future::ready(Ok(self.air)))
    }
}

// ---------------------------------------------------------------------------
// UnavailableSource
// ---------------------------------------------------------------------------

/// Every fetch fails with a transport error. Offline mode: the aggregator
/// runs entirely on fallback readings.
#[derive(Debug, Clone, Default)]
pub struct UnavailableSource {
    pub reason: String,
}

impl UnavailableSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> UpstreamError {
        UpstreamError::Transport(self.reason.clone())
    }
}

impl EnvironmentalSource for UnavailableSource {
    fn fetch_weather(&self, _at: Coordinates) -> FetchFuture<'_, WeatherReading> {
        Box::pin(future::ready(Err(self.error())))
    }

    fn fetch_air_quality(&self, _at: Coordinates) -> FetchFuture<'_, AirQualityReading> {
        Box::pin(future::ready(Err(self.error())))
    }
}

// ---------------------------------------------------------------------------
// SimulatedSource
// ---------------------------------------------------------------------------

/// Plausible monsoon-season readings drawn from a seeded generator.
/// Reproducible for a given seed and call order.
#[derive(Debug)]
pub struct SimulatedSource {
    rng: Mutex<ChaCha8Rng>,
}

impl SimulatedSource {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

impl EnvironmentalSource for SimulatedSource {
    fn fetch_weather(&self, _at: Coordinates) -> FetchFuture<'_, WeatherReading> {
        let reading = self.with_rng(|rng| WeatherReading {
            temperature_c: rng.gen_range(24.0..36.0),
            rainfall_mm: rng.gen_range(0.0..150.0),
            humidity_pct: rng.gen_range(55.0..98.0),
            wind_speed_kmh: rng.gen_range(2.0..35.0),
        });
        Box::pin(future::ready(Ok(reading)))
    }

    fn fetch_air_quality(&self, _at: Coordinates) -> FetchFuture<'_, AirQualityReading> {
        let reading = self.with_rng(|rng| {
            let aqi: f64 = rng.gen_range(40.0..350.0);
            AirQualityReading {
                aqi,
                pm2_5: aqi * rng.gen_range(0.3..0.5),
                pm10: aqi * rng.gen_range(0.6..0.9),
            }
        });
        Box::pin(future::ready(Ok(reading)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_COORDINATES;
    use futures_lite::future::block_on;

    #[test]
    fn test_static_source_returns_configured_readings() {
        let source = StaticSource::new(WeatherReading::FALLBACK, AirQualityReading::FALLBACK);
        let w = block_on(source.fetch_weather(DEFAULT_COORDINATES)).unwrap();
        let a = block_on(source.fetch_air_quality(DEFAULT_COORDINATES)).unwrap();
        assert_eq!(w, WeatherReading::FALLBACK);
        assert_eq!(a, AirQualityReading::FALLBACK);
    }

    #[test]
    fn test_unavailable_source_always_fails() {
        let source = UnavailableSource::new("offline");
        let err = block_on(source.fetch_weather(DEFAULT_COORDINATES)).unwrap_err();
        assert_eq!(err, UpstreamError::Transport("offline".to_string()));
        assert!(block_on(source.fetch_air_quality(DEFAULT_COORDINATES)).is_err());
    }

    #[test]
    fn test_simulated_source_is_reproducible() {
        let a = SimulatedSource::from_seed_u64(5);
        let b = SimulatedSource::from_seed_u64(5);
        let wa = block_on(a.fetch_weather(DEFAULT_COORDINATES)).unwrap();
        let wb = block_on(b.fetch_weather(DEFAULT_COORDINATES)).unwrap();
        assert_eq!(wa, wb);
        assert!((0.0..150.0).contains(&wa.rainfall_mm));
    }
}
