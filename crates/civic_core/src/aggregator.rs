//! Agent 1: civic data aggregator.
//!
//! Ingests weather and air quality for a region, scores the risk, merges the
//! result over a fresh baseline snapshot and writes it to the store.
//! Environmental outages degrade to fallback readings; a sync always yields
//! a snapshot. Each fetch is bounded by the fetch timeout, so a provider that
//! never answers counts as a failed fetch.

use std::sync::Arc;
use std::time::Duration;

use async_io::Timer;
use bevy::prelude::*;
use futures_lite::future;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ALL_WARDS, DEFAULT_FETCH_TIMEOUT_MS};
use crate::environment::{AirQualityReading, EnvironmentalSource, FetchFuture, WeatherReading};
use crate::error::UpstreamError;
use crate::risk::assess_risk;
use crate::roster::baseline_snapshot;
use crate::store::CivicDataStore;
use crate::types::CivicSnapshot;
use crate::wards::reference_coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    Active,
    Syncing,
    Error,
}

/// Health line for one upstream feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStatus {
    pub source_id: &'static str,
    pub name: &'static str,
    pub status: StreamState,
    pub record_count: u64,
}

const STREAMS: [(&str, &str, u64); 5] = [
    ("bmc", "Municipal Health Records", 12_500),
    ("imd", "Weather Patterns", 450),
    ("best", "Public Transport Density", 8_900),
    ("police", "Crowd & Traffic Data", 15_000),
    ("safar", "Air Quality Index", 120),
];

/// Resolve `fetch`, or fail with `Timeout` once `limit` has passed.
async fn within<T>(fetch: FetchFuture<'_, T>, limit: Duration) -> Result<T, UpstreamError> {
    future::or(fetch, async move {
        Timer::after(limit).await;
        Err(UpstreamError::Timeout {
            after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        })
    })
    .await
}

pub struct CivicDataAggregator {
    store: Arc<CivicDataStore>,
    source: Arc<dyn EnvironmentalSource>,
    fetch_timeout: Duration,
}

impl CivicDataAggregator {
    pub fn new(store: Arc<CivicDataStore>, source: Arc<dyn EnvironmentalSource>) -> Self {
        Self {
            store,
            source,
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Fetch, score, merge and store the snapshot for `region`.
    pub async fn sync_all_streams<R: Rng + ?Sized>(
        &self,
        region: &str,
        rng: &mut R,
    ) -> CivicSnapshot {
        info!("CivicDataAggregator: syncing streams for {}", region);
        let at = reference_coordinates(region);

        let (weather, air) = future::zip(
            within(self.source.fetch_weather(at), self.fetch_timeout),
            within(self.source.fetch_air_quality(at), self.fetch_timeout),
        )
        .await;

        let weather = weather.unwrap_or_else(|e| {
            warn!(
                "CivicDataAggregator: weather fetch for {} failed, using fallback: {}",
                region, e
            );
            WeatherReading::FALLBACK
        });
        let air = air.unwrap_or_else(|e| {
            warn!(
                "CivicDataAggregator: air quality fetch for {} failed, using fallback: {}",
                region, e
            );
            AirQualityReading::FALLBACK
        });

        let assessment = assess_risk(&weather, &air, rng);
        let enriched = assessment.merge_over(baseline_snapshot(rng));

        self.store.update_civic_data(region, enriched.clone());
        info!(
            "CivicDataAggregator: {} enriched, score {} risk {}",
            region,
            assessment.score,
            enriched.risk_level.label()
        );
        enriched
    }

    /// City-wide sync (`ALL_WARDS`).
    pub async fn sync_city_wide<R: Rng + ?Sized>(&self, rng: &mut R) -> CivicSnapshot {
        self.sync_all_streams(ALL_WARDS, rng).await
    }

    /// Simulated feed health report. Independent of actual syncs.
    pub fn stream_status(&self) -> Vec<StreamStatus> {
        STREAMS
            .iter()
            .map(|&(source_id, name, record_count)| StreamStatus {
                source_id,
                name,
                status: StreamState::Active,
                record_count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{HttpTransport, OpenMeteoSource, StaticSource, UnavailableSource};
    use crate::risk::{CONDITION_NONE, CONDITION_RESPIRATORY, CONDITION_VECTOR_BORNE};
    use crate::types::{Coordinates, RiskLevel};
    use futures_lite::future::block_on;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::Instant;

    /// Transport whose requests never complete.
    struct SilentTransport;

    impl HttpTransport for SilentTransport {
        fn get<'a>(&'a self, _url: &'a str, _timeout: Duration) -> FetchFuture<'a, String> {
            Box::pin(future::pending())
        }
    }

    /// One fetch answers, the other fails (`None`).
    struct HalfSource {
        weather: Option<WeatherReading>,
        air: Option<AirQualityReading>,
    }

    impl EnvironmentalSource for HalfSource {
        fn fetch_weather(&self, _at: Coordinates) -> FetchFuture<'_, WeatherReading> {
            Box::pin(future::ready(self.weather.ok_or(UpstreamError::Status(502))))
        }

        fn fetch_air_quality(&self, _at: Coordinates) -> FetchFuture<'_, AirQualityReading> {
            Box::pin(future::ready(self.air.ok_or(UpstreamError::Status(502))))
        }
    }

    fn aggregator(source: Arc<dyn EnvironmentalSource>) -> (Arc<CivicDataStore>, CivicDataAggregator) {
        let store = Arc::new(CivicDataStore::default());
        let agg = CivicDataAggregator::new(Arc::clone(&store), source);
        (store, agg)
    }

    fn static_source(rainfall: f64, humidity: f64, aqi: f64) -> Arc<dyn EnvironmentalSource> {
        Arc::new(StaticSource::new(
            WeatherReading {
                temperature_c: 29.0,
                rainfall_mm: rainfall,
                humidity_pct: humidity,
                wind_speed_kmh: 8.0,
            },
            AirQualityReading {
                aqi,
                pm2_5: 30.0,
                pm10: 60.0,
            },
        ))
    }

    #[test]
    fn test_sync_writes_snapshot_for_region() {
        let (store, agg) = aggregator(static_source(120.0, 85.0, 90.0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let snapshot = block_on(agg.sync_all_streams("G North", &mut rng));
        assert_eq!(store.civic_data("G North"), Some(snapshot.clone()));
        assert!(store.has_civic_data("G North"));
        assert_eq!(snapshot.risk_level, RiskLevel::Moderate);
        assert_eq!(snapshot.predicted_condition, CONDITION_VECTOR_BORNE);
        assert_eq!(snapshot.rainfall_mm, 120.0);
        assert_eq!(snapshot.aqi, 90.0);
        assert!((85..95).contains(&snapshot.confidence));
    }

    #[test]
    fn test_sync_outage_uses_fallback_readings() {
        let (store, agg) = aggregator(Arc::new(UnavailableSource::new("down")));
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let snapshot = block_on(agg.sync_city_wide(&mut rng));
        // rainfall 0, humidity 70, AQI 150: 10 points, AQI not above 150
        assert_eq!(snapshot.rainfall_mm, 0.0);
        assert_eq!(snapshot.aqi, 150.0);
        assert_eq!(snapshot.risk_level, RiskLevel::Low);
        assert_eq!(snapshot.predicted_condition, CONDITION_NONE);
        assert!(store.has_civic_data(ALL_WARDS));
    }

    #[test]
    fn test_sync_is_reproducible_for_same_seed() {
        let (_, agg) = aggregator(static_source(30.0, 90.0, 180.0));
        let a = block_on(agg.sync_all_streams("A Ward", &mut ChaCha8Rng::seed_from_u64(4)));
        let b = block_on(agg.sync_all_streams("A Ward", &mut ChaCha8Rng::seed_from_u64(4)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sync_overwrites_previous_snapshot() {
        let store = Arc::new(CivicDataStore::default());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let wet = CivicDataAggregator::new(Arc::clone(&store), static_source(60.0, 90.0, 250.0));
        let dry = CivicDataAggregator::new(Arc::clone(&store), static_source(0.0, 40.0, 160.0));
        assert_eq!(
            block_on(wet.sync_all_streams("H West", &mut rng)).risk_level,
            RiskLevel::High
        );
        let latest = block_on(dry.sync_all_streams("H West", &mut rng));
        assert_eq!(store.civic_data("H West"), Some(latest.clone()));
        assert_eq!(latest.predicted_condition, CONDITION_RESPIRATORY);
        assert_eq!(latest.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_silent_provider_times_out_to_fallback() {
        let store = Arc::new(CivicDataStore::default());
        let agg = CivicDataAggregator::new(
            Arc::clone(&store),
            Arc::new(OpenMeteoSource::new(SilentTransport)),
        )
        .with_fetch_timeout(Duration::from_millis(50));
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        let started = Instant::now();
        let snapshot = block_on(agg.sync_all_streams("G North", &mut rng));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(snapshot.rainfall_mm, 0.0);
        assert_eq!(snapshot.aqi, 150.0);
        assert_eq!(snapshot.risk_level, RiskLevel::Low);
        assert_eq!(store.civic_data("G North"), Some(snapshot));
    }

    #[test]
    fn test_failed_air_quality_falls_back_alone() {
        let (_, agg) = aggregator(Arc::new(HalfSource {
            weather: Some(WeatherReading {
                rainfall_mm: 60.0,
                humidity_pct: 90.0,
                ..WeatherReading::FALLBACK
            }),
            air: None,
        }));
        let snapshot = block_on(agg.sync_all_streams("K West", &mut ChaCha8Rng::seed_from_u64(8)));
        // 40 (rain > 50) + 10 (fallback AQI 150) + 20 (humidity > 80) = 70
        assert_eq!(snapshot.rainfall_mm, 60.0);
        assert_eq!(snapshot.aqi, 150.0);
        assert_eq!(snapshot.risk_level, RiskLevel::High);
        assert_eq!(snapshot.predicted_condition, CONDITION_VECTOR_BORNE);
    }

    #[test]
    fn test_failed_weather_falls_back_alone() {
        let (_, agg) = aggregator(Arc::new(HalfSource {
            weather: None,
            air: Some(AirQualityReading {
                aqi: 320.0,
                ..AirQualityReading::FALLBACK
            }),
        }));
        let snapshot = block_on(agg.sync_all_streams("K West", &mut ChaCha8Rng::seed_from_u64(9)));
        // fallback weather scores nothing; AQI > 300 is 50
        assert_eq!(snapshot.rainfall_mm, 0.0);
        assert_eq!(snapshot.aqi, 320.0);
        assert_eq!(snapshot.risk_level, RiskLevel::Moderate);
        assert_eq!(snapshot.predicted_condition, CONDITION_RESPIRATORY);
    }

    #[test]
    fn test_stream_status_is_static() {
        let (_, agg) = aggregator(Arc::new(UnavailableSource::default()));
        let status = agg.stream_status();
        assert_eq!(status.len(), 5);
        assert_eq!(status[0].source_id, "bmc");
        assert!(status.iter().all(|s| s.status == StreamState::Active));
        assert_eq!(agg.stream_status(), status);
    }
}
