//! # TestDashboard: headless integration test harness
//!
//! Wraps `bevy::app::App` + `MinimalPlugins` + `CivicPipelinePlugin` with a
//! manual clock and a caller-chosen environmental source, so tests can drive
//! the pipeline update by update and assert on the shared store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bevy::app::App;
use bevy::prelude::*;
use chrono::{TimeZone, Utc};

use crate::civic_rng::CivicRng;
use crate::clock::{Clock, ManualClock};
use crate::environment::{AirQualityReading, EnvironmentalSource, StaticSource, WeatherReading};
use crate::logistics::AllocationReport;
use crate::params::CivicParams;
use crate::pipeline::{
    AlertRaised, CivicDataSynced, CivicPipelinePlugin, CivicStore, LatestAllocation, SyncSchedule,
};
use crate::store::CivicDataStore;
use crate::types::{Alert, RegionKey};

/// Upper bound on how long `run_until_idle` waits for task-pool syncs.
const IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Every pipeline event seen since the harness was built.
#[derive(Resource, Default)]
pub struct EventTally {
    pub synced: Vec<RegionKey>,
    pub raised: Vec<Alert>,
}

fn tally_events(
    mut synced: EventReader<CivicDataSynced>,
    mut raised: EventReader<AlertRaised>,
    mut tally: ResMut<EventTally>,
) {
    tally
        .synced
        .extend(synced.read().map(|e| e.region.clone()));
    tally.raised.extend(raised.read().map(|e| e.0.clone()));
}

/// A headless pipeline for integration tests.
pub struct TestDashboard {
    app: App,
    clock: Arc<ManualClock>,
}

impl TestDashboard {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Pipeline over `source` with scheduled syncs effectively disabled, so
    /// only explicit `request_sync` calls run the aggregator.
    pub fn new(source: Arc<dyn EnvironmentalSource>) -> Self {
        let params = CivicParams {
            sync_interval: u32::MAX,
            ..Default::default()
        };
        Self::with_params(source, params, 42)
    }

    pub fn with_params(source: Arc<dyn EnvironmentalSource>, params: CivicParams, seed: u64) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 7, 15, 9, 0, 0).unwrap(),
        ));
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(params);
        app.insert_resource(CivicRng::from_seed_u64(seed));
        app.add_plugins(
            CivicPipelinePlugin::default()
                .with_source(source)
                .with_clock(clock.clone() as Arc<dyn Clock>)
                .with_seed(seed),
        );
        app.init_resource::<EventTally>();
        app.add_systems(Last, tally_events);
        app.update();
        Self { app, clock }
    }

    /// Pipeline whose source always reports the given rainfall, humidity
    /// and AQI.
    pub fn with_readings(rainfall_mm: f64, humidity_pct: f64, aqi: f64) -> Self {
        Self::new(Arc::new(StaticSource::new(
            WeatherReading {
                rainfall_mm,
                humidity_pct,
                ..WeatherReading::FALLBACK
            },
            AirQualityReading {
                aqi,
                ..AirQualityReading::FALLBACK
            },
        )))
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    pub fn update(&mut self) {
        self.app.update();
    }

    pub fn tick(&mut self, updates: usize) {
        for _ in 0..updates {
            self.app.update();
        }
    }

    pub fn request_sync(&mut self, region: &str) {
        self.app
            .world_mut()
            .resource_mut::<SyncSchedule>()
            .request(region);
    }

    /// Update until no sync is queued or running.
    pub fn run_until_idle(&mut self) {
        let started = Instant::now();
        loop {
            self.app.update();
            if self.app.world().resource::<SyncSchedule>().is_idle() {
                return;
            }
            assert!(
                started.elapsed() < IDLE_TIMEOUT,
                "pipeline did not go idle within {IDLE_TIMEOUT:?}"
            );
            std::thread::yield_now();
        }
    }

    /// `request_sync` + `run_until_idle`.
    pub fn sync(&mut self, region: &str) {
        self.request_sync(region);
        self.run_until_idle();
    }

    pub fn advance_clock(&self, by: chrono::Duration) {
        self.clock.advance(by);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn store(&self) -> Arc<CivicDataStore> {
        Arc::clone(&self.app.world().resource::<CivicStore>().0)
    }

    pub fn latest_allocation(&self) -> Option<AllocationReport> {
        self.app.world().resource::<LatestAllocation>().0.clone()
    }

    pub fn synced_regions(&self) -> Vec<RegionKey> {
        self.app.world().resource::<EventTally>().synced.clone()
    }

    pub fn raised_alerts(&self) -> Vec<Alert> {
        self.app.world().resource::<EventTally>().raised.clone()
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}
