//! Bevy integration: runs the four agents on the `Update` schedule.
//!
//! Every `sync_interval` updates (or on request) one aggregator sync per
//! watched region is spawned on the `AsyncComputeTaskPool`. Finished syncs
//! are picked up with `poll_once`, each one immediately followed by a
//! forecast for the same region. Once any forecast refreshed, the alert
//! system and the logistics coordinator run over the new store state.
//!
//! The agents only talk through the shared store; the systems just decide
//! when each one runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task};
use rand_chacha::ChaCha8Rng;

use crate::aggregator::CivicDataAggregator;
use crate::alerts::PublicAlertSystem;
use crate::civic_rng::CivicRng;
use crate::clock::{Clock, SystemClock};
use crate::config::DEFAULT_SEED;
use crate::environment::{EnvironmentalSource, SimulatedSource};
use crate::forecaster::OutbreakForecaster;
use crate::logistics::{AllocationReport, LogisticsCoordinator};
use crate::params::CivicParams;
use crate::store::CivicDataStore;
use crate::types::{Alert, CivicSnapshot, Forecast, RegionKey};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// The process-wide store, shared with every agent.
#[derive(Resource, Clone)]
pub struct CivicStore(pub Arc<CivicDataStore>);

/// The four agents, all constructed over the same [`CivicStore`].
#[derive(Resource)]
pub struct CivicAgents {
    pub aggregator: Arc<CivicDataAggregator>,
    pub forecaster: OutbreakForecaster,
    pub logistics: LogisticsCoordinator,
    pub alerts: PublicAlertSystem,
}

impl CivicAgents {
    pub fn new(
        store: &Arc<CivicDataStore>,
        source: Arc<dyn EnvironmentalSource>,
        clock: Arc<dyn Clock>,
        params: &CivicParams,
    ) -> Self {
        Self {
            aggregator: Arc::new(
                CivicDataAggregator::new(Arc::clone(store), source)
                    .with_fetch_timeout(params.fetch_timeout()),
            ),
            forecaster: OutbreakForecaster::new(Arc::clone(store), Arc::clone(&clock)),
            logistics: LogisticsCoordinator::new(Arc::clone(store))
                .with_thresholds(params.logistics),
            alerts: PublicAlertSystem::new(Arc::clone(store), clock)
                .with_cooldown(params.alert_cooldown())
                .with_recipients(params.broadcast_recipients),
        }
    }
}

/// A sync hands its generator back so the follow-up forecast for the same
/// region draws from a sequence that does not depend on task timing.
type SyncOutcome = (CivicSnapshot, ChaCha8Rng);

/// Sync cadence plus the syncs currently running on the task pool.
#[derive(Resource, Default)]
pub struct SyncSchedule {
    /// Updates since the last scheduled round.
    pub ticks: u32,
    pending: Vec<RegionKey>,
    in_flight: BTreeMap<RegionKey, Task<SyncOutcome>>,
}

impl SyncSchedule {
    /// Queue a sync for `region` on the next update.
    pub fn request(&mut self, region: impl Into<RegionKey>) {
        let region = region.into();
        if !self.pending.contains(&region) {
            self.pending.push(region);
        }
    }

    pub fn is_in_flight(&self, region: &str) -> bool {
        self.in_flight.contains_key(region)
    }

    /// Nothing queued and nothing running.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_empty()
    }
}

/// Result of the most recent logistics run, if any.
#[derive(Resource, Default, Debug, Clone)]
pub struct LatestAllocation(pub Option<AllocationReport>);

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Event, Debug, Clone)]
pub struct CivicDataSynced {
    pub region: RegionKey,
    pub snapshot: CivicSnapshot,
}

#[derive(Event, Debug, Clone)]
pub struct ForecastRefreshed {
    pub region: RegionKey,
    pub forecast: Forecast,
}

#[derive(Event, Debug, Clone)]
pub struct AlertRaised(pub Alert);

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Queue one sync per watched region every `sync_interval` updates.
pub fn tick_sync_schedule(params: Res<CivicParams>, mut schedule: ResMut<SyncSchedule>) {
    schedule.ticks += 1;
    if schedule.ticks < params.sync_interval.max(1) {
        return;
    }
    schedule.ticks = 0;
    for region in &params.watched_regions {
        schedule.request(region.clone());
    }
}

/// Move queued requests onto the task pool. A region with a sync still in
/// flight keeps its request queued until that sync lands.
pub fn spawn_syncs(
    mut schedule: ResMut<SyncSchedule>,
    agents: Res<CivicAgents>,
    mut rng: ResMut<CivicRng>,
) {
    if schedule.pending.is_empty() {
        return;
    }
    let pool = AsyncComputeTaskPool::get();
    let requests = std::mem::take(&mut schedule.pending);
    for region in requests {
        if schedule.in_flight.contains_key(&region) {
            debug!("Civic pipeline: sync for {} still in flight, deferring", region);
            schedule.pending.push(region);
            continue;
        }
        let aggregator = Arc::clone(&agents.aggregator);
        let mut task_rng = rng.fork();
        let task_region = region.clone();
        let task = pool.spawn(async move {
            let snapshot = aggregator
                .sync_all_streams(&task_region, &mut task_rng)
                .await;
            (snapshot, task_rng)
        });
        schedule.in_flight.insert(region, task);
    }
}

/// Collect finished syncs and forecast each synced region.
pub fn poll_syncs(
    mut schedule: ResMut<SyncSchedule>,
    agents: Res<CivicAgents>,
    mut synced: EventWriter<CivicDataSynced>,
    mut refreshed: EventWriter<ForecastRefreshed>,
) {
    let mut finished = Vec::new();
    for (region, task) in schedule.in_flight.iter_mut() {
        if let Some(outcome) = block_on(futures_lite::future::poll_once(task)) {
            finished.push((region.clone(), outcome));
        }
    }

    for (region, (snapshot, mut rng)) in finished {
        schedule.in_flight.remove(&region);
        let forecast = agents.forecaster.generate_forecast(&region, &mut rng);
        synced.send(CivicDataSynced {
            region: region.clone(),
            snapshot,
        });
        refreshed.send(ForecastRefreshed { region, forecast });
    }
}

/// After any forecast refresh: raise alerts and rerun logistics.
pub fn react_to_forecasts(
    mut refreshed: EventReader<ForecastRefreshed>,
    agents: Res<CivicAgents>,
    mut rng: ResMut<CivicRng>,
    mut allocation: ResMut<LatestAllocation>,
    mut raised: EventWriter<AlertRaised>,
) {
    if refreshed.is_empty() {
        return;
    }
    refreshed.clear();

    if let Some(alert) = agents.alerts.generate_alerts(&mut rng.0) {
        raised.send(AlertRaised(alert));
    }
    allocation.0 = Some(agents.logistics.allocate_resources());
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Inserts the store, agents and pipeline resources and wires the systems.
///
/// `CivicParams` and `CivicRng` already present in the world are kept, so
/// tests and the binary can configure them before adding the plugin.
pub struct CivicPipelinePlugin {
    pub source: Arc<dyn EnvironmentalSource>,
    pub clock: Arc<dyn Clock>,
    pub seed: u64,
}

impl Default for CivicPipelinePlugin {
    fn default() -> Self {
        Self {
            source: Arc::new(SimulatedSource::from_seed_u64(DEFAULT_SEED)),
            clock: Arc::new(SystemClock),
            seed: DEFAULT_SEED,
        }
    }
}

impl CivicPipelinePlugin {
    pub fn with_source(mut self, source: Arc<dyn EnvironmentalSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Plugin for CivicPipelinePlugin {
    fn build(&self, app: &mut App) {
        let params = app
            .world()
            .get_resource::<CivicParams>()
            .cloned()
            .unwrap_or_default();
        let mut rng = app
            .world_mut()
            .remove_resource::<CivicRng>()
            .unwrap_or_else(|| CivicRng::from_seed_u64(self.seed));

        let store = Arc::new(CivicDataStore::seeded(&mut rng.0));
        let agents = CivicAgents::new(
            &store,
            Arc::clone(&self.source),
            Arc::clone(&self.clock),
            &params,
        );
        info!(
            "Civic pipeline: watching {} region(s), sync every {} updates",
            params.watched_regions.len(),
            params.sync_interval
        );

        app.insert_resource(params)
            .insert_resource(rng)
            .insert_resource(CivicStore(store))
            .insert_resource(agents)
            .init_resource::<SyncSchedule>()
            .init_resource::<LatestAllocation>()
            .add_event::<CivicDataSynced>()
            .add_event::<ForecastRefreshed>()
            .add_event::<AlertRaised>()
            .add_systems(
                Update,
                (
                    tick_sync_schedule,
                    spawn_syncs,
                    poll_syncs,
                    react_to_forecasts,
                )
                    .chain(),
            );
    }
}
