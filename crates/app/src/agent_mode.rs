//! Headless command loop: reads JSON commands from stdin and writes JSON
//! responses to stdout, one per line.
//!
//! ## Protocol
//!
//! Each line of stdin is a JSON object with a `"cmd"` discriminator.
//! Each line of stdout is a JSON response with `"protocol_version"` and
//! `"type"` fields. See [`civic_core::protocol`] for the full schema.
//! Logs go to stderr so they never interleave with the protocol.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bevy::log::LogPlugin;
use bevy::prelude::*;

use civic_core::assistant::AssistantConfig;
use civic_core::civic_rng::CivicRng;
use civic_core::config::ALL_WARDS;
use civic_core::environment::{EnvironmentalSource, SimulatedSource, UnavailableSource};
use civic_core::error::ConfigError;
use civic_core::params::CivicParams;
use civic_core::pipeline::{CivicAgents, CivicStore, SyncSchedule};
use civic_core::protocol::{
    encode_response, make_response, CivicCommand, CivicResponse, ResponsePayload, PROTOCOL_VERSION,
};
use civic_core::CivicPipelinePlugin;

use crate::CliOptions;

/// Cap on `step` so a typo cannot hang the session.
const MAX_STEP_UPDATES: u64 = 10_000;

/// How long a `sync` command waits for the task pool.
const SYNC_TIMEOUT: Duration = Duration::from_secs(30);

/// Pipeline app without logging; `run_agent_mode` adds the log plugin.
pub fn build_app(options: &CliOptions, params: CivicParams) -> App {
    let source: Arc<dyn EnvironmentalSource> = if options.offline {
        Arc::new(UnavailableSource::new("offline mode"))
    } else {
        Arc::new(SimulatedSource::from_seed_u64(options.seed))
    };

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(params);
    app.add_plugins(
        CivicPipelinePlugin::default()
            .with_source(source)
            .with_seed(options.seed),
    );
    app
}

pub fn run_agent_mode(options: CliOptions, params: CivicParams) {
    let mut app = build_app(&options, params);
    app.add_plugins(LogPlugin {
        filter: std::env::var("MPULSE_LOG").unwrap_or_else(|_| LogPlugin::default().filter),
        ..default()
    });
    // Initial update so resources settle before the first command.
    app.update();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    emit(&mut stdout, &make_response(ResponsePayload::Ready));
    info!(
        "mpulse v{} ready (seed {}, {}), waiting for commands on stdin",
        PROTOCOL_VERSION,
        options.seed,
        if options.offline { "offline" } else { "simulated source" }
    );
    info!("{}", describe_assistant(&AssistantConfig::from_env()));

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("stdin read error: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<CivicCommand>(&line) {
            Ok(cmd) => process_command(cmd, &mut app),
            Err(e) => make_response(ResponsePayload::Error {
                message: format!("Parse error: {e}"),
            }),
        };
        let is_goodbye = matches!(response.payload, ResponsePayload::Goodbye);
        emit(&mut stdout, &response);
        if is_goodbye {
            break;
        }
    }

    info!("mpulse shutting down");
}

/// Startup line for the chat assistant; a missing key only disables it.
fn describe_assistant(config: &Result<AssistantConfig, ConfigError>) -> String {
    match config {
        Ok(c) => format!("assistant: {} via {}", c.provider, c.model),
        Err(e) => format!("assistant disabled: {e}"),
    }
}

fn emit(out: &mut impl Write, response: &CivicResponse) {
    let written = writeln!(out, "{}", encode_response(response)).and_then(|_| out.flush());
    if let Err(e) = written {
        error!("stdout write error: {e}");
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Update until the sync schedule has nothing queued or running.
fn run_until_idle(app: &mut App) -> bool {
    let started = Instant::now();
    loop {
        app.update();
        if app.world().resource::<SyncSchedule>().is_idle() {
            return true;
        }
        if started.elapsed() >= SYNC_TIMEOUT {
            return false;
        }
        std::thread::yield_now();
    }
}

pub fn process_command(cmd: CivicCommand, app: &mut App) -> CivicResponse {
    let store = Arc::clone(&app.world().resource::<CivicStore>().0);

    match cmd {
        CivicCommand::Sync { region } => {
            let region = region.unwrap_or_else(|| ALL_WARDS.to_string());
            app.world_mut()
                .resource_mut::<SyncSchedule>()
                .request(region.clone());
            if !run_until_idle(app) {
                return make_response(ResponsePayload::Error {
                    message: format!("sync for {region} did not finish within {SYNC_TIMEOUT:?}"),
                });
            }
            let snapshot = store.civic_data(&region);
            make_response(ResponsePayload::Civic { region, snapshot })
        }

        CivicCommand::Civic { region } => {
            let snapshot = store.civic_data(&region);
            make_response(ResponsePayload::Civic { region, snapshot })
        }

        CivicCommand::Forecast { region } => {
            let forecast = app
                .world_mut()
                .resource_scope(|world, mut rng: Mut<CivicRng>| {
                    world
                        .resource::<CivicAgents>()
                        .forecaster
                        .generate_forecast(&region, &mut rng.0)
                });
            make_response(ResponsePayload::Forecast { region, forecast })
        }

        CivicCommand::Hospitals => make_response(ResponsePayload::Hospitals {
            hospitals: store.hospitals(),
        }),

        CivicCommand::UpdateHospital { hospital } => match store.update_hospital(hospital) {
            Ok(()) => make_response(ResponsePayload::Ok),
            Err(e) => make_response(ResponsePayload::Error {
                message: e.to_string(),
            }),
        },

        CivicCommand::Allocate => {
            let report = app.world().resource::<CivicAgents>().logistics.allocate_resources();
            make_response(ResponsePayload::Allocation { report })
        }

        CivicCommand::Route { start, end } => {
            let route = app
                .world()
                .resource::<CivicAgents>()
                .logistics
                .suggest_ambulance_route(&start, &end);
            make_response(ResponsePayload::Route { route })
        }

        CivicCommand::Alerts => {
            let alert = app
                .world_mut()
                .resource_scope(|world, mut rng: Mut<CivicRng>| {
                    world
                        .resource::<CivicAgents>()
                        .alerts
                        .generate_alerts(&mut rng.0)
                });
            make_response(ResponsePayload::Alert { alert })
        }

        CivicCommand::AlertLog => make_response(ResponsePayload::AlertLog {
            alerts: store.alerts(),
        }),

        CivicCommand::Broadcast { alert_id, channels } => {
            let receipt = app
                .world()
                .resource::<CivicAgents>()
                .alerts
                .broadcast_alert(&alert_id, &channels);
            make_response(ResponsePayload::Broadcast { receipt })
        }

        CivicCommand::Streams => make_response(ResponsePayload::Streams {
            streams: app.world().resource::<CivicAgents>().aggregator.stream_status(),
        }),

        CivicCommand::Heatmap => make_response(ResponsePayload::Heatmap {
            wards: app.world().resource::<CivicAgents>().forecaster.risk_heatmap(),
        }),

        CivicCommand::Step { updates } => {
            let n = updates.min(MAX_STEP_UPDATES);
            for _ in 0..n {
                app.update();
            }
            make_response(ResponsePayload::StepComplete { updates: n })
        }

        CivicCommand::Quit => make_response(ResponsePayload::Goodbye),
    }
}
