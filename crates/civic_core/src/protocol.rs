//! Command protocol types for the headless `mpulse` driver.
//!
//! Defines the JSON command/response envelope that external programs
//! (dashboards, scripts, test harnesses) use to drive the civic pipeline
//! over newline-delimited JSON on stdin/stdout.
//!
//! The types live here so they can be unit-tested without the binary. The
//! I/O loop lives in `crates/app/src/agent_mode.rs`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregator::StreamStatus;
use crate::alerts::BroadcastReceipt;
use crate::logistics::{AllocationReport, AmbulanceRoute};
use crate::types::{Alert, CivicSnapshot, Forecast, Hospital, RegionKey};

// ---------------------------------------------------------------------------
// Commands (stdin → pipeline)
// ---------------------------------------------------------------------------

/// One line of stdin. The `cmd` field is the discriminator.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd")]
pub enum CivicCommand {
    /// Run the aggregator (and the follow-up forecast) for a region,
    /// default "All Wards".
    #[serde(rename = "sync")]
    Sync {
        #[serde(default)]
        region: Option<RegionKey>,
    },

    /// Read the stored snapshot, with the default-region fallback.
    #[serde(rename = "civic")]
    Civic { region: RegionKey },

    /// Run the forecaster for a region.
    #[serde(rename = "forecast")]
    Forecast { region: RegionKey },

    #[serde(rename = "hospitals")]
    Hospitals,

    /// Replace a roster entry by id.
    #[serde(rename = "update_hospital")]
    UpdateHospital { hospital: Hospital },

    #[serde(rename = "allocate")]
    Allocate,

    #[serde(rename = "route")]
    Route { start: String, end: String },

    /// Run the alert system once.
    #[serde(rename = "alerts")]
    Alerts,

    #[serde(rename = "alert_log")]
    AlertLog,

    #[serde(rename = "broadcast")]
    Broadcast { alert_id: Uuid, channels: Vec<String> },

    #[serde(rename = "streams")]
    Streams,

    #[serde(rename = "heatmap")]
    Heatmap,

    /// Advance the pipeline by `updates` app updates.
    #[serde(rename = "step")]
    Step { updates: u64 },

    #[serde(rename = "quit")]
    Quit,
}

// ---------------------------------------------------------------------------
// Responses (pipeline → stdout)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CivicResponse {
    pub protocol_version: u32,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ResponsePayload {
    #[serde(rename = "ready")]
    Ready,

    /// `snapshot` is absent only if even "All Wards" has no data.
    #[serde(rename = "civic")]
    Civic {
        region: RegionKey,
        snapshot: Option<CivicSnapshot>,
    },

    #[serde(rename = "forecast")]
    Forecast { region: RegionKey, forecast: Forecast },

    #[serde(rename = "hospitals")]
    Hospitals { hospitals: Vec<Hospital> },

    #[serde(rename = "allocation")]
    Allocation { report: AllocationReport },

    #[serde(rename = "route")]
    Route { route: AmbulanceRoute },

    /// `alert` is null when nothing was raised (no risk, or deduplicated).
    #[serde(rename = "alert")]
    Alert { alert: Option<Alert> },

    #[serde(rename = "alert_log")]
    AlertLog { alerts: Vec<Alert> },

    #[serde(rename = "broadcast")]
    Broadcast { receipt: BroadcastReceipt },

    #[serde(rename = "streams")]
    Streams { streams: Vec<StreamStatus> },

    #[serde(rename = "heatmap")]
    Heatmap { wards: BTreeMap<String, f32> },

    #[serde(rename = "step_complete")]
    StepComplete { updates: u64 },

    #[serde(rename = "ok")]
    Ok,

    #[serde(rename = "error")]
    Error { message: String },

    #[serde(rename = "goodbye")]
    Goodbye,
}

/// Bump when the command/response schema changes.
pub const PROTOCOL_VERSION: u32 = 1;

pub fn make_response(payload: ResponsePayload) -> CivicResponse {
    CivicResponse {
        protocol_version: PROTOCOL_VERSION,
        payload,
    }
}

/// Serialize one response line. Falls back to a hand-written error line so
/// the stream never goes silent.
pub fn encode_response(response: &CivicResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        format!(
            "{{\"protocol_version\":{PROTOCOL_VERSION},\"type\":\"error\",\"message\":{:?}}}",
            e.to_string()
        )
    })
}
