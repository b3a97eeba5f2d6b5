//! Data model shared by the store and the agents.
//!
//! Every collection the store owns is made of these plain values. Agents
//! receive clones and hand back whole replacements; nothing here is shared
//! by reference across agents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of a ward or administrative region, e.g. `"G North"`.
pub type RegionKey = String;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Three-step severity scale used for civic risk, hospital alert level and
/// alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

/// Crowd/event pressure on a region. Placeholder for a real event-calendar feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventDensity {
    Low,
    Moderate,
    High,
}

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

// ---------------------------------------------------------------------------
// Civic snapshot
// ---------------------------------------------------------------------------

/// Enriched civic state for one region. Replaced wholesale on every sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CivicSnapshot {
    pub rainfall_mm: f64,
    pub aqi: f64,
    pub event_density: EventDensity,
    pub predicted_condition: String,
    /// Model certainty, 0..=100.
    pub confidence: u8,
    pub risk_level: RiskLevel,
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub disease: String,
    pub predicted_cases: u32,
    /// 0..=100.
    pub confidence: u8,
}

/// One point per day over the forecast horizon, earliest first.
pub type Forecast = Vec<ForecastPoint>;

// ---------------------------------------------------------------------------
// Hospitals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: String,
    pub name: String,
    pub ward: RegionKey,
    pub beds_available: u32,
    pub total_beds: u32,
    pub doctors_on_duty: u32,
    pub alert_level: RiskLevel,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Hospital {
    /// Fraction of beds in use, or `None` for a hospital with no beds.
    pub fn occupancy(&self) -> Option<f64> {
        if self.total_beds == 0 {
            return None;
        }
        let occupied = self.total_beds.saturating_sub(self.beds_available);
        Some(occupied as f64 / self.total_beds as f64)
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

pub const CHANNEL_SMS: &str = "SMS";
pub const CHANNEL_APP: &str = "App";

/// A public alert. Immutable once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub severity: RiskLevel,
    pub regions: Vec<RegionKey>,
    pub created_at: DateTime<Utc>,
    pub channels: Vec<String>,
}
