//! Data-driven pipeline parameters.
//!
//! Collects the tunables of the four agents into a single [`CivicParams`]
//! resource. Defaults match the constants in [`crate::config`]; overrides
//! come from `MPULSE_*` environment variables via [`CivicParams::from_lookup`].

use std::str::FromStr;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{
    ALERT_COOLDOWN_MS, ALL_WARDS, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_SYNC_INTERVAL,
    SIMULATED_RECIPIENTS,
};
use crate::error::ConfigError;
use crate::logistics::LogisticsThresholds;
use crate::types::RegionKey;

pub const ALERT_COOLDOWN_VAR: &str = "MPULSE_ALERT_COOLDOWN_MS";
pub const FETCH_TIMEOUT_VAR: &str = "MPULSE_FETCH_TIMEOUT_MS";
pub const SYNC_INTERVAL_VAR: &str = "MPULSE_SYNC_INTERVAL";
pub const WARDS_VAR: &str = "MPULSE_WARDS";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CivicParams {
    /// Same-title alerts closer than this are suppressed.
    pub alert_cooldown_ms: i64,
    /// Per-request budget for environmental fetches; expiry counts as an
    /// outage and triggers the fallback readings.
    pub fetch_timeout_ms: u64,
    /// Updates between scheduled syncs.
    pub sync_interval: u32,
    /// Reported by the simulated broadcast gateway.
    pub broadcast_recipients: u64,
    pub logistics: LogisticsThresholds,
    /// Regions the pipeline syncs on its schedule.
    pub watched_regions: Vec<RegionKey>,
}

impl Default for CivicParams {
    fn default() -> Self {
        Self {
            alert_cooldown_ms: ALERT_COOLDOWN_MS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            broadcast_recipients: SIMULATED_RECIPIENTS,
            logistics: LogisticsThresholds::default(),
            watched_regions: vec![ALL_WARDS.to_string()],
        }
    }
}

fn parse_var<T: FromStr>(variable: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        variable: variable.to_string(),
        value: value.to_string(),
    })
}

impl CivicParams {
    /// Defaults with overrides from `lookup`. Unset variables keep the
    /// default; set but malformed ones are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut params = Self::default();

        if let Some(v) = lookup(ALERT_COOLDOWN_VAR) {
            params.alert_cooldown_ms = parse_var(ALERT_COOLDOWN_VAR, &v)?;
            if params.alert_cooldown_ms < 0 {
                return Err(ConfigError::InvalidValue {
                    variable: ALERT_COOLDOWN_VAR.to_string(),
                    value: v,
                });
            }
        }
        if let Some(v) = lookup(FETCH_TIMEOUT_VAR) {
            params.fetch_timeout_ms = parse_var(FETCH_TIMEOUT_VAR, &v)?;
        }
        if let Some(v) = lookup(SYNC_INTERVAL_VAR) {
            params.sync_interval = parse_var(SYNC_INTERVAL_VAR, &v)?;
            if params.sync_interval == 0 {
                return Err(ConfigError::InvalidValue {
                    variable: SYNC_INTERVAL_VAR.to_string(),
                    value: v,
                });
            }
        }
        if let Some(v) = lookup(WARDS_VAR) {
            let wards: Vec<RegionKey> = v
                .split(',')
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect();
            if wards.is_empty() {
                return Err(ConfigError::InvalidValue {
                    variable: WARDS_VAR.to_string(),
                    value: v,
                });
            }
            params.watched_regions = wards;
        }

        Ok(params)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn alert_cooldown(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.alert_cooldown_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_match_constants() {
        let params = CivicParams::default();
        assert_eq!(params.alert_cooldown_ms, 3_600_000);
        assert_eq!(params.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(params.broadcast_recipients, 150_000);
        assert_eq!(params.logistics.surge_cases, 50);
        assert!((params.logistics.overload_occupancy - 0.85).abs() < f64::EPSILON);
        assert!((params.logistics.diversion_occupancy - 0.60).abs() < f64::EPSILON);
        assert_eq!(params.watched_regions, vec!["All Wards".to_string()]);
        assert_eq!(CivicParams::from_lookup(none).unwrap(), params);
    }

    #[test]
    fn test_overrides_apply() {
        let params = CivicParams::from_lookup(|name| match name {
            "MPULSE_ALERT_COOLDOWN_MS" => Some("60000".to_string()),
            "MPULSE_FETCH_TIMEOUT_MS" => Some(" 2500 ".to_string()),
            "MPULSE_SYNC_INTERVAL" => Some("5".to_string()),
            "MPULSE_WARDS" => Some("G North, H West,,All Wards".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(params.alert_cooldown(), chrono::Duration::minutes(1));
        assert_eq!(params.fetch_timeout_ms, 2500);
        assert_eq!(params.sync_interval, 5);
        assert_eq!(params.watched_regions, vec!["G North", "H West", "All Wards"]);
    }

    #[test]
    fn test_malformed_value_is_reported() {
        let err = CivicParams::from_lookup(|name| {
            (name == "MPULSE_FETCH_TIMEOUT_MS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                variable: "MPULSE_FETCH_TIMEOUT_MS".to_string(),
                value: "soon".to_string(),
            }
        );
    }

    #[test]
    fn test_zero_interval_and_empty_wards_rejected() {
        assert!(CivicParams::from_lookup(|name| {
            (name == "MPULSE_SYNC_INTERVAL").then(|| "0".to_string())
        })
        .is_err());
        assert!(CivicParams::from_lookup(|name| {
            (name == "MPULSE_WARDS").then(|| " , ".to_string())
        })
        .is_err());
        assert!(CivicParams::from_lookup(|name| {
            (name == "MPULSE_ALERT_COOLDOWN_MS").then(|| "-1".to_string())
        })
        .is_err());
    }
}
