//! Shared civic data store: the single source of truth between agents.
//!
//! Owns four collections: per-region civic snapshots, per-region forecasts,
//! the hospital roster and the alert log. Each collection sits behind its
//! own lock, so every accessor is atomic on its own but there is no
//! isolation across calls. Readers always get clones; writers always hand
//! over whole values (per-key replace, never merge).
//!
//! Agents hold an `Arc<CivicDataStore>` and never touch the maps directly.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bevy::prelude::*;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::config::ALL_WARDS;
use crate::error::StoreError;
use crate::roster;
use crate::types::{Alert, CivicSnapshot, Forecast, Hospital, RegionKey};

#[derive(Debug, Default)]
pub struct CivicDataStore {
    civic: RwLock<HashMap<RegionKey, CivicSnapshot>>,
    forecasts: RwLock<HashMap<RegionKey, Forecast>>,
    hospitals: RwLock<Vec<Hospital>>,
    /// Most recent first.
    alerts: RwLock<Vec<Alert>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl CivicDataStore {
    /// Store with no civic data, no forecasts, no alerts and the given roster.
    pub fn with_roster(hospitals: Vec<Hospital>) -> Self {
        Self {
            hospitals: RwLock::new(hospitals),
            ..Default::default()
        }
    }

    /// Startup state: `ALL_WARDS` seeded with a baseline snapshot and the
    /// built-in hospital roster loaded.
    pub fn seeded<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let store = Self::with_roster(roster::seed_hospitals());
        store.update_civic_data(ALL_WARDS, roster::baseline_snapshot(rng));
        store
    }

    // -----------------------------------------------------------------------
    // Civic data
    // -----------------------------------------------------------------------

    /// Snapshot for `region`, else the `ALL_WARDS` snapshot (one hop only),
    /// else `None`.
    pub fn civic_data(&self, region: &str) -> Option<CivicSnapshot> {
        let civic = read(&self.civic);
        civic
            .get(region)
            .or_else(|| civic.get(ALL_WARDS))
            .cloned()
    }

    /// True when `region` has a snapshot of its own (no fallback applied).
    pub fn has_civic_data(&self, region: &str) -> bool {
        read(&self.civic).contains_key(region)
    }

    pub fn update_civic_data(&self, region: impl Into<RegionKey>, snapshot: CivicSnapshot) {
        let region = region.into();
        debug!("CivicDataStore: civic data updated for {}", region);
        write(&self.civic).insert(region, snapshot);
    }

    // -----------------------------------------------------------------------
    // Forecasts
    // -----------------------------------------------------------------------

    /// Latest forecast for `region`. No default-region fallback: `None`
    /// means "not forecasted yet".
    pub fn forecast(&self, region: &str) -> Option<Forecast> {
        read(&self.forecasts).get(region).cloned()
    }

    pub fn update_forecast(&self, region: impl Into<RegionKey>, forecast: Forecast) {
        let region = region.into();
        debug!("CivicDataStore: forecast updated for {}", region);
        write(&self.forecasts).insert(region, forecast);
    }

    // -----------------------------------------------------------------------
    // Hospitals
    // -----------------------------------------------------------------------

    /// Roster in seed order.
    pub fn hospitals(&self) -> Vec<Hospital> {
        read(&self.hospitals).clone()
    }

    /// Replace the roster entry with the same id. Unknown ids are rejected,
    /// never appended.
    pub fn update_hospital(&self, hospital: Hospital) -> Result<(), StoreError> {
        if hospital.beds_available > hospital.total_beds {
            return Err(StoreError::InvalidCapacity {
                id: hospital.id,
                beds_available: hospital.beds_available,
                total_beds: hospital.total_beds,
            });
        }
        let mut roster = write(&self.hospitals);
        let Some(slot) = roster.iter_mut().find(|h| h.id == hospital.id) else {
            warn!(
                "CivicDataStore: update for unknown hospital id {} ignored",
                hospital.id
            );
            return Err(StoreError::NoSuchHospital { id: hospital.id });
        };
        debug!("CivicDataStore: hospital {} updated", hospital.name);
        *slot = hospital;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Alerts
    // -----------------------------------------------------------------------

    /// Prepend to the log.
    pub fn add_alert(&self, alert: Alert) {
        debug!("CivicDataStore: alert added: {}", alert.title);
        write(&self.alerts).insert(0, alert);
    }

    /// Prepend `alert` unless an alert with the same title was created less
    /// than `cooldown` before `now`. Check and insert happen under one lock.
    /// Returns whether the alert was logged.
    pub fn insert_alert_unless_recent(
        &self,
        alert: Alert,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> bool {
        let mut log = write(&self.alerts);
        let duplicate = log
            .iter()
            .any(|a| a.title == alert.title && now.signed_duration_since(a.created_at) < cooldown);
        if duplicate {
            return false;
        }
        debug!("CivicDataStore: alert added: {}", alert.title);
        log.insert(0, alert);
        true
    }

    /// Alert log, most recent first.
    pub fn alerts(&self) -> Vec<Alert> {
        read(&self.alerts).clone()
    }

    pub fn alert(&self, id: &uuid::Uuid) -> Option<Alert> {
        read(&self.alerts).iter().find(|a| &a.id == id).cloned()
    }
}
