//! Agent 3: logistics coordinator.
//!
//! Read-only advisor over the hospital roster and the city-wide forecast.
//! Nothing it computes is written back to the store.

use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ALL_WARDS;
use crate::store::CivicDataStore;
use crate::types::Hospital;

/// Status string every allocation run reports.
pub const ALLOCATION_STATUS: &str = "Optimized";

/// Disclosure template returned as `recommendations`. Deliberately not built
/// from the computed diversions or surge diseases; those have their own
/// fields in [`AllocationReport`].
pub const RECOMMENDATION_TEMPLATE: [&str; 3] = [
    "Divert 20% of non-critical patients from Sion to KEM",
    "Activate reserve nursing staff for Night Shift in G-North",
    "Restock O2 cylinders in Cooper Hospital (Stock < 15%)",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticsThresholds {
    /// Occupancy strictly above this marks a hospital overloaded.
    pub overload_occupancy: f64,
    /// Occupancy strictly below this makes a hospital a diversion target.
    pub diversion_occupancy: f64,
    /// Predicted cases strictly above this flag a disease for extra staffing.
    pub surge_cases: u32,
}

impl Default for LogisticsThresholds {
    fn default() -> Self {
        Self {
            overload_occupancy: 0.85,
            diversion_occupancy: 0.60,
            surge_cases: 50,
        }
    }
}

/// An overloaded hospital paired with the first roster entry that can take
/// its non-critical patients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diversion {
    pub from: String,
    pub to: String,
    /// Occupancy of `from` at the time of the run.
    pub occupancy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationReport {
    pub status: String,
    pub recommendations: Vec<String>,
    pub diversions: Vec<Diversion>,
    /// Diseases above the surge threshold, first-seen order, no repeats.
    pub surge_diseases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbulanceRoute {
    pub route: String,
    pub eta: String,
    pub traffic_status: String,
}

pub struct LogisticsCoordinator {
    store: Arc<CivicDataStore>,
    thresholds: LogisticsThresholds,
}

impl LogisticsCoordinator {
    pub fn new(store: Arc<CivicDataStore>) -> Self {
        Self {
            store,
            thresholds: LogisticsThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: LogisticsThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn allocate_resources(&self) -> AllocationReport {
        info!("LogisticsCoordinator: optimizing resource allocation");
        let roster = self.store.hospitals();
        let diversions = plan_diversions(&roster, &self.thresholds);
        for d in &diversions {
            info!(
                "LogisticsCoordinator: {} at {:.0}% occupancy, divert to {}",
                d.from,
                d.occupancy * 100.0,
                d.to
            );
        }

        let surge_diseases = self
            .store
            .forecast(ALL_WARDS)
            .map(|forecast| {
                let mut diseases: Vec<String> = Vec::new();
                for point in forecast
                    .iter()
                    .filter(|p| p.predicted_cases > self.thresholds.surge_cases)
                {
                    if !diseases.contains(&point.disease) {
                        diseases.push(point.disease.clone());
                    }
                }
                diseases
            })
            .unwrap_or_default();
        if !surge_diseases.is_empty() {
            info!(
                "LogisticsCoordinator: increase staffing for {}",
                surge_diseases.join(", ")
            );
        }

        AllocationReport {
            status: ALLOCATION_STATUS.to_string(),
            recommendations: RECOMMENDATION_TEMPLATE.iter().map(|s| s.to_string()).collect(),
            diversions,
            surge_diseases,
        }
    }

    /// Routing-service stub; the answer does not depend on its inputs.
    pub fn suggest_ambulance_route(&self, start: &str, end: &str) -> AmbulanceRoute {
        debug!("LogisticsCoordinator: route requested {} -> {}", start, end);
        AmbulanceRoute {
            route: "Via Western Express Highway".to_string(),
            eta: "25 mins".to_string(),
            traffic_status: "Moderate".to_string(),
        }
    }
}

/// For every overloaded hospital, the first other hospital in roster order
/// under the diversion threshold. First match, not best match. Hospitals
/// without beds are skipped on both sides.
pub fn plan_diversions(roster: &[Hospital], thresholds: &LogisticsThresholds) -> Vec<Diversion> {
    roster
        .iter()
        .filter_map(|hospital| {
            let occupancy = hospital.occupancy()?;
            if occupancy <= thresholds.overload_occupancy {
                return None;
            }
            let target = roster.iter().find(|other| {
                other.id != hospital.id
                    && other
                        .occupancy()
                        .is_some_and(|o| o < thresholds.diversion_occupancy)
            })?;
            Some(Diversion {
                from: hospital.name.clone(),
                to: target.name.clone(),
                occupancy,
            })
        })
        .collect()
}
