//! Civic health data core.
//!
//! Four cooperating agents around one shared store: the aggregator ingests
//! weather and air quality and scores the civic risk, the forecaster
//! projects outbreak cases, the logistics coordinator advises on hospital
//! load and the alert system raises deduplicated public alerts. Agents are
//! plain service objects holding an `Arc<CivicDataStore>`; the
//! [`CivicPipelinePlugin`] runs them on a Bevy schedule.

pub mod aggregator;
pub mod alerts;
pub mod assistant;
pub mod civic_rng;
pub mod clock;
pub mod config;
pub mod environment;
pub mod error;
pub mod forecaster;
pub mod logistics;
pub mod params;
pub mod pipeline;
pub mod protocol;
pub mod risk;
pub mod roster;
pub mod store;
pub mod types;
pub mod wards;

#[cfg(test)]
pub mod test_harness;

pub use pipeline::CivicPipelinePlugin;
pub use store::CivicDataStore;
