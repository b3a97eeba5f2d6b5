//! Agent 2: outbreak forecaster.
//!
//! Reads the region's civic snapshot (with the default-region fallback),
//! generates a seven-day baseline projection and scales it up when the
//! snapshot is high risk. The result replaces the region's forecast in the
//! store. The projection is a stub generator, not a trained model.

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy::prelude::*;
use chrono::{Days, NaiveDate};
use rand::Rng;

use crate::clock::Clock;
use crate::config::FORECAST_HORIZON_DAYS;
use crate::store::CivicDataStore;
use crate::types::{Forecast, ForecastPoint, RiskLevel};
use crate::wards::RISK_HEATMAP;

/// Disease taxonomy forecast points are drawn from.
pub const DISEASES: [&str; 5] = [
    "Dengue",
    "Leptospirosis",
    "Malaria",
    "Respiratory Issues",
    "Waterborne Diseases",
];

/// Case multiplier applied to every point under high civic risk.
const HIGH_RISK_CASE_FACTOR: f64 = 1.5;
const HIGH_RISK_CONFIDENCE_BOOST: u8 = 5;
const MAX_CONFIDENCE: u8 = 99;

/// One point per day for `FORECAST_HORIZON_DAYS` days starting the day after
/// `today`. Per point: disease uniform over the taxonomy, cases in [20,120),
/// confidence in [70,100).
pub fn baseline_forecast<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> Forecast {
    (1..=FORECAST_HORIZON_DAYS)
        .map(|offset| ForecastPoint {
            date: today + Days::new(u64::from(offset)),
            disease: DISEASES[rng.gen_range(0..DISEASES.len())].to_string(),
            predicted_cases: rng.gen_range(20..120),
            confidence: rng.gen_range(70..100),
        })
        .collect()
}

/// Scale cases by 1.5 (floored) and raise confidence by 5, capped at 99.
pub fn apply_high_risk(forecast: &mut Forecast) {
    for point in forecast.iter_mut() {
        point.predicted_cases = (point.predicted_cases as f64 * HIGH_RISK_CASE_FACTOR).floor() as u32;
        point.confidence = point
            .confidence
            .saturating_add(HIGH_RISK_CONFIDENCE_BOOST)
            .min(MAX_CONFIDENCE);
    }
}

pub struct OutbreakForecaster {
    store: Arc<CivicDataStore>,
    clock: Arc<dyn Clock>,
}

impl OutbreakForecaster {
    pub fn new(store: Arc<CivicDataStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn generate_forecast<R: Rng + ?Sized>(&self, region: &str, rng: &mut R) -> Forecast {
        info!("OutbreakForecaster: running models for {}", region);
        let civic = self.store.civic_data(region);

        let mut forecast = baseline_forecast(self.clock.today(), rng);
        if civic.is_some_and(|c| c.risk_level == RiskLevel::High) {
            apply_high_risk(&mut forecast);
        }

        self.store.update_forecast(region, forecast.clone());
        info!(
            "OutbreakForecaster: forecast generated for {}, max predicted cases {}",
            region,
            forecast.iter().map(|p| p.predicted_cases).max().unwrap_or(0)
        );
        forecast
    }

    /// Static illustrative heatmap, ward name → intensity in 0.0-1.0.
    pub fn risk_heatmap(&self) -> BTreeMap<String, f32> {
        RISK_HEATMAP
            .iter()
            .map(|&(ward, intensity)| (ward.to_string(), intensity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::ALL_WARDS;
    use crate::types::{CivicSnapshot, EventDensity};
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 7, 30, 10, 0, 0).unwrap(),
        ))
    }

    fn snapshot(level: RiskLevel) -> CivicSnapshot {
        CivicSnapshot {
            rainfall_mm: 80.0,
            aqi: 120.0,
            event_density: EventDensity::Moderate,
            predicted_condition: "Dengue / Malaria".to_string(),
            confidence: 90,
            risk_level: level,
        }
    }

    #[test]
    fn test_baseline_shape_and_ranges() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 30).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let forecast = baseline_forecast(today, &mut rng);
        assert_eq!(forecast.len(), 7);
        assert_eq!(forecast[0].date, NaiveDate::from_ymd_opt(2025, 7, 31).unwrap());
        assert_eq!(forecast[6].date, NaiveDate::from_ymd_opt(2025, 8, 6).unwrap());
        for p in &forecast {
            assert!(DISEASES.contains(&p.disease.as_str()));
            assert!((20..120).contains(&p.predicted_cases));
            assert!((70..100).contains(&p.confidence));
        }
    }

    #[test]
    fn test_high_risk_scaling_matches_same_seed_baseline() {
        let store = Arc::new(CivicDataStore::default());
        store.update_civic_data("G North", snapshot(RiskLevel::High));
        let forecaster = OutbreakForecaster::new(Arc::clone(&store), clock());

        let baseline = baseline_forecast(
            NaiveDate::from_ymd_opt(2025, 7, 30).unwrap(),
            &mut ChaCha8Rng::seed_from_u64(77),
        );
        let scaled = forecaster.generate_forecast("G North", &mut ChaCha8Rng::seed_from_u64(77));

        assert_eq!(scaled.len(), baseline.len());
        for (b, s) in baseline.iter().zip(&scaled) {
            assert_eq!(s.disease, b.disease);
            assert_eq!(s.date, b.date);
            assert_eq!(s.predicted_cases, b.predicted_cases * 3 / 2);
            assert_eq!(s.confidence, (b.confidence + 5).min(99));
        }
        assert_eq!(store.forecast("G North"), Some(scaled));
    }

    #[test]
    fn test_moderate_risk_is_not_scaled() {
        let store = Arc::new(CivicDataStore::default());
        store.update_civic_data(ALL_WARDS, snapshot(RiskLevel::Moderate));
        let forecaster = OutbreakForecaster::new(Arc::clone(&store), clock());
        let baseline = baseline_forecast(
            NaiveDate::from_ymd_opt(2025, 7, 30).unwrap(),
            &mut ChaCha8Rng::seed_from_u64(5),
        );
        assert_eq!(
            forecaster.generate_forecast(ALL_WARDS, &mut ChaCha8Rng::seed_from_u64(5)),
            baseline
        );
    }

    #[test]
    fn test_region_without_data_uses_default_region_risk() {
        let store = Arc::new(CivicDataStore::default());
        store.update_civic_data(ALL_WARDS, snapshot(RiskLevel::High));
        let forecaster = OutbreakForecaster::new(Arc::clone(&store), clock());
        let baseline = baseline_forecast(
            NaiveDate::from_ymd_opt(2025, 7, 30).unwrap(),
            &mut ChaCha8Rng::seed_from_u64(8),
        );
        let forecast = forecaster.generate_forecast("H East", &mut ChaCha8Rng::seed_from_u64(8));
        assert_eq!(forecast[0].predicted_cases, baseline[0].predicted_cases * 3 / 2);
        // Written under the requested region, not the fallback one.
        assert!(store.forecast("H East").is_some());
        assert!(store.forecast(ALL_WARDS).is_none());
    }

    #[test]
    fn test_no_civic_data_skips_adjustment() {
        let store = Arc::new(CivicDataStore::default());
        let forecaster = OutbreakForecaster::new(Arc::clone(&store), clock());
        let baseline = baseline_forecast(
            NaiveDate::from_ymd_opt(2025, 7, 30).unwrap(),
            &mut ChaCha8Rng::seed_from_u64(9),
        );
        assert_eq!(
            forecaster.generate_forecast("G North", &mut ChaCha8Rng::seed_from_u64(9)),
            baseline
        );
    }

    #[test]
    fn test_regenerating_replaces_forecast() {
        let store = Arc::new(CivicDataStore::default());
        let forecaster = OutbreakForecaster::new(Arc::clone(&store), clock());
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        forecaster.generate_forecast("A Ward", &mut rng);
        let second = forecaster.generate_forecast("A Ward", &mut rng);
        assert_eq!(store.forecast("A Ward"), Some(second));
    }

    #[test]
    fn test_confidence_cap() {
        let mut forecast = vec![ForecastPoint {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            disease: "Dengue".to_string(),
            predicted_cases: 119,
            confidence: 97,
        }];
        apply_high_risk(&mut forecast);
        assert_eq!(forecast[0].predicted_cases, 178);
        assert_eq!(forecast[0].confidence, 99);
    }

    #[test]
    fn test_heatmap_is_static() {
        let forecaster = OutbreakForecaster::new(Arc::new(CivicDataStore::default()), clock());
        let heatmap = forecaster.risk_heatmap();
        assert_eq!(heatmap.get("G North"), Some(&0.8));
        assert_eq!(heatmap.get("D Ward"), Some(&0.2));
        assert_eq!(heatmap.len(), 4);
    }

    #[test]
    fn test_high_risk_confidence_saturates_at_cap() {
        let mut forecast = vec![ForecastPoint {
            date: NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
            disease: "Dengue".to_string(),
            predicted_cases: 10,
            confidence: 253,
        }];
        apply_high_risk(&mut forecast);
        assert_eq!(forecast[0].confidence, 99);
        assert_eq!(forecast[0].predicted_cases, 15);
    }
}
