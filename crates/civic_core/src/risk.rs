//! Local risk model: additive point scoring over weather and air quality.
//!
//! Points:
//! - rainfall > 50 mm: +40, else rainfall > 10 mm: +20
//! - AQI > 300: +50, else > 200: +30, else > 100: +10
//! - humidity > 80 %: +20
//!
//! Level: > 60 high, > 30 moderate, else low (strict inequalities).
//!
//! The predicted condition is a separate first-match chain and does not look
//! at the point total. Confidence and event density are synthetic draws from
//! the caller's RNG.

use rand::Rng;

use crate::environment::{AirQualityReading, WeatherReading};
use crate::types::{CivicSnapshot, EventDensity, RiskLevel};

pub const CONDITION_VECTOR_BORNE: &str = "Dengue / Malaria";
pub const CONDITION_RESPIRATORY: &str = "Respiratory Infections";
pub const CONDITION_LEPTOSPIROSIS: &str = "Leptospirosis";
pub const CONDITION_NONE: &str = "None";

/// Scorer output: every snapshot field except the region.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub rainfall_mm: f64,
    pub aqi: f64,
    pub score: u32,
    pub risk_level: RiskLevel,
    pub predicted_condition: &'static str,
    pub confidence: u8,
    pub event_density: EventDensity,
}

impl RiskAssessment {
    /// Overlay this assessment on `base`. Every field the scorer produces
    /// wins; `base` only matters for fields the scorer leaves alone.
    pub fn merge_over(&self, base: CivicSnapshot) -> CivicSnapshot {
        let mut merged = base;
        merged.rainfall_mm = self.rainfall_mm;
        merged.aqi = self.aqi;
        merged.event_density = self.event_density;
        merged.predicted_condition = self.predicted_condition.to_string();
        merged.confidence = self.confidence;
        merged.risk_level = self.risk_level;
        merged
    }
}

pub fn risk_points(weather: &WeatherReading, air: &AirQualityReading) -> u32 {
    let mut score = 0;

    // Waterborne
    if weather.rainfall_mm > 50.0 {
        score += 40;
    } else if weather.rainfall_mm > 10.0 {
        score += 20;
    }

    // Respiratory
    if air.aqi > 300.0 {
        score += 50;
    } else if air.aqi > 200.0 {
        score += 30;
    } else if air.aqi > 100.0 {
        score += 10;
    }

    // Vector breeding
    if weather.humidity_pct > 80.0 {
        score += 20;
    }

    score
}

pub fn classify_risk(score: u32) -> RiskLevel {
    if score > 60 {
        RiskLevel::High
    } else if score > 30 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Branch order is significant: wet and humid beats polluted beats very wet.
pub fn predict_condition(weather: &WeatherReading, air: &AirQualityReading) -> &'static str {
    if weather.rainfall_mm > 20.0 && weather.humidity_pct > 75.0 {
        CONDITION_VECTOR_BORNE
    } else if air.aqi > 150.0 {
        CONDITION_RESPIRATORY
    } else if weather.rainfall_mm > 100.0 {
        CONDITION_LEPTOSPIROSIS
    } else {
        CONDITION_NONE
    }
}

/// Integer in [85, 95).
pub fn draw_confidence<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(85..95)
}

/// High 30 %, Moderate 30 %, Low 40 %.
pub fn draw_event_density<R: Rng + ?Sized>(rng: &mut R) -> EventDensity {
    let roll: f64 = rng.gen();
    if roll >= 0.7 {
        EventDensity::High
    } else if roll >= 0.4 {
        EventDensity::Moderate
    } else {
        EventDensity::Low
    }
}

pub fn assess_risk<R: Rng + ?Sized>(
    weather: &WeatherReading,
    air: &AirQualityReading,
    rng: &mut R,
) -> RiskAssessment {
    let score = risk_points(weather, air);
    RiskAssessment {
        rainfall_mm: weather.rainfall_mm,
        aqi: air.aqi,
        score,
        risk_level: classify_risk(score),
        predicted_condition: predict_condition(weather, air),
        confidence: draw_confidence(rng),
        event_density: draw_event_density(rng),
    }
}
