//! Startup data: the hospital roster and the baseline civic snapshot.

use rand::Rng;

use crate::types::{CivicSnapshot, Coordinates, EventDensity, Hospital, RiskLevel};

struct HospitalSeed {
    id: &'static str,
    name: &'static str,
    ward: &'static str,
    beds_available: u32,
    total_beds: u32,
    doctors_on_duty: u32,
    alert_level: RiskLevel,
    lat: f64,
    lon: f64,
    website: &'static str,
    phone: &'static str,
    email: &'static str,
}

const SEED_ROSTER: [HospitalSeed; 5] = [
    HospitalSeed {
        id: "1",
        name: "KEM Hospital",
        ward: "G North",
        beds_available: 145,
        total_beds: 250,
        doctors_on_duty: 32,
        alert_level: RiskLevel::Moderate,
        lat: 19.0053,
        lon: 72.8479,
        website: "https://www.kem.edu/",
        phone: "+91-22-2410-7000",
        email: "info@kem.edu",
    },
    HospitalSeed {
        id: "2",
        name: "Sion Hospital",
        ward: "F North",
        beds_available: 89,
        total_beds: 200,
        doctors_on_duty: 28,
        alert_level: RiskLevel::High,
        lat: 19.0433,
        lon: 72.8637,
        website: "https://sionhospitalmumbai.com/",
        phone: "+91-22-2407-6521",
        email: "sion.hospital@gov.in",
    },
    HospitalSeed {
        id: "3",
        name: "JJ Hospital",
        ward: "D Ward",
        beds_available: 178,
        total_beds: 300,
        doctors_on_duty: 45,
        alert_level: RiskLevel::Low,
        lat: 18.9593,
        lon: 72.8365,
        website: "https://jjhospital.org/",
        phone: "+91-22-2373-5555",
        email: "admin@jjhospital.org",
    },
    HospitalSeed {
        id: "4",
        name: "Cooper Hospital",
        ward: "H West",
        beds_available: 67,
        total_beds: 150,
        doctors_on_duty: 22,
        alert_level: RiskLevel::High,
        lat: 19.0566,
        lon: 72.8323,
        website: "https://www.cooperhospitals.com/",
        phone: "+91-22-2620-2891",
        email: "contact@cooperhospital.org",
    },
    HospitalSeed {
        id: "5",
        name: "Nair Hospital",
        ward: "E Ward",
        beds_available: 112,
        total_beds: 220,
        doctors_on_duty: 35,
        alert_level: RiskLevel::Moderate,
        lat: 18.9950,
        lon: 72.8418,
        website: "https://www.tnmchospital.com/",
        phone: "+91-22-2307-4761",
        email: "info@nairhospital.org",
    },
];

/// The roster loaded once at store construction, in a fixed order.
pub fn seed_hospitals() -> Vec<Hospital> {
    SEED_ROSTER
        .iter()
        .map(|s| Hospital {
            id: s.id.to_string(),
            name: s.name.to_string(),
            ward: s.ward.to_string(),
            beds_available: s.beds_available,
            total_beds: s.total_beds,
            doctors_on_duty: s.doctors_on_duty,
            alert_level: s.alert_level,
            coordinates: Coordinates::new(s.lat, s.lon),
            website: Some(s.website.to_string()),
            phone: Some(s.phone.to_string()),
            email: Some(s.email.to_string()),
        })
        .collect()
}

/// A plausible random snapshot, used to seed the default region and as the
/// base the aggregator merges risk scoring over.
///
/// First matching rule wins:
/// rainfall > 100 → leptospirosis (high), rainfall > 50 → dengue (moderate),
/// aqi > 200 → respiratory (high), aqi > 150 → mild respiratory (moderate),
/// high event density → trauma (moderate), otherwise no outbreak (low).
pub fn baseline_snapshot<R: Rng + ?Sized>(rng: &mut R) -> CivicSnapshot {
    let rainfall = rng.gen_range(0..150u32) as f64;
    let aqi = rng.gen_range(50..350u32) as f64;
    let event_density = match rng.gen_range(0..3u8) {
        0 => EventDensity::Low,
        1 => EventDensity::Moderate,
        _ => EventDensity::High,
    };

    let (condition, risk_level, base, spread) = if rainfall > 100.0 {
        ("Leptospirosis & Waterborne Diseases", RiskLevel::High, 85, 15)
    } else if rainfall > 50.0 {
        ("Dengue & Malaria", RiskLevel::Moderate, 65, 20)
    } else if aqi > 200.0 {
        ("Respiratory Issues", RiskLevel::High, 75, 20)
    } else if aqi > 150.0 {
        ("Mild Respiratory Symptoms", RiskLevel::Moderate, 60, 15)
    } else if event_density == EventDensity::High {
        ("Trauma & Crowd-related Injuries", RiskLevel::Moderate, 70, 15)
    } else {
        ("None", RiskLevel::Low, 40, 20)
    };

    CivicSnapshot {
        rainfall_mm: rainfall,
        aqi,
        event_density,
        predicted_condition: condition.to_string(),
        confidence: base + rng.gen_range(0..spread),
        risk_level,
    }
}
