use crate::types::Coordinates;

/// Sentinel region used as the city-wide default and as the fallback for
/// wards that have no civic data of their own.
pub const ALL_WARDS: &str = "All Wards";

/// Mumbai city centre. Reference coordinate for `ALL_WARDS` and for any
/// ward that is not in the registry.
pub const DEFAULT_COORDINATES: Coordinates = Coordinates {
    lat: 19.0760,
    lon: 72.8777,
};

/// Number of daily points in a forecast, starting tomorrow.
pub const FORECAST_HORIZON_DAYS: u32 = 7;

/// Two alerts with the same title must be at least this far apart.
pub const ALERT_COOLDOWN_MS: i64 = 3_600_000;

/// Upper bound on a single environmental fetch before it counts as failed.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Pipeline updates between two scheduled syncs of the watched regions.
pub const DEFAULT_SYNC_INTERVAL: u32 = 600;

/// Recipient count reported by the simulated notification gateway.
pub const SIMULATED_RECIPIENTS: u64 = 150_000;

/// Seed for `CivicRng` when none is supplied.
pub const DEFAULT_SEED: u64 = 42;
