//! Ward registry: reference coordinates used when fetching environmental
//! readings, plus the static illustrative risk heatmap.

use crate::config::{ALL_WARDS, DEFAULT_COORDINATES};
use crate::types::Coordinates;

const WARD_COORDINATES: [(&str, Coordinates); 12] = [
    (ALL_WARDS, DEFAULT_COORDINATES),
    ("A Ward", Coordinates::new(18.9389, 72.8354)),   // Colaba
    ("B Ward", Coordinates::new(18.9569, 72.8377)),   // Sandhurst Road
    ("C Ward", Coordinates::new(18.9483, 72.8258)),   // Marine Lines
    ("D Ward", Coordinates::new(18.9633, 72.8133)),   // Grant Road
    ("E Ward", Coordinates::new(18.9733, 72.8281)),   // Byculla
    ("F North", Coordinates::new(19.0298, 72.8576)),  // Matunga
    ("F South", Coordinates::new(19.0018, 72.8428)),  // Parel
    ("G North", Coordinates::new(19.0269, 72.8397)),  // Dadar
    ("G South", Coordinates::new(19.0076, 72.8156)),  // Worli
    ("H East", Coordinates::new(19.0843, 72.8360)),   // Santacruz East
    ("H West", Coordinates::new(19.0596, 72.8295)),   // Bandra West
];

/// Registered coordinate for `region`, if any.
pub fn ward_coordinates(region: &str) -> Option<Coordinates> {
    WARD_COORDINATES
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, c)| *c)
}

/// Coordinate to sample for `region`: the registered one, else city centre.
pub fn reference_coordinates(region: &str) -> Coordinates {
    ward_coordinates(region).unwrap_or(DEFAULT_COORDINATES)
}

/// Illustrative ward intensity map (0.0-1.0). Not derived from live state.
pub const RISK_HEATMAP: [(&str, f32); 4] = [
    ("G North", 0.8),
    ("F South", 0.6),
    ("H West", 0.4),
    ("D Ward", 0.2),
];
