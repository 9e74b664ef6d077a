//! Scenario profile loading from JSON
//!
//! ```json
//! {
//!   "name": "patrol",
//!   "min_objects": 3,
//!   "max_objects": 8,
//!   "allowed_types": ["FIXED_WING", "ROTARY_WING", "UAV_SMALL"],
//!   "spawn_rate_hz": 0.1,
//!   "min_range_m": 5000,
//!   "max_range_m": 30000,
//!   "min_speed_mps": 50,
//!   "max_speed_mps": 300,
//!   "hostile_probability": 0.3
//! }
//! ```

use super::objects::ScenarioProfile;
use crate::error::{Error, Result};
use crate::protocol::TrackClass;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    name: String,
    #[serde(default)]
    min_objects: u32,
    #[serde(default)]
    max_objects: u32,
    allowed_types: Vec<String>,
    #[serde(default)]
    spawn_rate_hz: f64,
    #[serde(default)]
    min_range_m: f64,
    #[serde(default)]
    max_range_m: f64,
    #[serde(default)]
    min_speed_mps: f64,
    #[serde(default)]
    max_speed_mps: f64,
    #[serde(default)]
    hostile_probability: f64,
}

/// Parse a scenario profile from a JSON string.
pub fn scenario_from_str(json: &str) -> Result<ScenarioProfile> {
    let file: ScenarioFile = serde_json::from_str(json)?;

    if file.name.is_empty() {
        return Err(Error::Scenario("missing 'name'".to_string()));
    }
    if file.allowed_types.is_empty() {
        return Err(Error::Scenario("missing or empty 'allowed_types'".to_string()));
    }
    if file.max_objects < file.min_objects {
        return Err(Error::Scenario(
            "max_objects must be >= min_objects".to_string(),
        ));
    }

    let mut allowed_types = Vec::with_capacity(file.allowed_types.len());
    for name in &file.allowed_types {
        match TrackClass::from_name(name) {
            Some(class) => allowed_types.push(class),
            None => {
                return Err(Error::Scenario(format!("unknown track class '{}'", name)));
            }
        }
    }

    Ok(ScenarioProfile {
        name: file.name,
        min_objects: file.min_objects,
        max_objects: file.max_objects,
        allowed_types,
        spawn_rate_hz: file.spawn_rate_hz,
        min_range_m: file.min_range_m,
        max_range_m: file.max_range_m,
        min_speed_mps: file.min_speed_mps,
        max_speed_mps: file.max_speed_mps,
        hostile_probability: file.hostile_probability,
    })
}

/// Load a scenario profile from a JSON file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioProfile> {
    let content = fs::read_to_string(&path).map_err(|e| {
        Error::Scenario(format!(
            "cannot open scenario file {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;
    scenario_from_str(&content)
}
