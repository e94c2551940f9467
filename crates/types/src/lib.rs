use serde::{Deserialize, Serialize};

const DEFAULT_SENSORS_PER_DISTRICT: u32 = 3;

/// One district entry from the seeding plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictConfig {
    pub name: String,
    #[serde(default = "default_sensors_count")]
    pub sensors_count: u32,
}

fn default_sensors_count() -> u32 {
    DEFAULT_SENSORS_PER_DISTRICT
}

/// Parsed contents of the district file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictPlan {
    #[serde(default)]
    pub districts: Vec<DistrictConfig>,
    #[serde(default = "default_energy_sources")]
    pub energy_sources: Vec<String>,
}

pub fn default_energy_sources() -> Vec<String> {
    vec!["Solar".to_string(), "Grid".to_string()]
}

impl DistrictPlan {
    /// Energy source for the `index`-th sensor of a district, cycling through the list.
    pub fn energy_source_for(&self, index: usize) -> Option<&str> {
        if self.energy_sources.is_empty() {
            return None;
        }
        Some(self.energy_sources[index % self.energy_sources.len()].as_str())
    }

    pub fn total_sensors(&self) -> u64 {
        self.districts
            .iter()
            .map(|district| u64::from(district.sensors_count))
            .sum()
    }
}

/// WGS84 point, already rounded to six decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Body of `POST /sensors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorCreateRequest {
    pub district_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub energy_source: String,
}

impl SensorCreateRequest {
    pub fn new(district_name: impl Into<String>, point: GeoPoint, energy_source: impl Into<String>) -> Self {
        Self {
            district_name: district_name.into(),
            latitude: point.latitude,
            longitude: point.longitude,
            energy_source: energy_source.into(),
        }
    }
}
