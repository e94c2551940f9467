use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use types::DistrictPlan;

#[derive(Debug, Error)]
pub enum DistrictConfigError {
    #[error("district config not found at {path}")]
    Missing { path: PathBuf },
    #[error("failed to read district config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed district config {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid district config: {0}")]
    Invalid(String),
}

/// Reads and validates the district plan. Every error here is fatal for the run.
pub fn load_plan(path: &Path) -> Result<DistrictPlan, DistrictConfigError> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => DistrictConfigError::Missing {
            path: path.to_path_buf(),
        },
        _ => DistrictConfigError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let plan: DistrictPlan =
        serde_json::from_str(&content).map_err(|source| DistrictConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    validate_plan(&plan)?;

    info!(
        path = %path.display(),
        districts = plan.districts.len(),
        sensors = plan.total_sensors(),
        "district plan loaded"
    );
    Ok(plan)
}

/// Only guards the energy-source cycling; everything else is left to the API.
pub fn validate_plan(plan: &DistrictPlan) -> Result<(), DistrictConfigError> {
    if plan.energy_sources.is_empty() && plan.total_sensors() > 0 {
        return Err(DistrictConfigError::Invalid(
            "energy_sources must contain at least one label when sensors are requested".to_string(),
        ));
    }
    Ok(())
}
