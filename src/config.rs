use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::grid2d::HeatGrid;
use crate::error::{ConfigError, GridError};
use crate::stepper::StepMethod;

/// Run parameters for the `heat-diffusion` binary.
///
/// Every field is optional in the JSON file; missing fields take the defaults
/// below (a 101x101 grid, unit point source at the centre, epsilon 0.01,
/// 2700 steps with a snapshot every 300).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub n: usize,
    pub epsilon: f64,
    pub num_steps: usize,
    pub method: StepMethod,
    pub initial_value: f64,
    pub output_frequency: Option<usize>,
    pub output_path: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n: 101,
            epsilon: 0.01,
            num_steps: 2700,
            method: StepMethod::Stencil,
            initial_value: 1.0,
            output_frequency: Some(300),
            output_path: "output/heat_diffusion.json".to_string(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n == 0 {
            return Err(ConfigError::Invalid("n must be at least 1".to_string()));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "epsilon must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        if !self.initial_value.is_finite() {
            return Err(ConfigError::Invalid("initial_value must be finite".to_string()));
        }
        Ok(())
    }

    /// Zero field with `initial_value` at the centre cell.
    pub fn initial_grid(&self) -> Result<HeatGrid, GridError> {
        HeatGrid::point_source(self.n, self.n / 2, self.n / 2, self.initial_value)
    }
}
