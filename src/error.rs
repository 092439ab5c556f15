use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Invalid grid size: {0}")]
    InvalidGridSize(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperatorError {
    #[error("Invalid operator dimension: N = {0}, expected N >= 1")]
    InvalidDimension(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepperError {
    #[error("Operator dimension {operator_dim} does not match grid with {grid_cells} cells")]
    DimensionMismatch { operator_dim: usize, grid_cells: usize },
}

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    #[error("Stepper error: {0}")]
    Stepper(#[from] StepperError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("I/O error: {0}")]
    Io(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
