//! Explicit finite-difference heat diffusion on a square grid with zero Dirichlet walls.
//!
//! The same Euler step is available three ways: dense operator, sparse operator,
//! and a direct 5-point stencil. Grids are flattened row-major everywhere an
//! operator is involved; see [`domain::grid2d::HeatGrid`].

pub mod config;
pub mod domain;
pub mod error;
pub mod json_io;
pub mod operator;
pub mod simulation;
pub mod stepper;
