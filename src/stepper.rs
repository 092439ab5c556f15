//! One explicit Euler step of the 2D heat equation with zero Dirichlet walls.
//!
//! `u' = u + epsilon * L(u)`, where `L` is the 5-point Laplacian. `L` is applied
//! either through an assembled operator (dense or sparse) or directly as a stencil.
//! The scheme is stable for `epsilon <= 1/4`; larger values are accepted and simply
//! produce growing or oscillating fields.

use std::sync::Arc;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::grid2d::HeatGrid;
use crate::error::{OperatorError, StepperError};
use crate::operator::cache::cached_operator;
use crate::operator::{LaplacianOperator, OperatorRepr};

pub const STABILITY_LIMIT: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepMethod {
    /// Dense operator matrix-vector product.
    Dense,
    /// Sparse operator matrix-vector product.
    Sparse,
    /// Direct 5-point stencil, no operator.
    Stencil,
}

impl StepMethod {
    pub fn operator_repr(&self) -> Option<OperatorRepr> {
        match self {
            StepMethod::Dense => Some(OperatorRepr::Dense),
            StepMethod::Sparse => Some(OperatorRepr::Sparse),
            StepMethod::Stencil => None,
        }
    }
}

pub fn is_stable(epsilon: f64) -> bool {
    epsilon <= STABILITY_LIMIT
}

/// Advances `u` one step using `a` as the Laplacian.
///
/// `u` is flattened row-major, multiplied by `a`, and the product is folded back
/// into an `N x N` grid before being scaled and added to `u`.
pub fn advance_matvec(
    a: &LaplacianOperator,
    u: &HeatGrid,
    epsilon: f64,
) -> Result<HeatGrid, StepperError> {
    let n = u.side();
    if a.dim() != u.cells() {
        return Err(StepperError::DimensionMismatch {
            operator_dim: a.dim(),
            grid_cells: u.cells(),
        });
    }
    if !is_stable(epsilon) {
        debug!(epsilon, "epsilon exceeds the explicit stability limit");
    }

    let w = a.apply(&u.to_row_major())?;
    let laplacian = DMatrix::from_row_slice(n, n, &w);
    Ok(HeatGrid::from_square(u.values() + laplacian * epsilon))
}

/// Advances `u` one step with the 5-point stencil.
///
/// Cells outside the grid read as 0:
/// `u'[r][c] = (1 - 4 eps) u[r][c] + eps (up + down + left + right)`.
pub fn advance_stencil(u: &HeatGrid, epsilon: f64) -> HeatGrid {
    if !is_stable(epsilon) {
        debug!(epsilon, "epsilon exceeds the explicit stability limit");
    }

    let n = u.side();
    let f = u.values();
    let centre_weight = 1.0 - 4.0 * epsilon;
    let mut next = DMatrix::<f64>::zeros(n, n);

    // Column-outer to walk nalgebra's column-major storage in order.
    for c in 0..n {
        for r in 0..n {
            let up = if r > 0 { f[(r - 1, c)] } else { 0.0 };
            let down = if r + 1 < n { f[(r + 1, c)] } else { 0.0 };
            let left = if c > 0 { f[(r, c - 1)] } else { 0.0 };
            let right = if c + 1 < n { f[(r, c + 1)] } else { 0.0 };
            next[(r, c)] = centre_weight * f[(r, c)] + epsilon * (up + down + left + right);
        }
    }
    HeatGrid::from_square(next)
}

/// A step method bound to the operator it needs (if any) for one grid size.
#[derive(Debug, Clone)]
pub struct TimeStepper {
    method: StepMethod,
    operator: Option<Arc<LaplacianOperator>>,
}

impl TimeStepper {
    pub fn new(method: StepMethod, n: usize, epsilon: f64) -> Result<Self, OperatorError> {
        let operator = match method.operator_repr() {
            Some(repr) => Some(cached_operator(n, repr)?),
            None => None,
        };
        if !is_stable(epsilon) {
            warn!(
                epsilon,
                limit = STABILITY_LIMIT,
                "epsilon above stability limit, solution may diverge"
            );
        }
        Ok(Self { method, operator })
    }

    pub fn method(&self) -> StepMethod {
        self.method
    }

    pub fn operator(&self) -> Option<&LaplacianOperator> {
        self.operator.as_deref()
    }

    pub fn step(&self, u: &HeatGrid, epsilon: f64) -> Result<HeatGrid, StepperError> {
        match &self.operator {
            Some(a) => advance_matvec(a, u, epsilon),
            None => Ok(advance_stencil(u, epsilon)),
        }
    }
}
