//! Discrete 2D Laplacian for an `N x N` grid, flattened to an `N^2 x N^2` matrix.
//!
//! Flat index `k = row * N + col` (row-major, see [`HeatGrid`](crate::domain::grid2d::HeatGrid)).
//! Each row `k` of the operator holds the 5-point stencil of cell `(row, col)`:
//! `-4` on the diagonal and `1` for every neighbour that exists inside the grid.
//! Horizontal neighbours never wrap from the end of one grid row to the start of
//! the next, which is what separates this from a plain banded matrix.

pub mod cache;

use std::fmt;

use nalgebra::{DMatrix, DVector};
use rsparse::data::{Sprs, Trpl};
use rsparse::gaxpy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OperatorError, StepperError};

pub const DIAGONAL_COEFFICIENT: f64 = -4.0;
pub const NEIGHBOUR_COEFFICIENT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorRepr {
    Dense,
    Sparse,
}

pub enum LaplacianOperator {
    Dense(DMatrix<f64>),
    /// Compressed sparse column storage.
    Sparse(Sprs<f64>),
}

// (row, col, value) entries of the operator, in row-major cell order.
fn laplacian_triplets(n: usize) -> Vec<(usize, usize, f64)> {
    let cells = n * n;
    let mut triplets = Vec::with_capacity(5 * cells);

    for r in 0..n {
        for c in 0..n {
            let k = r * n + c;
            triplets.push((k, k, DIAGONAL_COEFFICIENT));

            // left
            if c > 0 {
                triplets.push((k, k - 1, NEIGHBOUR_COEFFICIENT));
            }
            // right, never across the end of a grid row
            if c < n - 1 {
                triplets.push((k, k + 1, NEIGHBOUR_COEFFICIENT));
            }
            // up
            if r > 0 {
                triplets.push((k, k - n, NEIGHBOUR_COEFFICIENT));
            }
            // down
            if r < n - 1 {
                triplets.push((k, k + n, NEIGHBOUR_COEFFICIENT));
            }
        }
    }
    triplets
}

fn check_dimension(n: usize) -> Result<(), OperatorError> {
    if n == 0 {
        return Err(OperatorError::InvalidDimension(n));
    }
    Ok(())
}

/// Dense `N^2 x N^2` Laplacian. Memory grows as `N^4`.
pub fn build_dense_operator(n: usize) -> Result<DMatrix<f64>, OperatorError> {
    check_dimension(n)?;
    let cells = n * n;
    let mut a = DMatrix::<f64>::zeros(cells, cells);
    for (row, col, value) in laplacian_triplets(n) {
        a[(row, col)] = value;
    }
    debug!(n, cells, "Built dense Laplacian operator");
    Ok(a)
}

/// Sparse (CSC) `N^2 x N^2` Laplacian holding only the non-zero stencil entries.
pub fn build_sparse_operator(n: usize) -> Result<Sprs<f64>, OperatorError> {
    check_dimension(n)?;
    let cells = n * n;
    let triplets = laplacian_triplets(n);

    let mut trpl_mat = Trpl::<f64> {
        m: cells,
        n: cells,
        p: Vec::with_capacity(triplets.len()), // column index per entry
        i: Vec::with_capacity(triplets.len()), // row index per entry
        x: Vec::with_capacity(triplets.len()),
    };
    for (row, col, value) in triplets.iter() {
        trpl_mat.i.push(*row);
        trpl_mat.p.push(*col as isize);
        trpl_mat.x.push(*value);
    }

    let mut sprs_mat = Sprs::<f64>::new();
    sprs_mat.from_trpl(&trpl_mat);
    debug!(n, cells, nnz = triplets.len(), "Built sparse Laplacian operator");
    Ok(sprs_mat)
}

pub fn build_operator(n: usize, repr: OperatorRepr) -> Result<LaplacianOperator, OperatorError> {
    match repr {
        OperatorRepr::Dense => build_dense_operator(n).map(LaplacianOperator::Dense),
        OperatorRepr::Sparse => build_sparse_operator(n).map(LaplacianOperator::Sparse),
    }
}

impl LaplacianOperator {
    pub fn repr(&self) -> OperatorRepr {
        match self {
            LaplacianOperator::Dense(_) => OperatorRepr::Dense,
            LaplacianOperator::Sparse(_) => OperatorRepr::Sparse,
        }
    }

    /// Number of rows (and columns), i.e. `N^2`.
    pub fn dim(&self) -> usize {
        match self {
            LaplacianOperator::Dense(a) => a.nrows(),
            LaplacianOperator::Sparse(a) => a.m,
        }
    }

    /// Grid side length `N` this operator was built for.
    pub fn side(&self) -> usize {
        (self.dim() as f64).sqrt().round() as usize
    }

    /// Number of stored non-zero coefficients.
    pub fn nnz(&self) -> usize {
        match self {
            LaplacianOperator::Dense(a) => a.iter().filter(|v| **v != 0.0).count(),
            LaplacianOperator::Sparse(a) => a.x.iter().filter(|v| **v != 0.0).count(),
        }
    }

    /// Matrix-vector product `A * v`.
    ///
    /// Fails with `DimensionMismatch` unless `v.len()` equals [`dim`](Self::dim).
    pub fn apply(&self, v: &[f64]) -> Result<Vec<f64>, StepperError> {
        if v.len() != self.dim() {
            return Err(StepperError::DimensionMismatch {
                operator_dim: self.dim(),
                grid_cells: v.len(),
            });
        }
        match self {
            LaplacianOperator::Dense(a) => {
                let w = a * DVector::from_column_slice(v);
                Ok(w.iter().copied().collect())
            }
            LaplacianOperator::Sparse(a) => Ok(gaxpy(a, v, &vec![0.0; a.m])),
        }
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        match self {
            LaplacianOperator::Dense(a) => a.clone(),
            LaplacianOperator::Sparse(a) => {
                let rows = a.to_dense();
                DMatrix::from_fn(a.m, a.n, |r, c| rows[r][c])
            }
        }
    }
}

impl fmt::Debug for LaplacianOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaplacianOperator")
            .field("repr", &self.repr())
            .field("dim", &self.dim())
            .field("nnz", &self.nnz())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;
    use super::*;

    #[test]
    fn test_n2_operator_exact() {
        let a = build_dense_operator(2).unwrap();
        // Index 1 is the last column of row 0, so 1 and 2 are not neighbours.
        let expected = dmatrix![
            -4.0,  1.0,  1.0,  0.0;
             1.0, -4.0,  0.0,  1.0;
             1.0,  0.0, -4.0,  1.0;
             0.0,  1.0,  1.0, -4.0
        ];
        assert_eq!(a, expected);
    }

    #[test]
    fn test_n3_row_wrap_zeroed() {
        let a = build_dense_operator(3).unwrap();
        assert_eq!(a.nrows(), 9);
        for i in 0..9 {
            assert_eq!(a[(i, i)], -4.0);
        }
        // Ends of rows 0 and 1 must not connect to the starts of rows 1 and 2.
        assert_eq!(a[(2, 3)], 0.0);
        assert_eq!(a[(3, 2)], 0.0);
        assert_eq!(a[(5, 6)], 0.0);
        assert_eq!(a[(6, 5)], 0.0);
        // Regular neighbours are present.
        assert_eq!(a[(0, 1)], 1.0);
        assert_eq!(a[(4, 1)], 1.0);
        assert_eq!(a[(4, 7)], 1.0);
        assert_eq!(a, a.transpose());
    }

    #[test]
    fn test_single_cell_operator() {
        let a = build_dense_operator(1).unwrap();
        assert_eq!(a, dmatrix![-4.0]);
    }

    #[test]
    fn test_invalid_dimension() {
        assert_eq!(build_dense_operator(0).unwrap_err(), OperatorError::InvalidDimension(0));
        assert!(build_sparse_operator(0).is_err());
        assert!(build_operator(0, OperatorRepr::Sparse).is_err());
    }

    #[test]
    fn test_sparse_matches_dense() {
        for n in 1..=6 {
            let dense = build_operator(n, OperatorRepr::Dense).unwrap();
            let sparse = build_operator(n, OperatorRepr::Sparse).unwrap();
            assert_eq!(sparse.dim(), n * n);
            assert_eq!(sparse.side(), n);
            assert_eq!(sparse.to_dense(), dense.to_dense());
            assert_eq!(sparse.nnz(), dense.nnz());
        }
    }

    #[test]
    fn test_sparse_nnz_count() {
        // N^2 diagonal entries plus two per horizontal and vertical adjacency.
        let n = 10;
        let sparse = build_operator(n, OperatorRepr::Sparse).unwrap();
        assert_eq!(sparse.nnz(), n * n + 4 * n * (n - 1));
    }

    #[test]
    fn test_apply_dense_and_sparse() {
        let v: Vec<f64> = (0..16).map(|k| (k as f64 * 0.37).sin()).collect();
        let dense = build_operator(4, OperatorRepr::Dense).unwrap();
        let sparse = build_operator(4, OperatorRepr::Sparse).unwrap();
        let wd = dense.apply(&v).unwrap();
        let ws = sparse.apply(&v).unwrap();
        assert_eq!(wd.len(), 16);
        for (d, s) in wd.iter().zip(ws.iter()) {
            assert_relative_eq!(*d, *s, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_apply_constant_field() {
        // Interior rows sum to zero, edge rows lose one unit per missing neighbour.
        let n = 3;
        let op = build_operator(n, OperatorRepr::Sparse).unwrap();
        let w = op.apply(&vec![1.0; n * n]).unwrap();
        assert_eq!(w, vec![-2.0, -1.0, -2.0, -1.0, 0.0, -1.0, -2.0, -1.0, -2.0]);
    }

    #[test]
    fn test_apply_rejects_wrong_length() {
        for repr in [OperatorRepr::Dense, OperatorRepr::Sparse] {
            let op = build_operator(3, repr).unwrap();
            assert_eq!(
                op.apply(&[1.0; 4]).unwrap_err(),
                StepperError::DimensionMismatch { operator_dim: 9, grid_cells: 4 }
            );
            // Too long is rejected rather than truncated.
            assert!(op.apply(&[1.0; 10]).is_err());
            assert!(op.apply(&[]).is_err());
        }
    }

    #[test]
    fn test_sparse_to_dense_is_row_indexed() {
        // N = 3: cell 2 (end of row 0) and cell 3 (start of row 1) stay unconnected.
        let dense = build_operator(3, OperatorRepr::Sparse).unwrap().to_dense();
        assert_eq!(dense[(2, 3)], 0.0);
        assert_eq!(dense[(3, 2)], 0.0);
        assert_eq!(dense[(0, 3)], 1.0);
        assert_eq!(dense[(4, 4)], -4.0);
    }
}
