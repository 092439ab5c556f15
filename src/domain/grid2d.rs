use std::ops::Index;

use crate::error::GridError;
use nalgebra::DMatrix;

/// Square temperature field at a single timestep.
///
/// Values live in an `N x N` nalgebra matrix indexed as `(row, col)`.
/// nalgebra stores matrices column-major, but every flattened view this type
/// hands out or accepts is **row-major**: flat index `k = row * N + col`.
/// The Laplacian operators in [`crate::operator`] are assembled against the
/// same ordering, so `to_row_major` / `from_row_major` are the only places a
/// grid should ever be flattened or rebuilt.
///
/// ```text
///   col:   0   1   2
/// row 0:   0   1   2
/// row 1:   3   4   5      k = row * N + col  (N = 3)
/// row 2:   6   7   8
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HeatGrid {
    values: DMatrix<f64>,
}

impl HeatGrid {
    pub fn new(values: DMatrix<f64>) -> Result<Self, GridError> {
        if values.nrows() == 0 || values.ncols() == 0 {
            return Err(GridError::InvalidGridSize(
                "Grid must contain at least one cell.".to_string(),
            ));
        }
        if values.nrows() != values.ncols() {
            return Err(GridError::InvalidGridSize(format!(
                "Grid must be square, got {}x{}",
                values.nrows(),
                values.ncols()
            )));
        }
        Ok(Self { values })
    }

    // Callers guarantee `values` is square and non-empty.
    pub(crate) fn from_square(values: DMatrix<f64>) -> Self {
        debug_assert!(values.nrows() == values.ncols() && !values.is_empty());
        Self { values }
    }

    pub fn zeros(n: usize) -> Result<Self, GridError> {
        Self::new(DMatrix::<f64>::zeros(n, n))
    }

    /// Zero grid with a single cell set to `value`.
    pub fn point_source(n: usize, row: usize, col: usize, value: f64) -> Result<Self, GridError> {
        let mut grid = Self::zeros(n)?;
        if row >= n || col >= n {
            return Err(GridError::InvalidGridSize(format!(
                "Point source ({}, {}) lies outside a {}x{} grid",
                row, col, n, n
            )));
        }
        grid.values[(row, col)] = value;
        Ok(grid)
    }

    /// Rebuilds a grid from a row-major slice of length `n * n`.
    pub fn from_row_major(n: usize, data: &[f64]) -> Result<Self, GridError> {
        if data.len() != n * n {
            return Err(GridError::InvalidGridSize(format!(
                "Flattened grid has {} values, expected {} for a {}x{} grid",
                data.len(),
                n * n,
                n,
                n
            )));
        }
        Self::new(DMatrix::from_row_slice(n, n, data))
    }

    /// Flattens the grid row-major (`k = row * N + col`).
    pub fn to_row_major(&self) -> Vec<f64> {
        let n = self.side();
        let mut flat = Vec::with_capacity(n * n);
        for r in 0..n {
            for c in 0..n {
                flat.push(self.values[(r, c)]);
            }
        }
        flat
    }

    /// Side length `N`.
    pub fn side(&self) -> usize {
        self.values.nrows()
    }

    pub fn cells(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn total_heat(&self) -> f64 {
        self.values.sum()
    }

    pub fn peak(&self) -> f64 {
        self.values.max()
    }
}

impl Index<(usize, usize)> for HeatGrid {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.values[index]
    }
}


#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = HeatGrid::zeros(5).unwrap();
        assert_eq!(grid.side(), 5);
        assert_eq!(grid.cells(), 25);
        assert_relative_eq!(grid.total_heat(), 0.0);
    }

    #[test]
    fn test_grid_creation_invalid_size() {
        assert!(HeatGrid::zeros(0).is_err());
        assert!(HeatGrid::new(DMatrix::<f64>::zeros(2, 3)).is_err());
        assert!(HeatGrid::new(DMatrix::<f64>::zeros(0, 3)).is_err());
    }

    #[test]
    fn test_row_major_flatten() {
        let grid = HeatGrid::new(dmatrix![
            1.0, 2.0, 3.0;
            4.0, 5.0, 6.0;
            7.0, 8.0, 9.0
        ]).unwrap();

        // nalgebra's own storage is column-major; the flattened view must not be.
        assert_eq!(grid.values().as_slice(), &[1.0, 4.0, 7.0, 2.0, 5.0, 8.0, 3.0, 6.0, 9.0]);
        assert_eq!(grid.to_row_major(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_from_row_major_roundtrip() {
        let data = [0.5, -1.0, 2.0, 3.5];
        let grid = HeatGrid::from_row_major(2, &data).unwrap();
        assert_eq!(grid[(0, 1)], -1.0);
        assert_eq!(grid[(1, 0)], 2.0);
        assert_eq!(grid.to_row_major(), data.to_vec());
    }

    #[test]
    fn test_from_row_major_wrong_length() {
        let result = HeatGrid::from_row_major(3, &[1.0, 2.0]);
        assert!(matches!(result, Err(GridError::InvalidGridSize(_))));
    }

    #[test]
    fn test_point_source() {
        let grid = HeatGrid::point_source(3, 1, 1, 1.0).unwrap();
        assert_eq!(grid[(1, 1)], 1.0);
        assert_relative_eq!(grid.total_heat(), 1.0);
        assert_relative_eq!(grid.peak(), 1.0);
        assert!(HeatGrid::point_source(3, 3, 0, 1.0).is_err());
    }
}
