//! Sparse matrix utilities for the global beam system
//!
//! A 1D beam mesh gives a banded stiffness matrix (half-bandwidth 5 with
//! natural DOF numbering), so a skyline Cholesky factorisation costs O(n).

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use super::Mat6;
use crate::error::{BridgeError, BridgeResult};

/// Sparse matrix builder using COO format
/// More efficient for incremental assembly
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a new sparse matrix builder
    pub fn new(size: usize) -> Self {
        // Two elements per node, 6x6 each
        let estimated_nnz = size * 24;
        Self {
            size,
            entries: Vec::with_capacity(estimated_nnz),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Add a value to the matrix (accumulates if already exists)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Scatter an element matrix into the global matrix
    pub fn add_element_matrix(&mut self, dofs: &[usize; 6], k_elem: &Mat6) {
        for (i, &di) in dofs.iter().enumerate() {
            for (j, &dj) in dofs.iter().enumerate() {
                self.add(di, dj, k_elem[(i, j)]);
            }
        }
    }

    /// Convert to CSR format; duplicate entries are summed
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);

        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }

        CsrMatrix::from(&coo)
    }

    /// Convert to dense matrix (for comparison/debugging)
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);

        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }

        mat
    }

    /// Get stored entry count (duplicates included)
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Sparse Cholesky solver for symmetric positive definite matrices
///
/// Skyline storage: each row keeps the entries from its first non-zero
/// column up to the diagonal.
pub struct SparseCholeskySolver {
    size: usize,
    skyline: Vec<Vec<f64>>,
    // Distance from diagonal to first non-zero on each row
    heights: Vec<usize>,
    // Diagonal before factorisation, for the relative pivot test
    diagonal: Vec<f64>,
}

impl SparseCholeskySolver {
    /// Create solver from CSR matrix (lower triangle is read)
    pub fn new(csr: &CsrMatrix<f64>) -> Self {
        let size = csr.nrows();

        let mut heights = vec![0usize; size];
        for (row, col, _val) in csr.triplet_iter() {
            if col < row {
                heights[row] = heights[row].max(row - col);
            }
        }

        let mut skyline: Vec<Vec<f64>> = heights.iter().map(|&h| vec![0.0; h + 1]).collect();
        let mut diagonal = vec![0.0; size];

        for (row, col, &val) in csr.triplet_iter() {
            if col <= row {
                let start = row - heights[row];
                skyline[row][col - start] += val;
                if col == row {
                    diagonal[row] += val;
                }
            }
        }

        Self {
            size,
            skyline,
            heights,
            diagonal,
        }
    }

    /// Factorize in place as `L * L^T`.
    ///
    /// A pivot that is non-positive, or smaller than `tolerance` times the
    /// diagonal entry before factorisation, marks the system as singular or
    /// ill-conditioned.
    pub fn factorize(&mut self, tolerance: f64) -> BridgeResult<()> {
        for i in 0..self.size {
            let hi = self.heights[i];
            let start_i = i - hi;

            // L[i,j] for j < i
            for j in start_i..i {
                let hj = self.heights[j];
                let start_j = j - hj;

                let mut sum = 0.0;
                for k in start_i.max(start_j)..j {
                    sum += self.get(i, k) * self.get(j, k);
                }

                let idx = j - start_i;
                self.skyline[i][idx] = (self.skyline[i][idx] - sum) / self.skyline[j][hj];
            }

            // L[i,i]
            let mut sum = 0.0;
            for j in start_i..i {
                let val = self.get(i, j);
                sum += val * val;
            }

            let pivot = self.skyline[i][hi] - sum;
            let scale = self.diagonal[i].abs();
            if !pivot.is_finite() || pivot <= 0.0 || pivot <= tolerance * scale {
                return Err(BridgeError::SingularSystem(format!(
                    "singular or ill-conditioned: pivot {pivot:.3e} at free DOF {i} \
                     is below pivot_tolerance {tolerance:.1e} x diagonal {scale:.3e}; \
                     check for a rigid-body mode or relax the tolerance"
                )));
            }
            self.skyline[i][hi] = pivot.sqrt();
        }

        Ok(())
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> f64 {
        if col > row {
            return self.get(col, row);
        }
        let start = row - self.heights[row];
        if col < start {
            return 0.0;
        }
        self.skyline[row][col - start]
    }

    /// Solve `L * L^T * x = b` with a factorized matrix
    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        let mut x = b.clone();

        // Forward substitution: L * y = b
        for i in 0..self.size {
            let start = i - self.heights[i];

            let mut sum = 0.0;
            for j in start..i {
                sum += self.get(i, j) * x[j];
            }

            x[i] = (x[i] - sum) / self.get(i, i);
        }

        // Backward substitution: L^T * x = y
        for i in (0..self.size).rev() {
            x[i] /= self.get(i, i);

            let start = i - self.heights[i];
            for j in start..i {
                x[j] -= self.get(i, j) * x[i];
            }
        }

        x
    }
}

/// Sparse matrix-vector multiplication
pub fn csr_matvec(csr: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    let n = csr.nrows();
    let mut y = DVector::zeros(n);

    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    for row in 0..n {
        let mut sum = 0.0;
        for idx in row_offsets[row]..row_offsets[row + 1] {
            sum += values[idx] * x[col_indices[idx]];
        }
        y[row] = sum;
    }

    y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tridiagonal(n: usize) -> SparseMatrixBuilder {
        let mut builder = SparseMatrixBuilder::new(n);
        for i in 0..n {
            builder.add(i, i, 4.0);
            if i + 1 < n {
                builder.add(i, i + 1, -1.0);
                builder.add(i + 1, i, -1.0);
            }
        }
        builder
    }

    #[test]
    fn test_sparse_builder_accumulates() {
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add(0, 0, 4.0);
        builder.add(0, 0, 1.0);
        builder.add(1, 1, 0.0);

        let dense = builder.to_dense();
        assert!((dense[(0, 0)] - 5.0).abs() < 1e-12);
        assert_eq!(builder.nnz(), 2);

        let csr = builder.to_csr();
        assert_eq!(csr.nnz(), 1);
    }

    #[test]
    fn test_cholesky_solve() {
        let builder = tridiagonal(5);
        let csr = builder.to_csr();
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);

        let mut solver = SparseCholeskySolver::new(&csr);
        solver.factorize(1e-12).unwrap();
        let x = solver.solve(&b);

        let residual = (&csr_matvec(&csr, &x) - &b).norm();
        assert!(residual < 1e-10, "Residual: {}", residual);
    }

    #[test]
    fn test_cholesky_detects_singular() {
        // Free-free spring: rigid-body translation
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add(0, 0, 1.0);
        builder.add(0, 1, -1.0);
        builder.add(1, 0, -1.0);
        builder.add(1, 1, 1.0);

        let mut solver = SparseCholeskySolver::new(&builder.to_csr());
        let err = solver.factorize(1e-10).unwrap_err();
        assert!(matches!(err, BridgeError::SingularSystem(_)));
    }
}
