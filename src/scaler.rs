//! Per-column min-max normalization fitted once on training data.
//!
//! Values outside the fitted range map outside `[0, 1]` and are never clamped:
//! an out-of-range feature is exactly what the detector needs to see.

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: Vec<f32>,
    max: Vec<f32>,
}

impl MinMaxScaler {
    /// Compute per-column min and max. Fails on a matrix with no rows.
    pub fn fit(matrix: ArrayView2<'_, f32>) -> Result<Self> {
        if matrix.nrows() == 0 {
            return Err(Error::EmptyDataset { stage: "no rows to fit the normalizer" });
        }
        let mut min = Vec::with_capacity(matrix.ncols());
        let mut max = Vec::with_capacity(matrix.ncols());
        for column in matrix.axis_iter(Axis(1)) {
            let (lo, hi) = column
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            min.push(lo);
            max.push(hi);
        }
        Ok(Self { min, max })
    }

    /// Number of columns this scaler was fitted on.
    pub fn dim(&self) -> usize {
        self.min.len()
    }

    pub fn min(&self) -> &[f32] {
        &self.min
    }

    pub fn max(&self) -> &[f32] {
        &self.max
    }

    /// Apply `(v - min) / (max - min)` per column; degenerate columns map to 0.
    pub fn transform(&self, matrix: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
        if matrix.ncols() != self.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                found: matrix.ncols(),
            });
        }
        let mut out = matrix.to_owned();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (lo, hi) = (self.min[j], self.max[j]);
            let range = hi - lo;
            if range == 0.0 {
                column.fill(0.0);
            } else {
                column.mapv_inplace(|v| (v - lo) / range);
            }
        }
        Ok(out)
    }
}
