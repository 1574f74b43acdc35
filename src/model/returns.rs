use crate::error::FitError;

/// Borrowed time-major panel of log returns: `rows` time steps by `cols` assets.
#[derive(Debug, Clone, Copy)]
pub struct ReturnsMatrix<'a> {
    data: &'a [f64],
    rows: usize,
    cols: usize,
}

impl<'a> ReturnsMatrix<'a> {
    pub fn new(data: &'a [f64], rows: usize, cols: usize) -> Result<Self, FitError> {
        let expected = rows.checked_mul(cols).ok_or(FitError::ShapeMismatch {
            rows,
            cols,
            expected: usize::MAX,
            actual: data.len(),
        })?;
        if data.len() != expected {
            return Err(FitError::ShapeMismatch {
                rows,
                cols,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    pub fn time_steps(&self) -> usize {
        self.rows
    }

    pub fn assets(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }

    pub fn value(&self, t: usize, asset: usize) -> f64 {
        self.data[t * self.cols + asset]
    }

    pub fn column(&self, asset: usize) -> StridedColumn {
        assert!(asset < self.cols, "asset {} out of range ({} assets)", asset, self.cols);
        StridedColumn {
            base: asset,
            stride: self.cols,
            len: self.rows,
        }
    }
}

/// A column of a time-major buffer: element `i` lives at `base + i * stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StridedColumn {
    pub base: usize,
    pub stride: usize,
    pub len: usize,
}

impl StridedColumn {
    pub fn iter<'d>(&self, data: &'d [f64]) -> impl Iterator<Item = f64> + 'd {
        data.iter()
            .skip(self.base)
            .step_by(self.stride.max(1))
            .take(self.len)
            .copied()
    }

    /// Copies the column into the head of `out`. `out` must hold at least `len` values.
    pub fn copy_into(&self, data: &[f64], out: &mut [f64]) {
        for (dst, src) in out[..self.len].iter_mut().zip(self.iter(data)) {
            *dst = src;
        }
    }
}
