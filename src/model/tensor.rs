use serde::Serialize;

use crate::error::FitError;
use crate::model::params::{Factor, ParameterVector, NUM_PARAMS};

/// Flattened (roll, asset, factor) estimates. Offset of a value is
/// `(roll * assets + asset) * NUM_PARAMS + factor`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftTensor {
    rolls: usize,
    assets: usize,
    data: Vec<f64>,
}

impl DriftTensor {
    pub fn empty(assets: usize) -> Self {
        Self {
            rolls: 0,
            assets,
            data: Vec::new(),
        }
    }

    /// Zero-filled tensor, or `FitError::Allocation` if the buffer cannot be reserved.
    pub fn try_zeroed(rolls: usize, assets: usize) -> Result<Self, FitError> {
        let len = tensor_len(rolls, assets)?;
        let data = try_alloc_zeroed(len, "drift tensor")?;
        Ok(Self { rolls, assets, data })
    }

    pub fn rolls(&self) -> usize {
        self.rolls
    }

    pub fn assets(&self) -> usize {
        self.assets
    }

    pub fn is_empty(&self) -> bool {
        self.rolls == 0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn offset(&self, roll: usize, asset: usize) -> usize {
        (roll * self.assets + asset) * NUM_PARAMS
    }

    pub fn params(&self, roll: usize, asset: usize) -> ParameterVector {
        let at = self.offset(roll, asset);
        let mut out = [0.0; NUM_PARAMS];
        out.copy_from_slice(&self.data[at..at + NUM_PARAMS]);
        ParameterVector(out)
    }

    pub fn value(&self, roll: usize, asset: usize, factor: Factor) -> f64 {
        self.data[self.offset(roll, asset) + factor.index()]
    }

    /// All assets' parameters for one roll, asset-major.
    pub fn roll_row(&self, roll: usize) -> &[f64] {
        let width = self.assets * NUM_PARAMS;
        &self.data[roll * width..(roll + 1) * width]
    }

    /// One asset's path for one factor across all rolls.
    pub fn factor_series(&self, asset: usize, factor: Factor) -> Vec<f64> {
        (0..self.rolls)
            .map(|r| self.value(r, asset, factor))
            .collect()
    }
}

pub(crate) fn tensor_len(rolls: usize, assets: usize) -> Result<usize, FitError> {
    rolls
        .checked_mul(assets)
        .and_then(|n| n.checked_mul(NUM_PARAMS))
        .ok_or(FitError::CapacityOverflow {
            what: "drift tensor",
            rolls,
            assets,
        })
}

pub(crate) fn try_alloc_zeroed(len: usize, what: &'static str) -> Result<Vec<f64>, FitError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| FitError::Allocation { what, len })?;
    buf.resize(len, 0.0);
    Ok(buf)
}
