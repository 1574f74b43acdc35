use rayon::prelude::*;

use crate::error::FitError;
use crate::estimator::{VariancePolicy, WindowEstimator};
use crate::model::params::{ParameterVector, NUM_PARAMS};
use crate::model::returns::ReturnsMatrix;
use crate::model::tensor::{tensor_len, try_alloc_zeroed, DriftTensor};

/// Number of full windows of `window_size` that fit in `time_steps` when
/// advancing by `step_size`. Zero when the series is shorter than one window.
pub fn roll_count(time_steps: usize, window_size: usize, step_size: usize) -> usize {
    if window_size == 0 || step_size == 0 || time_steps < window_size {
        return 0;
    }
    (time_steps - window_size) / step_size + 1
}

#[derive(Debug, Clone, Copy)]
pub struct RollingFitConfig {
    pub window_size: usize,
    pub step_size: usize,
    /// Warm start applied at the first window of every asset.
    pub initial: ParameterVector,
    pub variance_policy: VariancePolicy,
}

impl RollingFitConfig {
    pub fn new(window_size: usize, step_size: usize) -> Self {
        Self {
            window_size,
            step_size,
            initial: ParameterVector::default(),
            variance_policy: VariancePolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<(), FitError> {
        if self.window_size == 0 {
            return Err(FitError::InvalidWindowSize);
        }
        if self.step_size == 0 {
            return Err(FitError::InvalidStepSize);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollingFit {
    pub tensor: DriftTensor,
    pub time_steps: usize,
    pub window_size: usize,
    pub step_size: usize,
}

impl RollingFit {
    pub fn rolls(&self) -> usize {
        self.tensor.rolls()
    }

    /// Row of the source series at which roll `roll` ends.
    pub fn roll_end_index(&self, roll: usize) -> usize {
        self.window_size - 1 + roll * self.step_size
    }
}

#[derive(Debug, Clone)]
pub struct RollingFitEngine {
    cfg: RollingFitConfig,
    estimator: WindowEstimator,
}

impl RollingFitEngine {
    pub fn new(cfg: RollingFitConfig) -> Self {
        Self {
            estimator: WindowEstimator::new(cfg.variance_policy),
            cfg,
        }
    }

    pub fn config(&self) -> &RollingFitConfig {
        &self.cfg
    }

    pub fn rolls_for(&self, time_steps: usize) -> usize {
        roll_count(time_steps, self.cfg.window_size, self.cfg.step_size)
    }

    pub fn fit(&self, returns: &ReturnsMatrix<'_>) -> Result<RollingFit, FitError> {
        self.cfg.validate()?;
        let rolls = self.rolls_for(returns.time_steps());
        let mut tensor = if rolls == 0 {
            DriftTensor::empty(returns.assets())
        } else {
            DriftTensor::try_zeroed(rolls, returns.assets())?
        };
        self.fit_into(returns, tensor.as_mut_slice())?;
        Ok(self.wrap(returns, tensor))
    }

    /// Fills the head of a caller-owned buffer and returns the roll count.
    /// Nothing past `rolls * assets * NUM_PARAMS` is touched.
    pub fn fit_into(
        &self,
        returns: &ReturnsMatrix<'_>,
        out: &mut [f64],
    ) -> Result<usize, FitError> {
        self.cfg.validate()?;
        let time_steps = returns.time_steps();
        let assets = returns.assets();
        let rolls = self.rolls_for(time_steps);
        if rolls == 0 {
            tracing::warn!(
                time_steps,
                window_size = self.cfg.window_size,
                "Series shorter than one window, no rolls produced"
            );
            return Ok(0);
        }
        let required = tensor_len(rolls, assets)?;
        if out.len() < required {
            return Err(FitError::OutputTooSmall {
                required,
                actual: out.len(),
            });
        }

        if assets == 0 {
            tracing::info!(time_steps, rolls, "No assets in panel, nothing to fit");
            return Ok(rolls);
        }

        let mut scratch = try_alloc_zeroed(time_steps, "asset series")?;

        tracing::info!(
            assets,
            time_steps,
            rolls,
            window_size = self.cfg.window_size,
            step_size = self.cfg.step_size,
            "Starting rolling SVCJ fit"
        );
        for asset in 0..assets {
            self.fit_asset(returns, asset, &mut scratch, |roll, params| {
                let at = (roll * assets + asset) * NUM_PARAMS;
                out[at..at + NUM_PARAMS].copy_from_slice(params.as_slice());
            });
        }
        tracing::info!(assets, rolls, "Rolling SVCJ fit complete");
        Ok(rolls)
    }

    /// Same output as [`fit`](Self::fit), with assets spread over the rayon pool.
    /// Each worker owns its own asset series buffer.
    pub fn fit_parallel(&self, returns: &ReturnsMatrix<'_>) -> Result<RollingFit, FitError> {
        self.cfg.validate()?;
        let time_steps = returns.time_steps();
        let assets = returns.assets();
        let rolls = self.rolls_for(time_steps);
        if rolls == 0 {
            tracing::warn!(
                time_steps,
                window_size = self.cfg.window_size,
                "Series shorter than one window, no rolls produced"
            );
            return Ok(self.wrap(returns, DriftTensor::empty(assets)));
        }

        let mut tensor = DriftTensor::try_zeroed(rolls, assets)?;
        if assets == 0 {
            tracing::info!(time_steps, rolls, "No assets in panel, nothing to fit");
            return Ok(self.wrap(returns, tensor));
        }
        let per_asset = rolls
            .checked_mul(NUM_PARAMS)
            .ok_or(FitError::CapacityOverflow {
                what: "parallel staging",
                rolls,
                assets,
            })?;
        // Asset-major staging: each asset's rolls are one contiguous chunk.
        let mut by_asset = try_alloc_zeroed(tensor.as_slice().len(), "parallel staging")?;

        tracing::info!(
            assets,
            time_steps,
            rolls,
            window_size = self.cfg.window_size,
            step_size = self.cfg.step_size,
            threads = rayon::current_num_threads(),
            "Starting parallel rolling SVCJ fit"
        );
        by_asset
            .par_chunks_mut(per_asset)
            .enumerate()
            .try_for_each_init(
                || try_alloc_zeroed(time_steps, "asset series"),
                |scratch, (asset, chunk)| {
                    let scratch = match scratch {
                        Ok(buf) => buf,
                        Err(e) => return Err(e.clone()),
                    };
                    self.fit_asset(returns, asset, scratch, |roll, params| {
                        let at = roll * NUM_PARAMS;
                        chunk[at..at + NUM_PARAMS].copy_from_slice(params.as_slice());
                    });
                    Ok::<(), FitError>(())
                },
            )?;

        let out = tensor.as_mut_slice();
        for (asset, chunk) in by_asset.chunks(per_asset).enumerate() {
            for (roll, params) in chunk.chunks(NUM_PARAMS).enumerate() {
                let at = (roll * assets + asset) * NUM_PARAMS;
                out[at..at + NUM_PARAMS].copy_from_slice(params);
            }
        }
        tracing::info!(assets, rolls, "Parallel rolling SVCJ fit complete");
        Ok(self.wrap(returns, tensor))
    }

    fn fit_asset<F>(
        &self,
        returns: &ReturnsMatrix<'_>,
        asset: usize,
        scratch: &mut [f64],
        mut write: F,
    ) where
        F: FnMut(usize, &ParameterVector),
    {
        let time_steps = returns.time_steps();
        let window_size = self.cfg.window_size;
        returns.column(asset).copy_into(returns.as_slice(), scratch);
        let series = &scratch[..time_steps];

        let mut params = self.cfg.initial;
        let mut roll = 0usize;
        let mut start = 0usize;
        let mut non_finite = 0usize;
        while start + window_size <= time_steps {
            self.estimator
                .estimate_in_place(&series[start..start + window_size], &mut params);
            if !params.is_finite() {
                non_finite += 1;
            }
            write(roll, &params);
            roll += 1;
            start += self.cfg.step_size;
        }

        if non_finite > 0 {
            tracing::warn!(asset, non_finite, "Non-finite SVCJ estimates in rolling fit");
        }
        tracing::debug!(asset, rolls = roll, last = ?params.as_slice(), "Asset fit done");
    }

    fn wrap(&self, returns: &ReturnsMatrix<'_>, tensor: DriftTensor) -> RollingFit {
        RollingFit {
            tensor,
            time_steps: returns.time_steps(),
            window_size: self.cfg.window_size,
            step_size: self.cfg.step_size,
        }
    }
}

/// Fit with the default warm start and variance policy.
pub fn rolling_fit(
    returns: &ReturnsMatrix<'_>,
    window_size: usize,
    step_size: usize,
) -> Result<RollingFit, FitError> {
    RollingFitEngine::new(RollingFitConfig::new(window_size, step_size)).fit(returns)
}
