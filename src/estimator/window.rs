use serde::Deserialize;

use crate::model::params::{Factor, ParameterVector};

const TRADING_DAYS: f64 = 252.0;
const VOL_PIVOT: f64 = 0.2;
const WARM_WEIGHT: f64 = 0.1;
const RAW_WEIGHT: f64 = 0.9;
const PARAM_FLOOR: f64 = 1e-6;

/// What to do when `E[x^2] - m^2` rounds below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariancePolicy {
    /// Take the square root as-is; a negative variance yields NaN downstream.
    #[default]
    Propagate,
    /// Clamp variance at zero before the square root.
    ClampAtZero,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowMoments {
    pub mean: f64,
    pub variance: f64,
}

impl WindowMoments {
    /// Sample mean and population variance (no Bessel correction).
    pub fn from_window(window: &[f64]) -> Self {
        let n = window.len() as f64;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for &x in window {
            sum += x;
            sum_sq += x * x;
        }
        let mean = sum / n;
        Self {
            mean,
            variance: sum_sq / n - mean * mean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawEstimates {
    pub kappa: f64,
    pub theta: f64,
    pub sigma_v: f64,
    pub lambda: f64,
}

impl RawEstimates {
    pub fn from_annual_vol(vol: f64) -> Self {
        let excess = vol - VOL_PIVOT;
        Self {
            kappa: 1.5 + excess * 8.0,
            theta: vol * vol,
            sigma_v: 0.3 + excess * 3.0,
            lambda: 0.1 + excess * 2.0,
        }
    }
}

/// Closed-form SVCJ update for one window, smoothed against the warm start.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowEstimator {
    policy: VariancePolicy,
}

impl WindowEstimator {
    pub fn new(policy: VariancePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> VariancePolicy {
        self.policy
    }

    pub fn annual_vol(&self, variance: f64) -> f64 {
        let v = match self.policy {
            VariancePolicy::Propagate => variance,
            VariancePolicy::ClampAtZero => variance.max(0.0),
        };
        (v * TRADING_DAYS).sqrt()
    }

    /// `window` must be non-empty.
    pub fn estimate(&self, window: &[f64], previous: &ParameterVector) -> ParameterVector {
        let mut next = *previous;
        self.estimate_in_place(window, &mut next);
        next
    }

    /// Same as [`estimate`](Self::estimate) but overwrites the warm start.
    pub fn estimate_in_place(&self, window: &[f64], params: &mut ParameterVector) {
        debug_assert!(!window.is_empty(), "window must hold at least one return");
        let moments = WindowMoments::from_window(window);
        self.update_from_variance(moments.variance, params);
    }

    /// Blends and floors kappa, theta, sigma_v and lambda only; carried factors are never floored.
    pub fn update_from_variance(&self, variance: f64, params: &mut ParameterVector) {
        let raw = RawEstimates::from_annual_vol(self.annual_vol(variance));
        blend(params, Factor::Kappa, raw.kappa);
        blend(params, Factor::Theta, raw.theta);
        blend(params, Factor::SigmaV, raw.sigma_v);
        blend(params, Factor::Lambda, raw.lambda);

        for factor in Factor::ESTIMATED {
            // NaN compares false and passes through unfloored.
            if params.get(factor) < PARAM_FLOOR {
                params.set(factor, PARAM_FLOOR);
            }
        }
    }
}

fn blend(params: &mut ParameterVector, factor: Factor, raw: f64) {
    let prev = params.get(factor);
    params.set(factor, prev * WARM_WEIGHT + raw * RAW_WEIGHT);
}
