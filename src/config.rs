use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::engine::RollingFitConfig;
use crate::estimator::VariancePolicy;
use crate::model::params::{Factor, ParameterVector};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub fit: FitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FitConfig {
    pub window_size: usize,
    pub step_size: usize,
    #[serde(default)]
    pub variance_policy: VariancePolicy,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub initial: InitialParamsConfig,
}

/// Per-factor overrides of the warm start. Missing entries keep the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitialParamsConfig {
    pub mu: Option<f64>,
    pub kappa: Option<f64>,
    pub theta: Option<f64>,
    pub sigma_v: Option<f64>,
    pub rho: Option<f64>,
    pub lambda: Option<f64>,
    #[serde(rename = "mu_J", alias = "mu_j")]
    pub mu_j: Option<f64>,
    #[serde(rename = "sigma_J", alias = "sigma_j")]
    pub sigma_j: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl InitialParamsConfig {
    pub fn to_params(&self) -> ParameterVector {
        let mut p = ParameterVector::default();
        let overrides = [
            (Factor::Mu, self.mu),
            (Factor::Kappa, self.kappa),
            (Factor::Theta, self.theta),
            (Factor::SigmaV, self.sigma_v),
            (Factor::Rho, self.rho),
            (Factor::Lambda, self.lambda),
            (Factor::MuJ, self.mu_j),
            (Factor::SigmaJ, self.sigma_j),
        ];
        for (factor, value) in overrides {
            if let Some(v) = value {
                p.set(factor, v);
            }
        }
        p
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            bail!("fit.window_size must be > 0");
        }
        if self.step_size == 0 {
            bail!("fit.step_size must be > 0");
        }
        let initial = self.initial.to_params();
        if !initial.is_finite() {
            bail!("fit.initial contains a non-finite value: {:?}", initial.as_slice());
        }
        Ok(())
    }

    pub fn rolling(&self) -> RollingFitConfig {
        RollingFitConfig {
            window_size: self.window_size,
            step_size: self.step_size,
            initial: self.initial.to_params(),
            variance_policy: self.variance_policy,
        }
    }
}

impl Config {
    pub fn parse(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).context("failed to parse config")?;
        config.fit.validate().context("fit section is invalid")?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&config_str).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Reads `.env`, then the file named by `SVCJ_CONFIG` or `config/default.toml`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let path = std::env::var("SVCJ_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }
}
