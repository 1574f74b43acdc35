use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::engine::RollingFitEngine;
use crate::factor_matrix::FactorMatrix;
use crate::model::returns::ReturnsMatrix;

/// Row-labelled log-return panel as read by `svcj-fit`: one inner vec per time step.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnsPanel {
    pub index: Vec<String>,
    pub assets: Vec<String>,
    pub returns: Vec<Vec<f64>>,
}

impl ReturnsPanel {
    pub fn from_json(s: &str) -> Result<Self> {
        let panel: ReturnsPanel = serde_json::from_str(s).context("failed to parse returns panel")?;
        panel.to_dense()?;
        Ok(panel)
    }

    /// Time-major flattening of `returns`.
    pub fn to_dense(&self) -> Result<Vec<f64>> {
        if self.index.len() != self.returns.len() {
            bail!(
                "index has {} rows but returns has {}",
                self.index.len(),
                self.returns.len()
            );
        }
        let cols = self.assets.len();
        let mut dense = Vec::with_capacity(self.returns.len() * cols);
        for (t, row) in self.returns.iter().enumerate() {
            if row.len() != cols {
                bail!(
                    "row {} ({}) has {} values, expected {}",
                    t,
                    self.index[t],
                    row.len(),
                    cols
                );
            }
            dense.extend_from_slice(row);
        }
        Ok(dense)
    }

    pub fn fit(&self, engine: &RollingFitEngine, parallel: bool) -> Result<FactorMatrix<String>> {
        let dense = self.to_dense()?;
        let matrix = ReturnsMatrix::new(&dense, self.returns.len(), self.assets.len())?;
        let fit = if parallel {
            engine.fit_parallel(&matrix)?
        } else {
            engine.fit(&matrix)?
        };
        Ok(FactorMatrix::from_fit(&fit, &self.assets, &self.index)?)
    }
}
