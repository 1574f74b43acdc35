use serde::{Deserialize, Serialize};

use crate::engine::RollingFit;
use crate::error::FitError;
use crate::model::params::{Factor, NUM_PARAMS};

/// `{asset}_{factor}` labels, asset-major with factors in positional order.
pub fn factor_columns<S: AsRef<str>>(assets: &[S]) -> Vec<String> {
    assets
        .iter()
        .flat_map(|asset| {
            Factor::ALL
                .iter()
                .map(move |f| format!("{}_{}", asset.as_ref(), f.name()))
        })
        .collect()
}

/// Labelled `rolls x (assets * 8)` view of a rolling fit. Row `i` is stamped
/// with the source index entry at which its window ends.
/// Non-finite cells are written as `"NaN"`, `"inf"` or `"-inf"` so they stay
/// distinguishable from missing values in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorMatrix<I> {
    pub index: Vec<I>,
    pub columns: Vec<String>,
    #[serde(with = "cells")]
    pub rows: Vec<Vec<f64>>,
}

impl<I: Clone> FactorMatrix<I> {
    pub fn from_fit<S: AsRef<str>>(
        fit: &RollingFit,
        assets: &[S],
        source_index: &[I],
    ) -> Result<Self, FitError> {
        let tensor = &fit.tensor;
        if assets.len() != tensor.assets() {
            return Err(FitError::AssetLabelMismatch {
                expected: tensor.assets(),
                actual: assets.len(),
            });
        }
        if source_index.len() < fit.time_steps {
            return Err(FitError::IndexTooShort {
                required: fit.time_steps,
                actual: source_index.len(),
            });
        }

        let rolls = fit.rolls();
        let index = (0..rolls)
            .map(|r| source_index[fit.roll_end_index(r)].clone())
            .collect();
        let rows = (0..rolls).map(|r| tensor.roll_row(r).to_vec()).collect();
        Ok(Self {
            index,
            columns: factor_columns(assets),
            rows,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn column(&self, label: &str) -> Option<Vec<f64>> {
        let at = self.columns.iter().position(|c| c == label)?;
        Some(self.rows.iter().map(|row| row[at]).collect())
    }

    pub fn asset_count(&self) -> usize {
        self.columns.len() / NUM_PARAMS
    }

    /// Labels of columns holding at least one NaN or infinite cell.
    pub fn non_finite_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(at, _)| self.rows.iter().any(|row| !row[*at].is_finite()))
            .map(|(_, label)| label.as_str())
            .collect()
    }
}

mod cells {
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Num(f64),
        Text(String),
    }

    fn encode(v: f64) -> Cell {
        if v.is_nan() {
            Cell::Text("NaN".to_string())
        } else if v == f64::INFINITY {
            Cell::Text("inf".to_string())
        } else if v == f64::NEG_INFINITY {
            Cell::Text("-inf".to_string())
        } else {
            Cell::Num(v)
        }
    }

    fn decode<E: de::Error>(cell: Cell) -> Result<f64, E> {
        match cell {
            Cell::Num(v) => Ok(v),
            Cell::Text(t) => match t.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(E::custom(format!("invalid factor cell `{}`", other))),
            },
        }
    }

    pub fn serialize<S: Serializer>(rows: &[Vec<f64>], s: S) -> Result<S::Ok, S::Error> {
        let encoded: Vec<Vec<Cell>> = rows
            .iter()
            .map(|row| row.iter().map(|v| encode(*v)).collect())
            .collect();
        encoded.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<f64>>, D::Error> {
        let raw: Vec<Vec<Cell>> = Vec::deserialize(d)?;
        raw.into_iter()
            .map(|row| {
                row.into_iter()
                    .map(decode::<D::Error>)
                    .collect::<Result<Vec<f64>, D::Error>>()
            })
            .collect()
    }
}
