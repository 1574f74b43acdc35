pub mod config;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod factor_matrix;
pub mod model;
pub mod panel;

pub use engine::{roll_count, rolling_fit, RollingFit, RollingFitConfig, RollingFitEngine};
pub use error::FitError;
pub use estimator::{VariancePolicy, WindowEstimator};
pub use factor_matrix::{factor_columns, FactorMatrix};
pub use model::{DriftTensor, Factor, ParameterVector, ReturnsMatrix, StridedColumn, NUM_PARAMS};
pub use panel::ReturnsPanel;
