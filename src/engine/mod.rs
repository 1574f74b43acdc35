pub mod rolling;

pub use rolling::{roll_count, rolling_fit, RollingFit, RollingFitConfig, RollingFitEngine};
