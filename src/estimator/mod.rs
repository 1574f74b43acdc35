pub mod window;

pub use window::{RawEstimates, VariancePolicy, WindowEstimator, WindowMoments};
