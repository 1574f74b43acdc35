use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FitError {
    #[error("window size must be > 0")]
    InvalidWindowSize,

    #[error("step size must be > 0")]
    InvalidStepSize,

    #[error("returns buffer has {actual} values, expected {rows} x {cols} = {expected}")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },

    #[error("output buffer has {actual} values, fit needs {required}")]
    OutputTooSmall { required: usize, actual: usize },

    #[error("failed to allocate {what} of {len} values")]
    Allocation { what: &'static str, len: usize },

    #[error("{what} size overflows usize ({rolls} rolls x {assets} assets)")]
    CapacityOverflow {
        what: &'static str,
        rolls: usize,
        assets: usize,
    },

    #[error("got {actual} asset labels for {expected} assets")]
    AssetLabelMismatch { expected: usize, actual: usize },

    #[error("source index has {actual} rows, fit covers {required}")]
    IndexTooShort { required: usize, actual: usize },
}
