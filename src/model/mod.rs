pub mod params;
pub mod returns;
pub mod tensor;

pub use params::{Factor, ParameterVector, NUM_PARAMS};
pub use returns::{ReturnsMatrix, StridedColumn};
pub use tensor::DriftTensor;
