mod weights;
mod wino_weights;

pub use weights::WeightTensor;
pub use wino_weights::WinogradWeights;

pub(crate) use wino_weights::try_zeroed;
