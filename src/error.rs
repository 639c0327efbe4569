use thiserror::Error;

/// Status reported when creating or running a weight reorder.
///
/// Every variant is produced before the compute pipeline starts, so an
/// error never leaves a partially written destination behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    /// Shape, data type, layout or group mismatch between the descriptors.
    #[error("invalid arguments: {reason}")]
    InvalidArguments { reason: String },
    /// Scratch allocation failed while constructing the reorder.
    #[error("out of memory: could not allocate {bytes} bytes of {what}")]
    OutOfMemory { what: &'static str, bytes: usize },
    /// Descriptor initialization rejected the configuration.
    #[error("unimplemented: {reason}")]
    Unimplemented { reason: String },
}

impl ReorderError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ReorderError::InvalidArguments {
            reason: reason.into(),
        }
    }

    pub(crate) fn unimplemented(reason: impl Into<String>) -> Self {
        ReorderError::Unimplemented {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReorderError>;
