use crate::error::{ReorderError, Result};
use crate::tensor::try_zeroed;

/// Intermediate buffers owned by one reorder instance.
///
/// Sized once from the filter count and tile geometry; dropped with the
/// instance.
pub(crate) struct ScratchArena {
    /// HWIO copy of the source weights, `r * r * z`.
    pub transposed: Vec<f32>,
    /// Half-transformed filters, `r * alpha * z`.
    pub workspace: Vec<f32>,
    /// Winograd-domain coefficients, `alpha * alpha * z`.
    pub coeffs_f32: Vec<f32>,
    /// Quantized coefficients, `alpha * alpha * z`.
    pub coeffs_s8: Vec<i8>,
}

impl ScratchArena {
    pub fn new(z: usize, alpha: usize, r: usize) -> Result<Self> {
        let transposed_len = checked_len(&[r, r, z])?;
        let workspace_len = checked_len(&[r, alpha, z])?;
        let coeffs_len = checked_len(&[alpha, alpha, z])?;
        Ok(ScratchArena {
            transposed: try_zeroed(transposed_len, "transpose scratch")?,
            workspace: try_zeroed(workspace_len, "transform workspace")?,
            coeffs_f32: try_zeroed(coeffs_len, "f32 coefficient scratch")?,
            coeffs_s8: try_zeroed(coeffs_len, "s8 coefficient scratch")?,
        })
    }

    pub fn size_bytes(&self) -> usize {
        (self.transposed.len() + self.workspace.len() + self.coeffs_f32.len())
            * std::mem::size_of::<f32>()
            + self.coeffs_s8.len()
    }
}

fn checked_len(factors: &[usize]) -> Result<usize> {
    factors
        .iter()
        .try_fold(1usize, |acc, &f| acc.checked_mul(f))
        .filter(|&n| n.checked_mul(std::mem::size_of::<f32>()).is_some())
        .ok_or(ReorderError::OutOfMemory {
            what: "scratch size computation",
            bytes: usize::MAX,
        })
}
