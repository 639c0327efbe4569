use std::fmt;

use crate::error::{ReorderError, Result};
use crate::memory::{MemoryDesc, WinogradLayoutDescriptor};

/// Pre-transformed int8 Winograd weights with their zero-point compensation.
///
/// `coefficients` follows [`WinogradLayoutDescriptor::coefficient_offset`]
/// and `bias` follows [`WinogradLayoutDescriptor::bias_offset`]. Padding
/// lanes are zero in both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinogradWeights {
    pub layout: WinogradLayoutDescriptor,
    pub coefficients: Vec<i8>,
    pub bias: Vec<i32>,
}

impl WinogradWeights {
    /// Allocates a zero-filled buffer for `layout`.
    pub fn zeroed(layout: WinogradLayoutDescriptor) -> Result<Self> {
        let (coeff_len, bias_len, _) = layout.checked_sizes().ok_or(ReorderError::OutOfMemory {
            what: "winograd buffer size computation",
            bytes: usize::MAX,
        })?;
        let coefficients = try_zeroed::<i8>(coeff_len, "winograd coefficients")?;
        let bias = try_zeroed::<i32>(bias_len, "winograd bias")?;
        Ok(WinogradWeights {
            layout,
            coefficients,
            bias,
        })
    }

    pub fn coefficient(&self, u_h: usize, u_w: usize, oc: usize, ic: usize) -> i8 {
        self.coefficients[self.layout.coefficient_offset(u_h, u_w, oc, ic)]
    }

    pub fn bias(&self, u_h: usize, u_w: usize, oc: usize) -> i32 {
        self.bias[self.layout.bias_offset(u_h, u_w, oc)]
    }

    pub fn desc(&self) -> MemoryDesc {
        MemoryDesc::wino(self.layout)
    }

    pub fn byte_len(&self) -> usize {
        self.layout.size_bytes()
    }

    /// Serializes to the contiguous `[int8 coefficients][int32 bias]` form.
    /// Bias words are little-endian.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        out.extend(self.coefficients.iter().map(|&c| c as u8));
        for b in &self.bias {
            out.extend_from_slice(&b.to_le_bytes());
        }
        out
    }

    /// Decodes the contiguous form written by [`WinogradWeights::to_bytes`].
    pub fn from_bytes(layout: WinogradLayoutDescriptor, bytes: &[u8]) -> Result<Self> {
        let needed = layout.checked_sizes().map(|(_, _, bytes)| bytes);
        if needed != Some(bytes.len()) {
            return Err(ReorderError::invalid(format!(
                "winograd buffer has {} bytes, layout {} needs {}",
                bytes.len(),
                layout,
                needed.map_or_else(|| "more than usize::MAX".to_string(), |n| n.to_string())
            )));
        }
        let (coeff_bytes, bias_bytes) = bytes.split_at(layout.bias_byte_offset());
        let coefficients = coeff_bytes.iter().map(|&b| b as i8).collect();
        let bias = bias_bytes
            .chunks_exact(4)
            .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Ok(WinogradWeights {
            layout,
            coefficients,
            bias,
        })
    }
}

impl fmt::Display for WinogradWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.layout, self.byte_len())
    }
}

/// Zero-filled vector whose allocation failure is reported instead of aborting.
pub(crate) fn try_zeroed<T: Clone + Default>(len: usize, what: &'static str) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| ReorderError::OutOfMemory {
            what,
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    v.resize(len, T::default());
    Ok(v)
}
