use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Elements per parallel work item when quantizing a coefficient buffer.
const QUANT_CHUNK: usize = 4096;

/// Rounding applied to a scaled value before it is saturated to int8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundMode {
    /// Round half to even.
    #[default]
    Nearest,
    /// Round toward negative infinity.
    Down,
    /// Truncate toward zero.
    TowardZero,
}

impl RoundMode {
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            RoundMode::Nearest => x.round_ties_even(),
            RoundMode::Down => x.floor(),
            RoundMode::TowardZero => x.trunc(),
        }
    }
}

/// Parameters for scaling quantization: `q = saturate(round(value * scale))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantParams {
    pub scale: f32,
    pub round_mode: RoundMode,
}

impl QuantParams {
    pub fn new(scale: f32, round_mode: RoundMode) -> Self {
        QuantParams { scale, round_mode }
    }
}

/// Clamps to the int8 range. NaN maps to zero.
#[inline]
pub fn saturate_s8(x: f32) -> i8 {
    if x.is_nan() {
        return 0;
    }
    x.clamp(i8::MIN as f32, i8::MAX as f32) as i8
}

/// Quantizes one value: round first, then clamp.
#[inline]
pub fn quantize_s8(value: f32, params: &QuantParams) -> i8 {
    saturate_s8(params.round_mode.apply(value * params.scale))
}

/// Quantizes `src` into `dst` element-wise.
///
/// Returns how many values fell outside the int8 range and were clamped.
pub fn quantize_slice(src: &[f32], params: &QuantParams, dst: &mut [i8]) -> usize {
    assert_eq!(src.len(), dst.len(), "quantize_slice: length mismatch");
    dst.par_chunks_mut(QUANT_CHUNK)
        .zip(src.par_chunks(QUANT_CHUNK))
        .map(|(out, inp)| {
            let mut clamped = 0usize;
            for (q, &v) in out.iter_mut().zip(inp.iter()) {
                let rounded = params.round_mode.apply(v * params.scale);
                if rounded > i8::MAX as f32 || rounded < i8::MIN as f32 {
                    clamped += 1;
                }
                *q = saturate_s8(rounded);
            }
            clamped
        })
        .sum()
}
