//! The four stages of the int8 Winograd weight reorder.
//!
//! Transpose OIHW weights to HWIO, transform every filter with `G * g * G^T`,
//! quantize, then pack into channel blocks with zero-point compensation.
//! Each stage is a blocking rayon fan-out, so a stage only starts once every
//! worker of the previous one has finished.

mod basis;
mod pack;
mod simd;
mod transform;
mod transpose;

pub use basis::{TransformBasis, F2X2_3X3, F4X4_3X3};
pub use pack::{pack_blocked, ACTIVATION_ZERO_POINT};
pub use simd::{axpy_f32, sum_i8};
pub use transform::{transform_filters, LANES};
pub use transpose::transpose_oihw_to_hwio;
