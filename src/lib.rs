//! Load-time reorder of FP32 convolution weights into the int8 Winograd encoding.
//!
//! The reorder transposes OIHW weights, transforms each 3x3 filter into the
//! Winograd domain, quantizes the coefficients with saturation and packs them
//! into channel blocks together with the int32 zero-point compensation an
//! integer Winograd convolution adds back to its accumulators.
//!
//! # Example
//!
//! ```no_run
//! use wino_reorder::memory::{MemoryDesc, WinogradLayoutDescriptor};
//! use wino_reorder::reorder::{reorder_weights, ReorderAttr};
//! use wino_reorder::tensor::WeightTensor;
//!
//! let mut weights = WeightTensor::new(16, 16, 3, 3);
//! weights.fill(1.0);
//! let layout = WinogradLayoutDescriptor::for_weights(16, 16).unwrap();
//! let packed = reorder_weights(&weights, &MemoryDesc::wino(layout), &ReorderAttr::default()).unwrap();
//! assert_eq!(packed.to_bytes().len(), layout.size_bytes());
//! ```

/// Error type shared by every fallible operation.
pub mod error;
/// Memory descriptors: data types, weight formats and the Winograd layout.
pub mod memory;
/// Rounding modes and saturating int8 quantization.
pub mod quantization;
/// Reorder strategies, creation-time validation and execution.
pub mod reorder;
/// FP32 source weights and packed Winograd weights.
pub mod tensor;
/// Transpose, transform and packing stages.
pub mod winograd;

pub use error::{ReorderError, Result};
