use std::fmt;

use crate::error::{ReorderError, Result};
use crate::memory::{DataType, MemoryDesc};

/// A 4D FP32 convolution weight tensor.
///
/// Layout is OIHW (output channels, input channels, kernel height, kernel
/// width). A grouped tensor carries a leading group dim and is described as
/// GOIHW; only a single group is ever reorderable.
#[derive(Clone)]
pub struct WeightTensor {
    pub oc: usize,
    pub ic: usize,
    pub kh: usize,
    pub kw: usize,
    groups: Option<usize>,
    pub data: Vec<f32>,
}

impl WeightTensor {
    pub fn new(oc: usize, ic: usize, kh: usize, kw: usize) -> Self {
        WeightTensor {
            oc,
            ic,
            kh,
            kw,
            groups: None,
            data: vec![0.0; oc * ic * kh * kw],
        }
    }

    /// Zero-filled grouped tensor `[groups, oc, ic, kh, kw]`.
    pub fn grouped(groups: usize, oc: usize, ic: usize, kh: usize, kw: usize) -> Self {
        WeightTensor {
            oc,
            ic,
            kh,
            kw,
            groups: Some(groups),
            data: vec![0.0; groups * oc * ic * kh * kw],
        }
    }

    pub fn from_vec(oc: usize, ic: usize, kh: usize, kw: usize, data: Vec<f32>) -> Result<Self> {
        let expected = oc * ic * kh * kw;
        if data.len() != expected {
            return Err(ReorderError::invalid(format!(
                "weight data has {} elements, {}x{}x{}x{} needs {}",
                data.len(),
                oc,
                ic,
                kh,
                kw,
                expected
            )));
        }
        Ok(WeightTensor {
            oc,
            ic,
            kh,
            kw,
            groups: None,
            data,
        })
    }

    pub fn groups(&self) -> usize {
        self.groups.unwrap_or(1)
    }

    pub fn fill(&mut self, val: f32) {
        self.data.fill(val);
    }

    /// Source descriptor matching this tensor's shape and format.
    pub fn desc(&self) -> MemoryDesc {
        match self.groups {
            Some(g) => MemoryDesc::goihw(DataType::F32, g, self.oc, self.ic, self.kh, self.kw),
            None => MemoryDesc::oihw(DataType::F32, self.oc, self.ic, self.kh, self.kw),
        }
    }
}

impl fmt::Display for WeightTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.groups {
            Some(g) => write!(f, "{}x{}x{}x{}x{} (f32)", g, self.oc, self.ic, self.kh, self.kw),
            None => write!(f, "{}x{}x{}x{} (f32)", self.oc, self.ic, self.kh, self.kw),
        }
    }
}
