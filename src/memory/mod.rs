//! Memory descriptors for the weight encodings a reorder reads and writes.
//!
//! Only the subset of a full memory-descriptor object the Winograd reorder
//! needs: a data type, logical dims and a format tag. The Winograd format
//! embeds its own layout parameters so a consumer can decode the bytes
//! without re-deriving them.

mod wino_layout;

pub use wino_layout::{WinoFormat, WinogradLayoutDescriptor, DEFAULT_CHANNEL_BLOCK};

use std::fmt;

/// Element type of a memory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    F32,
    S8,
    S32,
}

impl DataType {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            DataType::F32 | DataType::S32 => 4,
            DataType::S8 => 1,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::F32 => write!(f, "f32"),
            DataType::S8 => write!(f, "s8"),
            DataType::S32 => write!(f, "s32"),
        }
    }
}

/// Layout tag of a weight tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightFormat {
    /// Plain `[oc, ic, kh, kw]`.
    Oihw,
    /// Grouped `[g, oc, ic, kh, kw]`.
    Goihw,
    /// Pre-transformed Winograd weights.
    Wino(WinogradLayoutDescriptor),
}

impl WeightFormat {
    /// Number of dims a descriptor with this format carries.
    pub fn ndims(&self) -> usize {
        match self {
            WeightFormat::Goihw => 5,
            WeightFormat::Oihw | WeightFormat::Wino(_) => 4,
        }
    }
}

impl fmt::Display for WeightFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightFormat::Oihw => write!(f, "oihw"),
            WeightFormat::Goihw => write!(f, "goihw"),
            WeightFormat::Wino(layout) => write!(f, "wino:{}", layout.wino_format),
        }
    }
}

/// Data type, logical dims and format of one memory region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDesc {
    pub data_type: DataType,
    pub dims: Vec<usize>,
    pub format: WeightFormat,
}

impl MemoryDesc {
    pub fn oihw(data_type: DataType, oc: usize, ic: usize, kh: usize, kw: usize) -> Self {
        MemoryDesc {
            data_type,
            dims: vec![oc, ic, kh, kw],
            format: WeightFormat::Oihw,
        }
    }

    pub fn goihw(
        data_type: DataType,
        groups: usize,
        oc: usize,
        ic: usize,
        kh: usize,
        kw: usize,
    ) -> Self {
        MemoryDesc {
            data_type,
            dims: vec![groups, oc, ic, kh, kw],
            format: WeightFormat::Goihw,
        }
    }

    /// Destination descriptor for the int8 Winograd encoding.
    pub fn wino(layout: WinogradLayoutDescriptor) -> Self {
        MemoryDesc {
            data_type: DataType::S8,
            dims: vec![layout.oc, layout.ic, layout.r, layout.r],
            format: WeightFormat::Wino(layout),
        }
    }

    /// Group count; 1 for ungrouped formats.
    pub fn groups(&self) -> usize {
        match self.format {
            WeightFormat::Goihw => self.dims.first().copied().unwrap_or(0),
            _ => 1,
        }
    }

    /// `[oc, ic, kh, kw]` with any group dim stripped.
    ///
    /// Returns `None` when the dim count does not match the format.
    pub fn weight_dims(&self) -> Option<[usize; 4]> {
        if self.dims.len() != self.format.ndims() {
            return None;
        }
        let d = &self.dims[self.dims.len() - 4..];
        Some([d[0], d[1], d[2], d[3]])
    }

    pub fn wino_layout(&self) -> Option<&WinogradLayoutDescriptor> {
        match &self.format {
            WeightFormat::Wino(layout) => Some(layout),
            _ => None,
        }
    }

    pub fn nelems(&self) -> usize {
        self.dims.iter().product()
    }

    /// Bytes the region occupies. For the Winograd format this includes the
    /// trailing int32 bias block.
    pub fn size_bytes(&self) -> usize {
        match &self.format {
            WeightFormat::Wino(layout) => layout.size_bytes(),
            _ => self.nelems() * self.data_type.size(),
        }
    }
}

impl fmt::Display for MemoryDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dims.iter().map(|d| d.to_string()).collect();
        write!(f, "{} {} ({})", self.format, dims.join("x"), self.data_type)
    }
}
