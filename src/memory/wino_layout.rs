use std::fmt;

use crate::error::{ReorderError, Result};

/// Channel block size the reference integer Winograd kernel consumes.
pub const DEFAULT_CHANNEL_BLOCK: usize = 16;

/// Identifies the byte encoding of pre-transformed Winograd weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WinoFormat {
    /// `[alpha][alpha][O][I][o][i]` int8 coefficients followed by
    /// `[alpha][alpha][oc]` int32 zero-point compensation.
    WeiAaOIoi,
}

impl fmt::Display for WinoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinoFormat::WeiAaOIoi => write!(f, "wei_aaOIoi"),
        }
    }
}

/// Layout parameters of a Winograd weight buffer.
///
/// `oc`/`ic` are the logical channel counts; `nb_oc * oc_block` and
/// `nb_ic * ic_block` are the padded counts the buffer is laid out for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinogradLayoutDescriptor {
    pub wino_format: WinoFormat,
    pub alpha: usize,
    pub r: usize,
    pub oc: usize,
    pub ic: usize,
    pub oc_block: usize,
    pub ic_block: usize,
    pub nb_oc: usize,
    pub nb_ic: usize,
}

impl WinogradLayoutDescriptor {
    /// Builds a layout, deriving the block counts by ceiling division.
    pub fn new(
        alpha: usize,
        r: usize,
        oc: usize,
        ic: usize,
        oc_block: usize,
        ic_block: usize,
    ) -> Result<Self> {
        if r == 0 || alpha < r {
            return Err(ReorderError::unimplemented(format!(
                "tile size alpha={} cannot hold a {}x{} kernel",
                alpha, r, r
            )));
        }
        if oc_block == 0 || ic_block == 0 {
            return Err(ReorderError::unimplemented("channel block size must be non-zero"));
        }
        Ok(WinogradLayoutDescriptor {
            wino_format: WinoFormat::WeiAaOIoi,
            alpha,
            r,
            oc,
            ic,
            oc_block,
            ic_block,
            nb_oc: oc.div_ceil(oc_block),
            nb_ic: ic.div_ceil(ic_block),
        })
    }

    /// F(2x2, 3x3) layout with 16-channel blocks.
    pub fn for_weights(oc: usize, ic: usize) -> Result<Self> {
        Self::new(4, 3, oc, ic, DEFAULT_CHANNEL_BLOCK, DEFAULT_CHANNEL_BLOCK)
    }

    /// Spatial output tile side (`alpha - r + 1`).
    pub fn output_tile(&self) -> usize {
        self.alpha + 1 - self.r
    }

    pub fn padded_oc(&self) -> usize {
        self.nb_oc * self.oc_block
    }

    pub fn padded_ic(&self) -> usize {
        self.nb_ic * self.ic_block
    }

    /// Number of Winograd-domain positions (`alpha * alpha`).
    pub fn positions(&self) -> usize {
        self.alpha * self.alpha
    }

    pub fn is_padded(&self) -> bool {
        self.padded_oc() != self.oc || self.padded_ic() != self.ic
    }

    pub fn coefficient_count(&self) -> usize {
        self.positions() * self.padded_oc() * self.padded_ic()
    }

    pub fn bias_count(&self) -> usize {
        self.positions() * self.padded_oc()
    }

    /// Byte offset where the int32 bias block starts.
    pub fn bias_byte_offset(&self) -> usize {
        self.coefficient_count()
    }

    pub fn size_bytes(&self) -> usize {
        self.coefficient_count() + self.bias_count() * std::mem::size_of::<i32>()
    }

    /// `(coefficient_count, bias_count, size_bytes)`, or `None` when any of
    /// them overflows `usize`. The unchecked accessors are only valid for
    /// layouts that pass this.
    pub fn checked_sizes(&self) -> Option<(usize, usize, usize)> {
        let padded_oc = self.nb_oc.checked_mul(self.oc_block)?;
        let padded_ic = self.nb_ic.checked_mul(self.ic_block)?;
        let bias = self.alpha.checked_mul(self.alpha)?.checked_mul(padded_oc)?;
        let coefficients = bias.checked_mul(padded_ic)?;
        let bytes = bias
            .checked_mul(std::mem::size_of::<i32>())?
            .checked_add(coefficients)?;
        Some((coefficients, bias, bytes))
    }

    /// Offset of coefficient `(u_h, u_w, oc, ic)` in the int8 block.
    pub fn coefficient_offset(&self, u_h: usize, u_w: usize, oc: usize, ic: usize) -> usize {
        let (o, ob) = (oc / self.oc_block, oc % self.oc_block);
        let (i, ib) = (ic / self.ic_block, ic % self.ic_block);
        (u_h * self.alpha + u_w) * self.padded_oc() * self.padded_ic()
            + o * self.oc_block * self.padded_ic()
            + i * self.oc_block * self.ic_block
            + ob * self.ic_block
            + ib
    }

    /// Index of the bias term for `(u_h, u_w, oc)` in the int32 block.
    pub fn bias_offset(&self, u_h: usize, u_w: usize, oc: usize) -> usize {
        (u_h * self.alpha + u_w) * self.padded_oc() + oc
    }
}

impl fmt::Display for WinogradLayoutDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} alpha={} r={} oc={}({}x{}) ic={}({}x{})",
            self.wino_format,
            self.alpha,
            self.r,
            self.oc,
            self.nb_oc,
            self.oc_block,
            self.ic,
            self.nb_ic,
            self.ic_block
        )
    }
}
