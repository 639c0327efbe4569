//! Reorder creation and dispatch.
//!
//! A reorder is picked from [`REORDER_IMPLS`] by the first entry whose
//! compatibility predicate accepts the source and destination descriptors.
//! Creation validates the descriptors and allocates scratch, so a created
//! reorder runs to completion without further checks beyond buffer lengths.

mod scratch;
mod wino;

pub use wino::WinoReorder;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ReorderError, Result};
use crate::memory::{MemoryDesc, WeightFormat};
use crate::quantization::{QuantParams, RoundMode};
use crate::tensor::{WeightTensor, WinogradWeights};

/// Attributes a reorder is created with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderAttr {
    /// Multiplier applied to every Winograd-domain coefficient before rounding.
    pub output_scale: f32,
    pub round_mode: RoundMode,
}

impl Default for ReorderAttr {
    fn default() -> Self {
        ReorderAttr {
            output_scale: 1.0,
            round_mode: RoundMode::Nearest,
        }
    }
}

impl ReorderAttr {
    pub fn new(output_scale: f32, round_mode: RoundMode) -> Self {
        ReorderAttr {
            output_scale,
            round_mode,
        }
    }

    pub fn quant_params(&self) -> QuantParams {
        QuantParams::new(self.output_scale, self.round_mode)
    }
}

/// A created weight reorder, ready to run.
pub trait WeightReorder: Send {
    fn name(&self) -> &'static str;
    fn src_desc(&self) -> &MemoryDesc;
    fn dst_desc(&self) -> &MemoryDesc;
    /// Reorders `src` into `dst`, overwriting all of it.
    fn execute(&mut self, src: &[f32], dst: &mut WinogradWeights) -> Result<()>;
}

pub type CreateFn = fn(&MemoryDesc, &MemoryDesc, &ReorderAttr) -> Result<Box<dyn WeightReorder>>;

/// One registered reorder strategy.
pub struct ReorderImpl {
    pub name: &'static str,
    pub is_applicable: fn(&MemoryDesc, &MemoryDesc) -> bool,
    pub create: CreateFn,
}

fn oihw_to_wino(src: &MemoryDesc, dst: &MemoryDesc) -> bool {
    src.format == WeightFormat::Oihw && matches!(dst.format, WeightFormat::Wino(_))
}

fn goihw_to_wino(src: &MemoryDesc, dst: &MemoryDesc) -> bool {
    src.format == WeightFormat::Goihw && matches!(dst.format, WeightFormat::Wino(_))
}

/// Registered strategies, tried in order.
pub static REORDER_IMPLS: &[ReorderImpl] = &[
    ReorderImpl {
        name: "wino_reorder:oihw",
        is_applicable: oihw_to_wino,
        create: wino::create,
    },
    ReorderImpl {
        name: "wino_reorder:goihw",
        is_applicable: goihw_to_wino,
        create: wino::create,
    },
];

/// Creates the first registered reorder that accepts `src -> dst`.
pub fn create_reorder(
    src: &MemoryDesc,
    dst: &MemoryDesc,
    attr: &ReorderAttr,
) -> Result<Box<dyn WeightReorder>> {
    let imp = REORDER_IMPLS
        .iter()
        .find(|imp| (imp.is_applicable)(src, dst))
        .ok_or_else(|| {
            ReorderError::invalid(format!("no reorder from {} to {}", src, dst))
        })?;
    debug!("selected {} for {} -> {}", imp.name, src, dst);
    (imp.create)(src, dst, attr)
}

/// Reorders `weights` into a freshly allocated Winograd buffer.
pub fn reorder_weights(
    weights: &WeightTensor,
    dst: &MemoryDesc,
    attr: &ReorderAttr,
) -> Result<WinogradWeights> {
    let layout = *dst
        .wino_layout()
        .ok_or_else(|| ReorderError::invalid(format!("{} is not a winograd format", dst)))?;
    let mut reorder = create_reorder(&weights.desc(), dst, attr)?;
    let mut out = WinogradWeights::zeroed(layout)?;
    reorder.execute(&weights.data, &mut out)?;
    Ok(out)
}
