use log::{debug, trace, warn};

use super::scratch::ScratchArena;
use super::{ReorderAttr, WeightReorder, REORDER_IMPLS};
use crate::error::{ReorderError, Result};
use crate::memory::{DataType, MemoryDesc, WeightFormat, WinoFormat, WinogradLayoutDescriptor};
use crate::quantization::{quantize_slice, QuantParams};
use crate::tensor::WinogradWeights;
use crate::winograd::{
    pack_blocked, transform_filters, transpose_oihw_to_hwio, TransformBasis,
    ACTIVATION_ZERO_POINT,
};

/// Reorders FP32 OIHW (or single-group GOIHW) weights into the int8
/// `wei_aaOIoi` Winograd encoding.
pub struct WinoReorder {
    name: &'static str,
    src: MemoryDesc,
    dst: MemoryDesc,
    layout: WinogradLayoutDescriptor,
    basis: &'static TransformBasis,
    params: QuantParams,
    dims: [usize; 4],
    scratch: ScratchArena,
}

/// Registry constructor shared by every `wino_reorder:*` entry.
pub(super) fn create(
    src: &MemoryDesc,
    dst: &MemoryDesc,
    attr: &ReorderAttr,
) -> Result<Box<dyn WeightReorder>> {
    Ok(Box::new(WinoReorder::new(src, dst, attr)?))
}

impl WinoReorder {
    /// Creates a reorder for `src -> dst`, named after the registry entry
    /// that accepts the pair.
    ///
    /// Fails with `InvalidArguments` on a data type, format or group
    /// mismatch, `Unimplemented` when the layout cannot be produced from
    /// these weights, and `OutOfMemory` when a buffer size overflows or
    /// scratch cannot be allocated.
    pub fn new(src: &MemoryDesc, dst: &MemoryDesc, attr: &ReorderAttr) -> Result<Self> {
        let imp = REORDER_IMPLS
            .iter()
            .find(|imp| (imp.is_applicable)(src, dst))
            .ok_or_else(|| {
                ReorderError::invalid(format!("no reorder from {} to {}", src, dst))
            })?;
        let name = imp.name;
        let layout = check_args(src, dst)?;
        let dims = src.weight_dims().ok_or_else(|| {
            ReorderError::invalid(format!("{} has {} dims", src, src.dims.len()))
        })?;
        let basis = init_layout(&layout, dims, attr)?;

        let [oc, ic, _, _] = dims;
        let z = oc.checked_mul(ic).ok_or(ReorderError::OutOfMemory {
            what: "scratch size computation",
            bytes: usize::MAX,
        })?;
        let scratch = ScratchArena::new(z, layout.alpha, layout.r)?;
        debug!(
            "{}: {} -> {}, scratch {} bytes",
            name,
            src,
            layout,
            scratch.size_bytes()
        );
        if layout.is_padded() {
            warn!(
                "{}: channels {}x{} padded to {}x{} for {}x{} blocks",
                name,
                oc,
                ic,
                layout.padded_oc(),
                layout.padded_ic(),
                layout.oc_block,
                layout.ic_block
            );
        }

        Ok(WinoReorder {
            name,
            src: src.clone(),
            dst: dst.clone(),
            layout,
            basis,
            params: attr.quant_params(),
            dims,
            scratch,
        })
    }

    pub fn layout(&self) -> &WinogradLayoutDescriptor {
        &self.layout
    }

    /// Runs [`WeightReorder::execute`] on a caller-provided pool.
    pub fn execute_in(
        &mut self,
        pool: &rayon::ThreadPool,
        src: &[f32],
        dst: &mut WinogradWeights,
    ) -> Result<()> {
        pool.install(|| self.execute(src, dst))
    }

    fn run(&mut self, src: &[f32], dst: &mut WinogradWeights) {
        let [oc, ic, _, _] = self.dims;
        let z = oc * ic;
        let scratch = &mut self.scratch;

        transpose_oihw_to_hwio(src, self.dims, &mut scratch.transposed);
        trace!("{}: transposed {} filters to hwio", self.name, z);

        transform_filters(
            &scratch.transposed,
            z,
            self.basis,
            &mut scratch.workspace,
            &mut scratch.coeffs_f32,
        );
        trace!(
            "{}: transformed to {}x{} tiles",
            self.name,
            self.basis.alpha,
            self.basis.alpha
        );

        let clamped = quantize_slice(&scratch.coeffs_f32, &self.params, &mut scratch.coeffs_s8);
        if clamped > 0 {
            warn!(
                "{}: {} of {} coefficients saturated at scale {}",
                self.name,
                clamped,
                scratch.coeffs_s8.len(),
                self.params.scale
            );
        }
        trace!("{}: quantized {} coefficients", self.name, scratch.coeffs_s8.len());

        pack_blocked(&scratch.coeffs_s8, &self.layout, &mut dst.coefficients, &mut dst.bias);
        trace!("{}: packed {}", self.name, self.layout);
    }
}

impl WeightReorder for WinoReorder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn src_desc(&self) -> &MemoryDesc {
        &self.src
    }

    fn dst_desc(&self) -> &MemoryDesc {
        &self.dst
    }

    fn execute(&mut self, src: &[f32], dst: &mut WinogradWeights) -> Result<()> {
        if src.len() != self.src.nelems() {
            return Err(ReorderError::invalid(format!(
                "{}: source has {} elements, {} needs {}",
                self.name,
                src.len(),
                self.src,
                self.src.nelems()
            )));
        }
        if dst.layout != self.layout
            || dst.coefficients.len() != self.layout.coefficient_count()
            || dst.bias.len() != self.layout.bias_count()
        {
            return Err(ReorderError::invalid(format!(
                "{}: destination {} does not match {}",
                self.name, dst, self.layout
            )));
        }
        self.run(src, dst);
        Ok(())
    }
}

/// Precondition checks; any failure is `InvalidArguments`.
fn check_args(src: &MemoryDesc, dst: &MemoryDesc) -> Result<WinogradLayoutDescriptor> {
    if src.data_type != DataType::F32 {
        return Err(ReorderError::invalid(format!("source data type {} is not f32", src.data_type)));
    }
    if dst.data_type != DataType::S8 {
        return Err(ReorderError::invalid(format!(
            "destination data type {} is not s8",
            dst.data_type
        )));
    }
    if !matches!(src.format, WeightFormat::Oihw | WeightFormat::Goihw) {
        return Err(ReorderError::invalid(format!(
            "source format {} is not oihw or goihw",
            src.format
        )));
    }
    let layout = match dst.format {
        WeightFormat::Wino(layout) if layout.wino_format == WinoFormat::WeiAaOIoi => layout,
        other => {
            return Err(ReorderError::invalid(format!(
                "destination format {} is not wino:{}",
                other,
                WinoFormat::WeiAaOIoi
            )))
        }
    };
    if src.dims.len() != src.format.ndims() {
        return Err(ReorderError::invalid(format!(
            "{} needs {} dims, got {}",
            src.format,
            src.format.ndims(),
            src.dims.len()
        )));
    }
    if src.groups() != 1 {
        return Err(ReorderError::invalid(format!(
            "grouped weights are not supported (groups = {})",
            src.groups()
        )));
    }
    Ok(layout)
}

/// Checks that `layout` can be produced from weights of shape `dims`.
fn init_layout(
    layout: &WinogradLayoutDescriptor,
    dims: [usize; 4],
    attr: &ReorderAttr,
) -> Result<&'static TransformBasis> {
    let [oc, ic, kh, kw] = dims;
    if dims.contains(&0) {
        return Err(ReorderError::unimplemented(format!(
            "empty weights {}x{}x{}x{}",
            oc, ic, kh, kw
        )));
    }
    let basis = TransformBasis::lookup(layout.alpha, layout.r).ok_or_else(|| {
        ReorderError::unimplemented(format!(
            "no transform basis for alpha={} r={}",
            layout.alpha, layout.r
        ))
    })?;
    if kh != layout.r || kw != layout.r {
        return Err(ReorderError::unimplemented(format!(
            "kernel {}x{} does not match r={}",
            kh, kw, layout.r
        )));
    }
    if layout.oc != oc || layout.ic != ic {
        return Err(ReorderError::unimplemented(format!(
            "layout channels {}x{} do not match weights {}x{}",
            layout.oc, layout.ic, oc, ic
        )));
    }
    // Padded sizes are used unchecked from here on.
    if layout.checked_sizes().is_none() {
        return Err(ReorderError::OutOfMemory {
            what: "winograd buffer size computation",
            bytes: usize::MAX,
        });
    }
    if layout.oc_block == 0
        || layout.ic_block == 0
        || layout.padded_oc() < oc
        || layout.padded_ic() < ic
    {
        return Err(ReorderError::unimplemented(format!(
            "blocking {} does not cover the channels",
            layout
        )));
    }
    // Worst-case compensation term must fit in i32.
    let max_bias =
        ACTIVATION_ZERO_POINT as i128 * (i8::MIN as i128).abs() * layout.padded_ic() as i128;
    if max_bias > i32::MAX as i128 {
        return Err(ReorderError::unimplemented(format!(
            "{} input channels overflow the int32 compensation",
            ic
        )));
    }
    if !attr.output_scale.is_finite() {
        return Err(ReorderError::unimplemented(format!(
            "output scale {} is not finite",
            attr.output_scale
        )));
    }
    Ok(basis)
}
