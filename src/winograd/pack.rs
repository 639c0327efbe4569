use rayon::prelude::*;

use super::simd::sum_i8;
use crate::memory::WinogradLayoutDescriptor;

/// Zero point the downstream integer kernel adds to every activation.
pub const ACTIVATION_ZERO_POINT: i32 = 128;

/// Packs quantized coefficients into the blocked layout and computes the
/// zero-point compensation.
///
/// `quantized` holds position `(u_h, u_w)`, input channel `i`, output channel
/// `o` at `((u_h * alpha + u_w) * ic + i) * oc + o` for the logical channel
/// counts. Each `(position, output block)` pair owns one contiguous run of
/// `coefficients` and one of `bias`; both runs are zeroed before they are
/// written, so padding lanes read as zero.
pub fn pack_blocked(
    quantized: &[i8],
    layout: &WinogradLayoutDescriptor,
    coefficients: &mut [i8],
    bias: &mut [i32],
) {
    let (oc, ic) = (layout.oc, layout.ic);
    let (oc_block, ic_block) = (layout.oc_block, layout.ic_block);
    let padded_ic = layout.padded_ic();
    assert_eq!(quantized.len(), layout.positions() * oc * ic, "pack: source length mismatch");
    assert_eq!(coefficients.len(), layout.coefficient_count(), "pack: coefficient length mismatch");
    assert_eq!(bias.len(), layout.bias_count(), "pack: bias length mismatch");
    if coefficients.is_empty() {
        return;
    }

    coefficients
        .par_chunks_mut(oc_block * padded_ic)
        .zip(bias.par_chunks_mut(oc_block))
        .enumerate()
        .for_each(|(chunk, (dst, dst_bias))| {
            let pos = chunk / layout.nb_oc;
            let o = chunk % layout.nb_oc;
            let src = &quantized[pos * ic * oc..(pos + 1) * ic * oc];
            dst.fill(0);
            dst_bias.fill(0);

            for ob in 0..oc_block {
                let oc_idx = o * oc_block + ob;
                if oc_idx >= oc {
                    break;
                }
                let mut acc = 0i32;
                for i in 0..layout.nb_ic {
                    let base = i * oc_block * ic_block + ob * ic_block;
                    let lane = &mut dst[base..base + ic_block];
                    for (ib, q) in lane.iter_mut().enumerate() {
                        let ic_idx = i * ic_block + ib;
                        if ic_idx >= ic {
                            break;
                        }
                        *q = src[ic_idx * oc + oc_idx];
                    }
                    acc += sum_i8(lane);
                }
                dst_bias[ob] = -ACTIVATION_ZERO_POINT * acc;
            }
        });
}
