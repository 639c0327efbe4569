use rayon::prelude::*;

use super::basis::TransformBasis;
use super::simd::axpy_f32;

/// Lanes per micro-kernel call. A trailing run shorter than this goes
/// through the same kernel, so the filter count needs no alignment.
pub const LANES: usize = 16;

/// `dst += g * src`, one lane group at a time.
#[inline]
fn axpy_lanes(dst: &mut [f32], src: &[f32], g: f32) {
    for (d, s) in dst.chunks_mut(LANES).zip(src.chunks(LANES)) {
        axpy_f32(d, s, g);
    }
}

/// Transforms `z` spatial filters into the Winograd domain.
///
/// `transposed` holds filter tap `(k, l)` of filter `f` at `(k * r + l) * z + f`.
/// `workspace` must hold `r * alpha * z` values and receives `g * G^T`.
/// `out` must hold `alpha * alpha * z` values and receives `G * g * G^T`,
/// position `(i, j)` of filter `f` at `(i * alpha + j) * z + f`.
pub fn transform_filters(
    transposed: &[f32],
    z: usize,
    basis: &TransformBasis,
    workspace: &mut [f32],
    out: &mut [f32],
) {
    let (alpha, r) = (basis.alpha, basis.r);
    assert_eq!(transposed.len(), r * r * z, "transform: input length mismatch");
    assert_eq!(workspace.len(), r * alpha * z, "transform: workspace length mismatch");
    assert_eq!(out.len(), alpha * alpha * z, "transform: output length mismatch");
    if z == 0 {
        return;
    }

    // ws[k, j] = sum_l G[j, l] * w[k, l]
    workspace.par_chunks_mut(z).enumerate().for_each(|(row, ws)| {
        let (k, j) = (row / alpha, row % alpha);
        ws.fill(0.0);
        for l in 0..r {
            let src = &transposed[(k * r + l) * z..(k * r + l + 1) * z];
            axpy_lanes(ws, src, basis.get(j, l));
        }
    });

    // U[i, j] = sum_k G[i, k] * ws[k, j]
    out.par_chunks_mut(z).enumerate().for_each(|(row, u)| {
        let (i, j) = (row / alpha, row % alpha);
        u.fill(0.0);
        for k in 0..r {
            let src = &workspace[(k * alpha + j) * z..(k * alpha + j + 1) * z];
            axpy_lanes(u, src, basis.get(i, k));
        }
    });
}
