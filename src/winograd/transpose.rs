use rayon::prelude::*;

/// Reindexes OIHW weights into HWIO order: `dst[h,w,i,o] = src[o,i,h,w]`.
///
/// Each destination row `(h, w, i)` holds all `oc` output channels and is
/// filled by exactly one worker.
pub fn transpose_oihw_to_hwio(src: &[f32], dims: [usize; 4], dst: &mut [f32]) {
    let [oc, ic, kh, kw] = dims;
    let total = oc * ic * kh * kw;
    assert_eq!(src.len(), total, "transpose: source length mismatch");
    assert_eq!(dst.len(), total, "transpose: destination length mismatch");
    if total == 0 {
        return;
    }

    let khw = kh * kw;
    dst.par_chunks_mut(oc).enumerate().for_each(|(row, out)| {
        // row = (h * kw + w) * ic + i
        let i = row % ic;
        let hw = row / ic;
        for (o, v) in out.iter_mut().enumerate() {
            *v = src[o * ic * khw + i * khw + hw];
        }
    });
}
