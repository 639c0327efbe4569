//! SIMD micro-kernels with NEON acceleration and scalar fallbacks.

// ── FP32 AXPY: dst[..] += a * src[..] ──

#[cfg(all(target_arch = "aarch64", feature = "simd"))]
pub fn axpy_f32(dst: &mut [f32], src: &[f32], a: f32) {
    use core::arch::aarch64::*;
    let len = dst.len().min(src.len());
    let mut j = 0usize;
    // SAFETY: every vector load/store stays below `len`, which bounds both slices.
    unsafe {
        let a_vec = vdupq_n_f32(a);
        while j + 4 <= len {
            let s = vld1q_f32(src.as_ptr().add(j));
            let d = vld1q_f32(dst.as_ptr().add(j));
            vst1q_f32(dst.as_mut_ptr().add(j), vfmaq_f32(d, a_vec, s));
            j += 4;
        }
    }
    // scalar tail
    while j < len {
        dst[j] += a * src[j];
        j += 1;
    }
}

#[cfg(not(all(target_arch = "aarch64", feature = "simd")))]
pub fn axpy_f32(dst: &mut [f32], src: &[f32], a: f32) {
    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        *d += a * s;
    }
}

// ── INT8 sum: widened to i32 ──
//
// Uses vpaddlq_s8 (16xi8 -> 8xi16) + vpadalq_s16 (8xi16 -> 4xi32) for stable Rust.

#[cfg(all(target_arch = "aarch64", feature = "simd"))]
pub fn sum_i8(a: &[i8]) -> i32 {
    use core::arch::aarch64::*;
    let len = a.len();
    let mut j = 0usize;
    // SAFETY: loads cover `j..j + 16` only while `j + 16 <= len`.
    let mut sum = unsafe {
        let mut acc = vdupq_n_s32(0);
        while j + 16 <= len {
            let va = vld1q_s8(a.as_ptr().add(j));
            acc = vpadalq_s16(acc, vpaddlq_s8(va));
            j += 16;
        }
        vaddvq_s32(acc)
    };
    while j < len {
        sum += a[j] as i32;
        j += 1;
    }
    sum
}

#[cfg(not(all(target_arch = "aarch64", feature = "simd")))]
pub fn sum_i8(a: &[i8]) -> i32 {
    a.iter().map(|&v| v as i32).sum()
}
