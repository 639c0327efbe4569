use proptest::prelude::*;
use wino_reorder::winograd::{
    transform_filters, transpose_oihw_to_hwio, TransformBasis, F2X2_3X3, F4X4_3X3, LANES,
};

/// Fill a flat vec with deterministic values based on index.
fn fill_deterministic(data: &mut [f32]) {
    for (i, v) in data.iter_mut().enumerate() {
        *v = ((i as f32) * 0.1 + 0.05).sin();
    }
}

/// Closed-form F(2x2, 3x3) filter transform, unrolled.
fn transform_filter_f2x3(g: &[f32; 9]) -> [f32; 16] {
    let mut tmp = [0.0f32; 12]; // 4x3
    for j in 0..3 {
        let g0 = g[j];
        let g1 = g[3 + j];
        let g2 = g[6 + j];
        tmp[j] = g0;
        tmp[3 + j] = (g0 + g1 + g2) * 0.5;
        tmp[6 + j] = (g0 - g1 + g2) * 0.5;
        tmp[9 + j] = g2;
    }
    let mut u = [0.0f32; 16];
    for i in 0..4 {
        let t0 = tmp[i * 3];
        let t1 = tmp[i * 3 + 1];
        let t2 = tmp[i * 3 + 2];
        u[i * 4] = t0;
        u[i * 4 + 1] = (t0 + t1 + t2) * 0.5;
        u[i * 4 + 2] = (t0 - t1 + t2) * 0.5;
        u[i * 4 + 3] = t2;
    }
    u
}

/// Runs transpose + transform and returns `[alpha][alpha][ic][oc]` coefficients.
fn run_transform(weights: &[f32], oc: usize, ic: usize, basis: &TransformBasis) -> Vec<f32> {
    let (alpha, r) = (basis.alpha, basis.r);
    let z = oc * ic;
    let mut transposed = vec![0.0f32; r * r * z];
    let mut workspace = vec![0.0f32; r * alpha * z];
    let mut out = vec![0.0f32; alpha * alpha * z];
    transpose_oihw_to_hwio(weights, [oc, ic, r, r], &mut transposed);
    transform_filters(&transposed, z, basis, &mut workspace, &mut out);
    out
}

fn assert_matches_reference(oc: usize, ic: usize, basis: &TransformBasis, tol: f32) {
    let (alpha, r) = (basis.alpha, basis.r);
    let mut weights = vec![0.0f32; oc * ic * r * r];
    fill_deterministic(&mut weights);
    let out = run_transform(&weights, oc, ic, basis);

    let z = oc * ic;
    let mut u = vec![0.0f32; alpha * alpha];
    for o in 0..oc {
        for i in 0..ic {
            let base = (o * ic + i) * r * r;
            basis.transform_filter(&weights[base..base + r * r], &mut u);
            for pos in 0..alpha * alpha {
                let got = out[pos * z + i * oc + o];
                assert!(
                    (got - u[pos]).abs() < tol,
                    "oc={} ic={} pos={}: pipeline {} vs reference {}",
                    o, i, pos, got, u[pos]
                );
            }
        }
    }
}

#[test]
fn transpose_reindexes_to_hwio() {
    let (oc, ic, kh, kw) = (3, 2, 3, 3);
    let mut src = vec![0.0f32; oc * ic * kh * kw];
    fill_deterministic(&mut src);
    let mut dst = vec![0.0f32; src.len()];
    transpose_oihw_to_hwio(&src, [oc, ic, kh, kw], &mut dst);

    for o in 0..oc {
        for i in 0..ic {
            for h in 0..kh {
                for w in 0..kw {
                    assert_eq!(
                        dst[h * kw * ic * oc + w * ic * oc + i * oc + o],
                        src[o * ic * kh * kw + i * kh * kw + h * kw + w],
                        "mismatch at o={} i={} h={} w={}",
                        o, i, h, w
                    );
                }
            }
        }
    }
}

#[test]
fn f2x3_basis_matches_closed_form() {
    let mut g = [0.0f32; 9];
    fill_deterministic(&mut g);
    let expected = transform_filter_f2x3(&g);
    let mut u = [0.0f32; 16];
    F2X2_3X3.transform_filter(&g, &mut u);
    for (i, (a, b)) in u.iter().zip(expected.iter()).enumerate() {
        assert!((a - b).abs() < 1e-6, "index {}: {} vs {}", i, a, b);
    }
}

#[test]
fn uniform_filter_gives_outer_product_of_row_sums() {
    // G * 1 * G^T = s s^T with s the row sums of G.
    let out = run_transform(&[1.0f32; 9], 1, 1, &F2X2_3X3);
    let s = [1.0f32, 1.5, 0.5, 1.0];
    for i in 0..4 {
        for j in 0..4 {
            assert_eq!(out[i * 4 + j], s[i] * s[j], "position ({}, {})", i, j);
        }
    }
}

#[test]
fn pipeline_matches_reference_full_lanes() {
    assert_matches_reference(16, 16, &F2X2_3X3, 1e-5);
}

#[test]
fn pipeline_matches_reference_partial_lanes() {
    // 5 * 7 = 35 filters: two full lane groups and a tail of 3.
    assert_eq!((5 * 7) % LANES, 3);
    assert_matches_reference(5, 7, &F2X2_3X3, 1e-5);
}

#[test]
fn pipeline_matches_reference_single_filter() {
    assert_matches_reference(1, 1, &F2X2_3X3, 1e-6);
}

#[test]
fn f4x3_pipeline_matches_reference() {
    assert_matches_reference(4, 3, &F4X4_3X3, 1e-5);
}

#[test]
fn basis_lookup() {
    assert_eq!(TransformBasis::lookup(4, 3).map(|b| b.alpha), Some(4));
    assert_eq!(TransformBasis::lookup(6, 3).map(|b| b.alpha), Some(6));
    assert!(TransformBasis::lookup(5, 3).is_none());
    assert!(TransformBasis::lookup(4, 2).is_none());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn transpose_is_a_bijection(oc in 1usize..9, ic in 1usize..9, kh in 1usize..4, kw in 1usize..4) {
        let n = oc * ic * kh * kw;
        // Distinct values so any collision or miss shows up.
        let src: Vec<f32> = (0..n).map(|i| i as f32).collect();
        let mut dst = vec![-1.0f32; n];
        transpose_oihw_to_hwio(&src, [oc, ic, kh, kw], &mut dst);

        for o in 0..oc {
            for i in 0..ic {
                for h in 0..kh {
                    for w in 0..kw {
                        prop_assert_eq!(
                            dst[((h * kw + w) * ic + i) * oc + o],
                            src[((o * ic + i) * kh + h) * kw + w]
                        );
                    }
                }
            }
        }
        let mut sorted = dst.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        prop_assert_eq!(sorted, src);
    }
}

#[test]
fn micro_kernels_handle_tails() {
    use wino_reorder::winograd::{axpy_f32, sum_i8};

    for len in [0usize, 1, 3, 4, 7, 16, 19] {
        let src: Vec<f32> = (0..len).map(|i| i as f32).collect();
        let mut dst = vec![1.0f32; len];
        axpy_f32(&mut dst, &src, 0.5);
        for (i, v) in dst.iter().enumerate() {
            assert_eq!(*v, 1.0 + 0.5 * i as f32, "axpy len={} index={}", len, i);
        }
    }

    for len in [0usize, 5, 16, 17, 40] {
        let a: Vec<i8> = (0..len).map(|i| if i % 2 == 0 { -128 } else { 127 }).collect();
        let expected: i32 = a.iter().map(|&v| v as i32).sum();
        assert_eq!(sum_i8(&a), expected, "sum_i8 len={}", len);
    }
}
