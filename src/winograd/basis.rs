/// Filter transform matrix `G` of a Winograd algorithm F(m x m, r x r).
///
/// Stored row-major, `alpha` rows of `r` taps each. Only compiled-in bases
/// exist; see [`TransformBasis::lookup`].
#[derive(Debug)]
pub struct TransformBasis {
    pub alpha: usize,
    pub r: usize,
    coeffs: &'static [f32],
}

/// F(2x2, 3x3):
/// ```text
/// [ 1     0     0   ]
/// [ 1/2   1/2   1/2 ]
/// [ 1/2  -1/2   1/2 ]
/// [ 0     0     1   ]
/// ```
pub static F2X2_3X3: TransformBasis = TransformBasis {
    alpha: 4,
    r: 3,
    coeffs: &[
        1.0, 0.0, 0.0, //
        0.5, 0.5, 0.5, //
        0.5, -0.5, 0.5, //
        0.0, 0.0, 1.0,
    ],
};

/// F(4x4, 3x3), interpolation points 0, ±1, ±2, ∞.
pub static F4X4_3X3: TransformBasis = TransformBasis {
    alpha: 6,
    r: 3,
    coeffs: &[
        1.0 / 4.0, 0.0, 0.0, //
        -1.0 / 6.0, -1.0 / 6.0, -1.0 / 6.0, //
        -1.0 / 6.0, 1.0 / 6.0, -1.0 / 6.0, //
        1.0 / 24.0, 1.0 / 12.0, 1.0 / 6.0, //
        1.0 / 24.0, -1.0 / 12.0, 1.0 / 6.0, //
        0.0, 0.0, 1.0,
    ],
};

impl TransformBasis {
    /// Compiled-in basis for a tile size and kernel size, if any.
    pub fn lookup(alpha: usize, r: usize) -> Option<&'static TransformBasis> {
        [&F2X2_3X3, &F4X4_3X3]
            .into_iter()
            .find(|b| b.alpha == alpha && b.r == r)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.coeffs[row * self.r + col]
    }

    /// Transforms one `r x r` filter `g` into `alpha x alpha` as `G * g * G^T`.
    ///
    /// Reference path for a single filter; the reorder pipeline batches the
    /// same contraction across all channel pairs.
    pub fn transform_filter(&self, g: &[f32], u: &mut [f32]) {
        let (a, r) = (self.alpha, self.r);
        assert_eq!(g.len(), r * r, "filter must be {}x{}", r, r);
        assert_eq!(u.len(), a * a, "tile must be {}x{}", a, a);

        // G * g (alpha x r)
        let mut tmp = vec![0.0f32; a * r];
        for i in 0..a {
            for j in 0..r {
                tmp[i * r + j] = (0..r).map(|k| self.get(i, k) * g[k * r + j]).sum();
            }
        }
        // (G * g) * G^T (alpha x alpha)
        for i in 0..a {
            for j in 0..a {
                u[i * a + j] = (0..r).map(|k| tmp[i * r + k] * self.get(j, k)).sum();
            }
        }
    }
}
