//! Piecewise-polynomial function approximation on [-1, 1].
//!
//! A [`PiecewisePoly`] splits [-1, 1] into `pieces` equal subintervals,
//! numbered right to left (piece 0 touches +1), and fits one polynomial per
//! subinterval by interpolation at Chebyshev nodes. Chebyshev-node
//! interpolation gives near-optimal uniform error for smooth functions
//! without contour integration, and fitting the pieces independently is fine
//! here because the fitted kernels are never differentiated afterwards.
//!
//! The kernel evaluators exploit a property of this layout: the 2M offsets
//! at which a spreading kernel is sampled fall into the 2M subintervals at
//! the *same* local coordinate, so one Horner pass per piece at a shared
//! abscissa yields all 2M kernel values (see [`PiecewisePoly::eval_all`]).

use num_traits::Float;

use crate::cast;

/// Table of `pieces` polynomials with `len` coefficients each.
///
/// Piece `l` covers `y` in `[1 - (2l+2)/L, 1 - 2l/L]` where `L = pieces`,
/// with midpoint `1 - (2l+1)/L` and half-width `1/L`. Coefficients are
/// stored row-major, constant term first. The table is immutable once
/// constructed.
#[derive(Debug, Clone)]
pub struct PiecewisePoly<T> {
    coeffs: Vec<T>,
    pieces: usize,
    len: usize,
}

impl<T: Float> PiecewisePoly<T> {
    /// Fit `f` on [-1, 1] with `pieces` polynomials of `len` coefficients.
    ///
    /// Each piece interpolates `f` at the `len` Chebyshev nodes
    /// `cos(pi (k - 1/2) / len)` of its subinterval; the monomial
    /// coefficients come from a dense Vandermonde solve. The fit runs in
    /// f64 and the table is narrowed to `T` once.
    pub fn fit<F>(f: F, pieces: usize, len: usize) -> Self
    where
        F: Fn(f64) -> f64,
    {
        assert!(pieces >= 1 && len >= 2);
        let l = pieces as f64;
        let half_width = 1.0 / l;

        // Chebyshev nodes and the shared Vandermonde matrix in local coords.
        let nodes: Vec<f64> = (1..=len)
            .map(|k| (std::f64::consts::PI * (k as f64 - 0.5) / len as f64).cos())
            .collect();
        let mut vandermonde = vec![0.0f64; len * len];
        for (i, &x) in nodes.iter().enumerate() {
            let mut p = 1.0;
            for j in 0..len {
                vandermonde[i * len + j] = p;
                p *= x;
            }
        }

        let mut coeffs = vec![T::zero(); pieces * len];
        let mut samples = vec![0.0f64; len];
        for piece in 0..pieces {
            let mid = 1.0 - (2.0 * piece as f64 + 1.0) / l;
            for (k, &x) in nodes.iter().enumerate() {
                samples[k] = f(mid + x * half_width);
            }
            let c = solve_dense(&vandermonde, &samples, len);
            for (j, &cj) in c.iter().enumerate() {
                coeffs[piece * len + j] = cast(cj);
            }
        }

        PiecewisePoly { coeffs, pieces, len }
    }

    pub fn pieces(&self) -> usize {
        self.pieces
    }

    /// Coefficients per piece (polynomial degree + 1).
    pub fn coeffs_per_piece(&self) -> usize {
        self.len
    }

    /// Evaluate every piece at the same local coordinate `x` in [-1, 1].
    ///
    /// `out[l]` receives the value of piece `l`'s polynomial at `x`, i.e.
    /// the approximated function at `y = 1 - (2l+1)/L + x/L`. `out` must
    /// hold `pieces` elements.
    #[inline]
    pub fn eval_all(&self, x: T, out: &mut [T]) {
        debug_assert!(x >= -T::one() && x <= T::one());
        debug_assert_eq!(out.len(), self.pieces);
        for (piece, slot) in out.iter_mut().enumerate() {
            *slot = self.eval_piece(piece, x);
        }
    }

    /// Horner evaluation of one piece at local coordinate `x`.
    #[inline]
    pub fn eval_piece(&self, piece: usize, x: T) -> T {
        let row = &self.coeffs[piece * self.len..(piece + 1) * self.len];
        let mut acc = row[self.len - 1];
        for j in (0..self.len - 1).rev() {
            acc = acc * x + row[j];
        }
        acc
    }

    /// Evaluate the approximation at a global coordinate `y` in [-1, 1].
    ///
    /// Locates the owning piece and maps `y` to its local coordinate. Used
    /// for verification; the transform hot paths go through `eval_all`.
    pub fn eval_at(&self, y: T) -> T {
        let l = cast::<T>(self.pieces as f64);
        let piece_f = (T::one() - y) * l / cast(2.0);
        let piece = piece_f
            .floor()
            .to_usize()
            .unwrap_or(0)
            .min(self.pieces - 1);
        let x = l * (y - T::one()) + cast(2.0 * piece as f64 + 1.0);
        self.eval_piece(piece, x)
    }
}

/// Solve the dense n-by-n system `a x = b` by Gaussian elimination with
/// partial pivoting. `a` is row-major and left unmodified; n is a small
/// compile-time-ish constant (the polynomial size), so a direct solve is
/// cheaper and simpler than anything iterative.
fn solve_dense(a: &[f64], b: &[f64], n: usize) -> Vec<f64> {
    let mut m = a.to_vec();
    let mut x = b.to_vec();

    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if m[row * n + col].abs() > m[pivot * n + col].abs() {
                pivot = row;
            }
        }
        if pivot != col {
            for j in 0..n {
                m.swap(col * n + j, pivot * n + j);
            }
            x.swap(col, pivot);
        }
        let diag = m[col * n + col];
        for row in col + 1..n {
            let factor = m[row * n + col] / diag;
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                m[row * n + j] -= factor * m[col * n + j];
            }
            x[row] -= factor * x[col];
        }
    }

    for col in (0..n).rev() {
        let mut acc = x[col];
        for j in col + 1..n {
            acc -= m[col * n + j] * x[j];
        }
        x[col] = acc / m[col * n + col];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_on_polynomials() {
        // A cubic must be reproduced exactly by len = 4 pieces.
        let f = |y: f64| 2.0 * y * y * y - y * y + 0.5 * y - 3.0;
        let table: PiecewisePoly<f64> = PiecewisePoly::fit(f, 6, 4);
        for i in 0..=200 {
            let y = -1.0 + 2.0 * i as f64 / 200.0;
            let err = (table.eval_at(y) - f(y)).abs();
            assert!(err < 1e-12, "cubic not reproduced at y = {}: err = {}", y, err);
        }
    }

    #[test]
    fn test_smooth_function_accuracy() {
        let f = |y: f64| (3.0 * y).cos() * (-y * y).exp();
        let table: PiecewisePoly<f64> = PiecewisePoly::fit(f, 8, 10);
        for i in 0..=500 {
            let y = -1.0 + 2.0 * i as f64 / 500.0;
            let err = (table.eval_at(y) - f(y)).abs();
            assert!(err < 1e-9, "fit error {} at y = {}", err, y);
        }
    }

    #[test]
    fn test_piece_numbering_right_to_left() {
        // Piece 0 must cover the subinterval touching +1.
        let table: PiecewisePoly<f64> = PiecewisePoly::fit(|y| y, 4, 3);
        // Midpoint of piece 0 is 1 - 1/4 = 0.75, reached at local x = 0.
        assert!((table.eval_piece(0, 0.0) - 0.75).abs() < 1e-13);
        // Midpoint of the last piece is -0.75.
        assert!((table.eval_piece(3, 0.0) + 0.75).abs() < 1e-13);
    }

    #[test]
    fn test_eval_all_matches_eval_piece() {
        let table: PiecewisePoly<f64> = PiecewisePoly::fit(|y| y.sin(), 8, 6);
        let mut out = vec![0.0; 8];
        table.eval_all(0.3, &mut out);
        for (piece, &v) in out.iter().enumerate() {
            assert_eq!(v, table.eval_piece(piece, 0.3));
        }
    }

    #[test]
    fn test_solve_dense() {
        // 3x3 system with known solution (1, -2, 3).
        let a = vec![2.0, 1.0, -1.0, -3.0, -1.0, 2.0, -2.0, 1.0, 2.0];
        let b = vec![2.0 - 2.0 - 3.0, -3.0 + 2.0 + 6.0, -2.0 - 2.0 + 6.0];
        let x = solve_dense(&a, &b, 3);
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] + 2.0).abs() < 1e-12);
        assert!((x[2] - 3.0).abs() < 1e-12);
    }
}
