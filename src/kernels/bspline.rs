//! Cardinal B-spline spreading kernel.
//!
//! The order-n cardinal B-spline (n = 2M) is the n-fold convolution of the
//! unit box, scaled to span 2M oversampled grid cells. Its 2M non-zero
//! values at a point come from the Cox-de Boor recurrence written as a
//! straight loop (Essmann et al., "A smooth particle mesh Ewald method",
//! J. Chem. Phys. 103, 1995), so they form an exact partition of unity;
//! no polynomial table is involved.

use num_traits::Float;

use crate::cast;

/// All `order` non-zero B-spline weights at fractional offset `u` in [0, 1).
///
/// `out[j]` is the weight of grid cell `c - M + 1 + j` (0-based central
/// cell `c`), i.e. `M_n(u + n - 1 - j)` in Essmann's notation. The weights
/// sum to one for any `u`.
#[inline]
pub fn weights<T: Float>(order: usize, u: T, out: &mut [T]) {
    debug_assert_eq!(out.len(), order);
    debug_assert!(order >= 2);
    let one = T::one();

    out[0] = one - u;
    out[1] = u;
    for k in 3..=order {
        let div = one / cast::<T>((k - 1) as f64);
        out[k - 1] = div * u * out[k - 2];
        for j in 1..k - 1 {
            let jf = cast::<T>(j as f64);
            let kf = cast::<T>(k as f64);
            out[k - 1 - j] =
                div * ((u + jf) * out[k - 2 - j] + (kf - jf - u) * out[k - 1 - j]);
        }
        out[0] = div * (one - u) * out[0];
    }
}

/// Analytical Fourier transform: `dx * sinc(k dx / 2)^order`, where
/// `sinc(x) = sin(x)/x`, continued by `dx` at k = 0.
pub fn fourier(k: f64, dx: f64, order: usize) -> f64 {
    let half = 0.5 * k * dx;
    if half.abs() < 1e-12 {
        return dx;
    }
    dx * (half.sin() / half).powi(order as i32)
}
