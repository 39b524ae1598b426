//! Periodic grid indexing and wavenumber layouts.
//!
//! Coordinates live on a period-2pi torus per axis. Cells are 0-based:
//! cell `c` of an axis with step `dx` covers `[c dx, (c+1) dx)`, and a
//! kernel of half-support M touches the 2M cells `c - M + 1 ..= c + M`
//! around the owning cell, wrapped modulo the axis length.

use num_traits::{Float, FloatConst};

use crate::cast;

/// Reduce a coordinate to the fundamental cell [0, 2pi).
#[inline]
pub fn to_unit_cell<T: Float + FloatConst>(x: T) -> T {
    let two_pi = T::PI() + T::PI();
    let y = x - two_pi * (x / two_pi).floor();
    // Rounding can land exactly on the upper boundary.
    if y >= two_pi {
        y - two_pi
    } else if y < T::zero() {
        T::zero()
    } else {
        y
    }
}

/// Owning cell of `x` and the fractional offset inside it.
///
/// Returns `(c, u)` with `c dx <= x < (c+1) dx` (up to floating-point
/// drift, which is absorbed by bumping `c`) and `u = x/dx - c` in [0, 1).
#[inline]
pub fn cell_and_offset<T: Float>(x: T, dx: T) -> (usize, T) {
    let q = x / dx;
    let mut cell = q.floor();
    if (cell + T::one()) * dx <= x {
        cell = cell + T::one();
    }
    let u = (q - cell).max(T::zero());
    (cell.to_usize().unwrap_or(0), u)
}

/// Write the 2M wrapped neighbour cells of `cell` into `out`:
/// `cell - M + 1 ..= cell + M`, each reduced modulo `n`.
///
/// The starting cell is wrapped once; successors use a single compare
/// instead of a division. Requires `2M < n`.
#[inline]
pub fn wrapped_cells(cell: usize, m: usize, n: usize, out: &mut [usize]) {
    debug_assert!(2 * m < n);
    debug_assert_eq!(out.len(), 2 * m);
    let mut j = (cell + n + 1 - m) % n;
    for slot in out.iter_mut() {
        *slot = j;
        j = if j == n - 1 { 0 } else { j + 1 };
    }
}

/// First cell of the 2M-neighbourhood when it does not cross the periodic
/// seam, or `None` when the wrapped variant is needed.
#[inline]
pub fn contiguous_start(cell: usize, m: usize, n: usize) -> Option<usize> {
    if cell + 1 >= m && cell + m < n {
        Some(cell + 1 - m)
    } else {
        None
    }
}

/// FFT-natural signed wavenumbers on `n` samples of a 2pi-periodic axis:
/// `0, 1, ..., ceil(n/2) - 1, -floor(n/2), ..., -1`.
pub fn wavenumbers<T: Float>(n: usize) -> Vec<T> {
    (0..n)
        .map(|i| {
            if i <= (n - 1) / 2 {
                cast(i as f64)
            } else {
                cast(i as f64 - n as f64)
            }
        })
        .collect()
}

/// Real-FFT half-spectrum wavenumbers: `0, 1, ..., n/2`.
pub fn rfft_wavenumbers<T: Float>(n: usize) -> Vec<T> {
    (0..=n / 2).map(|i| cast(i as f64)).collect()
}

/// Smallest integer >= `n` whose prime factors are all in {2, 3, 5}.
pub fn next_smooth(n: usize) -> usize {
    let mut candidate = n.max(1);
    loop {
        let mut rem = candidate;
        for p in [2usize, 3, 5] {
            while rem % p == 0 {
                rem /= p;
            }
        }
        if rem == 1 {
            return candidate;
        }
        candidate += 1;
    }
}

/// Map an integer-valued signed wavenumber onto its bin in a length-`n`
/// FFT layout.
#[inline]
pub fn spectrum_bin(k: f64, n: usize) -> usize {
    let ki = k.round() as i64;
    let n = n as i64;
    (((ki % n) + n) % n) as usize
}
