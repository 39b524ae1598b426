//! Modified and ordinary Bessel functions of order zero.
//!
//! Power-series evaluations, accurate over the argument ranges the
//! Kaiser-Bessel kernels produce (shape parameters are capped well below
//! the overflow threshold at construction). `besseli0` has all-positive
//! terms so the series is stable at any size; `besselj0` alternates and is
//! only used in the far spectral tail where the kernel transform is tiny.

/// Modified Bessel function of the first kind, order zero.
pub fn besseli0(x: f64) -> f64 {
    let q = 0.25 * x * x;
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut k = 1.0;
    while term > sum * f64::EPSILON {
        term *= q / (k * k);
        sum += term;
        k += 1.0;
    }
    sum
}

/// Bessel function of the first kind, order zero.
pub fn besselj0(x: f64) -> f64 {
    let q = 0.25 * x * x;
    let mut term: f64 = 1.0;
    let mut sum = 1.0;
    let mut k = 1.0;
    while term.abs() > 1e-18 {
        term *= -q / (k * k);
        sum += term;
        k += 1.0;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_besseli0_reference_values() {
        // Abramowitz & Stegun 9.8 tables.
        let cases = [
            (0.0, 1.0),
            (1.0, 1.2660658777520084),
            (2.0, 2.2795853023360673),
            (5.0, 27.239871823604442),
            (10.0, 2815.716628466254),
        ];
        for &(x, want) in &cases {
            let got = besseli0(x);
            let rel = ((got - want) / want).abs();
            assert!(rel < 1e-13, "I0({}) = {}, want {}", x, got, want);
        }
    }

    #[test]
    fn test_besseli0_large_argument() {
        // Asymptotic form e^x / sqrt(2 pi x); agreement to ~1/(8x).
        let x: f64 = 40.0;
        let asym = x.exp() / (2.0 * std::f64::consts::PI * x).sqrt();
        let got = besseli0(x);
        let rel = ((got - asym) / got).abs();
        assert!(rel < 0.01, "I0(40) far from asymptotic form: {}", rel);
    }

    #[test]
    fn test_besselj0_reference_values() {
        let cases = [
            (0.0, 1.0),
            (1.0, 0.7651976865579666),
            (2.0, 0.22389077914123567),
            (5.0, -0.17759677131433830),
        ];
        for &(x, want) in &cases {
            let got = besselj0(x);
            assert!(
                (got - want).abs() < 1e-12,
                "J0({}) = {}, want {}",
                x,
                got,
                want
            );
        }
    }

    #[test]
    fn test_besselj0_first_zero() {
        let z = 2.404825557695773;
        assert!(besselj0(z).abs() < 1e-12);
    }
}
