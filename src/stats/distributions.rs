//! Special functions behind the Student-t significance test
//!
//! - [`ln_gamma`]: Lanczos approximation (g = 7, 9 coefficients) with the
//!   reflection formula below 0.5
//! - [`incomplete_beta`]: regularized incomplete beta `I_x(a, b)` by
//!   continued fraction (modified Lentz)
//! - [`student_t_p_value`]: two-tailed p-value of a t statistic

use std::f64::consts::PI;

const LANCZOS_G: f64 = 7.0;

const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Maximum continued-fraction iterations
const BETA_MAX_ITERATIONS: usize = 200;
/// Relative convergence tolerance of the continued fraction
const BETA_EPS: f64 = 3e-14;
/// Floor for Lentz denominators
const BETA_FPMIN: f64 = 1e-300;

/// Natural logarithm of |Γ(z)|.
///
/// For `z < 0.5` the reflection formula `Γ(z)·Γ(1-z) = π / sin(πz)` maps the
/// argument back into the range where the series converges.
pub fn ln_gamma(z: f64) -> f64 {
    if z < 0.5 {
        return (PI / (PI * z).sin()).abs().ln() - ln_gamma(1.0 - z);
    }

    let z = z - 1.0;
    let mut x = LANCZOS_COEFFICIENTS[0];
    for (i, &c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        x += c / (z + i as f64);
    }
    let t = z + LANCZOS_G + 0.5;

    0.5 * (2.0 * PI).ln() + (z + 0.5) * t.ln() - t + x.ln()
}

/// Regularized incomplete beta function `I_x(a, b)` for `a, b > 0`.
///
/// Values of `x` outside `[0, 1]` are clamped.
pub fn incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x.is_nan() || !(a > 0.0) || !(b > 0.0) {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    // The continued fraction converges fastest on this side of the mean
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < BETA_FPMIN {
        d = BETA_FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=BETA_MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        // Even step
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < BETA_FPMIN {
            d = BETA_FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < BETA_FPMIN {
            c = BETA_FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        // Odd step
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < BETA_FPMIN {
            d = BETA_FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < BETA_FPMIN {
            c = BETA_FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < BETA_EPS {
            return h;
        }
    }

    tracing::trace!(x, a, b, "incomplete beta continued fraction did not converge");
    h
}

/// Two-tailed p-value of Student's t with `df` degrees of freedom:
/// `I_{df/(df+t²)}(df/2, 1/2)`, clamped to `[0, 1]`
pub fn student_t_p_value(t: f64, df: f64) -> f64 {
    if !(df > 0.0) || t.is_nan() {
        return 1.0;
    }
    if t.is_infinite() {
        return 0.0;
    }
    let x = df / (df + t * t);
    incomplete_beta(x, df / 2.0, 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ln_gamma_integers() {
        // Γ(n) = (n-1)!
        assert_relative_eq!(ln_gamma(1.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(ln_gamma(2.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(ln_gamma(5.0), 24.0_f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(ln_gamma(11.0), 3_628_800.0_f64.ln(), epsilon = 1e-10);
    }

    #[test]
    fn test_ln_gamma_reflection() {
        // Γ(1/2) = √π
        assert_relative_eq!(ln_gamma(0.5), PI.sqrt().ln(), epsilon = 1e-12);
        // Γ(1/4) ≈ 3.6256099082
        assert_relative_eq!(ln_gamma(0.25), 3.625_609_908_221_908_f64.ln(), epsilon = 1e-10);
        // |Γ(-1/2)| = 2√π
        assert_relative_eq!(ln_gamma(-0.5), (2.0 * PI.sqrt()).ln(), epsilon = 1e-10);
    }

    #[test]
    fn test_ln_gamma_large_argument() {
        // Stirling check at z = 1000
        let z: f64 = 1000.0;
        let stirling = (z - 0.5) * z.ln() - z + 0.5 * (2.0 * PI).ln() + 1.0 / (12.0 * z);
        assert_relative_eq!(ln_gamma(z), stirling, max_relative = 1e-10);
    }

    #[test]
    fn test_incomplete_beta_known_values() {
        // I_x(1, 1) = x
        assert_relative_eq!(incomplete_beta(0.3, 1.0, 1.0), 0.3, epsilon = 1e-12);
        // I_x(a, 1) = x^a
        assert_relative_eq!(incomplete_beta(0.5, 3.0, 1.0), 0.125, epsilon = 1e-12);
        // Symmetry: I_x(a, b) = 1 - I_{1-x}(b, a)
        let lhs = incomplete_beta(0.2, 2.5, 4.0);
        let rhs = 1.0 - incomplete_beta(0.8, 4.0, 2.5);
        assert_relative_eq!(lhs, rhs, epsilon = 1e-12);

        assert_eq!(incomplete_beta(0.0, 2.0, 3.0), 0.0);
        assert_eq!(incomplete_beta(1.0, 2.0, 3.0), 1.0);
        assert!(incomplete_beta(0.5, 0.0, 1.0).is_nan());
    }

    #[test]
    fn test_student_t_reference_values() {
        // t = 2.228 is the 97.5% quantile at df = 10
        assert_relative_eq!(student_t_p_value(2.228, 10.0), 0.05, epsilon = 5e-4);
        // t = 2.576 at large df approaches the normal 99.5% quantile
        assert_relative_eq!(student_t_p_value(2.576, 10_000.0), 0.01, epsilon = 5e-4);
        // df = 1 is Cauchy: p = 1 - 2·atan(t)/π
        let t: f64 = 3.0;
        assert_relative_eq!(
            student_t_p_value(t, 1.0),
            1.0 - 2.0 * t.atan() / PI,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_student_t_edges() {
        assert_eq!(student_t_p_value(0.0, 10.0), 1.0);
        assert_eq!(student_t_p_value(f64::INFINITY, 10.0), 0.0);
        assert_eq!(student_t_p_value(1.0, 0.0), 1.0);
        assert_eq!(student_t_p_value(f64::NAN, 5.0), 1.0);
    }
}
