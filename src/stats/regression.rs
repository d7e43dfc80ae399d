use super::correlation::paired_len;
use serde::{Deserialize, Serialize};

/// Ordinary least-squares fit of `y = intercept + slope·x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearRegression {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Standard error of the slope (`NaN` with only two points)
    pub slope_std_error: f64,
    pub sample_size: usize,
}

impl LinearRegression {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Least-squares line through the finite pairs of `x` and `y`.
///
/// `None` for mismatched lengths, fewer than two finite pairs, or constant
/// `x`.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Option<LinearRegression> {
    paired_len(x, y, 2).ok()?;

    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .unzip();
    let n = xs.len();
    if n < 2 {
        return None;
    }

    let nf = n as f64;
    let mean_x = xs.iter().sum::<f64>() / nf;
    let mean_y = ys.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in xs.iter().zip(&ys) {
        sxx += (a - mean_x) * (a - mean_x);
        sxy += (a - mean_x) * (b - mean_y);
        syy += (b - mean_y) * (b - mean_y);
    }
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_res: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(&a, &b)| {
            let residual = b - (intercept + slope * a);
            residual * residual
        })
        .sum();
    // A constant y is fitted exactly
    let r_squared = if syy == 0.0 { 1.0 } else { 1.0 - ss_res / syy };

    let slope_std_error = if n > 2 {
        (ss_res / (nf - 2.0) / sxx).sqrt()
    } else {
        f64::NAN
    };

    Some(LinearRegression {
        slope,
        intercept,
        r_squared,
        slope_std_error,
        sample_size: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let fit = linear_regression(&x, &y).unwrap();
        assert_relative_eq!(fit.slope, 2.0);
        assert_relative_eq!(fit.intercept, 1.0);
        assert_relative_eq!(fit.r_squared, 1.0);
        assert_relative_eq!(fit.slope_std_error, 0.0);
        assert_relative_eq!(fit.predict(10.0), 21.0);
    }

    #[test]
    fn test_noisy_line() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        let fit = linear_regression(&x, &y).unwrap();
        assert_relative_eq!(fit.slope, 0.6, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 2.2, epsilon = 1e-12);
        assert_relative_eq!(fit.r_squared, 0.6, epsilon = 1e-12);
        assert!(fit.slope_std_error > 0.0);
    }

    #[test]
    fn test_skips_non_finite_pairs() {
        let x = [0.0, 1.0, f64::NAN, 3.0];
        let y = [0.0, 2.0, 100.0, 6.0];
        let fit = linear_regression(&x, &y).unwrap();
        assert_eq!(fit.sample_size, 3);
        assert_relative_eq!(fit.slope, 2.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(linear_regression(&[1.0], &[1.0]).is_none());
        assert!(linear_regression(&[1.0, 2.0], &[1.0]).is_none());
        assert!(linear_regression(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(linear_regression(&[1.0, 2.0], &[3.0, 3.0]).unwrap().slope == 0.0);
    }
}
