//! Closed-form single-dose solutions.
//!
//! Every function here returns an amount-normalised concentration in mg/L for
//! one dose given at `t = 0`, and knows nothing about timestamps, units of the
//! input records or superposition. Negative `t` is the caller's problem.

/// Rates closer than this are treated as coincident
pub(crate) const COINCIDENT_RATE_EPS: f64 = 1e-9;

/// Unit absorption response `(e^{-λt} - e^{-ka·t}) / (ka - λ)`.
///
/// This is the convolution of a first-order input at rate `ka` with a unit
/// exponential disposition `e^{-λt}`. When the two rates coincide it takes
/// its analytic limit `t·e^{-ka·t}`.
pub fn absorption_response(ka: f64, lambda: f64, t: f64) -> f64 {
    if (ka - lambda).abs() < COINCIDENT_RATE_EPS {
        t * (-ka * t).exp()
    } else {
        ((-lambda * t).exp() - (-ka * t).exp()) / (ka - lambda)
    }
}

/// Convolution of three unit exponentials with rates `a`, `b`, `c`.
///
/// Returns `None` when any two rates are within `eps` of each other, since
/// the partial-fraction form has a zero denominator there.
pub fn triexponential(a: f64, b: f64, c: f64, t: f64, eps: f64) -> Option<f64> {
    if (a - b).abs() < eps || (a - c).abs() < eps || (b - c).abs() < eps {
        return None;
    }
    let value = (-a * t).exp() / ((b - a) * (c - a))
        + (-b * t).exp() / ((a - b) * (c - b))
        + (-c * t).exp() / ((a - c) * (b - c));
    Some(value)
}

/// Bateman equation: one compartment with first-order absorption.
///
/// `C(t) = F·D·ka / (V·(ka - ke)) · (e^{-ke·t} - e^{-ka·t})`
///
/// # Assumptions
/// - `dose` in mg, `volume` in L
/// - `ka != ke` (see [`absorption_response`] for the coincident limit)
pub fn one_compartment_oral(dose: f64, f: f64, ka: f64, ke: f64, volume: f64, t: f64) -> f64 {
    f * dose * ka / volume * absorption_response(ka, ke, t)
}

/// One compartment, intravenous bolus: `C(t) = D/V · e^{-ke·t}`
pub fn one_compartment_bolus(dose: f64, ke: f64, volume: f64, t: f64) -> f64 {
    dose / volume * (-ke * t).exp()
}

/// Bi-exponential disposition with first-order absorption.
///
/// The central-compartment unit response is
/// `fp·e^{-α·t} + (1 - fp)·e^{-β·t}` over the central volume, convolved with
/// the absorption input.
///
/// # Assumptions
/// - `peripheral_fraction` in `[0, 1)`
/// - `central_volume` in L
#[allow(clippy::too_many_arguments)]
pub fn two_compartment_oral(
    dose: f64,
    f: f64,
    ka: f64,
    alpha: f64,
    beta: f64,
    peripheral_fraction: f64,
    central_volume: f64,
    t: f64,
) -> f64 {
    let distribution = peripheral_fraction * absorption_response(ka, alpha, t);
    let elimination = (1.0 - peripheral_fraction) * absorption_response(ka, beta, t);
    f * dose * ka / central_volume * (distribution + elimination)
}

/// Bi-exponential disposition, intravenous bolus
pub fn two_compartment_bolus(
    dose: f64,
    alpha: f64,
    beta: f64,
    peripheral_fraction: f64,
    central_volume: f64,
    t: f64,
) -> f64 {
    dose / central_volume
        * (peripheral_fraction * (-alpha * t).exp()
            + (1.0 - peripheral_fraction) * (-beta * t).exp())
}
