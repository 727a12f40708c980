//! Reparameterisation of ARMA coefficients.
//!
//! Unconstrained reals are mapped to partial autocorrelations in (-1, 1)
//! and then through the Durbin-Levinson recursion to polynomial
//! coefficients. Every unconstrained vector therefore corresponds to a
//! stationary AR polynomial (or, with the sign flipped, an invertible MA
//! polynomial), which lets an unconstrained optimiser search safely.

use crate::{MathError, Result};

/// Map unconstrained values to the coefficients of a stationary AR polynomial
pub fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let partials: Vec<f64> = unconstrained
        .iter()
        .map(|x| x / (1.0 + x * x).sqrt())
        .collect();

    let mut coeffs: Vec<f64> = Vec::with_capacity(partials.len());
    for (k, &r) in partials.iter().enumerate() {
        let mut next = vec![0.0; k + 1];
        next[k] = r;
        for j in 0..k {
            next[j] = coeffs[j] - r * coeffs[k - 1 - j];
        }
        coeffs = next;
    }

    coeffs
}

/// Inverse of [`constrain_stationary`].
///
/// Fails if `coeffs` do not describe a stationary AR polynomial.
pub fn unconstrain_stationary(coeffs: &[f64]) -> Result<Vec<f64>> {
    let mut current = coeffs.to_vec();
    let mut partials = vec![0.0; coeffs.len()];

    for k in (0..coeffs.len()).rev() {
        let r = current[k];
        if !r.is_finite() || r.abs() >= 1.0 {
            return Err(MathError::InvalidInput(format!(
                "Coefficients {:?} are not stationary (partial autocorrelation {} at lag {})",
                coeffs,
                r,
                k + 1
            )));
        }
        partials[k] = r;

        let denom = 1.0 - r * r;
        current = (0..k)
            .map(|j| (current[j] + r * current[k - 1 - j]) / denom)
            .collect();
    }

    Ok(partials.iter().map(|r| r / (1.0 - r * r).sqrt()).collect())
}

/// Map unconstrained values to the coefficients of an invertible MA polynomial
pub fn constrain_invertible(unconstrained: &[f64]) -> Vec<f64> {
    constrain_stationary(unconstrained)
        .into_iter()
        .map(|c| -c)
        .collect()
}
