//! Descriptive statistics and autoregressive estimation helpers

use crate::{MathError, Result};

/// Arithmetic mean of a slice
pub fn mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty series".to_string(),
        ));
    }

    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample autocovariances for lags `0..=max_lag`, normalised by `n`
pub fn autocovariance(data: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    if data.len() <= max_lag {
        return Err(MathError::InsufficientData(format!(
            "Need more than {} observations for lag {} autocovariance, got {}",
            max_lag,
            max_lag,
            data.len()
        )));
    }

    let n = data.len();
    let m = mean(data)?;
    let centered: Vec<f64> = data.iter().map(|x| x - m).collect();

    let acov = (0..=max_lag)
        .map(|k| {
            centered[k..]
                .iter()
                .zip(centered.iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n as f64
        })
        .collect();

    Ok(acov)
}

/// Solve the Yule-Walker equations with the Levinson-Durbin recursion.
///
/// `acov` holds autocovariances for lags `0..=order`. Returns the AR
/// coefficients `phi_1..phi_order`. A series with zero variance yields
/// all-zero coefficients.
pub fn levinson_durbin(acov: &[f64], order: usize) -> Result<Vec<f64>> {
    if acov.len() < order + 1 {
        return Err(MathError::InvalidInput(format!(
            "Levinson-Durbin of order {} needs {} autocovariances, got {}",
            order,
            order + 1,
            acov.len()
        )));
    }

    if order == 0 || acov[0].abs() < 1e-12 {
        return Ok(vec![0.0; order]);
    }

    let mut phi: Vec<f64> = Vec::with_capacity(order);
    let mut error = acov[0];

    for k in 0..order {
        let mut num = acov[k + 1];
        for j in 0..k {
            num -= phi[j] * acov[k - j];
        }

        // Perfectly predictable series; higher lags add nothing
        if error.abs() < 1e-12 {
            phi.resize(order, 0.0);
            break;
        }

        let reflection = num / error;
        let mut next = vec![0.0; k + 1];
        next[k] = reflection;
        for j in 0..k {
            next[j] = phi[j] - reflection * phi[k - 1 - j];
        }

        error *= 1.0 - reflection * reflection;
        phi = next;
    }

    Ok(phi)
}
