//! Differencing and its inverse

use crate::{MathError, Result};

/// Difference a series `order` times.
///
/// Each pass shortens the series by one; differencing a series that is not
/// longer than `order` yields an empty vector.
pub fn difference(data: &[f64], order: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..order {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Integrate `order`-times differenced values back onto the level of `history`.
///
/// `increments` continue the series directly after the last element of
/// `history`, expressed on the `order`-th difference scale.
pub fn integrate(increments: &[f64], history: &[f64], order: usize) -> Result<Vec<f64>> {
    if order == 0 {
        return Ok(increments.to_vec());
    }

    if history.len() < order {
        return Err(MathError::InsufficientData(format!(
            "Integrating {} time(s) needs at least {} history values, got {}",
            order,
            order,
            history.len()
        )));
    }

    // Last value of each difference level 0..order
    let mut last: Vec<f64> = (0..order)
        .map(|k| {
            let level = difference(&history[history.len() - order..], k);
            level[level.len() - 1]
        })
        .collect();

    let mut result = Vec::with_capacity(increments.len());
    for &inc in increments {
        let mut carry = inc;
        for k in (0..order).rev() {
            last[k] += carry;
            carry = last[k];
        }
        result.push(carry);
    }

    Ok(result)
}
