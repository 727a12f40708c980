//! Derivative-free minimisation with the Nelder-Mead simplex method

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Settings for [`nelder_mead`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadConfig {
    /// Maximum number of simplex iterations
    pub max_iter: usize,
    /// Convergence tolerance on the objective spread and the simplex size
    pub tolerance: f64,
    /// Size of the initial simplex along each axis
    pub initial_step: f64,
    /// Reflection coefficient
    pub alpha: f64,
    /// Expansion coefficient
    pub gamma: f64,
    /// Contraction coefficient
    pub rho: f64,
    /// Shrink coefficient
    pub sigma: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 20_000,
            tolerance: 1e-10,
            initial_step: 0.1,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
        }
    }
}

/// Outcome of a minimisation
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadResult {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the tolerance was met before `max_iter`
    pub converged: bool,
}

/// Minimise `objective` starting from `initial`.
///
/// Non-finite objective values are treated as `+inf`, so the simplex moves
/// away from regions where the objective is undefined.
pub fn nelder_mead<F>(objective: F, initial: &[f64], config: &NelderMeadConfig) -> Result<NelderMeadResult>
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        return Err(MathError::InvalidInput(
            "Nelder-Mead needs at least one parameter".to_string(),
        ));
    }
    if !(config.tolerance > 0.0) || !(config.initial_step > 0.0) {
        return Err(MathError::InvalidInput(format!(
            "Tolerance ({}) and initial step ({}) must be positive",
            config.tolerance, config.initial_step
        )));
    }

    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    let n = initial.len();
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        vertex[i] += config.initial_step;
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|x| eval(x)).collect();

    if !values[0].is_finite() {
        return Err(MathError::CalculationError(
            "Objective is not finite at the initial point".to_string(),
        ));
    }

    let mut iterations = 0;
    let mut converged = false;

    loop {
        sort_simplex(&mut simplex, &mut values);

        if has_converged(&simplex, &values, config.tolerance) {
            converged = true;
            break;
        }
        if iterations >= config.max_iter {
            break;
        }
        iterations += 1;

        // Centroid of every vertex but the worst
        let mut centroid = vec![0.0; n];
        for vertex in &simplex[..n] {
            for (c, x) in centroid.iter_mut().zip(vertex.iter()) {
                *c += x / n as f64;
            }
        }

        let worst = simplex[n].clone();
        let reflected = along(&centroid, &worst, -config.alpha);
        let f_reflected = eval(&reflected);

        if f_reflected < values[0] {
            let expanded = along(&centroid, &reflected, config.gamma);
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                simplex[n] = expanded;
                values[n] = f_expanded;
            } else {
                simplex[n] = reflected;
                values[n] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[n - 1] {
            simplex[n] = reflected;
            values[n] = f_reflected;
            continue;
        }

        let (contracted, f_contracted) = if f_reflected < values[n] {
            let outside = along(&centroid, &reflected, config.rho);
            let f = eval(&outside);
            (outside, f)
        } else {
            let inside = along(&centroid, &worst, config.rho);
            let f = eval(&inside);
            (inside, f)
        };

        if f_contracted < values[n].min(f_reflected) {
            simplex[n] = contracted;
            values[n] = f_contracted;
            continue;
        }

        // Shrink towards the best vertex
        let best = simplex[0].clone();
        for i in 1..=n {
            simplex[i] = along(&best, &simplex[i], config.sigma);
            values[i] = eval(&simplex[i]);
        }
    }

    sort_simplex(&mut simplex, &mut values);

    Ok(NelderMeadResult {
        point: simplex.swap_remove(0),
        value: values[0],
        iterations,
        converged,
    })
}

/// `origin + scale * (target - origin)`
fn along(origin: &[f64], target: &[f64], scale: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target.iter())
        .map(|(o, t)| o + scale * (t - o))
        .collect()
}

fn sort_simplex(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = order.iter().map(|&i| simplex[i].clone()).collect();
    *values = order.iter().map(|&i| values[i]).collect();
}

fn has_converged(simplex: &[Vec<f64>], values: &[f64], tolerance: f64) -> bool {
    let best = values[0];
    let worst = values[values.len() - 1];
    if !worst.is_finite() {
        return false;
    }
    if worst - best <= tolerance * (best.abs() + tolerance) {
        return true;
    }

    let diameter = simplex[1..]
        .iter()
        .flat_map(|vertex| vertex.iter().zip(simplex[0].iter()).map(|(a, b)| (a - b).abs()))
        .fold(0.0, f64::max);
    diameter <= tolerance
}
