//! ARIMA models for time series forecasting
//!
//! Coefficients are estimated by conditional maximum likelihood: the series
//! is differenced `d` times, the first `p` differenced values are treated as
//! fixed, pre-sample errors are zero, and the innovation variance is
//! concentrated out, which leaves the conditional sum of squares as the
//! objective. AR and MA coefficients are searched in an unconstrained space
//! that maps onto stationary and invertible polynomials.

use crate::error::{ForecastError, Result, Stage};
use crate::models::{FittedModel, Forecast, ForecastModel};
use serde::{Deserialize, Serialize};
use series_math::differencing::{difference, integrate};
use series_math::optimize::{nelder_mead, NelderMeadConfig};
use series_math::stats::{autocovariance, levinson_durbin, mean};
use series_math::transform::{constrain_invertible, constrain_stationary, unconstrain_stationary};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;
use std::fmt;
use tracing::debug;

/// Longest extrapolation `predict` will produce past the training data
pub const MAX_FORECAST_HORIZON: usize = 10_000;

/// Orders of an ARIMA(p, d, q) model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Shortest training series the model can be fitted on
    pub fn min_observations(&self) -> usize {
        self.p + self.d + self.q + 1
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(5, 1, 0)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct Arima {
    /// Name of the model
    name: String,
    /// Model orders
    order: ArimaOrder,
    /// Settings for the coefficient search
    optimizer: NelderMeadConfig,
}

impl Arima {
    /// Create a new ARIMA model
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::from_order(ArimaOrder::new(p, d, q))
    }

    pub fn from_order(order: ArimaOrder) -> Self {
        Self {
            name: format!("ARIMA{}", order),
            order,
            optimizer: NelderMeadConfig::default(),
        }
    }

    /// Replace the optimiser settings
    pub fn with_optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Estimate AR and MA coefficients on the demeaned differenced series
    fn estimate_coefficients(&self, centered: &[f64]) -> Result<(Vec<f64>, Vec<f64>, usize)> {
        let (p, q) = (self.order.p, self.order.q);
        if p + q == 0 {
            return Ok((Vec::new(), Vec::new(), 0));
        }

        // Yule-Walker start for the AR part, zero MA
        let mut initial = vec![0.0; p + q];
        if p > 0 {
            let acov = autocovariance(centered, p)?;
            let phi = levinson_durbin(&acov, p)?;
            if let Ok(x) = unconstrain_stationary(&phi) {
                initial[..p].copy_from_slice(&x);
            }
        }

        let objective = |x: &[f64]| {
            let ar = constrain_stationary(&x[..p]);
            let ma = constrain_invertible(&x[p..]);
            conditional_sum_of_squares(centered, &ar, &ma)
        };

        let result = nelder_mead(objective, &initial, &self.optimizer).map_err(|err| {
            ForecastError::ModelFit {
                stage: Stage::Fit,
                reason: err.to_string(),
            }
        })?;

        if !result.converged {
            return Err(ForecastError::ModelFit {
                stage: Stage::Fit,
                reason: format!(
                    "optimizer did not converge within {} iterations (objective {:.6e})",
                    result.iterations, result.value
                ),
            });
        }

        Ok((
            constrain_stationary(&result.point[..p]),
            constrain_invertible(&result.point[p..]),
            result.iterations,
        ))
    }
}

impl ForecastModel for Arima {
    type Fitted = FittedArima;

    fn fit(&self, train: &[f64]) -> Result<FittedArima> {
        let order = self.order;
        if train.len() < order.min_observations() {
            return Err(ForecastError::InsufficientData {
                stage: Stage::Fit,
                required: order.min_observations(),
                actual: train.len(),
            });
        }
        if train.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit {
                stage: Stage::Fit,
                reason: "training data contains non-finite values".to_string(),
            });
        }

        let differenced = difference(train, order.d);
        // Differenced models carry no constant
        let level = if order.d == 0 { mean(&differenced)? } else { 0.0 };
        let centered: Vec<f64> = differenced.iter().map(|w| w - level).collect();

        let (ar_coefficients, ma_coefficients, iterations) =
            self.estimate_coefficients(&centered)?;
        let residuals = arma_residuals(&centered, &ar_coefficients, &ma_coefficients);

        let n_eff = (centered.len() - order.p) as f64;
        let css: f64 = residuals[order.p..].iter().map(|e| e * e).sum();
        let sigma2 = css / n_eff;
        let log_likelihood =
            -0.5 * n_eff * ((2.0 * PI).ln() + sigma2.max(f64::MIN_POSITIVE).ln() + 1.0);

        // Coefficients, variance and, without differencing, the mean
        let k = (order.p + order.q + 1 + usize::from(order.d == 0)) as f64;
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * n_eff.ln();

        let all_finite = ar_coefficients
            .iter()
            .chain(ma_coefficients.iter())
            .chain([sigma2, log_likelihood].iter())
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ForecastError::ModelFit {
                stage: Stage::Fit,
                reason: "estimation produced non-finite parameters".to_string(),
            });
        }

        debug!(
            model = %self.name,
            iterations,
            sigma2,
            aic,
            "fitted ARIMA model"
        );

        Ok(FittedArima {
            name: self.name.clone(),
            order,
            mean: level,
            ar_coefficients,
            ma_coefficients,
            sigma2,
            log_likelihood,
            aic,
            bic,
            iterations,
            history: train.to_vec(),
            differenced,
            residuals,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fitted ARIMA model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedArima {
    /// Name of the model
    name: String,
    /// Model orders
    order: ArimaOrder,
    /// Mean of the differenced series (zero when d > 0)
    mean: f64,
    /// Fitted AR coefficients
    ar_coefficients: Vec<f64>,
    /// Fitted MA coefficients
    ma_coefficients: Vec<f64>,
    /// Innovation variance
    sigma2: f64,
    /// Conditional log-likelihood
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    /// Optimiser iterations used
    iterations: usize,
    /// Training series
    history: Vec<f64>,
    /// Training series differenced d times
    differenced: Vec<f64>,
    /// In-sample innovations, zero for the conditioning values
    residuals: Vec<f64>,
}

impl FittedArima {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// Estimated innovation variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Bayesian information criterion
    pub fn bic(&self) -> f64 {
        self.bic
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// The training series the model was fitted on
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Check that the stored state is one `fit` could have produced.
    ///
    /// Models read from outside the process go through this before use.
    pub fn validate(&self) -> Result<()> {
        let ArimaOrder { p, d, q } = self.order;
        let inconsistent = |reason: String| Err(ForecastError::InvalidParameter(reason));

        if self.ar_coefficients.len() != p || self.ma_coefficients.len() != q {
            return inconsistent(format!(
                "order {} but {} AR and {} MA coefficients",
                self.order,
                self.ar_coefficients.len(),
                self.ma_coefficients.len()
            ));
        }
        if self.history.len() < self.order.min_observations() {
            return inconsistent(format!(
                "order {} needs {} observations, history has {}",
                self.order,
                self.order.min_observations(),
                self.history.len()
            ));
        }
        if self.differenced.len() != self.history.len() - d
            || self.residuals.len() != self.differenced.len()
        {
            return inconsistent(format!(
                "{} observations give {} differenced values and {} residuals",
                self.history.len(),
                self.differenced.len(),
                self.residuals.len()
            ));
        }

        let scalars = [self.mean, self.sigma2, self.log_likelihood, self.aic, self.bic];
        let all_finite = scalars
            .iter()
            .chain(&self.ar_coefficients)
            .chain(&self.ma_coefficients)
            .chain(&self.history)
            .chain(&self.differenced)
            .chain(&self.residuals)
            .all(|v| v.is_finite());
        if !all_finite || self.sigma2 < 0.0 {
            return inconsistent("non-finite parameters or negative variance".to_string());
        }

        Ok(())
    }

    /// Extrapolate `steps` values with `level` prediction intervals (e.g. 0.95)
    pub fn forecast_with_intervals(&self, steps: usize, level: f64) -> Result<Forecast> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Interval level must be between 0 and 1, got {}",
                level
            )));
        }

        let forecast = self.forecast(steps)?;
        let normal = Normal::new(0.0, 1.0)
            .map_err(|err| ForecastError::InvalidParameter(err.to_string()))?;
        let z = normal.inverse_cdf(0.5 + level / 2.0);

        let mut cumulative = 0.0;
        let intervals: Vec<(f64, f64)> = forecast
            .values()
            .iter()
            .zip(self.psi_weights(steps))
            .map(|(value, psi)| {
                cumulative += psi * psi;
                let se = (self.sigma2 * cumulative).sqrt();
                (value - z * se, value + z * se)
            })
            .collect();

        Forecast::new_with_intervals(forecast.start(), forecast.into_values(), intervals)
    }

    /// Human-readable description of the fitted parameters
    pub fn summary(&self) -> String {
        let mut s = format!("{} Model Summary\n", self.name);
        s.push_str(&"=".repeat(40));
        s.push('\n');
        s.push_str(&format!("Observations: {}\n", self.history.len()));

        if self.order.d == 0 {
            s.push_str(&format!("Mean: {:.6}\n", self.mean));
        }
        for (i, c) in self.ar_coefficients.iter().enumerate() {
            s.push_str(&format!("  ar.L{} = {:.6}\n", i + 1, c));
        }
        for (i, c) in self.ma_coefficients.iter().enumerate() {
            s.push_str(&format!("  ma.L{} = {:.6}\n", i + 1, c));
        }

        s.push_str(&format!("Sigma2: {:.6}\n", self.sigma2));
        s.push_str(&format!("Log likelihood: {:.4}\n", self.log_likelihood));
        s.push_str(&format!("AIC: {:.2}\n", self.aic));
        s.push_str(&format!("BIC: {:.2}\n", self.bic));
        s
    }

    /// One-step-ahead prediction of training index `t`
    fn one_step(&self, t: usize) -> f64 {
        let ArimaOrder { p, d, q } = self.order;

        // Not enough history to condition on
        if t < d + p {
            return if d == 0 {
                self.mean
            } else if t == 0 {
                self.history[0]
            } else {
                self.history[t - 1]
            };
        }

        let k = t - d;
        let mut pred = self.mean;
        for i in 0..p {
            pred += self.ar_coefficients[i] * (self.differenced[k - 1 - i] - self.mean);
        }
        for j in 0..q.min(k) {
            pred += self.ma_coefficients[j] * self.residuals[k - 1 - j];
        }

        // Undo the differencing with the observed past values
        pred + self.history[t] - self.differenced[k]
    }

    /// Recursive forecasts for the `steps` indices after the training data
    fn extrapolate(&self, steps: usize) -> Result<Vec<f64>> {
        let ArimaOrder { p, d, q } = self.order;

        let mut w: Vec<f64> = self.differenced.iter().map(|v| v - self.mean).collect();
        let mut e = self.residuals.clone();
        let mut out = Vec::with_capacity(steps);

        for _ in 0..steps {
            let k = w.len();
            let mut pred = 0.0;
            for i in 0..p.min(k) {
                pred += self.ar_coefficients[i] * w[k - 1 - i];
            }
            for j in 0..q.min(k) {
                pred += self.ma_coefficients[j] * e[k - 1 - j];
            }

            w.push(pred);
            // Future innovations are zero in expectation
            e.push(0.0);
            out.push(pred + self.mean);
        }

        Ok(integrate(&out, &self.history, d)?)
    }

    /// MA(infinity) weights of the integrated model
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        // AR polynomial times (1 - L)^d
        let mut poly = vec![1.0];
        poly.extend(self.ar_coefficients.iter().map(|c| -c));
        for _ in 0..self.order.d {
            let mut next = vec![0.0; poly.len() + 1];
            for (i, c) in poly.iter().enumerate() {
                next[i] += c;
                next[i + 1] -= c;
            }
            poly = next;
        }
        let phi_star: Vec<f64> = poly[1..].iter().map(|c| -c).collect();

        let mut psi = vec![0.0; horizon];
        for j in 0..horizon {
            if j == 0 {
                psi[0] = 1.0;
                continue;
            }
            let mut value = self.ma_coefficients.get(j - 1).copied().unwrap_or(0.0);
            for i in 1..=j.min(phi_star.len()) {
                value += phi_star[i - 1] * psi[j - i];
            }
            psi[j] = value;
        }
        psi
    }
}

impl FittedModel for FittedArima {
    fn predict(&self, start: usize, end: usize) -> Result<Vec<f64>> {
        if start > end {
            return Err(ForecastError::InvalidParameter(format!(
                "Prediction start ({}) is after end ({})",
                start, end
            )));
        }

        let n = self.history.len();
        if n == 0 {
            return Err(ForecastError::InsufficientData {
                stage: Stage::Predict,
                required: 1,
                actual: 0,
            });
        }
        if end >= n && end - n + 1 > MAX_FORECAST_HORIZON {
            return Err(ForecastError::InvalidParameter(format!(
                "Prediction end ({}) is more than {} steps past the training data",
                end, MAX_FORECAST_HORIZON
            )));
        }

        let mut predictions = Vec::with_capacity(end - start + 1);

        for t in start..=end.min(n - 1) {
            predictions.push(self.one_step(t));
        }

        if end >= n {
            let future = self.extrapolate(end - n + 1)?;
            let skip = start.saturating_sub(n);
            predictions.extend_from_slice(&future[skip..]);
        }

        Ok(predictions)
    }

    fn training_len(&self) -> usize {
        self.history.len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Innovations of an ARMA model on a demeaned series, conditioning on the first `p` values
fn arma_residuals(centered: &[f64], ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let (p, q) = (ar.len(), ma.len());
    let mut residuals = vec![0.0; centered.len()];

    for t in p..centered.len() {
        let mut pred = 0.0;
        for i in 0..p {
            pred += ar[i] * centered[t - 1 - i];
        }
        for j in 0..q.min(t) {
            pred += ma[j] * residuals[t - 1 - j];
        }
        residuals[t] = centered[t] - pred;
    }

    residuals
}

fn conditional_sum_of_squares(centered: &[f64], ar: &[f64], ma: &[f64]) -> f64 {
    arma_residuals(centered, ar, ma)[ar.len()..]
        .iter()
        .map(|e| e * e)
        .sum()
}
