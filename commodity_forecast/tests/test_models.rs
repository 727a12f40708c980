use assert_approx_eq::assert_approx_eq;
use commodity_forecast::models::arima::{Arima, ArimaOrder};
use commodity_forecast::models::lstm::LstmModel;
use commodity_forecast::models::{FittedModel, ForecastModel};
use commodity_forecast::{ForecastError, Stage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

fn simulate_arma(phi: f64, theta: f64, mean: f64, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).unwrap();

    let mut values = Vec::with_capacity(n);
    let mut prev = 0.0;
    let mut prev_error = 0.0;
    // Burn-in so the start value does not matter
    for i in 0..n + 200 {
        let error: f64 = rng.sample(noise);
        let x = phi * prev + error + theta * prev_error;
        prev = x;
        prev_error = error;
        if i >= 200 {
            values.push(mean + x);
        }
    }
    values
}

#[test]
fn test_ar1_recovers_coefficient() {
    let data = simulate_arma(0.6, 0.0, 50.0, 600, 7);
    let fitted = Arima::new(1, 0, 0).fit(&data).unwrap();

    assert!((fitted.ar_coefficients()[0] - 0.6).abs() < 0.1);
    assert!((fitted.mean() - 50.0).abs() < 0.5);
    assert!((fitted.sigma2() - 1.0).abs() < 0.2);
}

#[test]
fn test_ma1_recovers_coefficient() {
    let data = simulate_arma(0.0, 0.5, 0.0, 800, 11);
    let fitted = Arima::new(0, 0, 1).fit(&data).unwrap();

    assert!((fitted.ma_coefficients()[0] - 0.5).abs() < 0.1);
}

#[test]
fn test_arima_111_fits_integrated_series() {
    let increments = simulate_arma(0.4, 0.3, 0.0, 400, 23);
    let mut level = 100.0;
    let data: Vec<f64> = increments
        .iter()
        .map(|x| {
            level += x;
            level
        })
        .collect();

    let fitted = Arima::new(1, 1, 1).fit(&data).unwrap();

    assert_eq!(fitted.order(), ArimaOrder::new(1, 1, 1));
    assert!(fitted.ar_coefficients()[0].abs() < 1.0);
    assert!(fitted.ma_coefficients()[0].abs() < 1.0);
    assert!(fitted.aic().is_finite() && fitted.bic() > fitted.aic());

    let forecast = fitted.forecast(6).unwrap();
    assert_eq!(forecast.start(), data.len());
    assert_eq!(forecast.horizons(), 6);
    // Forecasts stay near the last level for a stationary increment process
    let last = *data.last().unwrap();
    for value in forecast.values() {
        assert!((value - last).abs() < 10.0);
    }
}

#[test]
fn test_predictions_cover_test_range() {
    let data: Vec<f64> = (0..30).map(|i| 10.0 + (i as f64 * 0.5).sin()).collect();
    let fitted = Arima::new(2, 0, 0).fit(&data[..24]).unwrap();

    let predictions = fitted.predict(24, 29).unwrap();
    assert_eq!(predictions.len(), 6);
    assert!(predictions.iter().all(|v| v.is_finite()));

    let in_sample = fitted.predict(0, 23).unwrap();
    assert_eq!(in_sample.len(), 24);
    // Warm-up values fall back to the mean
    assert_approx_eq!(in_sample[0], fitted.mean(), 1e-12);
}

#[test]
fn test_minimum_training_length() {
    let model = Arima::from_order(ArimaOrder::new(2, 1, 1));
    assert_eq!(model.order().min_observations(), 5);

    let err = model.fit(&[1.0, 2.0, 3.0, 4.0]).unwrap_err();
    assert!(err.is_insufficient_data());
    assert_eq!(err.stage(), Some(Stage::Fit));

    assert!(model.fit(&[1.0, 2.5, 2.0, 4.0, 3.5]).is_ok());
}

#[test]
fn test_non_finite_training_data() {
    let err = Arima::new(1, 0, 0)
        .fit(&[1.0, f64::NAN, 3.0, 4.0])
        .unwrap_err();
    assert!(matches!(err, ForecastError::ModelFit { .. }));
}

#[test]
fn test_lstm_is_not_implemented() {
    let model = LstmModel::default();
    assert_eq!(model.epochs, 100);
    assert_eq!(ForecastModel::name(&model), "LSTM");
    assert!(matches!(
        model.fit(&[1.0, 2.0, 3.0]),
        Err(ForecastError::NotImplemented(_))
    ));
}

fn generic_fit<M: ForecastModel>(model: &M, data: &[f64]) -> usize {
    model.fit(data).map(|f| f.training_len()).unwrap_or(0)
}

#[test]
fn test_models_share_interface() {
    let data = [1.0, 3.0, 2.0, 4.0, 3.0, 5.0];
    assert_eq!(generic_fit(&Arima::new(1, 0, 0), &data), 6);
    assert_eq!(generic_fit(&LstmModel::new(10), &data), 0);
}
