use commodity_forecast::config::{ModelKind, PipelineConfig};
use commodity_forecast::data::IndicatorSource;
use commodity_forecast::models::arima::ArimaOrder;
use commodity_forecast::ForecastError;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_partial_json_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "data_dir": "/srv/indicators",
            "target_commodity": "silver",
            "model_order": { "p": 2, "d": 1, "q": 1 },
            "optimizer": { "max_iter": 500 }
        }"#,
    )
    .unwrap();

    let config = PipelineConfig::from_json_file(&path).unwrap();

    assert_eq!(config.data_dir, PathBuf::from("/srv/indicators"));
    assert_eq!(config.target_commodity, "silver");
    assert_eq!(config.model_order, ArimaOrder::new(2, 1, 1));
    assert_eq!(config.model, ModelKind::Arima);
    assert_eq!(config.train_split, 0.8);
    assert_eq!(config.forecast_steps, 12);
    assert_eq!(config.optimizer.max_iter, 500);
    assert_eq!(config.optimizer.tolerance, 1e-10);
}

#[test]
fn test_model_kind_in_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "model": "lstm", "epochs": 20 }"#).unwrap();

    let config = PipelineConfig::from_json_file(&path).unwrap();
    assert_eq!(config.model, ModelKind::Lstm);
    assert_eq!(config.epochs, 20);
}

#[rstest]
#[case(r#"{ "target_commodity": "platinum" }"#)]
#[case(r#"{ "train_split": 1.0 }"#)]
#[case(r#"{ "forecast_steps": 0 }"#)]
#[case(r#"{ "model": "prophet" }"#)]
#[case("not json")]
fn test_invalid_configuration(#[case] json: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, json).unwrap();

    assert!(matches!(
        PipelineConfig::from_json_file(&path),
        Err(ForecastError::Config(_))
    ));
}

#[test]
fn test_custom_indicators() {
    let config = PipelineConfig::default()
        .with_indicators(vec![
            IndicatorSource::new("brent", "brent.csv"),
            IndicatorSource::new("wti", "wti.csv"),
        ])
        .with_target("wti");
    assert!(config.validate().is_ok());

    let round_trip: PipelineConfig =
        serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
    assert_eq!(round_trip, config);
}

#[test]
fn test_missing_config_file() {
    assert!(matches!(
        PipelineConfig::from_json_file("does/not/exist.json"),
        Err(ForecastError::Config(_))
    ));
}
