//! Commodity forecast CLI.
//!
//! Commands:
//! - `train`: backtest a model on the configured indicators and forecast ahead
//! - `predict`: extrapolate from a saved model

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commodity_forecast::config::{ModelKind, PipelineConfig};
use commodity_forecast::models::arima::ArimaOrder;
use commodity_forecast::models::FittedModel;
use commodity_forecast::persistence::{load_model, save_model};
use commodity_forecast::pipeline::ForecastPipeline;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "commodity_forecast",
    version,
    about = "Backtest and forecast commodity prices from economic indicators"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest the model on the target series and forecast past its end.
    Train {
        /// JSON configuration file; flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory containing the indicator files.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Indicator to forecast (e.g. gold, silver).
        #[arg(long)]
        target: Option<String>,

        /// Model family: arima or lstm.
        #[arg(long)]
        model: Option<ModelKind>,

        /// ARIMA order as three integers: p d q.
        #[arg(long, num_args = 3, value_names = ["P", "D", "Q"])]
        order: Option<Vec<usize>>,

        /// Fraction of the series used for training.
        #[arg(long)]
        train_split: Option<f64>,

        /// Months to forecast after the last observation.
        #[arg(long)]
        forecast_steps: Option<usize>,

        /// LSTM training epochs.
        #[arg(long)]
        epochs: Option<usize>,

        /// Save the model refitted on the full series to this path.
        #[arg(long)]
        save_model: Option<PathBuf>,

        /// Write the forecast to this CSV file.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Extrapolate from a model saved by `train --save-model`.
    Predict {
        /// Saved model file.
        #[arg(long)]
        model_file: PathBuf,

        /// Number of steps to forecast.
        #[arg(long, default_value_t = 12)]
        steps: usize,

        /// Write the forecast to this CSV file.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            config,
            data_dir,
            target,
            model,
            order,
            train_split,
            forecast_steps,
            epochs,
            save_model: save_path,
            output,
        } => {
            let mut cfg = match config {
                Some(path) => PipelineConfig::from_json_file(&path)
                    .with_context(|| format!("loading configuration from {}", path.display()))?,
                None => PipelineConfig::default(),
            };
            if let Some(dir) = data_dir {
                cfg = cfg.with_data_dir(dir);
            }
            if let Some(target) = target {
                cfg = cfg.with_target(target);
            }
            if let Some(model) = model {
                cfg = cfg.with_model(model);
            }
            if let Some([p, d, q]) = order.as_deref() {
                cfg = cfg.with_order(ArimaOrder::new(*p, *d, *q));
            }
            if let Some(split) = train_split {
                cfg = cfg.with_train_split(split);
            }
            if let Some(steps) = forecast_steps {
                cfg = cfg.with_forecast_steps(steps);
            }
            if let Some(epochs) = epochs {
                cfg = cfg.with_epochs(epochs);
            }

            train(cfg, save_path.as_deref(), output.as_deref())
        }
        Commands::Predict {
            model_file,
            steps,
            output,
        } => predict(&model_file, steps, output.as_deref()),
    }
}

fn train(config: PipelineConfig, save_path: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let target = config.target_commodity.clone();
    let pipeline = ForecastPipeline::new(config)?;

    let (monthly, warnings) = pipeline.prepare()?;
    if !warnings.is_empty() {
        info!(skipped = warnings.len(), "some indicators were not loaded");
    }

    let result = pipeline
        .run_on_table(&monthly)
        .with_context(|| format!("backtesting '{}'", target))?;

    println!("{}", result.model.summary());
    println!("Backtest over {} months", result.actuals.len());
    println!("RMSE: {:.4}", result.rmse);
    println!("{}", result.accuracy);

    let future = pipeline.forecast_future(&monthly)?;
    println!("Forecast for {}:", target);
    for (date, value) in future.dates.iter().zip(future.forecast.values()) {
        println!("  {}  {:.4}", date, value);
    }

    if let Some(path) = output {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(["date", "forecast"])?;
        for (date, value) in future.dates.iter().zip(future.forecast.values()) {
            writer.write_record([date.to_string(), value.to_string()])?;
        }
        writer.flush()?;
        info!(path = %path.display(), "wrote forecast");
    }

    if let Some(path) = save_path {
        save_model(path, &future.model)?;
    }

    Ok(())
}

fn predict(model_file: &Path, steps: usize, output: Option<&Path>) -> Result<()> {
    let model = load_model(model_file)
        .with_context(|| format!("loading model from {}", model_file.display()))?;
    let forecast = model.forecast(steps)?;

    println!("{} forecast, {} steps:", model.name(), steps);
    for (step, value) in forecast.values().iter().enumerate() {
        println!("  t+{:<3} {:.4}", step + 1, value);
    }

    if let Some(path) = output {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(["step", "forecast"])?;
        for (step, value) in forecast.values().iter().enumerate() {
            writer.write_record([(step + 1).to_string(), value.to_string()])?;
        }
        writer.flush()?;
    }

    Ok(())
}
