//! Saving and loading fitted models as JSON

use crate::error::{ForecastError, Result};
use crate::models::arima::FittedArima;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Version written into every saved model file
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    format_version: u32,
    model: &'a FittedArima,
}

#[derive(Deserialize)]
struct Envelope {
    format_version: u32,
    model: FittedArima,
}

/// Write a fitted model to `path`, replacing any existing file
pub fn save_model<P: AsRef<Path>>(path: P, model: &FittedArima) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(
        &mut writer,
        &EnvelopeRef {
            format_version: FORMAT_VERSION,
            model,
        },
    )?;
    writer.flush()?;

    info!(path = %path.display(), "saved fitted model");
    Ok(())
}

/// Read a model written by [`save_model`].
///
/// The stored state is checked with [`FittedArima::validate`], so a file
/// edited by hand fails here rather than inside `predict`.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<FittedArima> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let envelope: Envelope = serde_json::from_reader(reader)?;

    if envelope.format_version != FORMAT_VERSION {
        return Err(ForecastError::Serialization(format!(
            "unsupported model format version {} (expected {})",
            envelope.format_version, FORMAT_VERSION
        )));
    }

    envelope.model.validate().map_err(|err| {
        ForecastError::Serialization(format!("inconsistent model state: {}", err))
    })?;

    Ok(envelope.model)
}
