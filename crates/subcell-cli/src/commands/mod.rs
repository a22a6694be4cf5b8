pub mod check;
pub mod fmt;
pub mod import;
pub mod mesh;
pub mod scatter;

use crate::error::{CliError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub(crate) fn read_model_text(path: &Path) -> Result<String> {
    info!("Reading model from {:?}", path);
    std::fs::read_to_string(path).map_err(|e| CliError::parsing(path, e))
}

/// Model name derived from the file name: `models/egfr.bngl` is `egfr`.
pub(crate) fn model_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    info!("Writing JSON output to {:?}", path);
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| CliError::parsing(path, e))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
