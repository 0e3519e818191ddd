//! JSON export for candlestick output.

use super::KlineOutput;
use super::mode::Mode;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct ExportDocument<'a> {
    city: &'a str,
    mode: Mode,
    #[serde(flatten)]
    output: &'a KlineOutput,
}

/// Export candles and summary to a JSON file.
///
/// The output is pretty-printed; non-finite numbers are written as `null`.
pub fn export_to_json(city: &str, mode: Mode, output: &KlineOutput, output_path: &Path) -> Result<()> {
    let document = ExportDocument { city, mode, output };
    let json = serde_json::to_string_pretty(&document)
        .context("Failed to serialize kline output to JSON")?;

    let mut file = File::create(output_path)
        .context(format!("Failed to create JSON file: {}", output_path.display()))?;

    file.write_all(json.as_bytes())
        .context("Failed to write JSON data")?;

    Ok(())
}
