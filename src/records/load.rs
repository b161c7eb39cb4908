use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use super::RelationRecord;
use super::parse::{RecordFormat, parse_csv_records, parse_json_records};

pub fn load_records(path: &str) -> Result<Vec<RelationRecord>> {
    let format = RecordFormat::from_path(path)?;
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;

    let records = match format {
        RecordFormat::Json => parse_json_records(&raw),
        RecordFormat::Csv => {
            let delimiter = if path.to_ascii_lowercase().ends_with(".tsv") {
                b'\t'
            } else {
                b','
            };
            parse_csv_records(&raw, delimiter)
        }
    }
    .with_context(|| format!("failed to parse relation records from {path}"))?;

    info!(path, count = records.len(), ?format, "loaded relation records");
    Ok(records)
}
