use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::RelationRecord;

const SOURCE_KEYS: [&str; 3] = ["source", "source_id", "from"];
const TARGET_KEYS: [&str; 3] = ["target", "target_id", "to"];
const LABEL_KEYS: [&str; 2] = ["label", "relation"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum RecordFormat {
    Json,
    Csv,
}

impl RecordFormat {
    pub(super) fn from_path(path: &str) -> Result<Self> {
        let extension = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "csv" | "tsv" => Ok(Self::Csv),
            other => Err(anyhow!(
                "unsupported record file extension {other:?} for {path}; expected .json or .csv"
            )),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn is_reserved_key(key: &str) -> bool {
    SOURCE_KEYS.contains(&key) || TARGET_KEYS.contains(&key) || LABEL_KEYS.contains(&key)
}

pub(super) fn parse_json_records(raw: &str) -> Result<Vec<RelationRecord>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in record file")?;
    let rows = parsed
        .as_array()
        .ok_or_else(|| anyhow!("record JSON must be an array of objects"))?;

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let object = row
            .as_object()
            .ok_or_else(|| anyhow!("record {index} is not a JSON object"))?;

        let pick = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| object.get(*key).and_then(scalar_text))
                .unwrap_or_default()
        };

        // serde_json maps iterate in key order, which keeps details stable.
        let details = object
            .iter()
            .filter(|(key, _)| !is_reserved_key(key))
            .filter_map(|(_, value)| scalar_text(value))
            .collect();

        records.push(RelationRecord {
            source: pick(&SOURCE_KEYS),
            target: pick(&TARGET_KEYS),
            label: pick(&LABEL_KEYS),
            details,
        });
    }

    Ok(records)
}

pub(super) fn parse_csv_records(raw: &str, delimiter: u8) -> Result<Vec<RelationRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let headers = reader
        .headers()
        .context("record CSV is missing a header row")?
        .iter()
        .map(|header| header.to_ascii_lowercase())
        .collect::<Vec<_>>();

    let column = |keys: &[&str]| headers.iter().position(|header| keys.contains(&header.as_str()));
    let source_column =
        column(&SOURCE_KEYS).ok_or_else(|| anyhow!("record CSV has no source column"))?;
    let target_column =
        column(&TARGET_KEYS).ok_or_else(|| anyhow!("record CSV has no target column"))?;
    let label_column =
        column(&LABEL_KEYS).ok_or_else(|| anyhow!("record CSV has no label column"))?;

    let mut records = Vec::new();
    for (row_index, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("malformed CSV row {}", row_index + 2))?;
        let field = |column: usize| row.get(column).unwrap_or_default().to_string();

        let details = (0..row.len())
            .filter(|&column| {
                column != source_column && column != target_column && column != label_column
            })
            .map(field)
            .collect();

        records.push(RelationRecord {
            source: field(source_column),
            target: field(target_column),
            label: field(label_column),
            details,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_rows_keep_details_in_key_order() {
        let raw = r#"[
            {"source": "A", "target": "X", "label": "win", "sub_event": "Riot", "actor": "Alice"},
            {"from": "B", "to": "X", "relation": "loss", "year": 2020}
        ]"#;

        let records = parse_json_records(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].details, vec!["Alice", "Riot"]);
        assert_eq!(records[1].source, "B");
        assert_eq!(records[1].label, "loss");
        assert_eq!(records[1].details, vec!["2020"]);
    }

    #[test]
    fn json_rejects_non_array_documents() {
        assert!(parse_json_records(r#"{"source": "A"}"#).is_err());
    }

    #[test]
    fn csv_rows_collect_extra_columns_as_details() {
        let raw = "Source,actor,Target,label,sub_event\nA,Alice,X,win,Riot\nB,,X,loss,\n";

        let records = parse_csv_records(raw, b',').unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source, "A");
        assert_eq!(records[0].target, "X");
        assert_eq!(records[0].details, vec!["Alice", "Riot"]);
        assert_eq!(records[1].attribute(), None);
    }

    #[test]
    fn csv_without_label_column_is_rejected() {
        assert!(parse_csv_records("source,target\nA,B\n", b',').is_err());
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(RecordFormat::from_path("data/events.JSON").unwrap(), RecordFormat::Json);
        assert_eq!(RecordFormat::from_path("events.csv").unwrap(), RecordFormat::Csv);
        assert!(RecordFormat::from_path("events.xlsx").is_err());
    }
}
