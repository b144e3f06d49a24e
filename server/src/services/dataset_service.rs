//! CSV profiling: turns an uploaded dataset into the columns/stats/sample
//! shape the clean-data and analyze-data endpoints consume.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;

const SAMPLE_ROW_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub numeric_count: u64,
    pub missing: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetProfile {
    pub file_name: String,
    pub stored_name: Option<String>,
    pub columns: Vec<String>,
    pub row_count: u64,
    pub sample_rows: Vec<Value>,
    /// Stats per numeric column; text columns only contribute `missing`.
    pub stats: BTreeMap<String, ColumnStats>,
}

pub fn profile_csv(file_name: &str, content: &str) -> Result<DatasetProfile, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| ApiError::Internal(format!("failed to parse csv header: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut row_count: u64 = 0;
    let mut sample_rows = Vec::new();
    let mut sums = vec![0.0f64; columns.len()];
    let mut mins = vec![f64::INFINITY; columns.len()];
    let mut maxs = vec![f64::NEG_INFINITY; columns.len()];
    let mut numeric_counts = vec![0u64; columns.len()];
    let mut missing = vec![0u64; columns.len()];

    for record in reader.records() {
        let record = record.map_err(|e| ApiError::Internal(format!("failed to parse csv: {}", e)))?;
        row_count += 1;

        if sample_rows.len() < SAMPLE_ROW_LIMIT {
            let mut row = serde_json::Map::new();
            for (i, column) in columns.iter().enumerate() {
                let raw = record.get(i).unwrap_or("").trim();
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(|v| json!(v))
                    .unwrap_or_else(|| json!(raw));
                row.insert(column.clone(), value);
            }
            sample_rows.push(Value::Object(row));
        }

        for i in 0..columns.len() {
            let raw = record.get(i).unwrap_or("").trim();
            if raw.is_empty() {
                missing[i] += 1;
                continue;
            }
            if let Ok(v) = raw.parse::<f64>() {
                if v.is_finite() {
                    sums[i] += v;
                    mins[i] = mins[i].min(v);
                    maxs[i] = maxs[i].max(v);
                    numeric_counts[i] += 1;
                }
            }
        }
    }

    let mut stats = BTreeMap::new();
    for (i, column) in columns.iter().enumerate() {
        if numeric_counts[i] == 0 {
            continue;
        }
        stats.insert(
            column.clone(),
            ColumnStats {
                min: mins[i],
                max: maxs[i],
                mean: sums[i] / numeric_counts[i] as f64,
                numeric_count: numeric_counts[i],
                missing: missing[i],
            },
        );
    }

    Ok(DatasetProfile {
        file_name: file_name.to_string(),
        stored_name: None,
        columns,
        row_count,
        sample_rows,
        stats,
    })
}
