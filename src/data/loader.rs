use crate::data::bar::PriceBar;
use crate::engine::error::DataError;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "date")]
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    #[serde(default)]
    symbol: Option<String>,
}

//loads bars from a csv file
//headers are matched case-insensitively, so yahoo-style exports load as-is
//when symbol is given and the file has a symbol column, other rows are skipped
//rows keep file order; ordering is validated later by PriceSeries
pub fn load_csv<P: AsRef<Path>>(path: P, symbol: Option<&str>) -> Result<Vec<PriceBar>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let headers = reader
        .headers()
        .context(format!("Failed to read CSV header of {:?}", path))?
        .clone();
    let normalized = normalize_headers(&headers)?;
    reader.set_headers(normalized);

    let mut bars = Vec::new();
    let mut skipped = 0usize;

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        if let (Some(wanted), Some(found)) = (symbol, record.symbol.as_deref()) {
            if !wanted.eq_ignore_ascii_case(found) {
                skipped += 1;
                continue;
            }
        }

        let timestamp = parse_timestamp(&record.timestamp).context(format!(
            "Failed to parse timestamp '{}' at line {}",
            record.timestamp,
            index + 2
        ))?;

        bars.push(PriceBar::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ));
    }

    if skipped > 0 {
        debug!("Skipped {} rows not matching symbol {:?}", skipped, symbol);
    }
    info!("Loaded {} bars from {:?}", bars.len(), path);

    Ok(bars)
}

//lowercases headers and checks the required price columns are present
fn normalize_headers(headers: &StringRecord) -> Result<StringRecord, DataError> {
    let normalized: StringRecord = headers.iter().map(|h| h.to_lowercase()).collect();

    let has_time = normalized
        .iter()
        .any(|h| h == "timestamp" || h == "date");
    if !has_time {
        return Err(DataError::MissingColumn("timestamp".to_string()));
    }

    for column in REQUIRED_COLUMNS {
        if !normalized.iter().any(|h| h == column) {
            return Err(DataError::MissingColumn(column.to_string()));
        }
    }

    Ok(normalized)
}

//accepts rfc3339 timestamps or plain yyyy-mm-dd dates (midnight utc)
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date {}", raw))?;
    Ok(midnight.and_utc())
}
