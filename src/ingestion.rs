use crate::error::Result;
use crate::schema::{parse_amount, parse_count, SalesRecord};
use log::{debug, info, warn};
use serde::Deserialize;
use std::io::Read;

/// A CSV row before coercion. Every cell is optional text so a blank or
/// malformed number never rejects the whole file.
#[derive(Debug, Deserialize)]
struct CsvSalesRow {
    date: Option<String>,
    branch_name: Option<String>,
    channel_name: Option<String>,
    sales_value: Option<String>,
    orders_count: Option<String>,
    target_value: Option<String>,
}

impl From<CsvSalesRow> for SalesRecord {
    fn from(row: CsvSalesRow) -> Self {
        SalesRecord {
            sales_value: parse_amount(cell(&row.sales_value)),
            orders_count: parse_count(cell(&row.orders_count)),
            target_value: parse_amount(cell(&row.target_value)),
            date: trimmed(row.date),
            branch_name: trimmed(row.branch_name),
            channel_name: trimmed(row.channel_name),
        }
    }
}

fn cell(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn trimmed(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Parses a JSON array of raw sales rows.
pub fn records_from_json(json: &str) -> Result<Vec<SalesRecord>> {
    let records: Vec<SalesRecord> = serde_json::from_str(json)?;
    info!("Parsed {} sales records from JSON", records.len());
    log_blank_dates(&records);
    Ok(records)
}

/// Reads header-bearing CSV with the columns `date`, `branch_name`,
/// `channel_name`, `sales_value`, `orders_count` and `target_value`.
pub fn records_from_csv<R: Read>(reader: R) -> Result<Vec<SalesRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<CsvSalesRow>() {
        records.push(SalesRecord::from(row?));
    }

    info!("Parsed {} sales records from CSV", records.len());
    log_blank_dates(&records);
    Ok(records)
}

fn log_blank_dates(records: &[SalesRecord]) {
    let blank = records.iter().filter(|r| r.date.is_empty()).count();
    if blank > 0 {
        warn!("{} record(s) have no date and will never pass a filter", blank);
    } else {
        debug!("All ingested records carry a date");
    }
}
