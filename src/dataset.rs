use std::path::Path;

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::models::OrderRecord;

/// Reads the flat order table from a CSV file. Column-level problems
/// (unparsable timestamps, blank numerics) are coerced to `None` by the
/// field deserializers; structural problems (missing columns, broken
/// quoting) abort the load.
pub fn load_orders(path: &Path) -> anyhow::Result<Vec<OrderRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open order CSV at {}", path.display()))?;

    let mut orders = Vec::new();
    for (index, result) in reader.deserialize::<OrderRecord>().enumerate() {
        let order = result.with_context(|| format!("malformed CSV record {}", index + 1))?;
        orders.push(order);
    }

    Ok(orders)
}

/// Parses the timestamp layouts seen in order exports. Anything else is
/// treated as missing rather than an error.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_timestamp(&raw))
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().parse::<f64>().ok())
}

pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "order_id,customer_id,order_purchase_timestamp,order_delivered_customer_date,review_creation_date,customer_state,product_category_name,review_score,payment_value";

    fn load_from_str(body: &str) -> Vec<OrderRecord> {
        let csv = format!("{HEADER}\n{body}");
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        reader
            .deserialize::<OrderRecord>()
            .collect::<Result<Vec<_>, _>>()
            .expect("rows should deserialize")
    }

    #[test]
    fn parses_common_timestamp_layouts() {
        assert!(parse_timestamp("2018-07-01 10:30:00").is_some());
        assert!(parse_timestamp("2018-07-01T10:30:00").is_some());
        let midnight = parse_timestamp("2018-07-01").expect("date-only should parse");
        assert_eq!(midnight.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn bad_timestamps_become_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not-a-date"), None);
        assert_eq!(parse_timestamp("2018-13-45 00:00:00"), None);
    }

    #[test]
    fn blank_cells_load_as_missing_values() {
        let rows = load_from_str("o1,c1,2018-07-01 10:30:00,,,SP,,abc,");
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert!(row.purchased_at.is_some());
        assert!(row.delivered_at.is_none());
        assert!(row.reviewed_at.is_none());
        assert_eq!(row.customer_state.as_deref(), Some("SP"));
        assert!(row.product_category.is_none());
        assert!(row.review_score.is_none());
        assert!(row.payment_value.is_none());
    }

    #[test]
    fn numeric_cells_parse_when_valid() {
        let rows = load_from_str("o1,c1,2018-07-01 10:30:00,2018-07-05 08:00:00,,RJ,beleza_saude,4,129.90");
        let row = &rows[0];
        assert_eq!(row.review_score, Some(4.0));
        assert_eq!(row.payment_value, Some(129.90));
        assert_eq!(row.product_category.as_deref(), Some("beleza_saude"));
    }
}
