use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dataset;

/// One row of the input order table. Timestamp and numeric columns are
/// optional: unparsable values are coerced to `None` at load time so a few
/// bad cells never abort a whole report run.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_id: String,
    #[serde(
        rename = "order_purchase_timestamp",
        deserialize_with = "dataset::lenient_timestamp"
    )]
    pub purchased_at: Option<NaiveDateTime>,
    #[serde(
        rename = "order_delivered_customer_date",
        deserialize_with = "dataset::lenient_timestamp"
    )]
    pub delivered_at: Option<NaiveDateTime>,
    #[serde(
        rename = "review_creation_date",
        deserialize_with = "dataset::lenient_timestamp"
    )]
    pub reviewed_at: Option<NaiveDateTime>,
    #[serde(deserialize_with = "dataset::empty_as_none")]
    pub customer_state: Option<String>,
    #[serde(
        rename = "product_category_name",
        deserialize_with = "dataset::empty_as_none"
    )]
    pub product_category: Option<String>,
    #[serde(deserialize_with = "dataset::lenient_f64")]
    pub review_score: Option<f64>,
    #[serde(deserialize_with = "dataset::lenient_f64")]
    pub payment_value: Option<f64>,
}

/// Order count for one (calendar month, state) pair. The month is the
/// first-of-month date of the purchase timestamps it covers.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTrendRow {
    pub month: NaiveDate,
    pub state: String,
    pub order_count: usize,
}

/// One delivered-and-reviewed order: transit duration in whole days paired
/// with the review score.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryPair {
    pub order_id: String,
    pub transit_days: i64,
    pub review_score: f64,
}

/// Delivery extraction output. Orders whose delivery timestamp precedes the
/// purchase timestamp are listed under `anomalies` instead of being dropped
/// or clamped, so the caller can see them.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub pairs: Vec<DeliveryPair>,
    pub anomalies: Vec<DeliveryPair>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySales {
    pub category: String,
    pub sales_count: usize,
}

/// Per-customer RFM metrics plus their ordinal group labels.
#[derive(Debug, Clone, Serialize)]
pub struct RfmRow {
    pub customer_id: String,
    pub recency_days: i64,
    pub frequency: usize,
    pub monetary: f64,
    pub recency_group: &'static str,
    pub frequency_group: &'static str,
    pub monetary_group: &'static str,
}
