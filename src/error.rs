use thiserror::Error;

/// Failure kinds surfaced by the aggregation core. Window-filtered views
/// return empty tables for empty input; only the RFM engine treats it as
/// an error, because its snapshot date is undefined without any orders.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("no orders with a customer id and a valid purchase timestamp; RFM snapshot date is undefined")]
    EmptyDataset,
}
