use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};

use crate::analytics::whole_days;
use crate::error::AnalyticsError;
use crate::models::{OrderRecord, RfmRow};

/// One ordinal bin: values up to and including `upper` take `label`,
/// provided they exceeded the previous bin's upper bound.
pub struct Bin {
    pub upper: f64,
    pub label: &'static str,
}

pub const RECENCY_BINS: [Bin; 4] = [
    Bin { upper: 30.0, label: "Recent" },
    Bin { upper: 90.0, label: "Medium" },
    Bin { upper: 180.0, label: "Old" },
    Bin { upper: f64::INFINITY, label: "Very Old" },
];

pub const FREQUENCY_BINS: [Bin; 4] = [
    Bin { upper: 1.0, label: "Low" },
    Bin { upper: 3.0, label: "Medium" },
    Bin { upper: 6.0, label: "High" },
    Bin { upper: f64::INFINITY, label: "Very High" },
];

pub const MONETARY_BINS: [Bin; 4] = [
    Bin { upper: 100.0, label: "Low" },
    Bin { upper: 500.0, label: "Medium" },
    Bin { upper: 1000.0, label: "High" },
    Bin { upper: f64::INFINITY, label: "Very High" },
];

/// Maps a non-negative value onto its ordinal bin. Bounds are
/// right-inclusive: a value exactly on a boundary lands in the lower bin.
pub fn bin_label(value: f64, bins: &[Bin]) -> &'static str {
    for bin in bins {
        if value <= bin.upper {
            return bin.label;
        }
    }
    // Unreachable while the last bin is unbounded.
    bins[bins.len() - 1].label
}

/// Segments customers by Recency, Frequency, and Monetary value.
///
/// Only orders that carry a customer id and a valid purchase timestamp
/// participate: an unattributable or undatable order would distort every
/// metric. Recency is measured against a snapshot date one day after the
/// latest purchase in the dataset, so the most recent buyer scores 1.
pub fn segment_customers(orders: &[OrderRecord]) -> Result<Vec<RfmRow>, AnalyticsError> {
    struct CustomerAgg {
        last_purchase: NaiveDateTime,
        frequency: usize,
        monetary: f64,
    }

    let mut latest: Option<NaiveDateTime> = None;
    let mut per_customer: HashMap<String, CustomerAgg> = HashMap::new();

    for order in orders {
        let Some(purchased) = order.purchased_at else {
            continue;
        };
        if order.customer_id.trim().is_empty() {
            continue;
        }

        latest = Some(latest.map_or(purchased, |seen| seen.max(purchased)));
        let paid = order.payment_value.unwrap_or(0.0);

        per_customer
            .entry(order.customer_id.clone())
            .and_modify(|agg| {
                agg.last_purchase = agg.last_purchase.max(purchased);
                agg.frequency += 1;
                agg.monetary += paid;
            })
            .or_insert(CustomerAgg {
                last_purchase: purchased,
                frequency: 1,
                monetary: paid,
            });
    }

    let snapshot = latest.ok_or(AnalyticsError::EmptyDataset)? + Duration::days(1);

    let mut rows: Vec<RfmRow> = per_customer
        .into_iter()
        .map(|(customer_id, agg)| {
            let recency_days = whole_days(agg.last_purchase, snapshot);
            RfmRow {
                customer_id,
                recency_days,
                frequency: agg.frequency,
                monetary: agg.monetary,
                recency_group: bin_label(recency_days as f64, &RECENCY_BINS),
                frequency_group: bin_label(agg.frequency as f64, &FREQUENCY_BINS),
                monetary_group: bin_label(agg.monetary, &MONETARY_BINS),
            }
        })
        .collect();

    rows.sort_by(|a, b| a.customer_id.cmp(&b.customer_id));
    Ok(rows)
}
