use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

use crate::models::{CategorySales, DeliveryPair, DeliveryReport, MonthlyTrendRow, OrderRecord};

pub const TREND_WINDOW_MONTHS: u32 = 12;
pub const CATEGORY_WINDOW_MONTHS: u32 = 6;

/// Orders purchased within the trailing `months` calendar months relative to
/// `now`. Orders without a purchase timestamp never qualify. `now` comes in
/// from the caller so the same input always yields the same subset.
pub fn within_window(
    orders: &[OrderRecord],
    now: NaiveDateTime,
    months: u32,
) -> Vec<&OrderRecord> {
    let cutoff = now
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDateTime::MIN);

    orders
        .iter()
        .filter(|order| matches!(order.purchased_at, Some(ts) if ts >= cutoff))
        .collect()
}

/// Counts orders per (calendar month, customer state). Rows missing a state
/// carry no region and are skipped. Output is sorted by month then state so
/// repeated runs over the same input are identical.
pub fn monthly_trends(orders: &[&OrderRecord]) -> Vec<MonthlyTrendRow> {
    let mut counts: HashMap<(NaiveDate, String), usize> = HashMap::new();

    for order in orders {
        let (Some(purchased), Some(state)) = (order.purchased_at, order.customer_state.as_ref())
        else {
            continue;
        };
        let month = first_of_month(purchased.date());
        *counts.entry((month, state.clone())).or_insert(0) += 1;
    }

    let mut rows: Vec<MonthlyTrendRow> = counts
        .into_iter()
        .map(|((month, state), order_count)| MonthlyTrendRow {
            month,
            state,
            order_count,
        })
        .collect();

    rows.sort_by(|a, b| a.month.cmp(&b.month).then_with(|| a.state.cmp(&b.state)));
    rows
}

/// Pairs transit time in whole days with the review score for every order
/// that has purchase, delivery, and review data. Orders whose delivery
/// precedes their purchase are returned separately as anomalies.
pub fn delivery_satisfaction(orders: &[OrderRecord]) -> DeliveryReport {
    let mut pairs = Vec::new();
    let mut anomalies = Vec::new();

    for order in orders {
        let (Some(purchased), Some(delivered), Some(review_score)) =
            (order.purchased_at, order.delivered_at, order.review_score)
        else {
            continue;
        };

        let pair = DeliveryPair {
            order_id: order.order_id.clone(),
            transit_days: whole_days(purchased, delivered),
            review_score,
        };

        if pair.transit_days < 0 {
            anomalies.push(pair);
        } else {
            pairs.push(pair);
        }
    }

    DeliveryReport { pairs, anomalies }
}

/// Counts orders per product category, most sold first. Ties break on
/// category name ascending. Rows without a category are skipped.
pub fn category_sales(orders: &[&OrderRecord]) -> Vec<CategorySales> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for order in orders {
        let Some(category) = order.product_category.as_ref() else {
            continue;
        };
        *counts.entry(category.clone()).or_insert(0) += 1;
    }

    let mut rows: Vec<CategorySales> = counts
        .into_iter()
        .map(|(category, sales_count)| CategorySales {
            category,
            sales_count,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.sales_count
            .cmp(&a.sales_count)
            .then_with(|| a.category.cmp(&b.category))
    });
    rows
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Floored whole-day difference, so a delivery 90 minutes before the
/// purchase counts as -1 day rather than rounding to 0.
pub fn whole_days(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_seconds().div_euclid(86_400)
}
