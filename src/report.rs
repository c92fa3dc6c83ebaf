use std::fmt::Write;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{CategorySales, DeliveryReport, MonthlyTrendRow, RfmRow};

/// Everything one report run derives, bundled for JSON output. `rfm` is
/// `None` when no order was eligible for segmentation; the field stays
/// visible so consumers can tell "no data" from "not computed".
#[derive(Debug, Serialize)]
pub struct ReportTables {
    pub as_of: NaiveDateTime,
    pub monthly_trends: Vec<MonthlyTrendRow>,
    pub delivery: DeliveryReport,
    pub category_sales: Vec<CategorySales>,
    pub rfm: Option<Vec<RfmRow>>,
}

pub fn build_report(tables: &ReportTables) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Order Analytics Report");
    let _ = writeln!(output, "Reference instant: {}", tables.as_of);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Order Trend (trailing 12 months)");

    if tables.monthly_trends.is_empty() {
        let _ = writeln!(output, "No orders in the trailing year.");
    } else {
        for row in tables.monthly_trends.iter() {
            let _ = writeln!(
                output,
                "- {} {}: {} orders",
                row.month.format("%Y-%m"),
                row.state,
                row.order_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Delivery Time vs Review Score");

    if tables.delivery.pairs.is_empty() {
        let _ = writeln!(output, "No delivered orders with a review score.");
    } else {
        let count = tables.delivery.pairs.len();
        let avg_days: f64 = tables
            .delivery
            .pairs
            .iter()
            .map(|pair| pair.transit_days as f64)
            .sum::<f64>()
            / count as f64;
        let avg_score: f64 = tables
            .delivery
            .pairs
            .iter()
            .map(|pair| pair.review_score)
            .sum::<f64>()
            / count as f64;
        let _ = writeln!(
            output,
            "{count} delivered orders, average transit {avg_days:.1} days, average score {avg_score:.2}."
        );
    }
    if !tables.delivery.anomalies.is_empty() {
        let _ = writeln!(
            output,
            "{} orders report delivery before purchase and were kept out of the averages.",
            tables.delivery.anomalies.len()
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Product Categories (trailing 6 months)");

    if tables.category_sales.is_empty() {
        let _ = writeln!(output, "No categorized orders in the trailing 6 months.");
    } else {
        for row in tables.category_sales.iter().take(10) {
            let _ = writeln!(output, "- {}: {} orders", row.category, row.sales_count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## RFM Customer Segments");

    match &tables.rfm {
        None => {
            let _ = writeln!(output, "No orders eligible for RFM segmentation.");
        }
        Some(rows) => {
            for (group, count) in recency_distribution(rows) {
                let _ = writeln!(output, "- {group}: {count} customers");
            }
            let _ = writeln!(output);
            for row in rows.iter().take(10) {
                let _ = writeln!(
                    output,
                    "- {}: recency {}d ({}), frequency {} ({}), monetary {:.2} ({})",
                    row.customer_id,
                    row.recency_days,
                    row.recency_group,
                    row.frequency,
                    row.frequency_group,
                    row.monetary,
                    row.monetary_group
                );
            }
        }
    }

    output
}

/// Customer counts per recency group, in bin order.
pub fn recency_distribution(rows: &[RfmRow]) -> Vec<(&'static str, usize)> {
    crate::rfm::RECENCY_BINS
        .iter()
        .map(|bin| {
            let count = rows
                .iter()
                .filter(|row| row.recency_group == bin.label)
                .count();
            (bin.label, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeliveryPair;
    use chrono::NaiveDate;

    fn empty_tables() -> ReportTables {
        ReportTables {
            as_of: NaiveDate::from_ymd_opt(2018, 9, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            monthly_trends: Vec::new(),
            delivery: DeliveryReport {
                pairs: Vec::new(),
                anomalies: Vec::new(),
            },
            category_sales: Vec::new(),
            rfm: None,
        }
    }

    #[test]
    fn empty_tables_report_absence_explicitly() {
        let report = build_report(&empty_tables());
        assert!(report.contains("No orders in the trailing year."));
        assert!(report.contains("No delivered orders with a review score."));
        assert!(report.contains("No categorized orders in the trailing 6 months."));
        assert!(report.contains("No orders eligible for RFM segmentation."));
    }

    #[test]
    fn anomalous_deliveries_are_called_out() {
        let mut tables = empty_tables();
        tables.delivery.anomalies.push(DeliveryPair {
            order_id: "o1".to_string(),
            transit_days: -1,
            review_score: 1.0,
        });

        let report = build_report(&tables);
        assert!(report.contains("1 orders report delivery before purchase"));
    }

    #[test]
    fn populated_sections_render_rows() {
        let mut tables = empty_tables();
        tables.monthly_trends.push(MonthlyTrendRow {
            month: NaiveDate::from_ymd_opt(2018, 5, 1).unwrap(),
            state: "SP".to_string(),
            order_count: 3,
        });
        tables.category_sales.push(CategorySales {
            category: "beleza_saude".to_string(),
            sales_count: 7,
        });
        tables.rfm = Some(vec![RfmRow {
            customer_id: "C1".to_string(),
            recency_days: 12,
            frequency: 2,
            monetary: 88.0,
            recency_group: "Recent",
            frequency_group: "Medium",
            monetary_group: "Low",
        }]);

        let report = build_report(&tables);
        assert!(report.contains("- 2018-05 SP: 3 orders"));
        assert!(report.contains("- beleza_saude: 7 orders"));
        assert!(report.contains("- Recent: 1 customers"));
        assert!(report.contains("recency 12d (Recent)"));
    }

    #[test]
    fn report_is_deterministic_for_identical_tables() {
        let first = build_report(&empty_tables());
        let second = build_report(&empty_tables());
        assert_eq!(first, second);
    }
}
