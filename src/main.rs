use std::path::PathBuf;

use chrono::{NaiveDateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};

mod analytics;
mod dataset;
mod error;
mod models;
mod report;
mod rfm;

#[derive(Parser)]
#[command(name = "order-insights")]
#[command(about = "Descriptive analytics for e-commerce order exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly order counts per state over the trailing year
    Trends {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<NaiveDateTime>,
    },
    /// Delivery time versus review score pairs
    Delivery {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Product category sales ranking over the trailing 6 months
    Categories {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<NaiveDateTime>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// RFM customer segmentation over the full dataset
    Rfm {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Run every view and write a combined report
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<NaiveDateTime>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
    },
}

/// Accepts the same timestamp layouts as the CSV loader, so an `--as-of`
/// pulled out of the data itself round-trips.
fn parse_as_of(raw: &str) -> Result<NaiveDateTime, String> {
    dataset::parse_timestamp(raw)
        .ok_or_else(|| format!("unrecognized timestamp: {raw} (try 2018-09-01 00:00:00)"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Trends { csv, as_of } => {
            let orders = dataset::load_orders(&csv)?;
            // The clock is read here, once; the aggregation core only ever
            // sees an explicit reference instant.
            let now = as_of.unwrap_or_else(|| Utc::now().naive_utc());
            let window = analytics::within_window(&orders, now, analytics::TREND_WINDOW_MONTHS);
            let rows = analytics::monthly_trends(&window);

            if rows.is_empty() {
                println!("No orders in the trailing year.");
                return Ok(());
            }
            println!("{} orders in the trailing year.", window.len());
            for row in rows {
                println!(
                    "- {} {}: {} orders",
                    row.month.format("%Y-%m"),
                    row.state,
                    row.order_count
                );
            }
        }
        Commands::Delivery { csv, limit } => {
            let orders = dataset::load_orders(&csv)?;
            let delivery = analytics::delivery_satisfaction(&orders);

            if delivery.pairs.is_empty() {
                println!("No delivered orders with a review score.");
            }
            for pair in delivery.pairs.iter().take(limit) {
                println!(
                    "- {}: {} days in transit, score {:.0}",
                    pair.order_id, pair.transit_days, pair.review_score
                );
            }
            if !delivery.anomalies.is_empty() {
                println!(
                    "{} orders report delivery before purchase.",
                    delivery.anomalies.len()
                );
            }
        }
        Commands::Categories { csv, as_of, limit } => {
            let orders = dataset::load_orders(&csv)?;
            let now = as_of.unwrap_or_else(|| Utc::now().naive_utc());
            let window = analytics::within_window(&orders, now, analytics::CATEGORY_WINDOW_MONTHS);
            let rows = analytics::category_sales(&window);

            if rows.is_empty() {
                println!("No categorized orders in the trailing 6 months.");
                return Ok(());
            }
            println!("Top categories by sales:");
            for row in rows.iter().take(limit) {
                println!("- {}: {} orders", row.category, row.sales_count);
            }
        }
        Commands::Rfm { csv, limit } => {
            let orders = dataset::load_orders(&csv)?;
            let rows = rfm::segment_customers(&orders)?;

            println!("{} customers segmented.", rows.len());
            for (group, count) in report::recency_distribution(&rows) {
                println!("- {group}: {count} customers");
            }
            println!();
            for row in rows.iter().take(limit) {
                println!(
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
        Commands::Report {
            csv,
            as_of,
            out,
            format,
        } => {
            let orders = dataset::load_orders(&csv)?;
            let now = as_of.unwrap_or_else(|| Utc::now().naive_utc());

            let year_window =
                analytics::within_window(&orders, now, analytics::TREND_WINDOW_MONTHS);
            let half_year_window =
                analytics::within_window(&orders, now, analytics::CATEGORY_WINDOW_MONTHS);

            // An empty dataset is fatal only for segmentation; the report
            // still renders and says so instead of failing outright.
            let rfm_rows = match rfm::segment_customers(&orders) {
                Ok(rows) => Some(rows),
                Err(error::AnalyticsError::EmptyDataset) => None,
            };

            let tables = report::ReportTables {
                as_of: now,
                monthly_trends: analytics::monthly_trends(&year_window),
                delivery: analytics::delivery_satisfaction(&orders),
                category_sales: analytics::category_sales(&half_year_window),
                rfm: rfm_rows,
            };

            let rendered = match format {
                OutputFormat::Markdown => report::build_report(&tables),
                OutputFormat::Json => serde_json::to_string_pretty(&tables)?,
            };
            std::fs::write(&out, rendered)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
