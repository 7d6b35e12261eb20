use anyhow::Result;
use gridbook::{PnlPipeline, PnlReports, ReportConfig};
use polars::prelude::df;
use tracing_subscriber::EnvFilter;

/// Runs the pipeline on a small synthetic quarter built in memory and prints
/// the per-book reports, without touching the filesystem.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let volumes = df![
        "DealNumber" => [1001i64, 1002, 1003, 1004, 1005],
        "BuySell" => ["Buy", "Sell", "Buy", "Buy", "Sell"],
        "Date" => ["2025-01-15", "2025-01-15", "2025-02-03", "2025-02-03", "2025-03-21"],
        "Period" => [9i64, 21, 12, 3, 15],
        "Book" => ["Alpine", "Alpine", "Alpine", "Rhine", "Rhine"],
        "LocationId" => [1i64, 1, 2, 2, 1],
        "Volume" => [120.0, 45.0, 80.0, 60.0, 100.0],
        "Price" => [62.5, 71.0, 55.25, 48.0, 59.75],
    ]?;

    let locations = df![
        "LocationId" => [1i64, 2],
        "LocationName" => ["Laufenburg", "Sils"],
        "TimeZone" => [Some("Europe/Zurich"), None::<&str>],
    ]?;

    let forecast = df![
        "Month" => ["2025-01-01", "2025-02-01", "2025-03-01"],
        "OffPeakPrice" => [48.0, 46.5, 44.0],
        "PeakPrice" => [66.0, 63.0, 58.5],
    ]?;

    let pipeline = PnlPipeline::new(ReportConfig::default())?;
    let run = pipeline.run(volumes, locations, forecast)?;

    let reports = PnlReports::from_aggregate(&run.pnl)?;
    for report in &reports.reports {
        println!("== Book {} ==", report.book);
        println!("{}", report.pnl);
    }

    Ok(())
}
