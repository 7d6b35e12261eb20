use std::path::Path;

use anyhow::{Context, Result};
use gridbook::{PnlPipeline, PnlReports, ReportConfig, io};
use tracing_subscriber::EnvFilter;

/// End-to-end report generation from the three input artifacts on disk:
/// trade volumes and locations as Parquet, forecast benchmark prices as CSV.
fn main() -> Result<()> {
    init_tracing();

    let data_dir = Path::new("data");
    let output_dir = Path::new("output");

    let volumes = io::read_volume_table(&data_dir.join("power_volume_data.parquet"))
        .context("Failed to load volume table")?;
    let locations = io::read_location_table(&data_dir.join("location_data.parquet"))
        .context("Failed to load location table")?;
    let forecast = io::read_forecast_table(&data_dir.join("forecast_prices.csv"))
        .context("Failed to load forecast table")?;

    let pipeline = PnlPipeline::new(ReportConfig::default())?;
    let run = pipeline.run(volumes, locations, forecast)?;

    if !run.gaps.is_empty() {
        println!(
            "Forecast gaps: {}",
            serde_json::to_string(&run.gaps).context("Failed to render gap list")?
        );
    }

    let reports = PnlReports::from_aggregate(&run.pnl)?;
    for path in reports.save_as_csv(output_dir)? {
        println!("Report generated: {}", path.display());
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
