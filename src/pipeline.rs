pub mod aggregate;
pub mod classify;
pub mod forecast;
pub mod temporal;
pub mod valuation;

use polars::prelude::{DataFrame, IntoLazy, JoinArgs, JoinType, MaintainOrderJoin, col};

use crate::{
    config::ReportConfig,
    error::{GridbookResult, map_df_err},
    pipeline::forecast::ForecastGap,
    schema::{LocationCol, VolumeCol},
    validate,
};

/// The outcome of one pipeline run: the aggregated PnL rows for all books,
/// plus the forecast gaps encountered on the way.
#[derive(Debug, Clone)]
pub struct PnlRun {
    pub pnl: DataFrame,
    pub gaps: Vec<ForecastGap>,
}

/// The full validation and reconciliation pipeline.
///
/// One run is a single pass over the whole dataset: validate the three input
/// tables, merge locations onto trades, resolve delivery instants, classify,
/// value, reconcile against the forecast benchmark, and aggregate. Stages run
/// strictly in that order; the first failure aborts the run with no partial
/// output.
#[derive(Debug, Clone)]
pub struct PnlPipeline {
    config: ReportConfig,
}

impl PnlPipeline {
    pub fn new(config: ReportConfig) -> GridbookResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    #[tracing::instrument(skip_all, fields(
        trades = volumes.height(),
        locations = locations.height(),
        forecast_months = forecast.height(),
    ))]
    pub fn run(
        &self,
        mut volumes: DataFrame,
        mut locations: DataFrame,
        mut forecast: DataFrame,
    ) -> GridbookResult<PnlRun> {
        validate::validate_volumes(&mut volumes)?;
        validate::validate_locations(&mut locations)?;
        validate::validate_forecast(&mut forecast)?;
        tracing::debug!("Input tables validated");

        let mut merged = merge_locations(volumes, &locations)?;
        temporal::resolve_period_datetimes(&mut merged, &self.config)?;

        let classified = classify::classify(merged, &self.config)?;
        let valued = valuation::apply_trade_values(classified)?;
        let (reconciled, gaps) = forecast::reconcile(valued, &forecast, &self.config)?;
        let pnl = aggregate::aggregate(reconciled)?;

        tracing::info!(
            rows = pnl.height(),
            gaps = gaps.len(),
            "PnL aggregation complete"
        );

        Ok(PnlRun { pnl, gaps })
    }
}

/// Attaches LocationName and TimeZone to every trade row. Trades whose
/// LocationId has no location row keep nulls; the null TimeZone falls back to
/// the reporting timezone downstream.
fn merge_locations(volumes: DataFrame, locations: &DataFrame) -> GridbookResult<DataFrame> {
    let mut args = JoinArgs::new(JoinType::Left);
    args.maintain_order = MaintainOrderJoin::Left;

    volumes
        .lazy()
        .join(
            locations.clone().lazy(),
            [col(VolumeCol::LocationId)],
            [col(LocationCol::LocationId)],
            args,
        )
        .collect()
        .map_err(map_df_err)
}
