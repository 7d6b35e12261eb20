use chrono::Utc;
use polars::prelude::{DataFrame, DataType, DatetimeArgs, IntoLazy, col, datetime, lit, when};

use crate::{
    config::ReportConfig,
    error::{ConfigError, GridbookResult, map_df_err},
    schema::{DerivedCol, PeakOffPeak},
};

/// Derives the Month and PeakOffPeak buckets and applies the reporting-window
/// filter.
///
/// Month is the first-of-month date of the delivery instant's wall clock in
/// the reporting timezone. A delivery hour is Peak when its local hour lies
/// in [peak_start_hour, peak_end_hour). Rows outside
/// [window_start, window_end) are excluded before any grouping.
#[tracing::instrument(skip_all, fields(rows = df.height()))]
pub fn classify(df: DataFrame, cfg: &ReportConfig) -> GridbookResult<DataFrame> {
    let (window_start, window_end) = window_utc_micros(cfg)?;

    let pdt = || col(DerivedCol::PeriodDateTime);
    let instant = || pdt().cast(DataType::Int64);
    let hour = || pdt().dt().hour();

    let out = df
        .lazy()
        .filter(
            instant()
                .gt_eq(lit(window_start))
                .and(instant().lt(lit(window_end))),
        )
        .with_columns([
            datetime(DatetimeArgs::new(
                pdt().dt().year(),
                pdt().dt().month(),
                lit(1),
            ))
            .cast(DataType::Date)
            .alias(DerivedCol::Month.as_str()),
            when(
                hour()
                    .gt_eq(lit(i32::from(cfg.peak_start_hour)))
                    .and(hour().lt(lit(i32::from(cfg.peak_end_hour)))),
            )
            .then(lit(PeakOffPeak::Peak.as_str()))
            .otherwise(lit(PeakOffPeak::OffPeak.as_str()))
            .alias(DerivedCol::PeakOffPeak.as_str()),
        ])
        .collect()
        .map_err(map_df_err)?;

    tracing::debug!(
        kept = out.height(),
        "Classified delivery instants within the reporting window"
    );

    Ok(out)
}

fn window_utc_micros(cfg: &ReportConfig) -> GridbookResult<(i64, i64)> {
    Ok((
        window_bound_utc_micros(cfg, cfg.window_start)?,
        window_bound_utc_micros(cfg, cfg.window_end)?,
    ))
}

fn window_bound_utc_micros(cfg: &ReportConfig, bound: chrono::NaiveDateTime) -> GridbookResult<i64> {
    super::temporal::localize_first(cfg.reporting_timezone, bound)
        .map(|dt| dt.with_timezone(&Utc).timestamp_micros())
        .ok_or_else(|| {
            ConfigError::InvalidReportingWindow {
                start: cfg.window_start,
                end: cfg.window_end,
                msg: format!(
                    "boundary {bound} does not exist in {}",
                    cfg.reporting_timezone
                ),
            }
            .into()
        })
}
