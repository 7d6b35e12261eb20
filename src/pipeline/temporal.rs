use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use itertools::izip;
use polars::prelude::{
    DataFrame, DataType, NamedFrom, PlSmallStr, Series, TimeUnit, TimeZone as PolarsTimeZone,
};

use crate::{
    config::ReportConfig,
    error::{DataError, GridbookResult, TemporalError, map_df_err},
    schema::{DerivedCol, LocationCol, VolumeCol},
};

/// Computes the PeriodDateTime column: the start of the Period-th hour after
/// Date, localized in the row's effective timezone and converted into the
/// reporting timezone.
///
/// The effective timezone is the row's TimeZone when present, otherwise the
/// reporting timezone. Ambiguous local times resolve to their first
/// occurrence; nonexistent local times and invalid zone identifiers abort the
/// whole run.
#[tracing::instrument(skip_all, fields(rows = df.height()))]
pub fn resolve_period_datetimes(df: &mut DataFrame, cfg: &ReportConfig) -> GridbookResult<()> {
    let micros = {
        let dates = df
            .column(VolumeCol::Date.as_str())
            .map_err(map_df_err)?
            .as_materialized_series();
        let periods = df
            .column(VolumeCol::Period.as_str())
            .map_err(map_df_err)?
            .as_materialized_series();
        let zones = df
            .column(LocationCol::TimeZone.as_str())
            .map_err(map_df_err)?
            .as_materialized_series();

        let dates = dates.date().map_err(map_df_err)?;
        let periods = periods.i64().map_err(map_df_err)?;
        let zones = zones.str().map_err(map_df_err)?;

        izip!(dates.as_date_iter(), periods.into_iter(), zones.into_iter())
            .enumerate()
            .map(|(row, (date, period, zone))| resolve_row(row, date, period, zone, cfg))
            .collect::<GridbookResult<Vec<i64>>>()?
    };

    let dtype = DataType::Datetime(TimeUnit::Microseconds, Some(reporting_polars_tz(cfg)?));
    let series = Series::new(DerivedCol::PeriodDateTime.name(), micros)
        .cast(&dtype)
        .map_err(map_df_err)?;

    df.with_column(series).map_err(map_df_err)?;

    tracing::debug!(rows = df.height(), "Resolved period delivery instants");

    Ok(())
}

fn resolve_row(
    row: usize,
    date: Option<NaiveDate>,
    period: Option<i64>,
    zone: Option<&str>,
    cfg: &ReportConfig,
) -> GridbookResult<i64> {
    let date = date.ok_or(TemporalError::MissingValue {
        column: "Date",
        row,
    })?;
    let period = period.ok_or(TemporalError::MissingValue {
        column: "Period",
        row,
    })?;

    let naive = date.and_time(NaiveTime::MIN) + Duration::hours(period - 1);
    let zone = match zone {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| TemporalError::InvalidTimeZone {
                zone: name.to_string(),
                row,
            })?,
        None => cfg.reporting_timezone,
    };

    let localized = localize_first(zone, naive).ok_or_else(|| TemporalError::NonexistentLocalTime {
        local: naive,
        zone: zone.name().to_string(),
    })?;

    Ok(localized.with_timezone(&Utc).timestamp_micros())
}

/// Localizes a naive wall-clock instant into `zone`, taking the first
/// occurrence of an ambiguous time. Returns `None` for nonexistent times.
pub(crate) fn localize_first(zone: Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(first, _) => Some(first),
        LocalResult::None => None,
    }
}

pub(crate) fn reporting_polars_tz(cfg: &ReportConfig) -> GridbookResult<PolarsTimeZone> {
    PolarsTimeZone::opt_try_new(Some(PlSmallStr::from(cfg.reporting_timezone.name())))
        .map_err(map_df_err)?
        .ok_or_else(|| DataError::DataFrame("missing reporting timezone".to_string()).into())
}
