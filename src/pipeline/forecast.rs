use chrono::NaiveDate;
use itertools::izip;
use polars::prelude::{
    DataFrame, IntoLazy, JoinArgs, JoinType, MaintainOrderJoin, UniqueKeepStrategy, col, lit, when,
};
use serde::Serialize;

use crate::{
    config::{GapPolicy, ReportConfig},
    error::{DataError, GridbookResult, map_df_err},
    schema::{DerivedCol, ForecastCol, PeakOffPeak},
};

/// A trade month with no matching forecast benchmark row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastGap {
    pub month: NaiveDate,
    pub bucket: String,
}

/// Joins the forecast benchmark by calendar month and derives the benchmark
/// cost of every trade row.
///
/// ForecastPrice is the PeakPrice for Peak rows and the OffPeakPrice
/// otherwise; ForecastCost is ForecastPrice times absolute signed volume.
/// Months without a benchmark row keep null forecast figures and are
/// reported as [`ForecastGap`]s; under [`GapPolicy::Fail`] the first gap
/// aborts the run.
#[tracing::instrument(skip_all, fields(rows = df.height(), forecast_months = forecast.height()))]
pub fn reconcile(
    df: DataFrame,
    forecast: &DataFrame,
    cfg: &ReportConfig,
) -> GridbookResult<(DataFrame, Vec<ForecastGap>)> {
    let mut args = JoinArgs::new(JoinType::Left);
    args.maintain_order = MaintainOrderJoin::Left;

    let joined = df
        .lazy()
        .join(
            forecast.clone().lazy(),
            [col(DerivedCol::Month)],
            [col(ForecastCol::Month)],
            args,
        )
        .with_column(
            when(col(DerivedCol::PeakOffPeak).eq(lit(PeakOffPeak::Peak.as_str())))
                .then(col(ForecastCol::PeakPrice))
                .otherwise(col(ForecastCol::OffPeakPrice))
                .alias(DerivedCol::ForecastPrice.as_str()),
        )
        .with_column(
            (col(DerivedCol::ForecastPrice) * col(DerivedCol::AdjVolume).abs())
                .alias(DerivedCol::ForecastCost.as_str()),
        )
        .collect()
        .map_err(map_df_err)?;

    let gaps = collect_gaps(&joined)?;

    if cfg.forecast_gaps == GapPolicy::Fail
        && let Some(first) = gaps.first()
    {
        return Err(DataError::MissingForecast {
            month: first.month,
            bucket: first.bucket.clone(),
        }
        .into());
    }

    for gap in &gaps {
        tracing::warn!(
            month = %gap.month,
            bucket = %gap.bucket,
            "No forecast benchmark for trade month"
        );
    }

    Ok((joined, gaps))
}

/// Distinct (Month, PeakOffPeak) pairs whose benchmark join found nothing,
/// in first-seen order. Forecast prices are validated non-null, so a null
/// ForecastPrice can only come from an unmatched join.
fn collect_gaps(df: &DataFrame) -> GridbookResult<Vec<ForecastGap>> {
    let missing = df
        .clone()
        .lazy()
        .filter(col(DerivedCol::ForecastPrice).is_null())
        .select([col(DerivedCol::Month), col(DerivedCol::PeakOffPeak)])
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()
        .map_err(map_df_err)?;

    let months = missing
        .column(DerivedCol::Month.as_str())
        .map_err(map_df_err)?
        .as_materialized_series();
    let buckets = missing
        .column(DerivedCol::PeakOffPeak.as_str())
        .map_err(map_df_err)?
        .as_materialized_series();

    let months = months.date().map_err(map_df_err)?;
    let buckets = buckets.str().map_err(map_df_err)?;

    let gaps = izip!(months.as_date_iter(), buckets.into_iter())
        .filter_map(|(month, bucket)| {
            Some(ForecastGap {
                month: month?,
                bucket: bucket?.to_string(),
            })
        })
        .collect();

    Ok(gaps)
}
