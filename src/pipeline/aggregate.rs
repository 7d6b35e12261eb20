use polars::prelude::{DataFrame, IntoLazy, NULL, col, lit, when};

use crate::{
    error::{GridbookResult, map_df_err},
    schema::{DerivedCol, LocationCol, ReportCol, VolumeCol},
};

const GAP_ROWS: &str = "forecast_gap_rows";

/// Groups valued, classified rows by (Month, LocationName, PeakOffPeak,
/// Book) and sums them into the final PnL rows.
///
/// Group order is first-seen, so output is deterministic for a fixed input
/// order. A group whose month had no forecast benchmark reports null
/// ForecastCost and ForecastPnL; forecast presence is uniform within a group
/// because the group key contains Month and PeakOffPeak.
#[tracing::instrument(skip_all, fields(rows = df.height()))]
pub fn aggregate(df: DataFrame) -> GridbookResult<DataFrame> {
    df.lazy()
        .group_by_stable([
            col(DerivedCol::Month),
            col(LocationCol::LocationName),
            col(DerivedCol::PeakOffPeak),
            col(VolumeCol::Book),
        ])
        .agg([
            col(DerivedCol::AdjVolume)
                .sum()
                .alias(ReportCol::TotalVolume.as_str()),
            col(DerivedCol::TradeValue)
                .sum()
                .alias(ReportCol::TotalTradeValue.as_str()),
            col(DerivedCol::ForecastCost)
                .sum()
                .alias(ReportCol::ForecastCost.as_str()),
            col(DerivedCol::ForecastPrice).null_count().alias(GAP_ROWS),
        ])
        .with_column(
            when(col(GAP_ROWS).gt(lit(0)))
                .then(lit(NULL))
                .otherwise(col(ReportCol::ForecastCost.as_str()))
                .alias(ReportCol::ForecastCost.as_str()),
        )
        .with_column(
            (col(ReportCol::TotalTradeValue.as_str()) - col(ReportCol::ForecastCost.as_str()))
                .alias(ReportCol::ForecastPnL.as_str()),
        )
        .select([
            col(DerivedCol::Month),
            col(LocationCol::LocationName),
            col(DerivedCol::PeakOffPeak),
            col(VolumeCol::Book),
            col(ReportCol::TotalVolume.as_str()),
            col(ReportCol::TotalTradeValue.as_str()),
            col(ReportCol::ForecastCost.as_str()),
            col(ReportCol::ForecastPnL.as_str()),
        ])
        .collect()
        .map_err(map_df_err)
}
