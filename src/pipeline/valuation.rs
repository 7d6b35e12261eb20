use polars::prelude::{DataFrame, IntoLazy, col, lit, when};

use crate::{
    error::{GridbookResult, map_df_err},
    schema::{DerivedCol, Side, VolumeCol},
};

/// Derives the signed volume and signed trade value of every row.
///
/// A Buy adds volume and pays cash (negative TradeValue); a Sell removes
/// volume and receives cash (positive TradeValue). BuySell was canonicalized
/// by validation, so a single exact comparison decides the direction.
#[tracing::instrument(skip_all, fields(rows = df.height()))]
pub fn apply_trade_values(df: DataFrame) -> GridbookResult<DataFrame> {
    let is_buy = || col(VolumeCol::BuySell).eq(lit(Side::Buy.as_str()));
    let notional = || col(VolumeCol::Price) * col(VolumeCol::Volume);

    df.lazy()
        .with_columns([
            when(is_buy())
                .then(col(VolumeCol::Volume))
                .otherwise(-col(VolumeCol::Volume))
                .alias(DerivedCol::AdjVolume.as_str()),
            when(is_buy())
                .then(-notional())
                .otherwise(notional())
                .alias(DerivedCol::TradeValue.as_str()),
        ])
        .collect()
        .map_err(map_df_err)
}
