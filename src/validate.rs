use std::str::FromStr;

use polars::prelude::{
    DataFrame, DataType, Expr, IntoLazy, Schema, SchemaExt, StrptimeOptions, col,
};

use crate::{
    error::{GridbookResult, ValidationError, map_df_err},
    schema::{ForecastCol, Side, VolumeCol, forecast_schema, location_schema, volume_schema},
};

const PERIOD_MIN: i64 = 1;
const PERIOD_MAX: i64 = 25;

/// Per-table policy for columns whose target type is string.
///
/// Volume and forecast text fields are labels where a lossless render is
/// always acceptable; location names and IANA zone identifiers must already
/// be strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextPolicy {
    Coerce,
    Reject,
}

/// Validates and coerces the trade volume table in place.
///
/// Column coercion runs first (fail-fast, first offending column wins), then
/// the semantic checks: Period within [1, 25] over non-null values, Volume
/// and Price non-negative on every row, BuySell exactly "Buy" or "Sell".
pub fn validate_volumes(df: &mut DataFrame) -> GridbookResult<()> {
    coerce_table(df, "volumes", &volume_schema(), TextPolicy::Coerce)?;

    check_period_range(df)?;
    check_non_negative(df, VolumeCol::Volume.as_str())?;
    check_non_negative(df, VolumeCol::Price.as_str())?;
    check_buy_sell(df)?;

    Ok(())
}

/// Validates the location table in place.
///
/// LocationId follows the integer rule; LocationName and TimeZone are
/// rejected outright when not already string-typed.
pub fn validate_locations(df: &mut DataFrame) -> GridbookResult<()> {
    coerce_table(df, "locations", &location_schema(), TextPolicy::Reject)
}

/// Validates and coerces the forecast benchmark table in place.
pub fn validate_forecast(df: &mut DataFrame) -> GridbookResult<()> {
    coerce_table(df, "forecast", &forecast_schema(), TextPolicy::Coerce)?;

    check_non_negative(df, ForecastCol::OffPeakPrice.as_str())?;
    check_non_negative(df, ForecastCol::PeakPrice.as_str())?;

    Ok(())
}

// ================================================================================================
// Column Coercion
// ================================================================================================

fn coerce_table(
    df: &mut DataFrame,
    table: &'static str,
    target: &Schema,
    text_policy: TextPolicy,
) -> GridbookResult<()> {
    for field in target.iter_fields() {
        let column = field.name().as_str();
        let Some(current) = df.schema().get(column).cloned() else {
            return Err(ValidationError::MissingColumn {
                table,
                column: column.to_string(),
            }
            .into());
        };

        match field.dtype() {
            DataType::Int64 => coerce_integer(df, table, column, &current)?,
            DataType::Float64 => coerce_float(df, table, column, &current)?,
            DataType::String => coerce_text(df, table, column, &current, text_policy)?,
            DataType::Date => coerce_date(df, table, column, &current)?,
            other => {
                return Err(ValidationError::Coercion {
                    table,
                    column: column.to_string(),
                    expected: "supported",
                    reason: format!("unsupported target type {other}"),
                }
                .into());
            }
        }
    }

    Ok(())
}

/// Integer columns accept native integers or floats whose non-null values are
/// all whole; both are normalized to Int64. Anything else gets one hard cast
/// whose failure aborts the validation.
fn coerce_integer(
    df: &mut DataFrame,
    table: &'static str,
    column: &str,
    current: &DataType,
) -> GridbookResult<()> {
    if *current == DataType::Int64 {
        return Ok(());
    }

    let expr = if current.is_integer() || (current.is_float() && all_whole(df, column)?) {
        col(column).cast(DataType::Int64)
    } else {
        col(column).strict_cast(DataType::Int64)
    };

    recast(df, table, column, "integer or whole float", expr)
}

fn coerce_float(
    df: &mut DataFrame,
    table: &'static str,
    column: &str,
    current: &DataType,
) -> GridbookResult<()> {
    if *current == DataType::Float64 {
        return Ok(());
    }

    let expr = if current.is_float() {
        col(column).cast(DataType::Float64)
    } else {
        col(column).strict_cast(DataType::Float64)
    };

    recast(df, table, column, "float", expr)
}

fn coerce_text(
    df: &mut DataFrame,
    table: &'static str,
    column: &str,
    current: &DataType,
    policy: TextPolicy,
) -> GridbookResult<()> {
    if *current == DataType::String {
        return Ok(());
    }

    match policy {
        TextPolicy::Coerce => recast(df, table, column, "string", col(column).cast(DataType::String)),
        TextPolicy::Reject => Err(ValidationError::NotString {
            table,
            column: column.to_string(),
        }
        .into()),
    }
}

fn coerce_date(
    df: &mut DataFrame,
    table: &'static str,
    column: &str,
    current: &DataType,
) -> GridbookResult<()> {
    match current {
        DataType::Date => Ok(()),
        DataType::Datetime(_, _) => recast(df, table, column, "date", col(column).cast(DataType::Date)),
        DataType::String => {
            let options = StrptimeOptions {
                strict: true,
                ..Default::default()
            };
            recast(df, table, column, "date", col(column).str().to_date(options))
        }
        other => Err(ValidationError::Coercion {
            table,
            column: column.to_string(),
            expected: "date",
            reason: format!("cannot interpret {other} as a calendar date"),
        }
        .into()),
    }
}

fn recast(
    df: &mut DataFrame,
    table: &'static str,
    column: &str,
    expected: &'static str,
    expr: Expr,
) -> GridbookResult<()> {
    let out = df
        .clone()
        .lazy()
        .with_column(expr)
        .collect()
        .map_err(|e| ValidationError::Coercion {
            table,
            column: column.to_string(),
            expected,
            reason: e.to_string(),
        })?;

    *df = out;
    Ok(())
}

fn all_whole(df: &DataFrame, column: &str) -> GridbookResult<bool> {
    let series = df
        .column(column)
        .map_err(map_df_err)?
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(map_df_err)?;
    let ca = series.f64().map_err(map_df_err)?;

    Ok(ca.into_iter().flatten().all(|v| v.fract() == 0.0))
}

// ================================================================================================
// Semantic Checks
// ================================================================================================

fn check_period_range(df: &DataFrame) -> GridbookResult<()> {
    let series = df
        .column(VolumeCol::Period.as_str())
        .map_err(map_df_err)?
        .as_materialized_series();
    let ca = series.i64().map_err(map_df_err)?;

    let in_range = ca
        .into_iter()
        .flatten()
        .all(|p| (PERIOD_MIN..=PERIOD_MAX).contains(&p));

    if in_range {
        Ok(())
    } else {
        Err(ValidationError::PeriodOutOfRange {
            min: PERIOD_MIN,
            max: PERIOD_MAX,
        }
        .into())
    }
}

fn check_non_negative(df: &DataFrame, column: &str) -> GridbookResult<()> {
    let series = df
        .column(column)
        .map_err(map_df_err)?
        .as_materialized_series();
    let ca = series.f64().map_err(map_df_err)?;

    if ca.into_iter().all(|v| v.is_some_and(|x| x >= 0.0)) {
        Ok(())
    } else {
        Err(ValidationError::Negative {
            column: column.to_string(),
        }
        .into())
    }
}

fn check_buy_sell(df: &DataFrame) -> GridbookResult<()> {
    let series = df
        .column(VolumeCol::BuySell.as_str())
        .map_err(map_df_err)?
        .as_materialized_series();
    let ca = series.str().map_err(map_df_err)?;

    if ca
        .into_iter()
        .all(|v| v.is_some_and(|s| Side::from_str(s).is_ok()))
    {
        Ok(())
    } else {
        Err(ValidationError::InvalidSide.into())
    }
}
