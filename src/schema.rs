use std::sync::Arc;

use polars::prelude::{DataType, Field, PlSmallStr, Schema, SchemaRef};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use strum_macros::EnumString;

/// The standardized vocabulary for the trade volume table.
///
/// One row is one trade-period line. Volume and Price are never negative;
/// direction is carried solely by [`VolumeCol::BuySell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum VolumeCol {
    /// Trade identifier. Not required to be unique.
    DealNumber,
    /// Trade direction, exactly "Buy" or "Sell".
    BuySell,
    /// Delivery date, naive (no embedded timezone).
    Date,
    /// 1-based hourly slot index within the delivery day. The 25th slot
    /// accommodates the doubled hour of a daylight-saving fall-back day.
    Period,
    /// Trading book name. Also the output partition key.
    Book,
    /// Foreign key into the location table.
    LocationId,
    /// Physical volume, non-negative.
    Volume,
    /// Monetary price per unit, non-negative.
    Price,
}

/// The standardized vocabulary for the location table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum LocationCol {
    LocationId,
    LocationName,
    /// IANA timezone identifier. May be null; the reporting timezone is the
    /// fallback.
    TimeZone,
}

/// The standardized vocabulary for the forecast benchmark table.
///
/// One row per calendar month, carrying both benchmark prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ForecastCol {
    /// First-of-month date, primary key alongside the peak bucket.
    Month,
    OffPeakPrice,
    PeakPrice,
}

/// Working columns computed by the pipeline, never persisted as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum DerivedCol {
    /// The delivery instant normalized into the reporting timezone.
    PeriodDateTime,
    /// First-of-month date of the delivery instant's reporting-timezone wall
    /// clock.
    Month,
    PeakOffPeak,
    /// Signed volume: positive for Buy, negative for Sell.
    AdjVolume,
    /// Signed cash flow: negative outflow for Buy, positive inflow for Sell.
    TradeValue,
    /// Benchmark price selected from the forecast table by peak bucket.
    ForecastPrice,
    /// ForecastPrice times absolute signed volume.
    ForecastCost,
}

/// Columns of one aggregated PnL report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ReportCol {
    Month,
    LocationName,
    PeakOffPeak,
    TotalVolume,
    TotalTradeValue,
    ForecastCost,
    ForecastPnL,
}

/// Trade direction, canonicalized by validation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum Side {
    Buy,
    Sell,
}

/// Classification of a delivery hour as inside or outside the configured
/// high-demand window.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum PeakOffPeak {
    Peak,
    OffPeak,
}

macro_rules! impl_col_vocab {
    ($name:ident) => {
        impl From<$name> for PlSmallStr {
            fn from(value: $name) -> Self {
                value.as_str().into()
            }
        }

        impl $name {
            pub fn name(&self) -> PlSmallStr {
                (*self).into()
            }

            pub fn as_str(&self) -> &'static str {
                self.into()
            }

            pub fn field(&self) -> Field {
                Field::new(self.name(), self.dtype())
            }
        }
    };
}

impl_col_vocab!(VolumeCol);
impl_col_vocab!(LocationCol);
impl_col_vocab!(ForecastCol);
impl_col_vocab!(ReportCol);

impl Side {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl PeakOffPeak {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl DerivedCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl From<DerivedCol> for PlSmallStr {
    fn from(value: DerivedCol) -> Self {
        value.as_str().into()
    }
}

impl VolumeCol {
    pub fn dtype(&self) -> DataType {
        match self {
            Self::DealNumber | Self::Period | Self::LocationId => DataType::Int64,
            Self::BuySell | Self::Book => DataType::String,
            Self::Date => DataType::Date,
            Self::Volume | Self::Price => DataType::Float64,
        }
    }
}

impl LocationCol {
    pub fn dtype(&self) -> DataType {
        match self {
            Self::LocationId => DataType::Int64,
            Self::LocationName | Self::TimeZone => DataType::String,
        }
    }
}

impl ForecastCol {
    pub fn dtype(&self) -> DataType {
        match self {
            Self::Month => DataType::Date,
            Self::OffPeakPrice | Self::PeakPrice => DataType::Float64,
        }
    }
}

impl ReportCol {
    pub fn dtype(&self) -> DataType {
        match self {
            Self::Month => DataType::Date,
            Self::LocationName | Self::PeakOffPeak => DataType::String,
            Self::TotalVolume | Self::TotalTradeValue | Self::ForecastCost | Self::ForecastPnL => {
                DataType::Float64
            }
        }
    }
}

pub fn volume_schema() -> SchemaRef {
    let s = Schema::from_iter([
        VolumeCol::DealNumber.field(),
        VolumeCol::BuySell.field(),
        VolumeCol::Date.field(),
        VolumeCol::Period.field(),
        VolumeCol::Book.field(),
        VolumeCol::LocationId.field(),
        VolumeCol::Volume.field(),
        VolumeCol::Price.field(),
    ]);

    Arc::new(s)
}

pub fn location_schema() -> SchemaRef {
    let s = Schema::from_iter([
        LocationCol::LocationId.field(),
        LocationCol::LocationName.field(),
        LocationCol::TimeZone.field(),
    ]);

    Arc::new(s)
}

pub fn forecast_schema() -> SchemaRef {
    let s = Schema::from_iter([
        ForecastCol::Month.field(),
        ForecastCol::OffPeakPrice.field(),
        ForecastCol::PeakPrice.field(),
    ]);

    Arc::new(s)
}

/// Schema of one per-book output artifact, in output column order.
pub fn report_schema() -> SchemaRef {
    let s = Schema::from_iter([
        ReportCol::Month.field(),
        ReportCol::LocationName.field(),
        ReportCol::PeakOffPeak.field(),
        ReportCol::TotalVolume.field(),
        ReportCol::TotalTradeValue.field(),
        ReportCol::ForecastCost.field(),
        ReportCol::ForecastPnL.field(),
    ]);

    Arc::new(s)
}
