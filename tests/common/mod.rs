use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame, df};

pub struct VolumeRow {
    pub deal: i64,
    pub side: &'static str,
    pub date: &'static str,
    pub period: i64,
    pub book: &'static str,
    pub location: i64,
    pub volume: f64,
    pub price: f64,
}

pub fn volume_row(
    deal: i64,
    side: &'static str,
    date: &'static str,
    period: i64,
    book: &'static str,
    location: i64,
    volume: f64,
    price: f64,
) -> VolumeRow {
    VolumeRow {
        deal,
        side,
        date,
        period,
        book,
        location,
        volume,
        price,
    }
}

pub fn volume_table(rows: &[VolumeRow]) -> DataFrame {
    df![
        "DealNumber" => rows.iter().map(|r| r.deal).collect::<Vec<_>>(),
        "BuySell" => rows.iter().map(|r| r.side).collect::<Vec<_>>(),
        "Date" => rows.iter().map(|r| r.date).collect::<Vec<_>>(),
        "Period" => rows.iter().map(|r| r.period).collect::<Vec<_>>(),
        "Book" => rows.iter().map(|r| r.book).collect::<Vec<_>>(),
        "LocationId" => rows.iter().map(|r| r.location).collect::<Vec<_>>(),
        "Volume" => rows.iter().map(|r| r.volume).collect::<Vec<_>>(),
        "Price" => rows.iter().map(|r| r.price).collect::<Vec<_>>(),
    ]
    .unwrap()
}

pub fn location_table(rows: &[(i64, &str, Option<&str>)]) -> DataFrame {
    df![
        "LocationId" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        "LocationName" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        "TimeZone" => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
    ]
    .unwrap()
}

pub fn forecast_table(rows: &[(&str, f64, f64)]) -> DataFrame {
    df![
        "Month" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        "OffPeakPrice" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        "PeakPrice" => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
    ]
    .unwrap()
}

pub fn get_f64(df: &DataFrame, column: &str, row: usize) -> f64 {
    let series = df.column(column).expect("Column not found");
    match series.get(row).expect("Row not found") {
        AnyValue::Float64(v) => v,
        other => panic!("Expected f64, got {other:?}"),
    }
}

pub fn get_opt_f64(df: &DataFrame, column: &str, row: usize) -> Option<f64> {
    let series = df.column(column).expect("Column not found");
    match series.get(row).expect("Row not found") {
        AnyValue::Null => None,
        AnyValue::Float64(v) => Some(v),
        other => panic!("Expected Option<f64>, got {other:?}"),
    }
}

pub fn get_string(df: &DataFrame, column: &str, row: usize) -> String {
    let series = df.column(column).expect("Column not found");
    match series.get(row).expect("Row not found").into_static() {
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => panic!("Expected String, got {other:?}"),
    }
}

pub fn get_date(df: &DataFrame, column: &str, row: usize) -> NaiveDate {
    let series = df.column(column).expect("Column not found");
    match series.get(row).expect("Row not found") {
        AnyValue::Date(days) => {
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() + chrono::Duration::days(days.into())
        }
        other => panic!("Expected date, got {other:?}"),
    }
}
