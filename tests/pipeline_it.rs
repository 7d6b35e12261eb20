use chrono::NaiveDate;
use gridbook::{
    GapPolicy, GridbookError, PnlPipeline, PnlReports, ReportConfig,
    error::ValidationError,
};

mod common;

use common::{
    forecast_table, get_date, get_f64, get_opt_f64, get_string, location_table, volume_row,
    volume_table,
};

fn default_pipeline() -> PnlPipeline {
    PnlPipeline::new(ReportConfig::default()).unwrap()
}

#[test]
fn single_buy_produces_the_expected_report_row() {
    // One Buy of 100 @ 20 delivered 2025-03-01 08:00 local (Period 9, Peak)
    // against a March peak benchmark of 18.
    let volumes = volume_table(&[volume_row(1, "Buy", "2025-03-01", 9, "B1", 1, 100.0, 20.0)]);
    let locations = location_table(&[(1, "L1", None)]);
    let forecast = forecast_table(&[("2025-03-01", 12.0, 18.0)]);

    let run = default_pipeline().run(volumes, locations, forecast).unwrap();

    assert!(run.gaps.is_empty());
    assert_eq!(run.pnl.height(), 1);
    assert_eq!(
        get_date(&run.pnl, "Month", 0),
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    );
    assert_eq!(get_string(&run.pnl, "LocationName", 0), "L1");
    assert_eq!(get_string(&run.pnl, "PeakOffPeak", 0), "Peak");
    assert_eq!(get_f64(&run.pnl, "TotalVolume", 0), 100.0);
    assert_eq!(get_f64(&run.pnl, "TotalTradeValue", 0), -2000.0);
    assert_eq!(get_f64(&run.pnl, "ForecastCost", 0), 1800.0);
    assert_eq!(get_f64(&run.pnl, "ForecastPnL", 0), -3800.0);
}

#[test]
fn running_twice_on_identical_input_is_bit_exact() {
    let volumes = volume_table(&[
        volume_row(1, "Buy", "2025-03-01", 9, "B1", 1, 100.0, 20.0),
        volume_row(2, "Sell", "2025-03-01", 21, "B1", 1, 40.0, 22.5),
        volume_row(3, "Buy", "2025-07-15", 12, "B2", 2, 80.0, 55.25),
    ]);
    let locations = location_table(&[(1, "L1", Some("Europe/Zurich")), (2, "L2", None)]);
    let forecast = forecast_table(&[("2025-03-01", 12.0, 18.0), ("2025-07-01", 14.0, 21.0)]);

    let pipeline = default_pipeline();
    let first = pipeline
        .run(volumes.clone(), locations.clone(), forecast.clone())
        .unwrap();
    let second = pipeline.run(volumes, locations, forecast).unwrap();

    assert!(first.pnl.equals_missing(&second.pnl));
    assert_eq!(first.gaps, second.gaps);
}

#[test]
fn reporting_window_excludes_the_old_year_and_keeps_new_years_midnight() {
    // Period 24 on 2024-12-31 starts 23:00 local and is out; Period 1 on
    // 2025-01-01 starts at local midnight and is in.
    let volumes = volume_table(&[
        volume_row(1, "Buy", "2024-12-31", 24, "B1", 1, 10.0, 50.0),
        volume_row(2, "Buy", "2025-01-01", 1, "B1", 1, 20.0, 50.0),
    ]);
    let locations = location_table(&[(1, "L1", None)]);
    let forecast = forecast_table(&[("2024-12-01", 40.0, 60.0), ("2025-01-01", 40.0, 60.0)]);

    let run = default_pipeline().run(volumes, locations, forecast).unwrap();

    assert_eq!(run.pnl.height(), 1);
    assert_eq!(
        get_date(&run.pnl, "Month", 0),
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    );
    assert_eq!(get_f64(&run.pnl, "TotalVolume", 0), 20.0);
}

#[test]
fn negative_price_aborts_before_any_output() {
    let volumes = volume_table(&[volume_row(1, "Buy", "2025-03-01", 9, "B1", 1, 100.0, -20.0)]);
    let locations = location_table(&[(1, "L1", None)]);
    let forecast = forecast_table(&[("2025-03-01", 12.0, 18.0)]);

    let err = default_pipeline()
        .run(volumes, locations, forecast)
        .unwrap_err();

    assert!(matches!(
        &err,
        GridbookError::Validation(ValidationError::Negative { column }) if column == "Price"
    ));
}

#[test]
fn volume_is_conserved_per_book_within_the_window() {
    let rows = [
        volume_row(1, "Buy", "2025-03-01", 9, "B1", 1, 100.0, 20.0),
        volume_row(2, "Sell", "2025-03-01", 9, "B1", 2, 30.0, 21.0),
        volume_row(3, "Buy", "2025-05-10", 15, "B1", 1, 12.5, 33.0),
        volume_row(4, "Sell", "2025-05-10", 2, "B1", 1, 7.5, 30.0),
    ];
    let expected: f64 = 100.0 - 30.0 + 12.5 - 7.5;

    let volumes = volume_table(&rows);
    let locations = location_table(&[(1, "L1", None), (2, "L2", Some("Europe/Zurich"))]);
    let forecast = forecast_table(&[("2025-03-01", 12.0, 18.0), ("2025-05-01", 13.0, 19.0)]);

    let run = default_pipeline().run(volumes, locations, forecast).unwrap();

    let total: f64 = (0..run.pnl.height())
        .map(|i| get_f64(&run.pnl, "TotalVolume", i))
        .sum();
    assert_eq!(total, expected);
}

#[test]
fn fall_back_day_delivers_25_periods_into_one_month() {
    // All 25 slots of 2025-10-26 resolve; the doubled 02:00 hour takes its
    // first occurrence. Every slot is an OffPeak or Peak hour of October.
    let rows: Vec<_> = (1..=25)
        .map(|p| volume_row(p, "Buy", "2025-10-26", p, "B1", 1, 1.0, 10.0))
        .collect();
    let volumes = volume_table(&rows);
    let locations = location_table(&[(1, "L1", None)]);
    let forecast = forecast_table(&[("2025-10-01", 30.0, 45.0)]);

    let run = default_pipeline().run(volumes, locations, forecast).unwrap();

    let total: f64 = (0..run.pnl.height())
        .map(|i| get_f64(&run.pnl, "TotalVolume", i))
        .sum();
    assert_eq!(total, 25.0);
    for i in 0..run.pnl.height() {
        assert_eq!(
            get_date(&run.pnl, "Month", i),
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
        );
    }
}

#[test]
fn location_timezone_override_shifts_the_bucket() {
    // Period 9 in New York is 08:00 EST, which is 14:00 in Zurich: still
    // Peak. Period 15 is 14:00 EST, 20:00 in Zurich: OffPeak in the report
    // even though it is mid-afternoon locally.
    let volumes = volume_table(&[
        volume_row(1, "Buy", "2025-01-15", 9, "B1", 1, 10.0, 50.0),
        volume_row(2, "Buy", "2025-01-15", 15, "B1", 1, 10.0, 50.0),
    ]);
    let locations = location_table(&[(1, "NYC", Some("America/New_York"))]);
    let forecast = forecast_table(&[("2025-01-01", 40.0, 60.0)]);

    let run = default_pipeline().run(volumes, locations, forecast).unwrap();

    assert_eq!(run.pnl.height(), 2);
    assert_eq!(get_string(&run.pnl, "PeakOffPeak", 0), "Peak");
    assert_eq!(get_string(&run.pnl, "PeakOffPeak", 1), "OffPeak");
}

#[test]
fn duplicate_deal_numbers_are_ordinary_rows() {
    let volumes = volume_table(&[
        volume_row(7, "Buy", "2025-03-01", 9, "B1", 1, 10.0, 20.0),
        volume_row(7, "Buy", "2025-03-01", 9, "B1", 1, 10.0, 20.0),
    ]);
    let locations = location_table(&[(1, "L1", None)]);
    let forecast = forecast_table(&[("2025-03-01", 12.0, 18.0)]);

    let run = default_pipeline().run(volumes, locations, forecast).unwrap();

    assert_eq!(run.pnl.height(), 1);
    assert_eq!(get_f64(&run.pnl, "TotalVolume", 0), 20.0);
}

#[test]
fn forecast_gap_is_surfaced_and_strict_mode_aborts() {
    let volumes = volume_table(&[volume_row(1, "Buy", "2025-04-02", 9, "B1", 1, 10.0, 20.0)]);
    let locations = location_table(&[(1, "L1", None)]);
    let forecast = forecast_table(&[("2025-03-01", 12.0, 18.0)]);

    let run = default_pipeline()
        .run(volumes.clone(), locations.clone(), forecast.clone())
        .unwrap();

    assert_eq!(run.gaps.len(), 1);
    assert_eq!(
        run.gaps[0].month,
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    );
    assert_eq!(run.gaps[0].bucket, "Peak");
    assert_eq!(get_opt_f64(&run.pnl, "ForecastCost", 0), None);
    assert_eq!(get_opt_f64(&run.pnl, "ForecastPnL", 0), None);

    let strict = PnlPipeline::new(ReportConfig::default().with_gap_policy(GapPolicy::Fail)).unwrap();
    let err = strict.run(volumes, locations, forecast).unwrap_err();
    assert!(matches!(err, GridbookError::Data(_)));
}

#[test]
fn reports_split_per_book_and_write_csv() {
    let volumes = volume_table(&[
        volume_row(1, "Buy", "2025-03-01", 9, "B1", 1, 100.0, 20.0),
        volume_row(2, "Sell", "2025-03-01", 9, "B2", 1, 50.0, 20.0),
    ]);
    let locations = location_table(&[(1, "L1", None)]);
    let forecast = forecast_table(&[("2025-03-01", 12.0, 18.0)]);

    let run = default_pipeline().run(volumes, locations, forecast).unwrap();
    let reports = PnlReports::from_aggregate(&run.pnl).unwrap();

    assert_eq!(reports.books(), vec!["B1", "B2"]);

    let dir = std::env::temp_dir().join("gridbook_pipeline_it");
    let written = reports.save_as_csv(&dir).unwrap();
    assert_eq!(written.len(), 2);
    for path in &written {
        assert!(path.exists());
        std::fs::remove_file(path).unwrap();
    }
    let _ = std::fs::remove_dir(&dir);
}
