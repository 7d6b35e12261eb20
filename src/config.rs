use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

use crate::error::{ConfigError, GridbookResult};

/// How a trade month with no matching forecast benchmark is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapPolicy {
    /// Log each gap, return the gap list, and let the affected groups carry
    /// null forecast figures.
    #[default]
    Warn,
    /// Abort the run on the first gap.
    Fail,
}

/// Configuration surface of the reporting pipeline.
///
/// Window instants are wall-clock in the reporting timezone. The defaults
/// reproduce the standing report: Europe/Zurich, calendar year 2025, peak
/// hours 08:00 inclusive to 20:00 exclusive.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub reporting_timezone: Tz,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub peak_start_hour: u8,
    pub peak_end_hour: u8,
    pub forecast_gaps: GapPolicy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            reporting_timezone: chrono_tz::Europe::Zurich,
            window_start: first_of_year(2025),
            window_end: first_of_year(2026),
            peak_start_hour: 8,
            peak_end_hour: 20,
            forecast_gaps: GapPolicy::default(),
        }
    }
}

impl ReportConfig {
    pub fn with_reporting_timezone(self, reporting_timezone: Tz) -> Self {
        Self {
            reporting_timezone,
            ..self
        }
    }

    pub fn with_window(self, window_start: NaiveDateTime, window_end: NaiveDateTime) -> Self {
        Self {
            window_start,
            window_end,
            ..self
        }
    }

    pub fn with_peak_hours(self, peak_start_hour: u8, peak_end_hour: u8) -> Self {
        Self {
            peak_start_hour,
            peak_end_hour,
            ..self
        }
    }

    pub fn with_gap_policy(self, forecast_gaps: GapPolicy) -> Self {
        Self {
            forecast_gaps,
            ..self
        }
    }

    pub fn validate(&self) -> GridbookResult<()> {
        if self.peak_end_hour > 24 {
            return Err(ConfigError::InvalidPeakHours {
                start: self.peak_start_hour,
                end: self.peak_end_hour,
                msg: "end hour is past 24".to_string(),
            }
            .into());
        }
        if self.peak_start_hour >= self.peak_end_hour {
            return Err(ConfigError::InvalidPeakHours {
                start: self.peak_start_hour,
                end: self.peak_end_hour,
                msg: "start hour must be before end hour".to_string(),
            }
            .into());
        }
        if self.window_start >= self.window_end {
            return Err(ConfigError::InvalidReportingWindow {
                start: self.window_start,
                end: self.window_end,
                msg: "window start must be before window end".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

fn first_of_year(year: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .expect("January 1st exists in every year")
        .and_time(NaiveTime::MIN)
}
