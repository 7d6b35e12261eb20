use std::path::{Path, PathBuf};

use polars::prelude::{AnyValue, DataFrame, PlSmallStr};

use crate::{
    error::{GridbookResult, map_df_err},
    io::write_report_csv,
    schema::{VolumeCol, report_schema},
};

/// The finalized PnL table of one trading book: exactly the seven output
/// columns, one row per (Month, LocationName, PeakOffPeak) combination
/// observed for that book.
#[derive(Debug, Clone)]
pub struct BookReport {
    pub book: String,
    pub pnl: DataFrame,
}

/// All per-book reports of one pipeline run, in first-seen book order.
#[derive(Debug, Clone)]
pub struct PnlReports {
    pub reports: Vec<BookReport>,
}

impl PnlReports {
    /// Splits the aggregated PnL frame into one report per distinct Book.
    pub fn from_aggregate(pnl: &DataFrame) -> GridbookResult<Self> {
        pnl.partition_by_stable([VolumeCol::Book.as_str()], true)
            .map_err(map_df_err)?
            .into_iter()
            .map(BookReport::from_partition)
            .collect()
    }

    pub fn books(&self) -> Vec<&str> {
        self.reports.iter().map(|r| r.book.as_str()).collect()
    }

    /// Writes one timestamped CSV per book into `dir`, creating the
    /// directory if needed. Returns the written paths.
    #[tracing::instrument(skip_all, fields(books = self.reports.len(), dir = %dir.display()))]
    pub fn save_as_csv(&self, dir: &Path) -> GridbookResult<Vec<PathBuf>> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");

        self.reports
            .iter()
            .map(|report| {
                let path = dir.join(format!("{}_pnl_{stamp}.csv", report.book));
                write_report_csv(&mut report.pnl.clone(), &path)?;
                tracing::info!(book = %report.book, path = %path.display(), "Report generated");
                Ok(path)
            })
            .collect()
    }
}

impl FromIterator<BookReport> for PnlReports {
    fn from_iter<T: IntoIterator<Item = BookReport>>(iter: T) -> Self {
        PnlReports {
            reports: iter.into_iter().collect(),
        }
    }
}

impl BookReport {
    fn from_partition(partition: DataFrame) -> GridbookResult<Self> {
        let book = match partition
            .column(VolumeCol::Book.as_str())
            .map_err(map_df_err)?
            .get(0)
            .map_err(map_df_err)?
            .into_static()
        {
            AnyValue::String(s) => s.to_string(),
            AnyValue::StringOwned(s) => s.to_string(),
            _ => "unassigned".to_string(),
        };

        let columns: Vec<PlSmallStr> = report_schema().iter_names().cloned().collect();
        let pnl = partition.select(columns).map_err(map_df_err)?;

        Ok(Self { book, pnl })
    }
}
