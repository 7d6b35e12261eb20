pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod validate;

pub use config::{GapPolicy, ReportConfig};
pub use error::{GridbookError, GridbookResult};
pub use pipeline::{PnlPipeline, PnlRun, forecast::ForecastGap};
pub use report::{BookReport, PnlReports};
pub use schema::{PeakOffPeak, Side};
