use std::{fs::File, path::Path};

use polars::prelude::{
    CsvReadOptions, CsvWriter, DataFrame, ParquetReader, SerReader, SerWriter,
};

use crate::error::{GridbookResult, IoError};

/// Reads the trade volume table from a Parquet file.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_volume_table(path: &Path) -> GridbookResult<DataFrame> {
    read_parquet(path)
}

/// Reads the location table from a Parquet file.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_location_table(path: &Path) -> GridbookResult<DataFrame> {
    read_parquet(path)
}

/// Reads the forecast benchmark table from a CSV file. The Month column
/// arrives as date-like text; validation parses it.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_forecast_table(path: &Path) -> GridbookResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IoError::ReaderCreation(format!("{}: {e}", path.display())))?
        .finish()
        .map_err(|e| IoError::ReadFailed(e.to_string()).into())
}

fn read_parquet(path: &Path) -> GridbookResult<DataFrame> {
    let file =
        File::open(path).map_err(|e| IoError::ReaderCreation(format!("{}: {e}", path.display())))?;

    ParquetReader::new(file)
        .finish()
        .map_err(|e| IoError::ReadFailed(e.to_string()).into())
}

/// Writes one finalized report table as CSV, creating the parent directory
/// if needed.
pub fn write_report_csv(df: &mut DataFrame, path: &Path) -> GridbookResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            IoError::WriterCreation(format!("Failed to create directory {parent:?}: {e}"))
        })?;
    }

    let mut file = File::create(path).map_err(|e| IoError::WriterCreation(e.to_string()))?;

    CsvWriter::new(&mut file)
        .finish(df)
        .map_err(|e| IoError::WriteFailed(e.to_string()).into())
}
