//! CSV table loading.
//!
//! Both entry points apply the same checks: the name must carry a `.csv`
//! extension, the content must parse, and the table must have at least one row.

use crate::error::{ProcessingError, Result};
use polars::prelude::*;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, info};

/// Rows sampled for schema inference.
const INFER_SCHEMA_ROWS: usize = 100;

/// Load a CSV file from disk.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    ensure_csv_name(&path.to_string_lossy())?;

    if !path.exists() {
        return Err(ProcessingError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    debug!("Reading CSV from {}", path.display());
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| ProcessingError::InvalidCsv(e.to_string()))?
        .finish()
        .map_err(|e| ProcessingError::InvalidCsv(e.to_string()))?;

    ensure_not_empty(df, &path.to_string_lossy())
}

/// Load a CSV from an in-memory upload. `file_name` is only used for the
/// extension check and logging.
pub fn load_csv_from_reader<R: Read>(file_name: &str, mut reader: R) -> Result<DataFrame> {
    ensure_csv_name(file_name)?;

    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ProcessingError::EmptyDataset);
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| ProcessingError::InvalidCsv(e.to_string()))?;

    ensure_not_empty(df, file_name)
}

fn ensure_csv_name(file_name: &str) -> Result<()> {
    if file_name.to_ascii_lowercase().ends_with(".csv") {
        Ok(())
    } else {
        Err(ProcessingError::UnsupportedFileType(file_name.to_string()))
    }
}

fn ensure_not_empty(df: DataFrame, source: &str) -> Result<DataFrame> {
    if df.height() == 0 || df.width() == 0 {
        return Err(ProcessingError::EmptyDataset);
    }
    info!(
        "Loaded {} ({} rows x {} columns)",
        source,
        df.height(),
        df.width()
    );
    Ok(df)
}
