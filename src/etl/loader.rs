use std::fs::File;
use std::path::Path;

use clap::ValueEnum;
use tracing::{debug, info};

use crate::db::Destination;
use crate::etl::CsvParser;
use crate::{DbError, DbResult};

/// What to do when the target table already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LoadMode {
    /// Drop any existing table and write the dataset from scratch
    Replace,
    /// Keep existing rows and insert the dataset after them
    Append,
}

pub struct Loader {
    mode: LoadMode,
    delimiter: u8,
    has_headers: bool,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            mode: LoadMode::Replace,
            delimiter: b',',
            has_headers: true,
        }
    }

    pub fn with_mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Load a delimited file into `table` on `dest`.
    ///
    /// Returns the number of rows written. The whole file is parsed up front;
    /// the destination applies it in a single transaction, so the table is
    /// either fully written or the error propagates with nothing retried.
    pub fn load_csv<P: AsRef<Path>>(
        &self,
        file_path: P,
        dest: &mut dyn Destination,
        table: &str,
    ) -> DbResult<usize> {
        let path = file_path.as_ref();
        if table.trim().is_empty() {
            return Err(DbError::InvalidOperation(
                "table name must not be empty".to_string(),
            ));
        }
        if !path.exists() {
            return Err(DbError::FileNotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|e| {
            DbError::InvalidOperation(format!("failed to open {}: {}", path.display(), e))
        })?;

        let parser = CsvParser::new()
            .with_delimiter(self.delimiter)
            .with_headers(self.has_headers);
        let dataset = parser.parse(file)?;
        if dataset.columns.is_empty() {
            return Err(DbError::InvalidOperation(format!(
                "{} has no header row",
                path.display()
            )));
        }
        debug!(
            rows = dataset.row_count(),
            columns = dataset.columns.len(),
            "parsed dataset"
        );

        let written = match self.mode {
            LoadMode::Replace => dest.replace_table(table, &dataset)?,
            LoadMode::Append => dest.append_rows(table, &dataset)?,
        };
        info!(table, rows = written, "load complete");
        Ok(written)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
