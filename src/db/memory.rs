// In-memory destination mirroring the server-backed ones, keyed by table name.

use std::collections::HashMap;

use crate::db::Destination;
use crate::{ColumnType, Dataset, DbError, DbResult, Value};

#[derive(Debug, Default)]
pub struct MemoryDestination {
    tables: HashMap<String, MemTable>,
}

#[derive(Debug, Clone)]
pub struct MemTable {
    pub columns: Vec<String>,
    pub types: Vec<ColumnType>,
    pub rows: Vec<Vec<Value>>,
}

impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&MemTable> {
        self.tables.get(name)
    }

    /// Register an empty table, the way a pre-existing relation would appear.
    pub fn create_empty(&mut self, name: &str, columns: Vec<String>, types: Vec<ColumnType>) {
        self.tables.insert(
            name.to_string(),
            MemTable {
                columns,
                types,
                rows: Vec::new(),
            },
        );
    }
}

fn coerce_rows(dataset: &Dataset, types: &[ColumnType]) -> DbResult<Vec<Vec<Value>>> {
    dataset
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(types)
                .map(|(v, ty)| v.coerce(*ty))
                .collect::<DbResult<Vec<Value>>>()
        })
        .collect()
}

impl Destination for MemoryDestination {
    fn replace_table(&mut self, table: &str, dataset: &Dataset) -> DbResult<usize> {
        let types = dataset.column_types();
        let rows = coerce_rows(dataset, &types)?;
        let written = rows.len();
        self.tables.insert(
            table.to_string(),
            MemTable {
                columns: dataset.columns.clone(),
                types,
                rows,
            },
        );
        Ok(written)
    }

    fn append_rows(&mut self, table: &str, dataset: &Dataset) -> DbResult<usize> {
        if let Some(entry) = self.tables.get_mut(table) {
            if entry.columns != dataset.columns {
                return Err(DbError::Schema(format!(
                    "table '{}' has columns {:?}, dataset has {:?}",
                    table, entry.columns, dataset.columns
                )));
            }
            let rows = coerce_rows(dataset, &entry.types)?;
            let written = rows.len();
            entry.rows.extend(rows);
            return Ok(written);
        }
        self.replace_table(table, dataset)
    }

    fn count_rows(&mut self, table: &str) -> DbResult<u64> {
        self.tables
            .get(table)
            .map(|t| t.rows.len() as u64)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))
    }
}
