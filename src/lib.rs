pub mod args;
pub mod config;
pub mod db;
pub mod etl;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use args::{Cli, Commands};
pub use config::{AppConfig, ConnectionConfig, Driver};
pub use db::Destination;
pub use etl::{CsvParser, LoadMode, Loader};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("source file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("schema mismatch: {0}")]
    Schema(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

// Result type for db operations
pub type DbResult<T> = Result<T, DbError>;

/// A single cell, typed by inspecting its text form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

/// Storage type of a column, unified over every cell in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
}

impl Value {
    /// Infer the best-fitting type for a raw field. Empty fields become null,
    /// numeric text becomes an integer or float, `true`/`false` become booleans,
    /// everything else stays text.
    pub fn infer(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            _ => Value::Text(raw.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(ColumnType::Integer),
            Value::Float(_) => Some(ColumnType::Float),
            Value::Boolean(_) => Some(ColumnType::Boolean),
            Value::Text(_) => Some(ColumnType::Text),
        }
    }

    /// Rewrite the value so it fits a column of type `ty`. Integers widen to
    /// floats and anything renders as text; other combinations are rejected.
    pub fn coerce(&self, ty: ColumnType) -> DbResult<Value> {
        let coerced = match (self, ty) {
            (Value::Null, _) => Value::Null,
            (v, ColumnType::Text) => Value::Text(v.render()),
            (Value::Integer(i), ColumnType::Integer) => Value::Integer(*i),
            (Value::Integer(i), ColumnType::Float) => Value::Float(*i as f64),
            (Value::Float(f), ColumnType::Float) => Value::Float(*f),
            (Value::Boolean(b), ColumnType::Boolean) => Value::Boolean(*b),
            (v, ty) => {
                return Err(DbError::Schema(format!(
                    "value '{}' does not fit a {} column",
                    v.render(),
                    ty.name()
                )));
            }
        };
        Ok(coerced)
    }

    /// Plain-text rendering; nulls render as the empty string.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl ColumnType {
    /// Smallest type that holds values of both inputs.
    pub fn unify(self, other: ColumnType) -> ColumnType {
        use ColumnType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Text,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "text",
        }
    }
}

/// An ordered table of records read from a delimited source.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Unified type per column. A column with no non-null cells falls back to text.
    pub fn column_types(&self) -> Vec<ColumnType> {
        (0..self.columns.len())
            .map(|idx| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(idx).and_then(Value::column_type))
                    .reduce(ColumnType::unify)
                    .unwrap_or(ColumnType::Text)
            })
            .collect()
    }
}

/// Load a delimited file into `table`, replacing its contents.
pub fn load(config: &ConnectionConfig, path: impl AsRef<Path>, table: &str) -> DbResult<usize> {
    let mut dest = db::connect(config)?;
    Loader::new().load_csv(path, dest.as_mut(), table)
}

/// Current row count of `table`.
pub fn count(config: &ConnectionConfig, table: &str) -> DbResult<u64> {
    let mut dest = db::connect(config)?;
    dest.count_rows(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_inference() {
        assert_eq!(Value::infer("55"), Value::Integer(55));
        assert_eq!(Value::infer("-7"), Value::Integer(-7));
        assert_eq!(Value::infer("42.5"), Value::Float(42.5));
        assert_eq!(Value::infer("true"), Value::Boolean(true));
        assert_eq!(Value::infer("False"), Value::Boolean(false));
        assert_eq!(Value::infer(""), Value::Null);
        assert_eq!(Value::infer("  "), Value::Null);
        assert_eq!(Value::infer("Beijing"), Value::Text("Beijing".to_string()));
    }

    #[test]
    fn test_column_type_unification() {
        assert_eq!(
            ColumnType::Integer.unify(ColumnType::Float),
            ColumnType::Float
        );
        assert_eq!(
            ColumnType::Integer.unify(ColumnType::Integer),
            ColumnType::Integer
        );
        assert_eq!(
            ColumnType::Boolean.unify(ColumnType::Float),
            ColumnType::Text
        );
        assert_eq!(ColumnType::Text.unify(ColumnType::Integer), ColumnType::Text);
    }

    #[test]
    fn test_dataset_column_types() {
        let dataset = Dataset {
            columns: vec!["city".into(), "pm25".into(), "note".into()],
            rows: vec![
                vec![
                    Value::Text("Beijing".into()),
                    Value::Integer(55),
                    Value::Null,
                ],
                vec![
                    Value::Text("Shanghai".into()),
                    Value::Float(42.5),
                    Value::Null,
                ],
            ],
        };

        assert_eq!(
            dataset.column_types(),
            vec![ColumnType::Text, ColumnType::Float, ColumnType::Text]
        );
    }

    #[test]
    fn test_coercion_widens_and_rejects() {
        assert_eq!(
            Value::Integer(5).coerce(ColumnType::Float).unwrap(),
            Value::Float(5.0)
        );
        assert_eq!(
            Value::Integer(5).coerce(ColumnType::Text).unwrap(),
            Value::Text("5".to_string())
        );
        assert!(Value::Text("abc".into()).coerce(ColumnType::Integer).is_err());
        assert_eq!(Value::Null.coerce(ColumnType::Integer).unwrap(), Value::Null);
    }
}
