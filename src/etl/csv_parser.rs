use std::io::Read;

use crate::{Dataset, DbResult, Value};

pub struct CsvParser {
    delimiter: u8,
    has_headers: bool,
}

impl CsvParser {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Read the whole source into memory, naming columns from the header row
    /// and inferring a type for every cell.
    pub fn parse<R: Read>(&self, reader: R) -> DbResult<Dataset> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .from_reader(reader);

        let mut columns: Vec<String> = if self.has_headers {
            csv_reader.headers()?.iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(Value::infer).collect());
        }

        // Without a header row, name columns by position
        if !self.has_headers {
            let width = rows.first().map(Vec::len).unwrap_or(0);
            columns = (0..width).map(|i| format!("column_{}", i)).collect();
        }

        Ok(Dataset { columns, rows })
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnType;

    #[test]
    fn test_parse_with_typed_columns() {
        let input = "city,pm25,humid\nBeijing,55,0.4\nShanghai,42,0.35\n";
        let dataset = CsvParser::new().parse(input.as_bytes()).unwrap();

        assert_eq!(dataset.columns, vec!["city", "pm25", "humid"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(
            dataset.column_types(),
            vec![ColumnType::Text, ColumnType::Integer, ColumnType::Float]
        );
        assert_eq!(dataset.rows[0][0], Value::Text("Beijing".to_string()));
        assert_eq!(dataset.rows[1][1], Value::Integer(42));
    }

    #[test]
    fn test_parse_header_only() {
        let input = "city,pm25\n";
        let dataset = CsvParser::new().parse(input.as_bytes()).unwrap();

        assert_eq!(dataset.columns, vec!["city", "pm25"]);
        assert_eq!(dataset.row_count(), 0);
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_parse_custom_delimiter() {
        let input = "name;age;city\nAlice;25;NYC\nBob;30;London\n";
        let dataset = CsvParser::new()
            .with_delimiter(b';')
            .parse(input.as_bytes())
            .unwrap();

        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.rows[0][0], Value::Text("Alice".to_string()));
        assert_eq!(dataset.rows[1][1], Value::Integer(30));
    }

    #[test]
    fn test_parse_without_headers() {
        let input = "Alice,25\nBob,30\n";
        let dataset = CsvParser::new()
            .with_headers(false)
            .parse(input.as_bytes())
            .unwrap();

        assert_eq!(dataset.columns, vec!["column_0", "column_1"]);
        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn test_parse_ragged_row_is_error() {
        let input = "key,value\nkey1,value1\nkey2\n";
        let result = CsvParser::new().parse(input.as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_quoted_fields() {
        let input = "key,value\nkey4,\"value with, comma\"\n";
        let dataset = CsvParser::new().parse(input.as_bytes()).unwrap();
        assert_eq!(
            dataset.rows[0][1],
            Value::Text("value with, comma".to_string())
        );
    }
}
