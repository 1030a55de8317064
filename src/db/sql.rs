// Dialect-aware statement building shared by the server-backed destinations.

use crate::ColumnType;
use crate::config::Driver;

/// Quote an identifier, doubling any embedded quote character.
pub fn quote_ident(driver: Driver, ident: &str) -> String {
    match driver {
        Driver::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
        Driver::Mysql => format!("`{}`", ident.replace('`', "``")),
    }
}

pub fn sql_type(driver: Driver, ty: ColumnType) -> &'static str {
    match (driver, ty) {
        (_, ColumnType::Integer) => "BIGINT",
        (Driver::Postgres, ColumnType::Float) => "DOUBLE PRECISION",
        (Driver::Mysql, ColumnType::Float) => "DOUBLE",
        (_, ColumnType::Boolean) => "BOOLEAN",
        (_, ColumnType::Text) => "TEXT",
    }
}

pub fn drop_table(driver: Driver, table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(driver, table))
}

pub fn create_table(
    driver: Driver,
    table: &str,
    columns: &[String],
    types: &[ColumnType],
) -> String {
    let cols = columns
        .iter()
        .zip(types)
        .map(|(name, ty)| format!("{} {}", quote_ident(driver, name), sql_type(driver, *ty)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({})", quote_ident(driver, table), cols)
}

pub fn count_rows(driver: Driver, table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_ident(driver, table))
}

/// Single-row parameterized insert, placeholder style per dialect.
pub fn insert_row(driver: Driver, table: &str, columns: &[String]) -> String {
    let cols = columns
        .iter()
        .map(|c| quote_ident(driver, c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = columns
        .iter()
        .enumerate()
        .map(|(i, _)| match driver {
            Driver::Postgres => format!("${}", i + 1),
            Driver::Mysql => "?".to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(driver, table),
        cols,
        placeholders
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_per_dialect() {
        assert_eq!(
            quote_ident(Driver::Postgres, "Air_Pollution_Data"),
            "\"Air_Pollution_Data\""
        );
        assert_eq!(
            quote_ident(Driver::Mysql, "Air_Pollution_Data"),
            "`Air_Pollution_Data`"
        );
        assert_eq!(quote_ident(Driver::Postgres, "we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_ident(Driver::Mysql, "we`ird"), "`we``ird`");
    }

    #[test]
    fn test_create_table_statement() {
        let columns = vec!["city".to_string(), "pm25".to_string()];
        let types = vec![ColumnType::Text, ColumnType::Integer];

        assert_eq!(
            create_table(Driver::Postgres, "Air_Pollution_Data", &columns, &types),
            "CREATE TABLE \"Air_Pollution_Data\" (\"city\" TEXT, \"pm25\" BIGINT)"
        );
        assert_eq!(
            create_table(Driver::Mysql, "Air_Pollution_Data", &columns, &types),
            "CREATE TABLE `Air_Pollution_Data` (`city` TEXT, `pm25` BIGINT)"
        );
    }

    #[test]
    fn test_float_type_differs_per_dialect() {
        assert_eq!(sql_type(Driver::Postgres, ColumnType::Float), "DOUBLE PRECISION");
        assert_eq!(sql_type(Driver::Mysql, ColumnType::Float), "DOUBLE");
    }

    #[test]
    fn test_insert_row_placeholders() {
        let columns = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            insert_row(Driver::Mysql, "t", &columns),
            "INSERT INTO `t` (`a`, `b`) VALUES (?, ?)"
        );
        assert_eq!(
            insert_row(Driver::Postgres, "t", &columns),
            "INSERT INTO \"t\" (\"a\", \"b\") VALUES ($1, $2)"
        );
    }

    #[test]
    fn test_count_statement() {
        assert_eq!(
            count_rows(Driver::Mysql, "Air_Pollution_Data"),
            "SELECT COUNT(*) FROM `Air_Pollution_Data`"
        );
    }
}
