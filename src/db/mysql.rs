// MySQL destination over the synchronous `mysql` client.
//
// Rows go in as batched parameterized inserts inside a transaction. MySQL
// auto-commits around DDL, so a failed replace can leave the recreated table
// partially filled; the error still propagates and nothing is retried.

use mysql::prelude::Queryable;
use mysql::{Conn, Opts, Params, Transaction, TxOpts};
use tracing::debug;

use crate::config::{ConnectionConfig, Driver};
use crate::db::{Destination, sql};
use crate::{Dataset, DbError, DbResult, Value};

// Server error codes this module branches on
const ER_NO_SUCH_TABLE: u16 = 1146;
const ER_DBACCESS_DENIED: u16 = 1044;
const ER_ACCESS_DENIED: u16 = 1045;
const ER_BAD_DB: u16 = 1049;
const ER_TRUNCATED_WRONG_VALUE: u16 = 1292;
const ER_WARN_DATA_OUT_OF_RANGE: u16 = 1264;
const ER_TRUNCATED_WRONG_VALUE_FOR_FIELD: u16 = 1366;

pub struct MysqlDestination {
    conn: Conn,
}

impl MysqlDestination {
    pub fn connect(config: &ConnectionConfig) -> DbResult<Self> {
        let opts =
            Opts::from_url(&config.url()).map_err(|e| DbError::Connection(e.to_string()))?;
        let conn = Conn::new(opts).map_err(|e| DbError::Connection(e.to_string()))?;
        debug!(host = %config.host, database = %config.database, "connected to mysql");
        Ok(Self { conn })
    }

    fn insert_rows(tx: &mut Transaction<'_>, table: &str, dataset: &Dataset) -> DbResult<usize> {
        if dataset.rows.is_empty() {
            return Ok(0);
        }
        let types = dataset.column_types();
        let stmt = sql::insert_row(Driver::Mysql, table, &dataset.columns);
        let params = dataset
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&types)
                    .map(|(v, ty)| v.coerce(*ty).map(mysql_value))
                    .collect::<DbResult<Vec<mysql::Value>>>()
                    .map(Params::Positional)
            })
            .collect::<DbResult<Vec<Params>>>()?;
        tx.exec_batch(stmt.as_str(), params).map_err(map_err)?;
        Ok(dataset.rows.len())
    }

    fn table_exists(tx: &mut Transaction<'_>, table: &str) -> DbResult<bool> {
        let found: Option<u64> = tx
            .exec_first(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_name = ?",
                (table,),
            )
            .map_err(map_err)?;
        Ok(found.unwrap_or(0) > 0)
    }
}

impl Destination for MysqlDestination {
    fn replace_table(&mut self, table: &str, dataset: &Dataset) -> DbResult<usize> {
        let types = dataset.column_types();
        let mut tx = self
            .conn
            .start_transaction(TxOpts::default())
            .map_err(map_err)?;
        tx.query_drop(sql::drop_table(Driver::Mysql, table))
            .map_err(map_err)?;
        tx.query_drop(sql::create_table(
            Driver::Mysql,
            table,
            &dataset.columns,
            &types,
        ))
        .map_err(map_err)?;
        let written = Self::insert_rows(&mut tx, table, dataset)?;
        tx.commit().map_err(map_err)?;
        Ok(written)
    }

    fn append_rows(&mut self, table: &str, dataset: &Dataset) -> DbResult<usize> {
        let types = dataset.column_types();
        let mut tx = self
            .conn
            .start_transaction(TxOpts::default())
            .map_err(map_err)?;
        if !Self::table_exists(&mut tx, table)? {
            tx.query_drop(sql::create_table(
                Driver::Mysql,
                table,
                &dataset.columns,
                &types,
            ))
            .map_err(map_err)?;
        }
        let written = Self::insert_rows(&mut tx, table, dataset)?;
        tx.commit().map_err(map_err)?;
        Ok(written)
    }

    fn count_rows(&mut self, table: &str) -> DbResult<u64> {
        let stmt = sql::count_rows(Driver::Mysql, table);
        let count: Option<u64> = self.conn.query_first(stmt).map_err(map_err)?;
        count.ok_or_else(|| DbError::Query("count query returned no rows".to_string()))
    }
}

fn mysql_value(value: Value) -> mysql::Value {
    match value {
        Value::Null => mysql::Value::NULL,
        Value::Integer(i) => mysql::Value::from(i),
        Value::Float(f) => mysql::Value::from(f),
        Value::Boolean(b) => mysql::Value::from(b),
        Value::Text(s) => mysql::Value::from(s),
    }
}

/// Translate driver failures into the crate error model.
fn map_err(e: mysql::Error) -> DbError {
    match e {
        mysql::Error::MySqlError(ref server) => match server.code {
            ER_NO_SUCH_TABLE => DbError::TableNotFound(server.message.clone()),
            ER_DBACCESS_DENIED | ER_ACCESS_DENIED | ER_BAD_DB => {
                DbError::Connection(server.message.clone())
            }
            ER_TRUNCATED_WRONG_VALUE
            | ER_WARN_DATA_OUT_OF_RANGE
            | ER_TRUNCATED_WRONG_VALUE_FOR_FIELD => DbError::Schema(server.message.clone()),
            _ => DbError::Query(server.message.clone()),
        },
        mysql::Error::IoError(_) | mysql::Error::UrlError(_) | mysql::Error::DriverError(_) => {
            DbError::Connection(e.to_string())
        }
        other => DbError::Query(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversion() {
        assert_eq!(mysql_value(Value::Null), mysql::Value::NULL);
        assert_eq!(mysql_value(Value::Integer(55)), mysql::Value::from(55i64));
        assert_eq!(mysql_value(Value::Boolean(true)), mysql::Value::from(true));
        assert_eq!(
            mysql_value(Value::Text("Beijing".into())),
            mysql::Value::from("Beijing")
        );
    }
}
