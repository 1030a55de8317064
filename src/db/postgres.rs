// PostgreSQL destination over the blocking `postgres` client.
//
// Bulk writes go through COPY ... FROM STDIN in CSV form, wrapped in a single
// transaction with the DROP/CREATE, so a failed load rolls back whole.

use postgres::error::SqlState;
use postgres::{Client, NoTls, Transaction};
use tracing::debug;

use crate::config::{ConnectionConfig, Driver};
use crate::db::{Destination, sql};
use crate::{Dataset, DbError, DbResult};

pub struct PostgresDestination {
    client: Client,
}

impl PostgresDestination {
    pub fn connect(config: &ConnectionConfig) -> DbResult<Self> {
        let client = Client::connect(&config.url(), NoTls)
            .map_err(|e| DbError::Connection(e.to_string()))?;
        debug!(host = %config.host, database = %config.database, "connected to postgres");
        Ok(Self { client })
    }

    fn copy_rows(tx: &mut Transaction<'_>, table: &str, dataset: &Dataset) -> DbResult<usize> {
        if dataset.rows.is_empty() {
            return Ok(0);
        }
        let types = dataset.column_types();
        let columns = dataset
            .columns
            .iter()
            .map(|c| sql::quote_ident(Driver::Postgres, c))
            .collect::<Vec<_>>()
            .join(", ");
        let stmt = format!(
            "COPY {} ({}) FROM STDIN WITH (FORMAT csv)",
            sql::quote_ident(Driver::Postgres, table),
            columns
        );

        let writer = tx.copy_in(stmt.as_str()).map_err(map_err)?;
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        for row in &dataset.rows {
            // Unquoted empty fields read back as NULL on the server side
            let record = row
                .iter()
                .zip(&types)
                .map(|(v, ty)| v.coerce(*ty).map(|v| v.render()))
                .collect::<DbResult<Vec<String>>>()?;
            csv_writer.write_record(&record)?;
        }
        let writer = csv_writer
            .into_inner()
            .map_err(|e| DbError::Query(e.to_string()))?;
        let written = writer.finish().map_err(map_err)?;
        Ok(written as usize)
    }

    fn table_exists(tx: &mut Transaction<'_>, table: &str) -> DbResult<bool> {
        let row = tx
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
                &[&table],
            )
            .map_err(map_err)?;
        Ok(row.get(0))
    }
}

impl Destination for PostgresDestination {
    fn replace_table(&mut self, table: &str, dataset: &Dataset) -> DbResult<usize> {
        let types = dataset.column_types();
        let mut tx = self.client.transaction().map_err(map_err)?;
        tx.batch_execute(&sql::drop_table(Driver::Postgres, table))
            .map_err(map_err)?;
        tx.batch_execute(&sql::create_table(
            Driver::Postgres,
            table,
            &dataset.columns,
            &types,
        ))
        .map_err(map_err)?;
        let written = Self::copy_rows(&mut tx, table, dataset)?;
        tx.commit().map_err(map_err)?;
        Ok(written)
    }

    fn append_rows(&mut self, table: &str, dataset: &Dataset) -> DbResult<usize> {
        let types = dataset.column_types();
        let mut tx = self.client.transaction().map_err(map_err)?;
        if !Self::table_exists(&mut tx, table)? {
            tx.batch_execute(&sql::create_table(
                Driver::Postgres,
                table,
                &dataset.columns,
                &types,
            ))
            .map_err(map_err)?;
        }
        let written = Self::copy_rows(&mut tx, table, dataset)?;
        tx.commit().map_err(map_err)?;
        Ok(written)
    }

    fn count_rows(&mut self, table: &str) -> DbResult<u64> {
        let stmt = sql::count_rows(Driver::Postgres, table);
        let row = self.client.query_one(stmt.as_str(), &[]).map_err(map_err)?;
        let count: i64 = row.get(0);
        Ok(count as u64)
    }
}

/// Translate driver failures into the crate error model.
fn map_err(e: postgres::Error) -> DbError {
    if let Some(db) = e.as_db_error() {
        let code = db.code();
        if *code == SqlState::UNDEFINED_TABLE {
            return DbError::TableNotFound(db.message().to_string());
        }
        // syntax/access (42xxx) and data (22xxx) classes are schema-shaped
        if code.code().starts_with("42") || code.code().starts_with("22") {
            return DbError::Schema(db.message().to_string());
        }
        return DbError::Query(db.message().to_string());
    }
    DbError::Connection(e.to_string())
}
