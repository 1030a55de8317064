pub mod memory;
pub mod mysql;
pub mod postgres;
pub mod sql;

pub use memory::MemoryDestination;
pub use mysql::MysqlDestination;
pub use postgres::PostgresDestination;

use crate::config::{ConnectionConfig, Driver};
use crate::{Dataset, DbResult};

/// A database that can receive datasets and report table sizes.
///
/// Each method is one synchronous round trip; the connection closes when the
/// destination is dropped, whether the operation succeeded or not.
pub trait Destination {
    /// Drop and recreate `table` so it holds exactly `dataset`.
    fn replace_table(&mut self, table: &str, dataset: &Dataset) -> DbResult<usize>;

    /// Insert `dataset` after any existing rows, creating `table` if missing.
    fn append_rows(&mut self, table: &str, dataset: &Dataset) -> DbResult<usize>;

    /// Current number of rows in `table`.
    fn count_rows(&mut self, table: &str) -> DbResult<u64>;
}

/// Open a connection for the configured driver.
pub fn connect(config: &ConnectionConfig) -> DbResult<Box<dyn Destination>> {
    Ok(match config.driver {
        Driver::Postgres => Box::new(PostgresDestination::connect(config)?),
        Driver::Mysql => Box::new(MysqlDestination::connect(config)?),
    })
}
