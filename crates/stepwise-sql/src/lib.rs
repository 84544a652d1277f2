//! Offline checks for migration statement lists.
//!
//! [`SchemaModel`] replays DDL against an in-memory model of tables, indexes
//! and foreign keys, rejecting statements a database would refuse because of
//! ordering: dropping a table another table still references, adding a
//! foreign key to a table that does not exist yet, and so on.
//! [`verify_round_trip`] replays a step's `up` list followed by its `down`
//! list and checks the schema is back where it started.

mod fallback;

pub mod model;
pub use model::{ForeignKey, Index, Replayed, SchemaModel, Table};

mod verify;
pub use verify::{verify_round_trip, Opaque, Report};

use sqlparser::dialect::{
    Dialect as ParserDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect,
};
use stepwise_core::Dialect;

pub(crate) fn parser_dialect(dialect: Dialect) -> Box<dyn ParserDialect> {
    match dialect {
        Dialect::Mysql => Box::new(MySqlDialect {}),
        Dialect::Postgresql => Box::new(PostgreSqlDialect {}),
        Dialect::Sqlite => Box::new(SQLiteDialect {}),
    }
}
