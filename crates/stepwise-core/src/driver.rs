mod capability;
pub use capability::Capability;

mod dialect;
pub use dialect::Dialect;

use crate::{async_trait, migration::AppliedMigration, Result};

use std::{borrow::Cow, fmt::Debug};

#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// The connection URL this driver was created from.
    fn url(&self) -> Cow<'_, str>;

    /// Open a new connection to the database.
    async fn connect(&self) -> Result<Box<dyn Connection>>;
}

#[async_trait]
pub trait Connection: Debug + Send + 'static {
    /// The engine kind the connection was configured with, e.g. `mysql` or
    /// `better-sqlite3`. [`Dialect::from_engine_kind`] maps it to a dialect.
    fn engine_kind(&self) -> &str;

    /// Describes what the database supports, which informs the runner.
    fn capability(&self) -> &'static Capability;

    /// Execute a single raw SQL statement and return the number of affected
    /// rows.
    async fn exec(&mut self, sql: &str) -> Result<u64>;

    /// Create the ledger table if it does not exist yet.
    async fn ensure_ledger(&mut self) -> Result<()>;

    /// Migrations recorded in the ledger, ordered by id.
    async fn applied_migrations(&mut self) -> Result<Vec<AppliedMigration>>;

    /// Record a migration as applied.
    async fn record_migration(&mut self, id: u64, name: &str) -> Result<()>;

    /// Remove a migration from the ledger after it has been reverted.
    async fn forget_migration(&mut self, id: u64) -> Result<()>;
}
