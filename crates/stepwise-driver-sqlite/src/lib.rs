use rusqlite::Connection as RusqliteConnection;
use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};
use stepwise_core::{
    async_trait,
    driver::{Capability, Driver},
    migration::AppliedMigration,
    Error, Result,
};
use url::Url;

const CREATE_LEDGER: &str = "CREATE TABLE IF NOT EXISTS __stepwise_migrations (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
)";

#[derive(Debug)]
pub struct Sqlite {
    location: Location,

    /// Reported by connections as their engine kind.
    engine_kind: &'static str,
}

#[derive(Debug)]
enum Location {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver from a `sqlite:` or `better-sqlite3:` URL.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str)
            .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url_str}")))?;

        let engine_kind = match url.scheme() {
            "sqlite" => "sqlite",
            "better-sqlite3" => "better-sqlite3",
            _ => {
                return Err(Error::invalid_connection_url(format!(
                    "connection URL does not have a `sqlite` scheme; url={}",
                    url_str
                )))
            }
        };

        let location = if url.path() == ":memory:" {
            Location::InMemory
        } else {
            Location::File(PathBuf::from(url.path()))
        };

        Ok(Self {
            location,
            engine_kind,
        })
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self {
            location: Location::InMemory,
            engine_kind: "sqlite",
        }
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            location: Location::File(path.as_ref().to_path_buf()),
            engine_kind: "sqlite",
        }
    }
}

#[async_trait]
impl Driver for Sqlite {
    fn url(&self) -> Cow<'_, str> {
        match &self.location {
            Location::InMemory => Cow::Owned(format!("{}::memory:", self.engine_kind)),
            Location::File(path) => Cow::Owned(format!("{}:{}", self.engine_kind, path.display())),
        }
    }

    async fn connect(&self) -> Result<Box<dyn stepwise_core::Connection>> {
        let connection = match &self.location {
            Location::File(path) => Connection::open(path)?,
            Location::InMemory => Connection::in_memory()?,
        };
        Ok(Box::new(connection.with_engine_kind(self.engine_kind)))
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
    engine_kind: &'static str,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection =
            RusqliteConnection::open_in_memory().map_err(Error::driver_operation_failed)?;
        Self::from_rusqlite(connection)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::driver_operation_failed)?;
        Self::from_rusqlite(connection)
    }

    fn from_rusqlite(connection: RusqliteConnection) -> Result<Self> {
        // Foreign keys are off by default in SQLite
        connection
            .execute_batch("PRAGMA foreign_keys = ON")
            .map_err(Error::driver_operation_failed)?;

        Ok(Self {
            connection,
            engine_kind: "sqlite",
        })
    }

    /// Report `engine_kind` instead of `sqlite`, e.g. `better-sqlite3`.
    pub fn with_engine_kind(mut self, engine_kind: &'static str) -> Self {
        self.engine_kind = engine_kind;
        self
    }

    /// The underlying rusqlite connection, for introspection.
    pub fn as_rusqlite(&self) -> &RusqliteConnection {
        &self.connection
    }
}

#[async_trait]
impl stepwise_core::driver::Connection for Connection {
    fn engine_kind(&self) -> &str {
        self.engine_kind
    }

    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    async fn exec(&mut self, sql: &str) -> Result<u64> {
        let count = self
            .connection
            .execute(sql, [])
            .map_err(Error::driver_operation_failed)?;
        Ok(count as u64)
    }

    async fn ensure_ledger(&mut self) -> Result<()> {
        self.connection
            .execute(CREATE_LEDGER, [])
            .map_err(Error::driver_operation_failed)?;
        Ok(())
    }

    async fn applied_migrations(&mut self) -> Result<Vec<AppliedMigration>> {
        let mut stmt = self
            .connection
            .prepare("SELECT id, name FROM __stepwise_migrations ORDER BY id")
            .map_err(Error::driver_operation_failed)?;

        let rows = stmt
            .query_map([], |row| {
                let id: u64 = row.get(0)?;
                let name: String = row.get(1)?;
                Ok(AppliedMigration::new(id, name))
            })
            .map_err(Error::driver_operation_failed)?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::driver_operation_failed)
    }

    async fn record_migration(&mut self, id: u64, name: &str) -> Result<()> {
        tracing::debug!(id, name, "recording migration in ledger");
        self.connection
            .execute(
                "INSERT INTO __stepwise_migrations (id, name, applied_at) VALUES (?1, ?2, datetime('now'))",
                rusqlite::params![id, name],
            )
            .map_err(Error::driver_operation_failed)?;
        Ok(())
    }

    async fn forget_migration(&mut self, id: u64) -> Result<()> {
        tracing::debug!(id, "removing migration from ledger");
        self.connection
            .execute(
                "DELETE FROM __stepwise_migrations WHERE id = ?1",
                rusqlite::params![id],
            )
            .map_err(Error::driver_operation_failed)?;
        Ok(())
    }
}
