use mysql_async::{prelude::Queryable, Conn, Pool};
use std::borrow::Cow;
use stepwise_core::{
    async_trait,
    driver::{Capability, Driver},
    migration::AppliedMigration,
    Error, Result,
};
use url::Url;

const CREATE_LEDGER: &str = "CREATE TABLE IF NOT EXISTS __stepwise_migrations (
    id BIGINT UNSIGNED NOT NULL,
    name VARCHAR(255) NOT NULL,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (id)
) ENGINE=InnoDB";

#[derive(Debug)]
pub struct MySQL {
    url: String,
    pool: Pool,
}

impl MySQL {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str)
            .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url_str}")))?;

        if url.scheme() != "mysql" {
            return Err(Error::invalid_connection_url(format!(
                "connection url does not have a `mysql` scheme; url={}",
                url_str
            )));
        }

        if url.host_str().is_none() {
            return Err(Error::invalid_connection_url(format!(
                "missing host in connection URL; url={}",
                url_str
            )));
        }

        if url.path().is_empty() || url.path() == "/" {
            return Err(Error::invalid_connection_url(format!(
                "no database specified - missing path in connection URL; url={}",
                url_str
            )));
        }

        let opts = mysql_async::Opts::from_url(url.as_ref())
            .map_err(|err| Error::invalid_connection_url(err.to_string()))?;

        Ok(Self {
            url: url_str,
            pool: Pool::new(opts),
        })
    }
}

#[async_trait]
impl Driver for MySQL {
    fn url(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.url)
    }

    async fn connect(&self) -> Result<Box<dyn stepwise_core::Connection>> {
        let conn = self
            .pool
            .get_conn()
            .await
            .map_err(Error::driver_operation_failed)?;
        Ok(Box::new(Connection::new(conn)))
    }
}

#[derive(Debug)]
pub struct Connection {
    conn: Conn,
}

impl Connection {
    pub fn new(conn: Conn) -> Self {
        Self { conn }
    }
}

impl From<Conn> for Connection {
    fn from(conn: Conn) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl stepwise_core::driver::Connection for Connection {
    fn engine_kind(&self) -> &str {
        "mysql"
    }

    fn capability(&self) -> &'static Capability {
        &Capability::MYSQL
    }

    async fn exec(&mut self, sql: &str) -> Result<u64> {
        let result = self
            .conn
            .query_iter(sql)
            .await
            .map_err(Error::driver_operation_failed)?;
        let count = result.affected_rows();
        result
            .drop_result()
            .await
            .map_err(Error::driver_operation_failed)?;
        Ok(count)
    }

    async fn ensure_ledger(&mut self) -> Result<()> {
        self.conn
            .query_drop(CREATE_LEDGER)
            .await
            .map_err(Error::driver_operation_failed)
    }

    async fn applied_migrations(&mut self) -> Result<Vec<AppliedMigration>> {
        let rows: Vec<(u64, String)> = self
            .conn
            .query("SELECT id, name FROM __stepwise_migrations ORDER BY id")
            .await
            .map_err(Error::driver_operation_failed)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| AppliedMigration::new(id, name))
            .collect())
    }

    async fn record_migration(&mut self, id: u64, name: &str) -> Result<()> {
        tracing::debug!(id, name, "recording migration in ledger");
        self.conn
            .exec_drop(
                "INSERT INTO __stepwise_migrations (id, name) VALUES (?, ?)",
                (id, name),
            )
            .await
            .map_err(Error::driver_operation_failed)
    }

    async fn forget_migration(&mut self, id: u64) -> Result<()> {
        tracing::debug!(id, "removing migration from ledger");
        self.conn
            .exec_drop("DELETE FROM __stepwise_migrations WHERE id = ?", (id,))
            .await
            .map_err(Error::driver_operation_failed)
    }
}
