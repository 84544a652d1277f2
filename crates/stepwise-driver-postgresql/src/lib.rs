use postgres::{tls::MakeTlsConnect, Socket};
use std::borrow::Cow;
use stepwise_core::{
    async_trait,
    driver::{Capability, Driver},
    migration::AppliedMigration,
    Error, Result,
};
use tokio_postgres::{Client, Config};
use url::Url;

const CREATE_LEDGER: &str = "CREATE TABLE IF NOT EXISTS __stepwise_migrations (
    id BIGINT PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

#[derive(Debug)]
pub struct PostgreSQL {
    url: String,
    config: Config,
}

impl PostgreSQL {
    /// Create a new PostgreSQL driver from a `postgresql://` or `postgres://`
    /// connection URL.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str)
            .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url_str}")))?;

        if !matches!(url.scheme(), "postgresql" | "postgres") {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `postgresql` scheme; url={}",
                url_str
            )));
        }

        let host = url.host_str().ok_or_else(|| {
            Error::invalid_connection_url(format!(
                "missing host in connection URL; url={}",
                url_str
            ))
        })?;

        if url.path().is_empty() || url.path() == "/" {
            return Err(Error::invalid_connection_url(format!(
                "no database specified - missing path in connection URL; url={}",
                url_str
            )));
        }

        let mut config = Config::new();
        config.host(host);
        config.dbname(url.path().trim_start_matches('/'));

        if let Some(port) = url.port() {
            config.port(port);
        }

        if !url.username().is_empty() {
            config.user(url.username());
        }

        if let Some(password) = url.password() {
            config.password(password);
        }

        Ok(Self {
            url: url_str,
            config,
        })
    }
}

#[async_trait]
impl Driver for PostgreSQL {
    fn url(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.url)
    }

    async fn connect(&self) -> Result<Box<dyn stepwise_core::Connection>> {
        let connection = Connection::connect(&self.config, tokio_postgres::NoTls).await?;
        Ok(Box::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    client: Client,
}

impl Connection {
    /// Wrap an already initialized client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connects using a [`tokio_postgres::Config`], driving the connection on
    /// a spawned task.
    pub async fn connect<T>(config: &Config, tls: T) -> Result<Self>
    where
        T: MakeTlsConnect<Socket> + 'static,
        T::Stream: Send,
    {
        let (client, connection) = config
            .connect(tls)
            .await
            .map_err(Error::driver_operation_failed)?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("postgresql connection error: {e}");
            }
        });

        Ok(Self::new(client))
    }
}

impl From<Client> for Connection {
    fn from(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl stepwise_core::driver::Connection for Connection {
    fn engine_kind(&self) -> &str {
        "postgresql"
    }

    fn capability(&self) -> &'static Capability {
        &Capability::POSTGRESQL
    }

    async fn exec(&mut self, sql: &str) -> Result<u64> {
        self.client
            .execute(sql, &[])
            .await
            .map_err(Error::driver_operation_failed)
    }

    async fn ensure_ledger(&mut self) -> Result<()> {
        self.client
            .batch_execute(CREATE_LEDGER)
            .await
            .map_err(Error::driver_operation_failed)
    }

    async fn applied_migrations(&mut self) -> Result<Vec<AppliedMigration>> {
        let rows = self
            .client
            .query(
                "SELECT id, name FROM __stepwise_migrations ORDER BY id",
                &[],
            )
            .await
            .map_err(Error::driver_operation_failed)?;

        rows.iter()
            .map(|row| {
                let id: i64 = row.get(0);
                let name: String = row.get(1);
                let id = u64::try_from(id).map_err(Error::driver_operation_failed)?;
                Ok(AppliedMigration::new(id, name))
            })
            .collect()
    }

    async fn record_migration(&mut self, id: u64, name: &str) -> Result<()> {
        let id = i64::try_from(id).map_err(Error::driver_operation_failed)?;
        self.client
            .execute(
                "INSERT INTO __stepwise_migrations (id, name) VALUES ($1, $2)",
                &[&id, &name],
            )
            .await
            .map_err(Error::driver_operation_failed)?;
        Ok(())
    }

    async fn forget_migration(&mut self, id: u64) -> Result<()> {
        let id = i64::try_from(id).map_err(Error::driver_operation_failed)?;
        self.client
            .execute("DELETE FROM __stepwise_migrations WHERE id = $1", &[&id])
            .await
            .map_err(Error::driver_operation_failed)?;
        Ok(())
    }
}
